use std::sync::Arc;

use clap::Args;

use crate::config::{AppConfig, parse_listen};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::chat::ChatCompletionClient;
use crate::services::LanguageModelService;
use crate::web;

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Address to listen on, e.g. 0.0.0.0:8080.
    #[arg(short, long)]
    pub listen: Option<String>,
    /// Override the configured model identifier.
    #[arg(short, long)]
    pub model: Option<String>,
}

pub async fn run(args: ServeArgs) -> AppResult<()> {
    let mut config = AppConfig::load()?;
    if let Some(listen) = args.listen.as_deref() {
        config.listen = parse_listen(listen)?;
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    if config.api_key.is_none() {
        tracing::warn!(
            "API key not configured; set OPENROUTER_API_KEY or run `crisis-desk config init`. Statement generation will fail."
        );
    }
    tracing::info!(
        model = %config.model,
        endpoint = %config.endpoint,
        timeout = ?config.timeout,
        max_attempts = config.retry.max_attempts(),
        retry_delay = ?config.retry.delay(),
        "loaded configuration"
    );

    let language_model: Arc<dyn LanguageModelService> =
        Arc::new(ChatCompletionClient::from_config(&config));
    let context = AppContext::new(language_model);

    web::serve(context, config.listen).await
}
