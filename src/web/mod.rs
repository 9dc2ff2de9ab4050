mod page;

use std::net::SocketAddr;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::context::AppContext;
use crate::error::{AppError, AppResult, CallFailure};
use crate::workflow::statement::generate_statements;

use self::page::PageView;

#[derive(Debug, Deserialize)]
struct StatementForm {
    #[serde(default)]
    description: String,
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/statements", get(index).post(create_statements))
        .route("/health", get(health_check))
        .with_state(ctx)
}

pub async fn serve(ctx: AppContext, addr: SocketAddr) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Serving crisis desk on http://{}", listener.local_addr()?);
    axum::serve(listener, router(ctx))
        .await
        .map_err(|err| AppError::Server(err.to_string()))
}

async fn index() -> Html<String> {
    Html(page::render(&PageView::default()))
}

async fn create_statements(
    State(ctx): State<AppContext>,
    Form(form): Form<StatementForm>,
) -> (StatusCode, Html<String>) {
    match generate_statements(&ctx, &form.description).await {
        Ok(pair) => (
            StatusCode::OK,
            Html(page::render(&PageView {
                description: &form.description,
                statements: Some(&pair),
                ..PageView::default()
            })),
        ),
        Err(err) => {
            let (status, partial) = match &err {
                AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, None),
                AppError::Stage(failure)
                    if matches!(failure.failure, CallFailure::Configuration(_)) =>
                {
                    (StatusCode::INTERNAL_SERVER_ERROR, None)
                }
                AppError::Stage(failure) => {
                    (StatusCode::BAD_GATEWAY, failure.crisis_statement.as_deref())
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, None),
            };
            let html = page::render(&PageView {
                description: &form.description,
                partial_crisis_statement: partial,
                error: Some(err.to_string()),
                ..PageView::default()
            });
            (status, Html(html))
        }
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "crisis-desk"
    }))
}
