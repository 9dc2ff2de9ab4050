use std::io::{self, BufRead, Write};

use clap::{Args, Subcommand};

use crate::config::{
    DEFAULT_ENDPOINT, DEFAULT_LISTEN, DEFAULT_MODEL, DEFAULT_TIMEOUT, StoredConfig,
    config_file_path, parse_listen, parse_max_attempts, parse_retry_delay_secs,
    parse_timeout_secs,
};
use crate::error::{AppError, AppResult};
use crate::infra::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Interactively edit the stored configuration.
    Init,
    /// Print the stored configuration with the API key masked.
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => {
            let mut cfg = StoredConfig::load()?;
            println!("Configuring crisis-desk. Enter keeps a value, '-' clears it.");
            println!("The API key is stored in plain text in the config file.");
            println!();

            let stdin = io::stdin();
            edit(&mut cfg, &mut stdin.lock(), &mut io::stdout())?;
            cfg.save()?;
            println!("\nConfiguration saved to {}", config_file_path()?.display());
            Ok(())
        }
        ConfigCommand::Show => {
            let cfg = StoredConfig::load()?;
            println!("Configuration file: {}", config_file_path()?.display());
            for setting in Setting::ALL {
                println!("{}: {}", setting.label(), setting.shown(setting.value(&cfg)));
            }
            Ok(())
        }
    }
}

/// One stored setting as the wizard sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setting {
    ApiKey,
    Endpoint,
    Model,
    TimeoutSecs,
    MaxAttempts,
    RetryDelaySecs,
    Listen,
}

impl Setting {
    const ALL: [Setting; 7] = [
        Setting::ApiKey,
        Setting::Endpoint,
        Setting::Model,
        Setting::TimeoutSecs,
        Setting::MaxAttempts,
        Setting::RetryDelaySecs,
        Setting::Listen,
    ];

    fn label(self) -> &'static str {
        match self {
            Setting::ApiKey => "OpenRouter API key",
            Setting::Endpoint => "Chat completion endpoint",
            Setting::Model => "Model",
            Setting::TimeoutSecs => "Request timeout (seconds)",
            Setting::MaxAttempts => "Attempts per stage",
            Setting::RetryDelaySecs => "Delay between attempts (seconds)",
            Setting::Listen => "Listen address",
        }
    }

    fn default_hint(self) -> Option<String> {
        match self {
            Setting::ApiKey => None,
            Setting::Endpoint => Some(DEFAULT_ENDPOINT.to_string()),
            Setting::Model => Some(DEFAULT_MODEL.to_string()),
            Setting::TimeoutSecs => Some(DEFAULT_TIMEOUT.as_secs().to_string()),
            Setting::MaxAttempts => Some(DEFAULT_MAX_ATTEMPTS.to_string()),
            Setting::RetryDelaySecs => Some(DEFAULT_RETRY_DELAY.as_secs().to_string()),
            Setting::Listen => Some(DEFAULT_LISTEN.to_string()),
        }
    }

    fn value(self, cfg: &StoredConfig) -> &Option<String> {
        match self {
            Setting::ApiKey => &cfg.api_key,
            Setting::Endpoint => &cfg.endpoint,
            Setting::Model => &cfg.model,
            Setting::TimeoutSecs => &cfg.timeout_secs,
            Setting::MaxAttempts => &cfg.max_attempts,
            Setting::RetryDelaySecs => &cfg.retry_delay_secs,
            Setting::Listen => &cfg.listen,
        }
    }

    fn slot(self, cfg: &mut StoredConfig) -> &mut Option<String> {
        match self {
            Setting::ApiKey => &mut cfg.api_key,
            Setting::Endpoint => &mut cfg.endpoint,
            Setting::Model => &mut cfg.model,
            Setting::TimeoutSecs => &mut cfg.timeout_secs,
            Setting::MaxAttempts => &mut cfg.max_attempts,
            Setting::RetryDelaySecs => &mut cfg.retry_delay_secs,
            Setting::Listen => &mut cfg.listen,
        }
    }

    /// Checks a typed value and returns the form it is stored in.
    fn validate(self, raw: &str) -> AppResult<String> {
        let raw = raw.trim();
        match self {
            Setting::ApiKey | Setting::Model => Ok(raw.to_string()),
            Setting::Endpoint => {
                let url = reqwest::Url::parse(raw).map_err(|err| {
                    AppError::Configuration(format!("invalid endpoint URL '{raw}': {err}"))
                })?;
                match url.scheme() {
                    "http" | "https" => Ok(url.to_string()),
                    scheme => Err(AppError::Configuration(format!(
                        "endpoint must use http or https, not '{scheme}'"
                    ))),
                }
            }
            Setting::TimeoutSecs => parse_timeout_secs(raw).map(|d| d.as_secs().to_string()),
            Setting::MaxAttempts => parse_max_attempts(raw).map(|n| n.to_string()),
            Setting::RetryDelaySecs => parse_retry_delay_secs(raw).map(|d| d.as_secs().to_string()),
            Setting::Listen => parse_listen(raw).map(|addr| addr.to_string()),
        }
    }

    fn shown(self, value: &Option<String>) -> String {
        match value.as_deref().filter(|v| !v.is_empty()) {
            None => "<not set>".to_string(),
            Some(secret) if self == Setting::ApiKey => mask_secret(secret),
            Some(v) => v.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Answer {
    Keep,
    Clear,
    Set(String),
}

/// Walks every setting, asking again until each answer is valid.
fn edit<R: BufRead, W: Write>(
    cfg: &mut StoredConfig,
    input: &mut R,
    output: &mut W,
) -> AppResult<()> {
    for setting in Setting::ALL {
        let current = setting.value(cfg).clone();
        match ask(setting, current.as_deref(), input, output)? {
            Answer::Keep => {}
            Answer::Clear => *setting.slot(cfg) = None,
            Answer::Set(value) => *setting.slot(cfg) = Some(value),
        }
    }
    Ok(())
}

fn ask<R: BufRead, W: Write>(
    setting: Setting,
    current: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> AppResult<Answer> {
    loop {
        match (current, setting.default_hint()) {
            (Some(value), _) => write!(
                output,
                "{} [{}]: ",
                setting.label(),
                setting.shown(&Some(value.to_string()))
            )?,
            (None, Some(hint)) => write!(output, "{} (default {hint}): ", setting.label())?,
            (None, None) => write!(output, "{}: ", setting.label())?,
        }
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(Answer::Keep);
        }
        match line.trim() {
            "" => return Ok(Answer::Keep),
            "-" => return Ok(Answer::Clear),
            raw => match setting.validate(raw) {
                Ok(value) => return Ok(Answer::Set(value)),
                Err(err) => writeln!(output, "  {err}; try again.")?,
            },
        }
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 6 {
        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 3..].iter().collect();
        format!("{prefix}***{suffix}")
    } else {
        "***".to_string()
    }
}
