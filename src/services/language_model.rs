use async_trait::async_trait;

use crate::error::CallFailure;

/// Outcome of one chat-completion call, after its retry budget is spent.
pub type CallResult = Result<String, CallFailure>;

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    async fn complete(&self, prompt: &str) -> CallResult;
}
