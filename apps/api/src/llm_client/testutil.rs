//! Scripted chat model for unit tests.

use async_trait::async_trait;

use crate::llm_client::{ChatModel, LlmError};

/// Replies with a fixed completion, or fails with an API error.
pub struct ScriptedChat(pub Result<String, &'static str>);

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(
        &self,
        _system: &str,
        _prompt: &str,
        _temperature: f32,
    ) -> Result<String, LlmError> {
        match &self.0 {
            Ok(reply) => Ok(reply.clone()),
            Err(msg) => Err(LlmError::Api {
                status: 500,
                message: msg.to_string(),
            }),
        }
    }
}
