//! Scripted in-memory provider for dispatcher and route tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Generate, LlmError, NativeResponse, OutputPart, ProviderRequest, RequestMode};
use crate::models::analysis::ProviderKind;

/// Replays queued responses in order and records the mode of every call.
/// Once the script runs out it answers with an empty response.
pub struct ScriptedProvider {
    kind: ProviderKind,
    model: String,
    script: Mutex<VecDeque<Result<NativeResponse, LlmError>>>,
    calls: Mutex<Vec<RequestMode>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind, model: &str) -> Self {
        Self {
            kind,
            model: model.to_string(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn then_text(self, text: &str) -> Self {
        self.then(Ok(NativeResponse {
            output_text: None,
            output: vec![OutputPart::text(text)],
        }))
    }

    pub fn then_empty(self) -> Self {
        self.then(Ok(NativeResponse::default()))
    }

    pub fn then_error(self, status: u16, message: &str) -> Self {
        self.then(Err(LlmError::Api {
            status,
            message: message.to_string(),
        }))
    }

    fn then(self, response: Result<NativeResponse, LlmError>) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<RequestMode> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generate for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ProviderRequest<'_>) -> Result<NativeResponse, LlmError> {
        self.calls.lock().unwrap().push(request.mode);
        self.prompts.lock().unwrap().push(request.prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(NativeResponse::default()))
    }
}
