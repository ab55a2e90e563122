//! Scripted completion backend shared by the tool tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lessonmcp_providers::{BackendError, CompletionBackend, RetryEngine};

/// Replays a fixed script and records every prompt it receives.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<String, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str, _model: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::transport("script exhausted")))
    }

    fn display_name(&self) -> &str {
        "Scripted"
    }
}

/// Single-model, single-pass engine over `backend`.
pub fn engine(backend: Arc<ScriptedBackend>) -> Arc<RetryEngine> {
    Arc::new(RetryEngine::new(backend, vec!["test-model".to_string()], 1).unwrap())
}
