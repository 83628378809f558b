//! Scripted [`Evaluator`] used by tests in place of a live provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Evaluator, LlmError, RawResponse};

#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Fail(String),
}

impl Step {
    pub fn reply(content: impl Into<String>) -> Self {
        Step::Reply(content.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Step::Fail(message.into())
    }
}

/// Replays `steps` in order; once the script runs out, every call fails.
pub struct ScriptedEvaluator {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicU32,
}

impl ScriptedEvaluator {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Evaluator for ScriptedEvaluator {
    async fn evaluate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _temperature: f32,
    ) -> Result<RawResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(content)) => Ok(RawResponse {
                content,
                usage: None,
            }),
            Some(Step::Fail(message)) => Err(LlmError::Api {
                status: 503,
                message,
            }),
            None => Err(LlmError::EmptyContent),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
