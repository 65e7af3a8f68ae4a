//! Extractive question answering behind a stable call contract:
//! context + question in, answer span out.

pub mod assets;
pub mod handle;
pub mod model;
pub mod span;

pub use handle::{ModelHandle, QaService};
pub use model::ExtractiveModel;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Character range `[start, end)` of the answer within the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// An empty `text` means the model found no supporting span. That is a
/// result, not a failure; failures come back as [`crate::Error`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub score: Option<f32>,
    pub span: Option<Span>,
}

impl Answer {
    pub fn new(text: impl Into<String>, score: f32, span: Span) -> Self {
        Self {
            text: text.into(),
            score: Some(score),
            span: Some(span),
        }
    }

    pub fn none() -> Self {
        Self {
            text: String::new(),
            score: None,
            span: None,
        }
    }

    pub fn none_with_score(score: f32) -> Self {
        Self {
            score: Some(score),
            ..Self::none()
        }
    }

    pub fn is_found(&self) -> bool {
        !self.text.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDiag {
    pub model: String,
    pub architecture: String,
    pub device: String,
    pub max_seq_len: usize,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Anything that can pick an answer span out of a context.
///
/// Implementations must be reentrant: a single instance is shared by every
/// caller once constructed and is invoked concurrently without locking.
pub trait QuestionAnswerer: Send + Sync {
    fn answer(&self, context: &str, question: &str) -> Result<Answer>;

    fn diag(&self) -> ModelDiag {
        ModelDiag::default()
    }
}

/// Answer `question` against `context`. An empty context yields an empty
/// answer without invoking the model.
pub fn answer(handle: &dyn QuestionAnswerer, context: &str, question: &str) -> Result<Answer> {
    if context.is_empty() {
        return Ok(Answer::none());
    }
    handle.answer(context, question)
}
