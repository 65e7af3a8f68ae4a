use crate::{document::DocumentFormat, qa::Answer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskReport {
    /// Absent when the context was supplied directly instead of uploaded.
    pub document: Option<DocumentInfo>,
    pub context_chars: usize,
    pub question: String,
    pub answer: Answer,
    pub timings: Timings,
    pub started: String,
    pub finished: String,
    pub config_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub name: String,
    pub format: DocumentFormat,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timings {
    pub extract_ms: u64,
    pub answer_ms: u64,
}
