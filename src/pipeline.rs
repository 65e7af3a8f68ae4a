use crate::{
    config::Config,
    document::{Document, DocumentFormat},
    error::{Error, Result},
    extract,
    qa::{Answer, QaService},
    report::{AskReport, DocumentInfo, Timings},
    upload,
    util::{now_rfc3339, sha256_hex},
};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Where the QA context comes from: an uploaded document, or text the user
/// supplied (or edited) directly.
#[derive(Debug, Clone)]
pub enum ContextSource {
    Document(Document),
    Text(String),
}

pub struct AskOutput {
    pub context: String,
    pub answer: Answer,
    pub report: AskReport,
}

/// Request/response boundary between a front end and the two core steps.
/// Each call runs to completion on the calling thread.
pub struct Pipeline {
    cfg: Config,
    qa: QaService,
}

impl Pipeline {
    pub fn new(cfg: &Config, qa: QaService) -> Self {
        Self {
            cfg: cfg.clone(),
            qa,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg, QaService::from_config(&cfg.model))
    }

    pub fn qa(&self) -> &QaService {
        &self.qa
    }

    /// Read an upload from disk. Without `declared`, the extension picks the format.
    /// Files over the upload limit are rejected before they are read.
    pub fn load(&self, path: &Path, declared: Option<DocumentFormat>) -> Result<Document> {
        let size = std::fs::metadata(path)?.len();
        let limit = self.cfg.limits.max_upload_bytes;
        if size > limit {
            return Err(Error::UploadTooLarge { size, limit });
        }
        let doc = Document::from_path(path, declared)?;
        info!(
            "loaded {} format={} bytes={} sha256={}",
            doc.name,
            doc.format,
            doc.size(),
            sha256_hex(&doc.bytes)
        );
        Ok(doc)
    }

    /// Validate an upload and turn it into plain text.
    pub fn extract(&self, doc: &Document) -> Result<String> {
        upload::validate(&self.cfg.limits, doc)?;
        let text = extract::extract_document(doc)?;
        info!("extracted {} chars from {}", text.chars().count(), doc.name);
        if text.is_empty() {
            warn!("no text could be extracted from {}", doc.name);
        }
        Ok(text)
    }

    pub fn ask(&self, context: &str, question: &str) -> Result<Answer> {
        info!("Getting answer...");
        self.qa.answer(context, question)
    }

    pub fn run(&self, source: &ContextSource, question: &str) -> Result<AskOutput> {
        let started = now_rfc3339();

        let t = Instant::now();
        let (context, document) = match source {
            ContextSource::Document(doc) => {
                let text = self.extract(doc)?;
                let info = DocumentInfo {
                    name: doc.name.clone(),
                    format: doc.format,
                    bytes: doc.size(),
                    sha256: sha256_hex(&doc.bytes),
                };
                (text, Some(info))
            }
            ContextSource::Text(text) => (text.clone(), None),
        };
        let extract_ms = t.elapsed().as_millis() as u64;

        let t = Instant::now();
        let answer = self.ask(&context, question)?;
        let answer_ms = t.elapsed().as_millis() as u64;

        info!(
            "answer found={} score={:?} chars={}",
            answer.is_found(),
            answer.score,
            answer.text.chars().count()
        );

        let report = AskReport {
            document,
            context_chars: context.chars().count(),
            question: question.to_string(),
            answer: answer.clone(),
            timings: Timings {
                extract_ms,
                answer_ms,
            },
            started,
            finished: now_rfc3339(),
            config_hash: sha256_hex(self.cfg.normalized_for_hash().as_bytes()),
        };

        Ok(AskOutput {
            context,
            answer,
            report,
        })
    }
}
