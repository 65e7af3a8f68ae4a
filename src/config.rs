use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: Model,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub output: Output,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    /// Hugging Face repository of an extractive QA checkpoint.
    pub repo_id: String,
    pub revision: String,
    /// Directory holding config.json, tokenizer.json and weights. Skips the hub when set.
    pub local_dir: String,
    /// Hub cache override; empty uses the hub client's default.
    pub cache_dir: String,
    /// "cpu" or "auto" (first CUDA device when compiled in, else CPU).
    pub device: String,
    pub max_seq_len: usize,
    pub doc_stride: usize,
    pub max_answer_len: usize,
    pub max_question_len: usize,
    pub handle_impossible_answer: bool,
}
impl Default for Model {
    fn default() -> Self {
        Self {
            repo_id: "deepset/tinyroberta-squad2".into(),
            revision: "main".into(),
            local_dir: "".into(),
            cache_dir: "".into(),
            device: "cpu".into(),
            max_seq_len: 384,
            doc_stride: 128,
            max_answer_len: 15,
            max_question_len: 64,
            handle_impossible_answer: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_upload_bytes: u64,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_upload_bytes: 3 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub print_json: bool,
    pub write_report_json: bool,
    pub report_path: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            print_json: false,
            write_report_json: false,
            report_path: "doc-ask-report.json".into(),
        }
    }
}
