use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 3] = [Self::Pdf, Self::Docx, Self::Txt];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }

    /// Format implied by a file name's extension, if it is one we accept.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" | "text" => Ok(Self::Txt),
            other => Err(format!("unknown format '{other}' (expected pdf, docx or txt)")),
        }
    }
}

/// An uploaded document: consumed once by the extractor, never persisted.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, format: DocumentFormat, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            format,
            bytes,
        }
    }

    /// Read a document from disk. Without a declared format the extension decides.
    pub fn from_path(path: &Path, declared: Option<DocumentFormat>) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let format = match declared {
            Some(f) => f,
            None => DocumentFormat::from_name(&name).ok_or_else(|| {
                Error::UnsupportedFormat(
                    path.extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("<none>")
                        .to_string(),
                )
            })?,
        };

        let bytes = std::fs::read(path)?;
        Ok(Self::new(name, format, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
