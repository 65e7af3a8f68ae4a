use crate::config::Limits;
use crate::document::{Document, DocumentFormat};
use crate::error::{Error, Result};
use tracing::warn;

/// Reject uploads before any extraction runs: oversized files and files whose
/// extension disagrees with the declared format.
pub fn validate(limits: &Limits, doc: &Document) -> Result<()> {
    if doc.size() > limits.max_upload_bytes {
        return Err(Error::UploadTooLarge {
            size: doc.size(),
            limit: limits.max_upload_bytes,
        });
    }

    let has_extension = std::path::Path::new(&doc.name).extension().is_some();
    match DocumentFormat::from_name(&doc.name) {
        Some(implied) if implied == doc.format => {}
        None if !has_extension => {
            warn!("upload has no extension; trusting declared format {}: {}", doc.format, doc.name);
        }
        _ => {
            return Err(Error::FormatMismatch {
                declared: doc.format,
                name: doc.name.clone(),
            });
        }
    }

    Ok(())
}
