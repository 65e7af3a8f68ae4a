use crate::error::{Error, Result};

/// Strict UTF-8 decode. Invalid input is rejected rather than patched with
/// replacement characters.
pub fn extract_txt(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| Error::Encoding {
            valid_up_to: e.valid_up_to(),
        })
}
