pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod qa;
pub mod report;
pub mod upload;
pub mod util;

pub use document::{Document, DocumentFormat};
pub use error::{Error, ErrorKind, Result};
pub use qa::{answer, Answer, QuestionAnswerer, Span};
