#![allow(dead_code)]

use doc_ask::qa::{ModelHandle, QaService};
use doc_ask::{Answer, Error, QuestionAnswerer, Result, Span};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Stand-in model: answers with the word right before " is the capital",
/// or "no answer" when the phrase is absent. Fails on the question "boom".
pub struct ScriptedModel;

impl QuestionAnswerer for ScriptedModel {
    fn answer(&self, context: &str, question: &str) -> Result<Answer> {
        if question == "boom" {
            return Err(Error::Inference("scripted model fault".into()));
        }
        match context.find(" is the capital") {
            Some(end) => {
                let start = context[..end].rfind(char::is_whitespace).map(|i| i + 1).unwrap_or(0);
                let text = &context[start..end];
                let char_start = context[..start].chars().count();
                Ok(Answer::new(
                    text,
                    0.93,
                    Span {
                        start: char_start,
                        end: char_start + text.chars().count(),
                    },
                ))
            }
            None => Ok(Answer::none_with_score(0.71)),
        }
    }
}

/// A lazily-loading service around [`ScriptedModel`] that counts loads.
pub fn counting_service() -> (QaService, Arc<AtomicUsize>) {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let service = QaService::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScriptedModel) as ModelHandle)
    });
    (service, loads)
}
