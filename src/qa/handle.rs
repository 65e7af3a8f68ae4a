use super::{Answer, ExtractiveModel, QuestionAnswerer};
use crate::config;
use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared, immutable model handle. Cheap to clone.
pub type ModelHandle = Arc<dyn QuestionAnswerer>;

type Loader = Box<dyn Fn() -> Result<ModelHandle> + Send + Sync>;

/// Owns the model handle's lifecycle: `Uninitialized` until the first
/// [`QaService::get_model_handle`], then `Ready` for the life of the service.
///
/// Concurrent first callers block on a single construction; the loader runs
/// at most once per successful initialization. A failed load leaves the
/// service uninitialized.
pub struct QaService {
    cell: OnceCell<ModelHandle>,
    loader: Loader,
}

impl QaService {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<ModelHandle> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            loader: Box::new(loader),
        }
    }

    /// A service backed by the pretrained model described in `cfg`, loaded lazily.
    pub fn from_config(cfg: &config::Model) -> Self {
        let cfg = cfg.clone();
        Self::new(move || Ok(Arc::new(ExtractiveModel::load(&cfg)?) as ModelHandle))
    }

    /// A service that is already `Ready` with the given handle.
    pub fn with_handle(handle: ModelHandle) -> Self {
        Self {
            cell: OnceCell::with_value(handle),
            // Never called: the cell is already set.
            loader: Box::new(|| Err(Error::model_load("model handle was injected"))),
        }
    }

    pub fn get_model_handle(&self) -> Result<ModelHandle> {
        self.cell
            .get_or_try_init(|| {
                info!("Loading QA model...");
                let started = Instant::now();
                let handle = (self.loader)()?;
                info!("QA model loaded in {}ms", started.elapsed().as_millis());
                Ok::<_, crate::error::Error>(handle)
            })
            .cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Answer against the shared handle. An empty context never loads the model.
    pub fn answer(&self, context: &str, question: &str) -> Result<Answer> {
        if context.is_empty() {
            return Ok(Answer::none());
        }
        let handle = self.get_model_handle()?;
        super::answer(handle.as_ref(), context, question)
    }
}
