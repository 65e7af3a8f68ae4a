use crate::config::Model;
use crate::error::{Error, Result};
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Weight files in order of preference.
pub const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];

#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    pub fn paths(&self) -> Vec<String> {
        [&self.config, &self.tokenizer, &self.weights]
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    }
}

pub fn resolve(cfg: &Model) -> Result<ModelFiles> {
    if !cfg.local_dir.is_empty() {
        return from_dir(Path::new(&cfg.local_dir));
    }
    from_hub(cfg)
}

pub fn from_dir(dir: &Path) -> Result<ModelFiles> {
    let required = |name: &str| -> Result<PathBuf> {
        let p = dir.join(name);
        if p.is_file() {
            Ok(p)
        } else {
            Err(Error::model_load(format!("missing {}", p.display())))
        }
    };

    let weights = WEIGHT_FILES
        .iter()
        .map(|f| dir.join(f))
        .find(|p| p.is_file())
        .ok_or_else(|| {
            Error::model_load(format!(
                "no weights in {} (looked for {})",
                dir.display(),
                WEIGHT_FILES.join(", ")
            ))
        })?;

    Ok(ModelFiles {
        config: required("config.json")?,
        tokenizer: required("tokenizer.json")?,
        weights,
    })
}

fn from_hub(cfg: &Model) -> Result<ModelFiles> {
    info!("resolving model {}@{} from the hub", cfg.repo_id, cfg.revision);

    let mut builder = ApiBuilder::new().with_progress(false);
    if !cfg.cache_dir.is_empty() {
        builder = builder.with_cache_dir(PathBuf::from(&cfg.cache_dir));
    }
    let api = builder.build().map_err(Error::model_load)?;
    let repo = api.repo(Repo::with_revision(
        cfg.repo_id.clone(),
        RepoType::Model,
        cfg.revision.clone(),
    ));

    let get = |name: &str| {
        repo.get(name)
            .map_err(|e| Error::model_load(format!("{}/{name}: {e}", cfg.repo_id)))
    };

    let config = get("config.json")?;
    let tokenizer = get("tokenizer.json")?;

    let mut last_err = None;
    let mut weights = None;
    for name in WEIGHT_FILES {
        match get(name) {
            Ok(p) => {
                weights = Some(p);
                break;
            }
            Err(e) => {
                debug!("weights {name} unavailable: {e}");
                last_err = Some(e);
            }
        }
    }
    let weights = match (weights, last_err) {
        (Some(p), _) => p,
        (None, Some(e)) => return Err(e),
        (None, None) => return Err(Error::model_load("no weight files configured")),
    };

    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}
