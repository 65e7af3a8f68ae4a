use crate::{
    config::Config,
    document::{Document, DocumentFormat},
    pipeline::{ContextSource, Pipeline},
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "doc-ask")]
#[command(about = "Ask questions about a PDF, Word or text document (extractive QA)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./doc-ask.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the QA model once and print what was loaded.
    Doctor {},
    /// Print the plain text extracted from a document.
    Extract {
        #[arg(long)]
        input: PathBuf,
        /// pdf, docx or txt. Defaults to the file extension.
        #[arg(long)]
        format: Option<DocumentFormat>,
        /// Write the text here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Answer a question from a document or from literal context text.
    Ask {
        #[arg(long, required_unless_present = "context", conflicts_with = "context")]
        input: Option<PathBuf>,
        /// Use this text as the context instead of a document.
        #[arg(long)]
        context: Option<String>,
        #[arg(long)]
        format: Option<DocumentFormat>,
        #[arg(long)]
        question: String,
        /// Print the full JSON report.
        #[arg(long)]
        json: bool,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = match &cfg_path {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };

    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
    if let Some(p) = &cfg_path {
        info!("config {}", p.display());
    }

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Extract { input, format, out } => extract(&cfg, input, *format, out.as_deref()),
        Command::Ask {
            input,
            context,
            format,
            question,
            json,
        } => {
            let pipeline = Pipeline::from_config(&cfg);
            let source = match (input, context) {
                (Some(path), _) => ContextSource::Document(load_document(&pipeline, path, *format)?),
                (None, Some(text)) => ContextSource::Text(text.clone()),
                (None, None) => return Err(anyhow!("either --input or --context is required")),
            };
            ask(&cfg, &pipeline, &source, question, *json)
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("doc-ask.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output; logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("doc-ask.log"))
}

fn load_document(pipeline: &Pipeline, path: &Path, format: Option<DocumentFormat>) -> Result<Document> {
    pipeline
        .load(path, format)
        .with_context(|| format!("reading input: {}", path.display()))
}

fn doctor(cfg: &Config) -> Result<()> {
    let pipeline = Pipeline::from_config(cfg);
    let handle = pipeline.qa().get_model_handle()?;
    println!("{}", serde_json::to_string_pretty(&handle.diag())?);
    Ok(())
}

fn extract(cfg: &Config, input: &Path, format: Option<DocumentFormat>, out: Option<&Path>) -> Result<()> {
    let pipeline = Pipeline::from_config(cfg);
    let doc = load_document(&pipeline, input, format)?;
    let text = pipeline
        .extract(&doc)
        .with_context(|| format!("extracting {}", input.display()))?;

    match out {
        Some(path) => {
            std::fs::write(path, &text).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {} chars to {}", text.chars().count(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn ask(cfg: &Config, pipeline: &Pipeline, source: &ContextSource, question: &str, json: bool) -> Result<()> {
    let out = pipeline.run(source, question)?;

    if cfg.output.write_report_json {
        let path = PathBuf::from(&cfg.output.report_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(&out.report)?)
            .with_context(|| format!("writing report: {}", path.display()))?;
    }

    if json || cfg.output.print_json {
        println!("{}", serde_json::to_string_pretty(&out.report)?);
    } else if out.answer.is_found() {
        println!("Answer:\n{}", out.answer.text);
    } else {
        println!("No answer found.");
    }
    Ok(())
}
