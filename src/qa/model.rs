//! Pretrained extractive QA model: a BERT-family encoder with a two-logit
//! `qa_outputs` head, run with candle on CPU (or CUDA when available).

use super::assets::{self, ModelFiles};
use super::span::{self, Pick, WindowScores};
use super::{Answer, ModelDiag, QuestionAnswerer, Span};
use crate::config;
use crate::error::{Error, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tokenizers::{
    Encoding, PostProcessor, Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy,
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Bert,
    /// Same encoder as BERT; positions start after the padding index.
    Roberta,
}

impl Architecture {
    pub fn detect(model_type: Option<&str>) -> Self {
        match model_type {
            Some("roberta") => Self::Roberta,
            _ => Self::Bert,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Bert => "bert",
            Self::Roberta => "roberta",
        }
    }
}

pub struct ExtractiveModel {
    encoder: BertModel,
    qa_outputs: Linear,
    tokenizer: Tokenizer,
    device: Device,
    uses_token_types: bool,
    max_seq_len: usize,
    doc_stride: usize,
    /// Special tokens the post-processor adds around a question/context pair.
    pair_specials: usize,
    max_answer_len: usize,
    max_question_len: usize,
    handle_impossible_answer: bool,
    diag: ModelDiag,
}

impl std::fmt::Debug for ExtractiveModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractiveModel")
            .field("diag", &self.diag)
            .finish_non_exhaustive()
    }
}

impl ExtractiveModel {
    pub fn load(cfg: &config::Model) -> Result<Self> {
        let files = assets::resolve(cfg)?;
        Self::from_files(&files, cfg)
    }

    pub fn from_files(files: &ModelFiles, cfg: &config::Model) -> Result<Self> {
        let started = Instant::now();
        let device = select_device(&cfg.device)?;

        let raw = std::fs::read_to_string(&files.config)?;
        let mut bert_cfg: BertConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::model_load(format!("{}: {e}", files.config.display())))?;
        let arch = Architecture::detect(bert_cfg.model_type.as_deref());

        let mut tensors = load_tensors(&files.weights, &device)?;
        if arch == Architecture::Roberta {
            shift_positions(&mut tensors, &mut bert_cfg)?;
        }

        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let encoder = BertModel::load(vb.clone(), &bert_cfg).map_err(Error::model_load)?;
        let qa_outputs =
            candle_nn::linear(bert_cfg.hidden_size, 2, vb.pp("qa_outputs")).map_err(Error::model_load)?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(Error::model_load)?;
        let pair_specials = tokenizer
            .get_post_processor()
            .map_or(0, |p| p.added_tokens(true));
        // A window must keep more than `doc_stride` context tokens after the question.
        if cfg.doc_stride + cfg.max_question_len + pair_specials >= cfg.max_seq_len {
            return Err(Error::model_load(format!(
                "doc_stride ({}) + max_question_len ({}) + {pair_specials} special tokens must be below max_seq_len ({})",
                cfg.doc_stride, cfg.max_question_len, cfg.max_seq_len
            )));
        }
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: cfg.max_seq_len,
                stride: cfg.doc_stride,
                strategy: TruncationStrategy::OnlySecond,
                direction: TruncationDirection::Right,
            }))
            .map_err(Error::model_load)?;

        let diag = ModelDiag {
            model: if cfg.local_dir.is_empty() {
                format!("{}@{}", cfg.repo_id, cfg.revision)
            } else {
                cfg.local_dir.clone()
            },
            architecture: arch.name().to_string(),
            device: format!("{device:?}"),
            max_seq_len: cfg.max_seq_len,
            files: files.paths(),
        };
        info!(
            "QA model ready: {} arch={} device={} in {}ms",
            diag.model,
            diag.architecture,
            diag.device,
            started.elapsed().as_millis()
        );

        Ok(Self {
            encoder,
            qa_outputs,
            tokenizer,
            device,
            uses_token_types: bert_cfg.type_vocab_size > 1,
            max_seq_len: cfg.max_seq_len,
            doc_stride: cfg.doc_stride,
            pair_specials,
            max_answer_len: cfg.max_answer_len,
            max_question_len: cfg.max_question_len,
            handle_impossible_answer: cfg.handle_impossible_answer,
            diag,
        })
    }

    /// The question cut to `max_question_len` tokens (0 keeps it whole), with its token count.
    fn clip_question<'q>(&self, question: &'q str) -> Result<(&'q str, usize)> {
        let enc = self.tokenizer.encode(question, false).map_err(Error::inference)?;
        if self.max_question_len == 0 || enc.len() <= self.max_question_len {
            return Ok((question, enc.len()));
        }
        let (_, end) = enc.get_offsets()[self.max_question_len - 1];
        warn!(
            "question has {} tokens; keeping the first {}",
            enc.len(),
            self.max_question_len
        );
        Ok((question.get(..end).unwrap_or(question), self.max_question_len))
    }

    fn window_logits(&self, window: &Encoding) -> candle_core::Result<(Vec<f32>, Vec<f32>)> {
        let input_ids = Tensor::new(window.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = if self.uses_token_types {
            Tensor::new(window.get_type_ids(), &self.device)?.unsqueeze(0)?
        } else {
            input_ids.zeros_like()?
        };
        let attention_mask = Tensor::new(window.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden = self
            .encoder
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let logits = self
            .qa_outputs
            .forward(&hidden)?
            .squeeze(0)?
            .to_dtype(DType::F32)?
            .to_vec2::<f32>()?;

        Ok(logits.iter().map(|row| (row[0], row[1])).unzip())
    }
}

impl QuestionAnswerer for ExtractiveModel {
    fn answer(&self, context: &str, question: &str) -> Result<Answer> {
        let started = Instant::now();
        let (question, question_tokens) = self.clip_question(question)?;
        let reserved = question_tokens + self.pair_specials;
        if reserved + self.doc_stride >= self.max_seq_len {
            return Err(Error::inference(format!(
                "question takes {reserved} of {} tokens, leaving no room for a context window with stride {}",
                self.max_seq_len, self.doc_stride
            )));
        }

        let mut encoding = self
            .tokenizer
            .encode((question, context), true)
            .map_err(Error::inference)?;
        let overflow = encoding.take_overflowing();
        let windows: Vec<Encoding> = std::iter::once(encoding).chain(overflow).collect();

        let mut scores: Vec<WindowScores> = Vec::with_capacity(windows.len());
        for window in &windows {
            let (start, end) = self.window_logits(window).map_err(Error::inference)?;
            let is_context: Vec<bool> = window
                .get_sequence_ids()
                .iter()
                .map(|s| *s == Some(1))
                .collect();
            scores.push(span::score_window(&start, &end, &is_context, self.max_answer_len));
        }

        let answer = match span::pick(&scores, self.handle_impossible_answer) {
            Pick::NoAnswer { score } => Answer::none_with_score(score),
            Pick::Span { window, span } => {
                let offsets = windows[window].get_offsets();
                let (from, _) = offsets[span.start];
                let (_, to) = offsets[span.end];
                let text = context.get(from..to).ok_or_else(|| {
                    Error::inference(format!("token offsets {from}..{to} are not on character boundaries"))
                })?;
                let start = context[..from].chars().count();
                Answer::new(
                    text,
                    span.score,
                    Span {
                        start,
                        end: start + text.chars().count(),
                    },
                )
            }
        };

        debug!(
            "answered over {} window(s) in {}ms score={:?} found={}",
            windows.len(),
            started.elapsed().as_millis(),
            answer.score,
            answer.is_found()
        );
        Ok(answer)
    }

    fn diag(&self) -> ModelDiag {
        self.diag.clone()
    }
}

fn select_device(name: &str) -> Result<Device> {
    match name {
        "cpu" => Ok(Device::Cpu),
        "auto" => Device::cuda_if_available(0).map_err(Error::model_load),
        other => Err(Error::model_load(format!("unknown device '{other}' (expected cpu or auto)"))),
    }
}

fn load_tensors(path: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let is_safetensors = path.extension().and_then(|e| e.to_str()) == Some("safetensors");
    if is_safetensors {
        return candle_core::safetensors::load(path, device)
            .map_err(|e| Error::model_load(format!("{}: {e}", path.display())));
    }

    let tensors = candle_core::pickle::read_all(path)
        .map_err(|e| Error::model_load(format!("{}: {e}", path.display())))?;
    tensors
        .into_iter()
        .map(|(name, t)| Ok((name, t.to_device(device).map_err(Error::model_load)?)))
        .collect()
}

/// RoBERTa numbers positions from `pad_token_id + 1`. Dropping the unused
/// leading rows lets the BERT encoder index positions from zero.
fn shift_positions(tensors: &mut HashMap<String, Tensor>, cfg: &mut BertConfig) -> Result<()> {
    let offset = cfg.pad_token_id + 1;
    let key = tensors
        .keys()
        .find(|k| k.ends_with("embeddings.position_embeddings.weight"))
        .cloned()
        .ok_or_else(|| Error::model_load("position embeddings not found in weights"))?;

    let table = &tensors[&key];
    let rows = table.dim(0).map_err(Error::model_load)?;
    if rows <= offset {
        return Err(Error::model_load(format!(
            "position table has {rows} rows, need more than {offset}"
        )));
    }
    let shifted = table.narrow(0, offset, rows - offset).map_err(Error::model_load)?;
    debug!("shifted {key} by {offset} rows");

    cfg.max_position_embeddings = rows - offset;
    tensors.insert(key, shifted);
    Ok(())
}
