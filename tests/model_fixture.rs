//! Runs `ExtractiveModel` end to end on a tiny randomly initialised encoder
//! and a word-level tokenizer written to a temp dir. Weights are random, so
//! these tests check span plumbing, not answer quality.

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use doc_ask::config;
use doc_ask::qa::ExtractiveModel;
use doc_ask::{Answer, ErrorKind, QuestionAnswerer};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

const HIDDEN: usize = 8;
const SPECIALS: [&str; 4] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]"];
const WORDS: [&str; 20] = [
    "what", "is", "the", "capital", "of", "france", "paris", "a", "city", "river", "seine",
    "flows", "through", "it", "café", "über", "and", "?", ".", ":",
];

fn tokenizer_json() -> Value {
    let vocab: serde_json::Map<String, Value> = SPECIALS
        .iter()
        .chain(WORDS.iter())
        .enumerate()
        .map(|(i, t)| (t.to_string(), json!(i)))
        .collect();
    let added: Vec<Value> = SPECIALS
        .iter()
        .enumerate()
        .map(|(i, t)| {
            json!({
                "id": i, "content": t, "single_word": false, "lstrip": false,
                "rstrip": false, "normalized": false, "special": true
            })
        })
        .collect();
    json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added,
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": { "type": "BertProcessing", "sep": ["[SEP]", 3], "cls": ["[CLS]", 2] },
        "decoder": null,
        "model": { "type": "WordLevel", "vocab": vocab, "unk_token": "[UNK]" }
    })
}

fn encoder_config(model_type: &str, pad_token_id: usize, type_vocab_size: usize, positions: usize) -> Value {
    json!({
        "vocab_size": SPECIALS.len() + WORDS.len(),
        "hidden_size": HIDDEN,
        "num_hidden_layers": 1,
        "num_attention_heads": 2,
        "intermediate_size": 16,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.0,
        "max_position_embeddings": positions,
        "type_vocab_size": type_vocab_size,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": pad_token_id,
        "position_embedding_type": "absolute",
        "use_cache": false,
        "classifier_dropout": null,
        "model_type": model_type
    })
}

fn write_model(dir: &Path, config: Value) {
    std::fs::write(dir.join("config.json"), config.to_string()).unwrap();
    std::fs::write(dir.join("tokenizer.json"), tokenizer_json().to_string()).unwrap();

    let bert_cfg: BertConfig = serde_json::from_value(config).unwrap();
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    BertModel::load(vb.clone(), &bert_cfg).unwrap();
    candle_nn::linear(HIDDEN, 2, vb.pp("qa_outputs")).unwrap();
    varmap.save(dir.join("model.safetensors")).unwrap();
}

fn bert_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), encoder_config("bert", 0, 2, 32));
    dir
}

fn model_cfg(dir: &TempDir) -> config::Model {
    config::Model {
        local_dir: dir.path().display().to_string(),
        max_seq_len: 32,
        doc_stride: 8,
        max_question_len: 8,
        max_answer_len: 5,
        handle_impossible_answer: false,
        ..config::Model::default()
    }
}

fn assert_span_matches(context: &str, answer: &Answer) {
    assert!(answer.is_found());
    let span = answer.span.expect("span");
    let picked: String = context
        .chars()
        .skip(span.start)
        .take(span.end - span.start)
        .collect();
    assert_eq!(picked, answer.text);
    assert!(context.contains(&answer.text));
}

#[test]
fn span_maps_back_onto_a_multibyte_context() {
    let dir = bert_dir();
    let model = ExtractiveModel::load(&model_cfg(&dir)).unwrap();

    let context = "Über café: Paris is the capital of France.";
    let answer = model.answer(context, "What is the capital of France?").unwrap();
    assert_span_matches(context, &answer);
    assert!(answer.score.is_some());
}

#[test]
fn context_longer_than_one_window_is_answered() {
    let dir = bert_dir();
    let model = ExtractiveModel::load(&model_cfg(&dir)).unwrap();

    let context = "The river Seine flows through Paris and the city. ".repeat(12);
    let answer = model.answer(&context, "What flows through Paris?").unwrap();
    assert_span_matches(&context, &answer);
}

#[test]
fn long_question_is_clipped_to_fit() {
    let dir = bert_dir();
    let model = ExtractiveModel::load(&model_cfg(&dir)).unwrap();

    let question = "what is the capital of france ".repeat(6);
    let context = "Paris is the capital of France.";
    let answer = model.answer(context, &question).unwrap();
    assert_span_matches(context, &answer);
}

#[test]
fn unclipped_question_that_fills_the_window_is_an_inference_error() {
    let dir = bert_dir();
    let cfg = config::Model {
        max_question_len: 0,
        ..model_cfg(&dir)
    };
    let model = ExtractiveModel::load(&cfg).unwrap();

    let question = "what is the capital of france ".repeat(4);
    let context = "The river Seine flows through Paris. ".repeat(20);
    let err = model.answer(&context, &question).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Inference);
}

#[test]
fn stride_that_leaves_no_context_room_is_rejected_at_load() {
    let dir = bert_dir();
    let cfg = config::Model {
        doc_stride: 24,
        max_question_len: 8,
        ..model_cfg(&dir)
    };
    let err = ExtractiveModel::load(&cfg).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::ModelLoad);
}

#[test]
fn roberta_checkpoint_loads_with_shifted_positions() {
    let dir = tempfile::tempdir().unwrap();
    // Two extra rows for the padding offset RoBERTa numbers positions from.
    write_model(dir.path(), encoder_config("roberta", 1, 1, 34));
    let model = ExtractiveModel::load(&model_cfg(&dir)).unwrap();
    assert_eq!(model.diag().architecture, "roberta");

    let context = "Paris is the capital of France.";
    let answer = model.answer(context, "What is the capital of France?").unwrap();
    assert_span_matches(context, &answer);
}

#[test]
fn missing_weights_fail_to_load() {
    let dir = bert_dir();
    std::fs::remove_file(dir.path().join("model.safetensors")).unwrap();
    let err = ExtractiveModel::load(&model_cfg(&dir)).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::ModelLoad);
}
