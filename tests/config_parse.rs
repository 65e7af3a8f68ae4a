use doc_ask::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../doc-ask.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.model.repo_id, "deepset/tinyroberta-squad2");
    assert_eq!(cfg.limits.max_upload_bytes, 3 * 1024 * 1024);
    assert!(cfg.model.doc_stride < cfg.model.max_seq_len);
}

#[test]
fn missing_keys_fall_back_to_defaults() {
    let cfg: Config = toml::from_str("[model]\nmax_seq_len = 256\n").expect("parse TOML");
    assert_eq!(cfg.model.max_seq_len, 256);
    assert_eq!(cfg.model.doc_stride, 128);
    assert_eq!(cfg.model.max_answer_len, 15);
    assert!(cfg.model.handle_impossible_answer);
    assert_eq!(cfg.logging.level, "info");
    assert!(!cfg.output.print_json);
}

#[test]
fn config_hash_input_is_stable() {
    let cfg = Config::default();
    assert_eq!(cfg.normalized_for_hash(), cfg.clone().normalized_for_hash());
    assert!(cfg.normalized_for_hash().contains("max_upload_bytes"));
}
