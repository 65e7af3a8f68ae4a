use doc_ask::config::Limits;
use doc_ask::upload::validate;
use doc_ask::{Document, DocumentFormat, Error, ErrorKind};

#[test]
fn oversized_upload_is_rejected() {
    let limits = Limits::default();
    let doc = Document::new(
        "big.txt",
        DocumentFormat::Txt,
        vec![b'a'; limits.max_upload_bytes as usize + 1],
    );
    let err = validate(&limits, &doc).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RejectedUpload);
    assert!(matches!(err, Error::UploadTooLarge { .. }));
}

#[test]
fn upload_at_the_limit_is_accepted() {
    let limits = Limits { max_upload_bytes: 16 };
    let doc = Document::new("notes.txt", DocumentFormat::Txt, vec![b'a'; 16]);
    assert!(validate(&limits, &doc).is_ok());
}

#[test]
fn extension_must_match_declared_format() {
    let doc = Document::new("report.pdf", DocumentFormat::Docx, b"x".to_vec());
    let err = validate(&Limits::default(), &doc).unwrap_err();
    assert!(matches!(err, Error::FormatMismatch { declared: DocumentFormat::Docx, .. }));
}

#[test]
fn unknown_extension_is_a_mismatch() {
    let doc = Document::new("slides.pptx", DocumentFormat::Pdf, b"x".to_vec());
    assert!(validate(&Limits::default(), &doc).is_err());
}

#[test]
fn missing_extension_trusts_declared_format() {
    let doc = Document::new("README", DocumentFormat::Txt, b"hello".to_vec());
    assert!(validate(&Limits::default(), &doc).is_ok());
}

#[test]
fn format_names_parse() {
    assert_eq!("PDF".parse::<DocumentFormat>().unwrap(), DocumentFormat::Pdf);
    assert_eq!(".docx".parse::<DocumentFormat>().unwrap(), DocumentFormat::Docx);
    assert_eq!("text".parse::<DocumentFormat>().unwrap(), DocumentFormat::Txt);
    assert!("doc".parse::<DocumentFormat>().is_err());
    assert_eq!(DocumentFormat::from_name("Thesis.Final.PDF"), Some(DocumentFormat::Pdf));
    assert_eq!(DocumentFormat::from_name("archive.zip"), None);
}
