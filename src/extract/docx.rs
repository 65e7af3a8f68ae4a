use crate::document::DocumentFormat;
use crate::error::{Error, Result};
use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild};

/// Body paragraphs in order, each followed by a newline.
///
/// Tables, images and embedded objects are skipped. Empty paragraphs still
/// contribute their newline.
pub fn extract_docx(bytes: &[u8]) -> Result<String> {
    let docx = read_docx(bytes).map_err(|e| Error::unreadable(DocumentFormat::Docx, format!("{e:?}")))?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(para) = child {
            push_paragraph(para, &mut text);
            text.push('\n');
        }
    }
    Ok(text)
}

fn push_paragraph(para: &Paragraph, out: &mut String) {
    for child in &para.children {
        push_paragraph_child(child, out);
    }
}

fn push_paragraph_child(child: &ParagraphChild, out: &mut String) {
    match child {
        ParagraphChild::Run(run) => push_run(run, out),
        // Runs inside a hyperlink are part of the visible paragraph text.
        ParagraphChild::Hyperlink(link) => {
            for c in &link.children {
                push_paragraph_child(c, out);
            }
        }
        _ => {}
    }
}

fn push_run(run: &Run, out: &mut String) {
    for rc in &run.children {
        match rc {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}
