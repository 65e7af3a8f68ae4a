//! Span selection over a model's start/end logits.
//!
//! A window is one tokenized `[CLS] question [SEP] context [SEP]` slice. Only
//! context tokens may start or end an answer; token 0 carries the "no answer"
//! score.

/// Logit assigned to tokens that may not be part of an answer.
const MASKED_LOGIT: f32 = -10_000.0;

/// Token indices of a candidate answer, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanChoice {
    pub start: usize,
    pub end: usize,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowScores {
    pub best: Option<SpanChoice>,
    pub null_score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pick {
    Span { window: usize, span: SpanChoice },
    NoAnswer { score: f32 },
}

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

pub fn score_window(
    start_logits: &[f32],
    end_logits: &[f32],
    is_context: &[bool],
    max_answer_len: usize,
) -> WindowScores {
    let n = start_logits.len().min(end_logits.len()).min(is_context.len());
    if n == 0 {
        return WindowScores {
            best: None,
            null_score: 0.0,
        };
    }

    let masked = |logits: &[f32]| -> Vec<f32> {
        (0..n)
            .map(|i| if i == 0 || is_context[i] { logits[i] } else { MASKED_LOGIT })
            .collect()
    };
    let p_start = softmax(&masked(start_logits));
    let p_end = softmax(&masked(end_logits));

    let null_score = p_start[0] * p_end[0];
    let max_len = max_answer_len.max(1);

    let mut best: Option<SpanChoice> = None;
    for s in 0..n {
        if !is_context[s] {
            continue;
        }
        for e in s..(s + max_len).min(n) {
            // Context tokens are contiguous; the first non-context token ends it.
            if !is_context[e] {
                break;
            }
            let score = p_start[s] * p_end[e];
            if best.is_none_or(|b| score > b.score) {
                best = Some(SpanChoice { start: s, end: e, score });
            }
        }
    }

    WindowScores { best, null_score }
}

/// Best span across all windows, or "no answer" when nothing qualifies or,
/// with `handle_impossible_answer`, when the null score beats every span.
pub fn pick(windows: &[WindowScores], handle_impossible_answer: bool) -> Pick {
    let min_null = windows
        .iter()
        .map(|w| w.null_score)
        .fold(f32::INFINITY, f32::min);
    let min_null = if min_null.is_finite() { min_null } else { 0.0 };

    let best = windows
        .iter()
        .enumerate()
        .filter_map(|(i, w)| w.best.map(|b| (i, b)))
        .fold(None::<(usize, SpanChoice)>, |acc, (i, b)| match acc {
            Some((_, a)) if a.score >= b.score => acc,
            _ => Some((i, b)),
        });

    match best {
        Some((_, span)) if handle_impossible_answer && min_null > span.score => {
            Pick::NoAnswer { score: min_null }
        }
        Some((window, span)) => Pick::Span { window, span },
        None => Pick::NoAnswer { score: min_null },
    }
}
