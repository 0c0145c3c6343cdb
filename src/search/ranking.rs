//! Query-time ranking over the similarity index. The index is injected at
//! construction; when none was loaded the service degrades to a single
//! canned result so the search page stays functional.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::search::index::{SchemeRecord, SimilarityIndex};

const SUMMARY_WIDTH: usize = 250;
const ELLIPSIS: &str = "...";

/// One ranked search hit, ready for rendering.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredRecord {
    pub scheme_name: String,
    pub scheme_category: String,
    pub level: String,
    pub summary: String,
    pub benefits: String,
    pub eligibility: String,
    pub application: String,
    pub documents: String,
    pub tags: String,
    pub score: f64,
}

pub struct RankingService {
    index: Option<Arc<SimilarityIndex>>,
}

impl RankingService {
    pub fn new(index: Option<Arc<SimilarityIndex>>) -> Self {
        Self { index }
    }

    pub fn is_degraded(&self) -> bool {
        self.index.is_none()
    }

    /// Rank the catalog against a free-text query and return the top `top_k`
    /// hits in descending score order. Equal scores keep the original catalog
    /// row order (the descending sort is stable), so results are
    /// deterministic. Without a loaded index, returns the fallback record.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<ScoredRecord> {
        let Some(index) = &self.index else {
            return vec![fallback_record()];
        };

        let qvec = index.vectorizer.transform(query);
        let mut scored: Vec<(usize, f64)> = index
            .matrix
            .iter()
            .map(|row| cosine_similarity(&qvec, row))
            .enumerate()
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(row, score)| materialize(&index.schemes[row], score))
            .collect()
    }
}

/// `(q . r) / (|q| * |r|)`, defined as 0 when either vector is zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn materialize(scheme: &SchemeRecord, score: f64) -> ScoredRecord {
    let scheme_name = if scheme.scheme_name.is_empty() {
        "Unknown Scheme".to_string()
    } else {
        scheme.scheme_name.clone()
    };
    ScoredRecord {
        scheme_name,
        scheme_category: scheme.scheme_category.clone(),
        level: scheme.level.clone(),
        summary: shorten(&scheme.details, SUMMARY_WIDTH),
        benefits: scheme.benefits.clone(),
        eligibility: scheme.eligibility.clone(),
        application: scheme.application.clone(),
        documents: scheme.documents.clone(),
        tags: scheme.tags.clone(),
        score: round3(score),
    }
}

/// The canned hit served when no index artifacts were loaded at startup,
/// keeping the search page functional in degraded mode.
fn fallback_record() -> ScoredRecord {
    ScoredRecord {
        scheme_name: "Startup India".to_string(),
        scheme_category: "Entrepreneurship".to_string(),
        level: "National".to_string(),
        summary: "A Government initiative to promote startups.".to_string(),
        benefits: "Tax exemptions, mentorship".to_string(),
        eligibility: "Registered startups".to_string(),
        application: "Apply on Startup India portal".to_string(),
        documents: "Company registration, PAN".to_string(),
        tags: "startup, innovation".to_string(),
        score: 0.91,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Collapse whitespace and truncate at a word boundary so the result,
/// including the ellipsis marker, never exceeds `width` characters. Text
/// that already fits is returned collapsed but unmarked.
pub fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(ELLIPSIS.len());
    let mut out = String::new();
    let mut out_chars = 0;
    for word in &words {
        let word_chars = word.chars().count();
        let needed = if out.is_empty() {
            word_chars
        } else {
            out_chars + 1 + word_chars
        };
        if needed > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
            out_chars += 1;
        }
        out.push_str(word);
        out_chars += word_chars;
    }
    out.push_str(ELLIPSIS);
    out
}
