//! Pairwise compatibility scoring.
//!
//! Everything in this module is pure: callers load the question catalog and
//! both users' answers, and get back a 0-100 percentage. Scores are computed
//! over the questions both users answered, iterating the catalog in
//! position order so `score(a, b) == score(b, a)` holds bit-for-bit.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Serialize;

use crate::models::{AnswerSet, Question, QuestionKind};

/// Which similarity function a deployment uses. The two produce
/// percentages on different scales and must not be mixed for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringVariant {
    /// Hand-tuned per-position distance tables.
    #[default]
    Tuned,
    /// Exact match / Jaccard / linear scale, chosen by question kind.
    Typed,
}

impl FromStr for ScoringVariant {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tuned" => Ok(ScoringVariant::Tuned),
            "typed" => Ok(ScoringVariant::Typed),
            _ => Err(()),
        }
    }
}

/// Similarity for distances 1..=4 on questions without a bespoke table.
pub const FALLBACK_CURVE: [f64; 4] = [0.7, 0.5, 0.3, 0.1];

/// Similarity for a distance no table covers.
const UNMAPPED_DISTANCE: f64 = 0.5;

/// Bespoke curves for positions 1..=10, indexed by `distance - 1`.
///
/// Several are non-monotonic on purpose: on negatively framed traits
/// ("critical, likes to argue", "anxious") two people at opposite extremes
/// get along better than a near miss.
const TUNED_TABLES: [[f64; 4]; 10] = [
    [0.8, 0.6, 0.3, 0.1], // open, sociable
    [0.7, 0.5, 0.6, 0.2], // critical, argumentative
    [0.8, 0.5, 0.3, 0.1], // responsible, disciplined
    [0.7, 0.8, 0.6, 0.3], // easily upset, anxious
    [0.8, 0.6, 0.4, 0.2], // open to new experience
    [0.7, 0.8, 0.5, 0.3], // hides emotions
    [0.9, 0.7, 0.4, 0.2], // sympathetic, kind
    [0.8, 0.9, 0.6, 0.3], // spontaneous
    [0.8, 0.6, 0.4, 0.1], // emotionally stable
    [0.7, 0.8, 0.5, 0.3], // conservative
];

fn curve_for_position(position: i64) -> &'static [f64; 4] {
    usize::try_from(position)
        .ok()
        .and_then(|p| p.checked_sub(1))
        .and_then(|idx| TUNED_TABLES.get(idx))
        .unwrap_or(&FALLBACK_CURVE)
}

/// Table-driven similarity of two single indices on the question at
/// `position` (1-based).
pub fn tuned_similarity(position: i64, a: i64, b: i64) -> f64 {
    if a == b {
        return 1.0;
    }
    let distance = (a - b).unsigned_abs() as usize;
    curve_for_position(position)
        .get(distance - 1)
        .copied()
        .unwrap_or(UNMAPPED_DISTANCE)
}

/// Kind-driven similarity of two selections.
pub fn typed_similarity(question: &Question, a: &[i64], b: &[i64]) -> f64 {
    match question.kind {
        QuestionKind::Single => match (a.first(), b.first()) {
            (Some(x), Some(y)) if x == y => 1.0,
            _ => 0.0,
        },
        QuestionKind::Multiple => {
            let left: BTreeSet<i64> = a.iter().copied().collect();
            let right: BTreeSet<i64> = b.iter().copied().collect();
            let union = left.union(&right).count();
            if union == 0 {
                return 0.0;
            }
            left.intersection(&right).count() as f64 / union as f64
        }
        QuestionKind::Scale => {
            let (Some(x), Some(y)) = (a.first(), b.first()) else {
                return 0.0;
            };
            let max_diff = question.option_count().saturating_sub(1);
            if max_diff == 0 {
                return 1.0;
            }
            1.0 - (x - y).unsigned_abs() as f64 / max_diff as f64
        }
    }
}

/// Similarity of two answers to one question, always within `[0, 1]`.
pub fn answer_similarity(variant: ScoringVariant, question: &Question, a: &[i64], b: &[i64]) -> f64 {
    let raw = match variant {
        ScoringVariant::Tuned => match (a.first(), b.first()) {
            (Some(x), Some(y)) => tuned_similarity(question.position, *x, *y),
            _ => 0.0,
        },
        ScoringVariant::Typed => typed_similarity(question, a, b),
    };
    raw.clamp(0.0, 1.0)
}

/// Per-question similarities for the questions both users answered, in
/// catalog order.
fn shared_similarities<'q>(
    variant: ScoringVariant,
    questions: &'q [Question],
    a: &AnswerSet,
    b: &AnswerSet,
) -> Vec<(&'q Question, f64)> {
    questions
        .iter()
        .filter_map(|q| {
            let left = a.get(&q.id)?;
            let right = b.get(&q.id)?;
            Some((q, answer_similarity(variant, q, left, right)))
        })
        .collect()
}

fn to_percentage(similarities: &[f64]) -> u8 {
    if similarities.is_empty() {
        return 0;
    }
    let total: f64 = similarities.iter().sum();
    let pct = (total / similarities.len() as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Compatibility percentage of two answer sets. Zero when the users share
/// no answered question.
pub fn compatibility(
    variant: ScoringVariant,
    questions: &[Question],
    a: &AnswerSet,
    b: &AnswerSet,
) -> u8 {
    let sims: Vec<f64> = shared_similarities(variant, questions, a, b)
        .into_iter()
        .map(|(_, s)| s)
        .collect();
    to_percentage(&sims)
}

#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityInsights {
    pub score: u8,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

const STRENGTH_THRESHOLD: f64 = 0.8;
const CONCERN_THRESHOLD: f64 = 0.3;

/// Score plus the question titles the pair agrees or clashes on.
pub fn insights(
    variant: ScoringVariant,
    questions: &[Question],
    a: &AnswerSet,
    b: &AnswerSet,
) -> CompatibilityInsights {
    let shared = shared_similarities(variant, questions, a, b);
    let mut strengths = Vec::new();
    let mut concerns = Vec::new();
    for (question, similarity) in &shared {
        if *similarity >= STRENGTH_THRESHOLD {
            strengths.push(question.title.clone());
        } else if *similarity <= CONCERN_THRESHOLD {
            concerns.push(question.title.clone());
        }
    }
    let sims: Vec<f64> = shared.iter().map(|(_, s)| *s).collect();
    CompatibilityInsights {
        score: to_percentage(&sims),
        strengths,
        concerns,
    }
}
