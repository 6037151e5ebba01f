use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::answers::Answers;
use super::catalog::{
    QuestionCatalog, QuestionType, INTEREST_CATEGORIES, MAX_RESPONSE, PERSONALITY_CATEGORIES,
    SKILL_CATEGORIES, VALUE_CATEGORIES,
};

/// Per-category scores for the four assessment groups.
///
/// Personality and interests are normalized to 0–100. Values and skills stay on
/// the raw 0–5 scale (0 = unanswered). Every category key is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreProfile {
    pub personality: BTreeMap<String, u32>,
    pub interests: BTreeMap<String, u32>,
    pub values: BTreeMap<String, u32>,
    pub skills: BTreeMap<String, u32>,
}

impl ScoreProfile {
    /// All-zero profile with every category key present.
    #[cfg(test)]
    pub fn empty() -> Self {
        let zeroed = |categories: &[&str]| {
            categories
                .iter()
                .map(|c| (c.to_string(), 0))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            personality: zeroed(&PERSONALITY_CATEGORIES),
            interests: zeroed(&INTEREST_CATEGORIES),
            values: zeroed(&VALUE_CATEGORIES),
            skills: zeroed(&SKILL_CATEGORIES),
        }
    }
}

/// Computes the score profile for a set of answers.
///
/// Pure: neither input is modified, and the same answers always yield the same
/// profile. Answers for ids outside the catalog are ignored.
pub fn compute_scores(answers: &Answers, catalog: &QuestionCatalog) -> ScoreProfile {
    ScoreProfile {
        personality: normalized_group(answers, catalog, QuestionType::Trait, &PERSONALITY_CATEGORIES),
        interests: normalized_group(answers, catalog, QuestionType::Interest, &INTEREST_CATEGORIES),
        values: raw_group(answers, catalog, QuestionType::Value, &VALUE_CATEGORIES),
        skills: raw_group(answers, catalog, QuestionType::Skill, &SKILL_CATEGORIES),
    }
}

/// sum(answered) / (questions in category × 5) × 100, rounded.
fn normalized_group(
    answers: &Answers,
    catalog: &QuestionCatalog,
    question_type: QuestionType,
    categories: &[&'static str],
) -> BTreeMap<String, u32> {
    categories
        .iter()
        .map(|&category| {
            let mut question_count = 0u32;
            let mut sum = 0u32;
            for question in catalog.for_category(question_type, category) {
                question_count += 1;
                if let Some(value) = answers.get(question.id) {
                    sum += u32::from(*value);
                }
            }
            let score = if question_count == 0 || sum == 0 {
                0
            } else {
                let max = f64::from(question_count) * MAX_RESPONSE as f64;
                ((f64::from(sum) / max) * 100.0).round() as u32
            };
            (category.to_string(), score)
        })
        .collect()
}

/// Latest raw answer per category; the last answered question in catalog order wins.
fn raw_group(
    answers: &Answers,
    catalog: &QuestionCatalog,
    question_type: QuestionType,
    categories: &[&'static str],
) -> BTreeMap<String, u32> {
    categories
        .iter()
        .map(|&category| {
            let score = catalog
                .for_category(question_type, category)
                .filter_map(|question| answers.get(question.id))
                .last()
                .map(|value| u32::from(*value))
                .unwrap_or(0);
            (category.to_string(), score)
        })
        .collect()
}
