use std::collections::BTreeMap;

use super::catalog::{QuestionCatalog, Step, MAX_RESPONSE, MIN_RESPONSE};
use super::AssessmentError;

/// Recorded responses keyed by question id. Ordered so snapshots, persistence
/// and scoring iterate deterministically.
pub type Answers = BTreeMap<String, u8>;

/// In-memory answer map bound to a question catalog.
#[derive(Debug, Clone)]
pub struct AnswerStore {
    catalog: QuestionCatalog,
    answers: Answers,
}

impl AnswerStore {
    pub fn new(catalog: QuestionCatalog) -> Self {
        Self {
            catalog,
            answers: Answers::new(),
        }
    }

    /// Rebuilds a store from persisted answers, rejecting anything the catalog
    /// would not have accepted through `submit`.
    pub fn from_answers(catalog: QuestionCatalog, answers: Answers) -> Result<Self, AssessmentError> {
        let mut store = Self::new(catalog);
        for (question_id, value) in answers {
            store.submit(&question_id, i64::from(value))?;
        }
        Ok(store)
    }

    /// Records or overwrites a response.
    pub fn submit(&mut self, question_id: &str, value: i64) -> Result<(), AssessmentError> {
        if !self.catalog.contains(question_id) {
            return Err(AssessmentError::Validation(format!(
                "Unknown question id '{question_id}'"
            )));
        }
        if !(MIN_RESPONSE..=MAX_RESPONSE).contains(&value) {
            return Err(AssessmentError::Validation(format!(
                "Answer for '{question_id}' must be between {MIN_RESPONSE} and {MAX_RESPONSE}, got {value}"
            )));
        }
        // Range checked above.
        self.answers.insert(question_id.to_string(), value as u8);
        Ok(())
    }

    #[cfg(test)]
    pub fn get(&self, question_id: &str) -> Option<u8> {
        self.answers.get(question_id).copied()
    }

    #[cfg(test)]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Owned copy of the current answers, detached from later mutations.
    pub fn snapshot(&self) -> Answers {
        self.answers.clone()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// Question ids of a step that have no recorded answer, in catalog order.
    pub fn missing_for_step(&self, step: Step) -> Vec<String> {
        self.catalog
            .for_step(step)
            .filter(|question| !self.answers.contains_key(question.id))
            .map(|question| question.id.to_string())
            .collect()
    }

    pub fn is_step_complete(&self, step: Step) -> bool {
        self.catalog
            .for_step(step)
            .all(|question| self.answers.contains_key(question.id))
    }

    /// Share of the catalog answered, as a whole percentage.
    pub fn progress_percent(&self) -> u8 {
        let total = self.catalog.len();
        if total == 0 || self.is_empty() {
            return 0;
        }
        ((self.len() as f64 / total as f64) * 100.0).round() as u8
    }
}
