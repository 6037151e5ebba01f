//! Assessment Session — the explicit, caller-owned state machine.
//!
//! NotStarted → InProgress(step 0..3) → Analyzing → Completed
//! Completed → NotStarted only through `reset`.
//!
//! Every transition is a plain method returning its outcome; nothing here is async
//! or touches storage. `AssessmentEngine` pairs sessions with persistence and
//! enrichment.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answers::{AnswerStore, Answers};
use super::catalog::{QuestionCatalog, Step};
use super::models::{AssessmentResult, AssessmentState};
use super::AssessmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssessmentPhase {
    NotStarted,
    InProgress { step: Step },
    Analyzing,
    Completed,
}

impl AssessmentPhase {
    pub fn label(self) -> &'static str {
        match self {
            AssessmentPhase::NotStarted => "not_started",
            AssessmentPhase::InProgress { .. } => "in_progress",
            AssessmentPhase::Analyzing => "analyzing",
            AssessmentPhase::Completed => "completed",
        }
    }
}

/// Result of asking the session to move forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved(Step),
    /// The current step still has unanswered questions.
    Incomplete { step: Step, missing: Vec<String> },
    /// The last step is complete; the caller should submit.
    ReadyToSubmit,
}

/// A frozen view of the answers handed to scoring at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub answers: Answers,
}

#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: Uuid,
    answers: AnswerStore,
    phase: AssessmentPhase,
    /// Last step reached; kept while Analyzing/Completed so it can be persisted.
    active_step: Step,
    result: Option<AssessmentResult>,
    /// Bumped on every reset so in-flight submissions can be recognized as stale.
    generation: u64,
}

impl AssessmentSession {
    pub fn new(id: Uuid, catalog: QuestionCatalog) -> Self {
        Self {
            id,
            answers: AnswerStore::new(catalog),
            phase: AssessmentPhase::NotStarted,
            active_step: Step::FIRST,
            result: None,
            generation: 0,
        }
    }

    /// Rebuilds a session from persisted state: completed if a result exists,
    /// otherwise in progress at the saved step.
    pub fn restore(
        id: Uuid,
        catalog: QuestionCatalog,
        state: AssessmentState,
    ) -> Result<Self, AssessmentError> {
        let step = Step::from_index(state.active_step).ok_or_else(|| {
            AssessmentError::Validation(format!("Step index {} is out of range", state.active_step))
        })?;
        let answers = AnswerStore::from_answers(catalog, state.answers)?;
        let phase = match state.result {
            Some(_) => AssessmentPhase::Completed,
            None => AssessmentPhase::InProgress { step },
        };
        Ok(Self {
            id,
            answers,
            phase,
            active_step: step,
            result: state.result,
            generation: 0,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> AssessmentPhase {
        self.phase
    }

    pub fn active_step(&self) -> Step {
        self.active_step
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    /// NotStarted → InProgress(step 0). No-op in any other phase.
    pub fn start(&mut self) -> AssessmentPhase {
        if self.phase == AssessmentPhase::NotStarted {
            self.active_step = Step::FIRST;
            self.phase = AssessmentPhase::InProgress { step: Step::FIRST };
        }
        self.phase
    }

    /// Records an answer. Starts the session if needed; rejected once submitted.
    pub fn submit_answer(&mut self, question_id: &str, value: i64) -> Result<(), AssessmentError> {
        match self.phase {
            AssessmentPhase::Analyzing | AssessmentPhase::Completed => {
                return Err(AssessmentError::InvalidState(
                    "Answers cannot change after the assessment was submitted".to_string(),
                ));
            }
            AssessmentPhase::NotStarted | AssessmentPhase::InProgress { .. } => {}
        }
        self.answers.submit(question_id, value)?;
        self.start();
        Ok(())
    }

    pub fn is_step_complete(&self, step: Step) -> bool {
        self.answers.is_step_complete(step)
    }

    /// Moves to the next step if the current one is complete.
    pub fn advance(&mut self) -> Result<Advance, AssessmentError> {
        let step = match self.phase {
            AssessmentPhase::InProgress { step } => step,
            AssessmentPhase::NotStarted => Step::FIRST,
            AssessmentPhase::Analyzing | AssessmentPhase::Completed => {
                return Err(AssessmentError::InvalidState(
                    "The assessment was already submitted".to_string(),
                ));
            }
        };
        self.start();

        if !self.answers.is_step_complete(step) {
            return Ok(Advance::Incomplete {
                step,
                missing: self.answers.missing_for_step(step),
            });
        }

        match step.next() {
            Some(next) => {
                self.active_step = next;
                self.phase = AssessmentPhase::InProgress { step: next };
                Ok(Advance::Moved(next))
            }
            None => Ok(Advance::ReadyToSubmit),
        }
    }

    /// Moves to the previous step without touching answers.
    pub fn back(&mut self) -> Result<Step, AssessmentError> {
        match self.phase {
            AssessmentPhase::InProgress { step } => {
                let previous = step.previous().unwrap_or(Step::FIRST);
                self.active_step = previous;
                self.phase = AssessmentPhase::InProgress { step: previous };
                Ok(previous)
            }
            AssessmentPhase::NotStarted => Ok(Step::FIRST),
            AssessmentPhase::Analyzing | AssessmentPhase::Completed => Err(
                AssessmentError::InvalidState("The assessment was already submitted".to_string()),
            ),
        }
    }

    /// InProgress(last step, complete) → Analyzing. Returns the answers snapshot
    /// scoring must use.
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket, AssessmentError> {
        match self.phase {
            AssessmentPhase::InProgress { step } if step == Step::LAST => {}
            other => {
                return Err(AssessmentError::InvalidState(format!(
                    "Submission requires the final step, session is {other:?}"
                )));
            }
        }
        if !self.answers.is_step_complete(Step::LAST) {
            return Err(AssessmentError::InvalidState(
                "The final step still has unanswered questions".to_string(),
            ));
        }
        self.phase = AssessmentPhase::Analyzing;
        Ok(AnalysisTicket {
            generation: self.generation,
            answers: self.answers.snapshot(),
        })
    }

    /// Analyzing → Completed, only for the generation that started the analysis.
    /// Returns false when the result is stale and was discarded.
    pub fn complete(&mut self, ticket_generation: u64, result: AssessmentResult) -> bool {
        if self.phase != AssessmentPhase::Analyzing || self.generation != ticket_generation {
            return false;
        }
        self.result = Some(result);
        self.phase = AssessmentPhase::Completed;
        true
    }

    /// Any phase → NotStarted. Clears answers and result.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.result = None;
        self.active_step = Step::FIRST;
        self.phase = AssessmentPhase::NotStarted;
        self.generation += 1;
    }

    /// Working copy to flush to storage.
    pub fn to_state(&self) -> AssessmentState {
        AssessmentState {
            answers: self.answers.snapshot(),
            active_step: self.active_step.index(),
            result: self.result.clone(),
        }
    }
}
