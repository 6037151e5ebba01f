use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answers::Answers;
use super::archetypes::Level;
use super::scoring::ScoreProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerRecommendation {
    pub title: String,
    pub match_percent: u8, // 0 – 100
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub importance: String, // "High" | "Medium" | "Low" by convention; free text from the service
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Final output of a completed assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Always computed locally, never taken from the recommendation service.
    pub scores: ScoreProfile,
    pub personality_type: String,
    /// Name of the locally matched archetype, kept even when enrichment overrides
    /// `personality_type`.
    pub archetype: String,
    /// Careers typical for `archetype`, from the local catalog.
    #[serde(default)]
    pub archetype_careers: Vec<String>,
    pub explanation: String,
    pub trait_levels: BTreeMap<String, Level>,
    pub recommended_careers: Vec<CareerRecommendation>,
    pub skill_gaps: Vec<SkillGap>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// The durable shape of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentState {
    pub answers: Answers,
    pub active_step: usize,
    pub result: Option<AssessmentResult>,
}
