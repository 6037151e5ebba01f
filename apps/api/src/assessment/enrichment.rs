//! Enrichment Client — augments the local result with AI-generated recommendations.
//!
//! The raw backend is pluggable (`RecommendationService`): an HTTP endpoint, the
//! LLM client, or nothing at all. Whatever the backend returns is validated and
//! repaired here; anything unusable resolves to the built-in fallback dataset, so
//! callers always receive an `Enrichment` and never an error.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::answers::Answers;
use super::models::{CareerRecommendation, SkillGap};
use super::prompts::{RECOMMENDATION_PROMPT_TEMPLATE, RECOMMENDATION_SYSTEM};
use super::scoring::ScoreProfile;
use crate::llm_client::{retry_delay, strip_json_fences, LlmClient, LlmError};

/// Entries below this match are boosted.
const BOOST_THRESHOLD: u8 = 90;
/// Only the top three positions are boosted.
const BOOSTED_POSITIONS: usize = 3;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Recommendation service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed recommendation response: {0}")]
    Malformed(String),

    #[error("No recommendation backend configured")]
    Unconfigured,
}

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

/// Payload sent to every recommendation backend.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentRequest {
    pub personality: BTreeMap<String, u32>,
    pub interests: BTreeMap<String, u32>,
    pub values: BTreeMap<String, u32>,
    pub skills: BTreeMap<String, u32>,
    pub answers: Answers,
}

impl EnrichmentRequest {
    pub fn new(scores: &ScoreProfile, answers: &Answers) -> Self {
        Self {
            personality: scores.personality.clone(),
            interests: scores.interests.clone(),
            values: scores.values.clone(),
            skills: scores.skills.clone(),
            answers: answers.clone(),
        }
    }
}

/// A validated, post-processed service response. `recommended_careers` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentSuccess {
    pub recommended_careers: Vec<CareerRecommendation>,
    pub personality_type: Option<String>,
    pub explanation: Option<String>,
    pub skill_gaps: Vec<SkillGap>,
    pub next_steps: Vec<String>,
}

/// The built-in dataset, plus why it was used (diagnostics only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentFallback {
    pub recommended_careers: Vec<CareerRecommendation>,
    pub personality_type: String,
    pub explanation: String,
    pub skill_gaps: Vec<SkillGap>,
    pub next_steps: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    Success(EnrichmentSuccess),
    Fallback(EnrichmentFallback),
}

impl Enrichment {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Enrichment::Fallback(_))
    }

    pub fn recommended_careers(&self) -> &[CareerRecommendation] {
        match self {
            Enrichment::Success(s) => &s.recommended_careers,
            Enrichment::Fallback(f) => &f.recommended_careers,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backends
// ────────────────────────────────────────────────────────────────────────────

/// A source of raw recommendation JSON. Validation happens in `EnrichmentClient`.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Short backend label for logs.
    fn backend(&self) -> &'static str;

    async fn recommend(&self, request: &EnrichmentRequest) -> Result<Value, EnrichmentError>;
}

/// POSTs the request to an external recommendation endpoint.
pub struct HttpRecommendationService {
    client: Client,
    endpoint: String,
    max_retries: u32,
    backoff: Duration,
}

impl HttpRecommendationService {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, EnrichmentError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
            max_retries: 2,
            backoff: Duration::from_millis(500),
        })
    }

    /// Retries apply to transport errors, 429 and 5xx; delay doubles per attempt
    /// up to `llm_client::MAX_RETRY_DELAY`.
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.backoff = backoff;
        self
    }
}

#[async_trait]
impl RecommendationService for HttpRecommendationService {
    fn backend(&self) -> &'static str {
        "http"
    }

    async fn recommend(&self, request: &EnrichmentRequest) -> Result<Value, EnrichmentError> {
        let mut last_error: Option<EnrichmentError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = retry_delay(self.backoff, attempt);
                warn!(
                    "Recommendation request attempt {} failed, retrying after {}ms",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&self.endpoint).json(request).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EnrichmentError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = Some(EnrichmentError::Status {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EnrichmentError::Status {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let body = response.text().await?;
            return serde_json::from_str(strip_json_fences(&body))
                .map_err(|e| EnrichmentError::Malformed(format!("body is not JSON: {e}")));
        }

        Err(last_error.unwrap_or(EnrichmentError::Unconfigured))
    }
}

/// Asks the LLM for recommendations in the endpoint's response shape.
pub struct LlmRecommendationService {
    llm: LlmClient,
}

impl LlmRecommendationService {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl RecommendationService for LlmRecommendationService {
    fn backend(&self) -> &'static str {
        "llm"
    }

    async fn recommend(&self, request: &EnrichmentRequest) -> Result<Value, EnrichmentError> {
        let prompt = build_recommendation_prompt(request)?;
        Ok(self.llm.call_json::<Value>(&prompt, RECOMMENDATION_SYSTEM).await?)
    }
}

fn build_recommendation_prompt(request: &EnrichmentRequest) -> Result<String, EnrichmentError> {
    Ok(RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{personality_json}", &prompt_json(&request.personality)?)
        .replace("{interests_json}", &prompt_json(&request.interests)?)
        .replace("{values_json}", &prompt_json(&request.values)?)
        .replace("{skills_json}", &prompt_json(&request.skills)?)
        .replace("{answers_json}", &prompt_json(&request.answers)?))
}

fn prompt_json<T: Serialize>(value: &T) -> Result<String, EnrichmentError> {
    serde_json::to_string(value)
        .map_err(|e| EnrichmentError::Malformed(format!("failed to serialize prompt input: {e}")))
}

/// Used when no backend is configured: every assessment completes on the fallback.
pub struct OfflineRecommendationService;

#[async_trait]
impl RecommendationService for OfflineRecommendationService {
    fn backend(&self) -> &'static str {
        "offline"
    }

    async fn recommend(&self, _request: &EnrichmentRequest) -> Result<Value, EnrichmentError> {
        Err(EnrichmentError::Unconfigured)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client: validation, repair, fallback
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct EnrichmentClient {
    service: Arc<dyn RecommendationService>,
}

impl EnrichmentClient {
    pub fn new(service: Arc<dyn RecommendationService>) -> Self {
        Self { service }
    }

    pub fn backend(&self) -> &'static str {
        self.service.backend()
    }

    /// Total: returns the fallback dataset on any failure.
    pub async fn enrich(&self, scores: &ScoreProfile, answers: &Answers) -> Enrichment {
        let request = EnrichmentRequest::new(scores, answers);
        let outcome = self
            .service
            .recommend(&request)
            .await
            .and_then(interpret_response);

        match outcome {
            Ok(success) => {
                info!(
                    "Enrichment succeeded via {} backend: {} careers",
                    self.backend(),
                    success.recommended_careers.len()
                );
                Enrichment::Success(success)
            }
            Err(EnrichmentError::Unconfigured) => {
                debug!("No recommendation backend configured, using fallback dataset");
                Enrichment::Fallback(fallback_dataset(EnrichmentError::Unconfigured.to_string()))
            }
            Err(e) => {
                warn!("Enrichment via {} backend failed, using fallback dataset: {e}", self.backend());
                Enrichment::Fallback(fallback_dataset(e.to_string()))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    #[serde(default)]
    recommended_careers: Option<Vec<Value>>,
    #[serde(default)]
    personality_type: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    skill_gaps: Option<Vec<Value>>,
    #[serde(default)]
    next_steps: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawCareer {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "match")]
    match_score: Option<NumberLike>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

impl NumberLike {
    fn to_percent(&self) -> u8 {
        let raw = match self {
            NumberLike::Number(n) => *n,
            NumberLike::Text(s) => s.trim().trim_end_matches('%').trim().parse().unwrap_or(0.0),
        };
        if raw.is_finite() {
            raw.clamp(0.0, 100.0).round() as u8
        } else {
            0
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSkillGap {
    #[serde(default)]
    skill: Option<String>,
    #[serde(default)]
    importance: Option<String>,
    #[serde(default)]
    resources: Option<Resources>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Resources {
    One(String),
    Many(Vec<String>),
}

/// Validates and repairs a raw service response, then applies the top-match boost.
pub fn interpret_response(value: Value) -> Result<EnrichmentSuccess, EnrichmentError> {
    // Some backends return the JSON document as a string.
    let value = match value {
        Value::String(text) => serde_json::from_str(strip_json_fences(&text))
            .map_err(|e| EnrichmentError::Malformed(format!("string body is not JSON: {e}")))?,
        other => other,
    };

    let raw: RawResponse = serde_json::from_value(value)
        .map_err(|e| EnrichmentError::Malformed(format!("unexpected response shape: {e}")))?;

    let mut recommended_careers: Vec<CareerRecommendation> = raw
        .recommended_careers
        .ok_or_else(|| EnrichmentError::Malformed("missing recommendedCareers".to_string()))?
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawCareer>(entry).ok())
        .filter_map(|career| {
            let title = non_blank(career.title)?;
            Some(CareerRecommendation {
                title,
                match_percent: career.match_score.map(|m| m.to_percent()).unwrap_or(0),
                description: career.description.unwrap_or_default().trim().to_string(),
            })
        })
        .collect();

    if recommended_careers.is_empty() {
        return Err(EnrichmentError::Malformed(
            "recommendedCareers has no usable entries".to_string(),
        ));
    }
    boost_top_matches(&mut recommended_careers);

    let skill_gaps = raw
        .skill_gaps
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawSkillGap>(entry).ok())
        .filter_map(|gap| {
            Some(SkillGap {
                skill: non_blank(gap.skill)?,
                importance: non_blank(gap.importance).unwrap_or_else(|| "Medium".to_string()),
                resources: match gap.resources {
                    Some(Resources::One(r)) => non_blank(Some(r)).into_iter().collect(),
                    Some(Resources::Many(rs)) => rs.into_iter().filter(|r| !r.trim().is_empty()).collect(),
                    None => Vec::new(),
                },
            })
        })
        .collect();

    let next_steps = raw
        .next_steps
        .unwrap_or_default()
        .into_iter()
        .filter_map(|step| match step {
            Value::String(s) => non_blank(Some(s)),
            _ => None,
        })
        .collect();

    Ok(EnrichmentSuccess {
        recommended_careers,
        personality_type: non_blank(raw.personality_type),
        explanation: non_blank(raw.explanation),
        skill_gaps,
        next_steps,
    })
}

/// Product rule: a top-three entry below 90 is lifted to `90 + (3 - position) * 3`
/// where position is 1-based, so 96 / 93 / 90.
pub fn boost_top_matches(careers: &mut [CareerRecommendation]) {
    for (index, career) in careers.iter_mut().take(BOOSTED_POSITIONS).enumerate() {
        if career.match_percent < BOOST_THRESHOLD {
            let position = index as u8 + 1;
            career.match_percent = BOOST_THRESHOLD + (BOOSTED_POSITIONS as u8 - position) * 3;
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback dataset
// ────────────────────────────────────────────────────────────────────────────

pub const FALLBACK_PERSONALITY_TYPE: &str = "Analytical Problem Solver";

/// The fixed dataset used whenever enrichment is unavailable or invalid.
pub fn fallback_dataset(reason: String) -> EnrichmentFallback {
    let career = |title: &str, match_percent: u8, description: &str| CareerRecommendation {
        title: title.to_string(),
        match_percent,
        description: description.to_string(),
    };
    let gap = |skill: &str, importance: &str, resources: &[&str]| SkillGap {
        skill: skill.to_string(),
        importance: importance.to_string(),
        resources: resources.iter().map(|r| r.to_string()).collect(),
    };

    EnrichmentFallback {
        recommended_careers: vec![
            career(
                "Software Developer",
                96,
                "Design, build and maintain applications, turning requirements into reliable software.",
            ),
            career(
                "Data Analyst",
                93,
                "Collect, clean and interpret data to help teams make evidence-based decisions.",
            ),
            career(
                "Project Manager",
                90,
                "Plan and coordinate projects, keeping scope, schedule and stakeholders aligned.",
            ),
        ],
        personality_type: FALLBACK_PERSONALITY_TYPE.to_string(),
        explanation: "You approach problems methodically and enjoy turning complex information \
            into practical solutions. Roles that combine analysis, structure and collaboration \
            are a strong fit for your profile."
            .to_string(),
        skill_gaps: vec![
            gap(
                "Cloud Computing",
                "High",
                &["AWS Cloud Practitioner course", "Google Cloud Skills Boost"],
            ),
            gap(
                "Data Visualization",
                "Medium",
                &["Tableau Public tutorials", "Storytelling with Data (book)"],
            ),
            gap(
                "Project Management",
                "Medium",
                &["Google Project Management Certificate", "Scrum.org learning paths"],
            ),
            gap(
                "Public Speaking",
                "Low",
                &["Toastmasters International", "Coursera: Dynamic Public Speaking"],
            ),
        ],
        next_steps: vec![
            "Update your resume to highlight analytical and technical achievements".to_string(),
            "Pick one skill gap and complete an introductory course this month".to_string(),
            "Reach out to two professionals in your top recommended career for informational interviews".to_string(),
        ],
        reason,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
