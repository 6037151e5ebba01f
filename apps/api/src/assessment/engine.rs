//! Assessment Engine — owns the working copies of sessions and keeps them in step
//! with durable storage and the enrichment backend.
//!
//! Flow on final submission:
//!   begin_analysis (snapshot) → spawn analysis task:
//!   compute_scores → match_archetype → enrich (await, no lock held) → assemble
//!   → commit only if still Analyzing for the same generation → persist.
//!
//! The analysis task is detached from the caller, so a dropped request cannot
//! strand a session in `Analyzing`.
//!
//! Only unsettled sessions live in memory. Once a result or a reset is safely
//! in storage the working copy is evicted and later reads go to storage.
//! Storage write failures are logged and never block a session: the in-memory
//! working copy stays authoritative and is kept.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::aggregator::assemble;
use super::answers::Answers;
use super::archetypes::match_archetype;
use super::catalog::{QuestionCatalog, Step};
use super::enrichment::{Enrichment, EnrichmentClient};
use super::models::AssessmentResult;
use super::persistence::PersistenceManager;
use super::scoring::compute_scores;
use super::session::{Advance, AnalysisTicket, AssessmentSession};
use super::AssessmentError;

/// Snapshot of a session returned to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub status: &'static str,
    pub active_step: Step,
    pub step_index: usize,
    pub total_steps: usize,
    pub progress_percent: u8,
    pub answered: usize,
    pub completed_steps: Vec<Step>,
    pub answers: Answers,
    pub result: Option<AssessmentResult>,
}

impl SessionView {
    fn of(session: &AssessmentSession) -> Self {
        Self {
            session_id: session.id(),
            status: session.phase().label(),
            active_step: session.active_step(),
            step_index: session.active_step().index(),
            total_steps: Step::ALL.len(),
            progress_percent: session.answers().progress_percent(),
            answered: session.answers().len(),
            completed_steps: Step::ALL
                .into_iter()
                .filter(|&step| session.is_step_complete(step))
                .collect(),
            answers: session.answers().snapshot(),
            result: session.result().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdvanceOutcome {
    Advanced {
        session: SessionView,
    },
    /// Navigation blocked: the current step still has unanswered questions.
    Incomplete {
        step: Step,
        missing: Vec<String>,
        session: SessionView,
    },
    /// The final step was submitted. `session.status` is `completed`, or
    /// `not_started` if the session was reset while analysis was running.
    Submitted {
        session: SessionView,
    },
}

pub struct AssessmentEngine {
    catalog: QuestionCatalog,
    sessions: Mutex<HashMap<Uuid, AssessmentSession>>,
    persistence: PersistenceManager,
    enrichment: EnrichmentClient,
    clear_progress_on_complete: bool,
}

impl AssessmentEngine {
    pub fn new(
        catalog: QuestionCatalog,
        persistence: PersistenceManager,
        enrichment: EnrichmentClient,
    ) -> Self {
        Self {
            catalog,
            sessions: Mutex::new(HashMap::new()),
            persistence,
            enrichment,
            clear_progress_on_complete: false,
        }
    }

    /// Drop answers and step from storage once a result is committed.
    pub fn clear_progress_on_complete(mut self, enabled: bool) -> Self {
        self.clear_progress_on_complete = enabled;
        self
    }

    pub fn catalog(&self) -> QuestionCatalog {
        self.catalog
    }

    pub fn enrichment_backend(&self) -> &'static str {
        self.enrichment.backend()
    }

    /// Starts a new session at step 0.
    pub async fn create_session(&self) -> SessionView {
        let id = Uuid::new_v4();
        let mut session = AssessmentSession::new(id, self.catalog);
        session.start();
        self.persist(&session).await;
        let view = SessionView::of(&session);
        self.sessions.lock().await.insert(id, session);
        info!("Started assessment session {id}");
        view
    }

    /// Current view, resuming from storage after a restart.
    pub async fn session(&self, id: Uuid) -> Result<SessionView, AssessmentError> {
        let mut sessions = self.sessions.lock().await;
        let session = self.resolve(&mut sessions, id).await?;
        Ok(SessionView::of(session))
    }

    pub async fn submit_answer(
        &self,
        id: Uuid,
        question_id: &str,
        value: i64,
    ) -> Result<SessionView, AssessmentError> {
        let mut sessions = self.sessions.lock().await;
        let session = self.resolve(&mut sessions, id).await?;
        session.submit_answer(question_id, value)?;
        self.persist(session).await;
        Ok(SessionView::of(session))
    }

    pub async fn back(&self, id: Uuid) -> Result<SessionView, AssessmentError> {
        let mut sessions = self.sessions.lock().await;
        let session = self.resolve(&mut sessions, id).await?;
        session.back()?;
        self.persist(session).await;
        Ok(SessionView::of(session))
    }

    /// Advances one step; on a complete final step, submits the assessment.
    ///
    /// Submission runs on a spawned task. Awaiting here only waits for it;
    /// dropping this future leaves the analysis running to completion.
    pub async fn advance(self: &Arc<Self>, id: Uuid) -> Result<AdvanceOutcome, AssessmentError> {
        let ticket = {
            let mut sessions = self.sessions.lock().await;
            let session = self.resolve(&mut sessions, id).await?;
            match session.advance()? {
                Advance::Moved(_) => {
                    self.persist(session).await;
                    return Ok(AdvanceOutcome::Advanced {
                        session: SessionView::of(session),
                    });
                }
                Advance::Incomplete { step, missing } => {
                    return Ok(AdvanceOutcome::Incomplete {
                        step,
                        missing,
                        session: SessionView::of(session),
                    });
                }
                Advance::ReadyToSubmit => {
                    // Stored answers and step are already current and `Analyzing`
                    // is not persisted, so nothing awaits between here and the spawn.
                    session.begin_analysis()?
                }
            }
        };

        let engine = Arc::clone(self);
        let analysis = tokio::spawn(async move { engine.analyze(id, ticket).await });
        let session = analysis
            .await
            .map_err(|e| AssessmentError::AnalysisFailed(format!("session {id}: {e}")))?;
        Ok(AdvanceOutcome::Submitted { session })
    }

    /// Clears the session and its stored keys. Any analysis still in flight
    /// is discarded when it returns.
    ///
    /// Once storage is cleared the session id is retired; the next assessment
    /// starts with `create_session`.
    pub async fn reset(&self, id: Uuid) -> Result<SessionView, AssessmentError> {
        let mut sessions = self.sessions.lock().await;
        let session = self.resolve(&mut sessions, id).await?;
        session.reset();
        let view = SessionView::of(session);
        match self.persistence.reset(id).await {
            Ok(()) => {
                sessions.remove(&id);
            }
            Err(e) => warn!("Failed to clear stored state for session {id}: {e}"),
        }
        info!("Reset assessment session {id}");
        Ok(view)
    }

    pub async fn result(&self, id: Uuid) -> Result<AssessmentResult, AssessmentError> {
        let mut sessions = self.sessions.lock().await;
        let session = self.resolve(&mut sessions, id).await?;
        session
            .result()
            .cloned()
            .ok_or(AssessmentError::ResultNotReady(id))
    }

    /// Number of sessions held in memory.
    pub async fn live_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Scores the frozen snapshot, enriches it, and commits the result if the
    /// session is still waiting for it.
    async fn analyze(&self, id: Uuid, ticket: AnalysisTicket) -> SessionView {
        let scores = compute_scores(&ticket.answers, &self.catalog);
        let local = match_archetype(&scores);
        info!(
            "Session {id}: local archetype {} ({} traits matched)",
            local.personality_type, local.matched_traits
        );

        let enrichment = self.enrichment.enrich(&scores, &ticket.answers).await;
        debug!(
            "Session {id}: {} recommended careers (fallback: {})",
            enrichment.recommended_careers().len(),
            enrichment.is_fallback()
        );
        if let Enrichment::Fallback(fallback) = &enrichment {
            info!("Session {id}: completing with fallback recommendations ({})", fallback.reason);
        }
        let result = assemble(&local, enrichment, scores);

        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(&id) else {
            warn!(
                "Session {id}: discarding analysis for generation {}, session was reset",
                ticket.generation
            );
            return SessionView::of(&AssessmentSession::new(id, self.catalog));
        };

        if !session.complete(ticket.generation, result) {
            warn!(
                "Session {id}: discarding analysis for generation {}, session is now {} at generation {}",
                ticket.generation,
                session.phase().label(),
                session.generation()
            );
            return SessionView::of(session);
        }

        let stored = match (self.clear_progress_on_complete, session.result()) {
            (true, Some(result)) => match self.persistence.save_result_only(id, result).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to persist result for session {id}: {e}");
                    false
                }
            },
            _ => self.persist(session).await,
        };
        let view = SessionView::of(session);
        if stored {
            sessions.remove(&id);
        }
        info!("Session {id} completed");
        view
    }

    /// Finds the working copy, loading it from storage if this process has not
    /// seen the session yet.
    async fn resolve<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, AssessmentSession>,
        id: Uuid,
    ) -> Result<&'a mut AssessmentSession, AssessmentError> {
        if !sessions.contains_key(&id) {
            let state = self
                .persistence
                .load(id)
                .await
                .ok_or(AssessmentError::SessionNotFound(id))?;
            let session = AssessmentSession::restore(id, self.catalog, state)?;
            info!("Resumed assessment session {id} from storage");
            sessions.insert(id, session);
        }
        sessions
            .get_mut(&id)
            .ok_or(AssessmentError::SessionNotFound(id))
    }

    /// Returns whether storage now holds the session's state.
    async fn persist(&self, session: &AssessmentSession) -> bool {
        match self.persistence.save(session.id(), &session.to_state()).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist assessment session {}: {e}", session.id());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::Notify;

    use super::*;
    use crate::assessment::enrichment::{
        EnrichmentError, EnrichmentRequest, OfflineRecommendationService, RecommendationService,
    };
    use crate::assessment::persistence::{KeyValueStore, MemoryStore, StateKeys};

    struct StaticService(Value);

    #[async_trait]
    impl RecommendationService for StaticService {
        fn backend(&self) -> &'static str {
            "static"
        }

        async fn recommend(&self, _request: &EnrichmentRequest) -> Result<Value, EnrichmentError> {
            Ok(self.0.clone())
        }
    }

    /// Blocks inside `recommend` until released.
    struct GatedService {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl RecommendationService for GatedService {
        fn backend(&self) -> &'static str {
            "gated"
        }

        async fn recommend(&self, _request: &EnrichmentRequest) -> Result<Value, EnrichmentError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(json!({"recommendedCareers": [{"title": "Late", "match": 99}]}))
        }
    }

    fn gated() -> (Arc<GatedService>, Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let service = Arc::new(GatedService {
            entered: entered.clone(),
            release: release.clone(),
        });
        (service, entered, release)
    }

    fn build_engine(store: Arc<MemoryStore>, service: Arc<dyn RecommendationService>) -> AssessmentEngine {
        let catalog = QuestionCatalog::standard();
        AssessmentEngine::new(
            catalog,
            PersistenceManager::new(store, catalog),
            EnrichmentClient::new(service),
        )
    }

    fn engine_with(store: Arc<MemoryStore>, service: Arc<dyn RecommendationService>) -> Arc<AssessmentEngine> {
        Arc::new(build_engine(store, service))
    }

    fn offline_engine(store: Arc<MemoryStore>) -> Arc<AssessmentEngine> {
        engine_with(store, Arc::new(OfflineRecommendationService))
    }

    async fn answer_step(engine: &AssessmentEngine, id: Uuid, step: Step, value: i64) {
        for question in QuestionCatalog::standard().for_step(step) {
            engine.submit_answer(id, question.id, value).await.unwrap();
        }
    }

    /// Answers and advances through the first three steps.
    async fn reach_last_step(engine: &Arc<AssessmentEngine>, id: Uuid) {
        for step in [Step::Personality, Step::Interests, Step::Values] {
            answer_step(engine, id, step, 5).await;
            assert!(matches!(
                engine.advance(id).await.unwrap(),
                AdvanceOutcome::Advanced { .. }
            ));
        }
    }

    /// Waits until the session reports `status`, failing after a few seconds.
    async fn wait_for_status(engine: &AssessmentEngine, id: Uuid, status: &str) {
        let polled = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if engine.session(id).await.map(|v| v.status).ok() == Some(status) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(polled.is_ok(), "session {id} never reached {status}");
    }

    #[tokio::test]
    async fn test_create_session_starts_at_step_zero() {
        let engine = offline_engine(Arc::new(MemoryStore::new()));
        let view = engine.create_session().await;
        assert_eq!(view.status, "in_progress");
        assert_eq!(view.step_index, 0);
        assert_eq!(view.total_steps, 4);
        assert_eq!(view.answered, 0);
        assert!(view.completed_steps.is_empty());
        assert!(view.result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let engine = offline_engine(Arc::new(MemoryStore::new()));
        let err = engine.session(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AssessmentError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_answer_rejected() {
        let engine = offline_engine(Arc::new(MemoryStore::new()));
        let id = engine.create_session().await.session_id;
        assert!(matches!(
            engine.submit_answer(id, "p1", 6).await,
            Err(AssessmentError::Validation(_))
        ));
        assert!(matches!(
            engine.submit_answer(id, "zz", 3).await,
            Err(AssessmentError::Validation(_))
        ));
        assert!(engine.session(id).await.unwrap().answers.is_empty());
    }

    #[tokio::test]
    async fn test_advance_blocked_until_step_complete() {
        let engine = offline_engine(Arc::new(MemoryStore::new()));
        let id = engine.create_session().await.session_id;
        engine.submit_answer(id, "p1", 4).await.unwrap();
        match engine.advance(id).await.unwrap() {
            AdvanceOutcome::Incomplete { step, missing, session } => {
                assert_eq!(step, Step::Personality);
                assert_eq!(missing.len(), 9);
                assert_eq!(session.step_index, 0);
            }
            other => panic!("expected incomplete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_view_lists_completed_steps() {
        let engine = offline_engine(Arc::new(MemoryStore::new()));
        let id = engine.create_session().await.session_id;
        answer_step(&engine, id, Step::Personality, 3).await;
        engine.submit_answer(id, "v1", 3).await.unwrap();
        let view = engine.session(id).await.unwrap();
        assert_eq!(view.completed_steps, vec![Step::Personality]);
        assert_eq!(view.answered, 11);
    }

    #[tokio::test]
    async fn test_full_run_offline_completes_with_fallback() {
        let engine = offline_engine(Arc::new(MemoryStore::new()));
        let id = engine.create_session().await.session_id;
        reach_last_step(&engine, id).await;
        answer_step(&engine, id, Step::Skills, 5).await;

        let session = match engine.advance(id).await.unwrap() {
            AdvanceOutcome::Submitted { session } => session,
            other => panic!("expected submission, got {other:?}"),
        };
        assert_eq!(session.status, "completed");

        let result = engine.result(id).await.unwrap();
        assert_eq!(result.recommended_careers.len(), 3);
        assert!(result.recommended_careers[0].match_percent >= 96);
        assert!(result.scores.personality.values().all(|&v| v == 100));
        assert!(result.scores.interests.values().all(|&v| v == 100));
        assert_eq!(result.archetype, "Innovative Technologist");
        assert!(result.archetype_careers.contains(&"Software Engineer".to_string()));
    }

    #[tokio::test]
    async fn test_malformed_enrichment_uses_fallback_list() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_with(store, Arc::new(StaticService(json!({"careers": "nope"}))));
        let id = engine.create_session().await.session_id;
        reach_last_step(&engine, id).await;
        answer_step(&engine, id, Step::Skills, 2).await;
        engine.advance(id).await.unwrap();

        let result = engine.result(id).await.unwrap();
        let titles: Vec<&str> = result.recommended_careers.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Software Developer", "Data Analyst", "Project Manager"]);
        assert!(result.recommended_careers[0].match_percent >= 96);
    }

    #[tokio::test]
    async fn test_successful_enrichment_is_boosted_and_scores_stay_local() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_with(
            store,
            Arc::new(StaticService(json!({
                "recommendedCareers": [
                    {"title": "A", "match": 80, "description": "a"},
                    {"title": "B", "match": 70, "description": "b"},
                    {"title": "C", "match": 60, "description": "c"}
                ],
                "personalityType": "Remote Type",
                "personality": {"openness": 1}
            }))),
        );
        let id = engine.create_session().await.session_id;
        reach_last_step(&engine, id).await;
        answer_step(&engine, id, Step::Skills, 4).await;
        engine.advance(id).await.unwrap();

        let result = engine.result(id).await.unwrap();
        let matches: Vec<u8> = result.recommended_careers.iter().map(|c| c.match_percent).collect();
        assert_eq!(matches, vec![96, 93, 90]);
        assert_eq!(result.personality_type, "Remote Type");
        assert_eq!(result.scores.personality["openness"], 100);
    }

    #[tokio::test]
    async fn test_resume_after_restart_at_last_step() {
        let store = Arc::new(MemoryStore::new());
        let id = {
            let engine = offline_engine(store.clone());
            let id = engine.create_session().await.session_id;
            reach_last_step(&engine, id).await;
            id
        };

        let engine = offline_engine(store);
        let view = engine.session(id).await.unwrap();
        assert_eq!(view.status, "in_progress");
        assert_eq!(view.active_step, Step::Skills);
        assert_eq!(view.answers.len(), 25);
        assert_eq!(view.answers.get("v5"), Some(&5));

        answer_step(&engine, id, Step::Skills, 3).await;
        assert!(matches!(
            engine.advance(id).await.unwrap(),
            AdvanceOutcome::Submitted { .. }
        ));
    }

    #[tokio::test]
    async fn test_completed_result_survives_restart() {
        let store = Arc::new(MemoryStore::new());
        let (id, result) = {
            let engine = offline_engine(store.clone());
            let id = engine.create_session().await.session_id;
            reach_last_step(&engine, id).await;
            answer_step(&engine, id, Step::Skills, 3).await;
            engine.advance(id).await.unwrap();
            (id, engine.result(id).await.unwrap())
        };

        let engine = offline_engine(store);
        assert_eq!(engine.session(id).await.unwrap().status, "completed");
        assert_eq!(engine.result(id).await.unwrap(), result);
    }

    #[tokio::test]
    async fn test_clear_progress_on_complete_keeps_only_result() {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(
            build_engine(store.clone(), Arc::new(OfflineRecommendationService))
                .clear_progress_on_complete(true),
        );
        let id = engine.create_session().await.session_id;
        reach_last_step(&engine, id).await;
        answer_step(&engine, id, Step::Skills, 3).await;
        engine.advance(id).await.unwrap();

        let keys = StateKeys::for_session(id);
        assert!(store.get(&keys.answers).await.unwrap().is_none());
        assert!(store.get(&keys.active_step).await.unwrap().is_none());
        assert!(store.get(&keys.result).await.unwrap().is_some());

        let restarted = offline_engine(store);
        assert_eq!(restarted.session(id).await.unwrap().status, "completed");
    }

    #[tokio::test]
    async fn test_reset_returns_to_not_started_and_clears_storage() {
        let store = Arc::new(MemoryStore::new());
        let engine = offline_engine(store.clone());
        let id = engine.create_session().await.session_id;
        reach_last_step(&engine, id).await;
        answer_step(&engine, id, Step::Skills, 3).await;
        engine.advance(id).await.unwrap();

        let view = engine.reset(id).await.unwrap();
        assert_eq!(view.status, "not_started");
        assert!(view.answers.is_empty());
        assert!(view.result.is_none());

        let keys = StateKeys::for_session(id);
        assert!(store.get(&keys.answers).await.unwrap().is_none());
        assert!(store.get(&keys.result).await.unwrap().is_none());
        assert!(matches!(
            engine.result(id).await,
            Err(AssessmentError::SessionNotFound(_))
        ));

        let restarted = offline_engine(store);
        assert!(matches!(
            restarted.session(id).await,
            Err(AssessmentError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_settled_sessions_are_evicted_from_memory() {
        let engine = offline_engine(Arc::new(MemoryStore::new()));

        let finished = engine.create_session().await.session_id;
        reach_last_step(&engine, finished).await;
        answer_step(&engine, finished, Step::Skills, 4).await;
        engine.advance(finished).await.unwrap();

        let abandoned = engine.create_session().await.session_id;
        engine.submit_answer(abandoned, "p1", 2).await.unwrap();
        engine.reset(abandoned).await.unwrap();

        let open = engine.create_session().await.session_id;
        assert_eq!(engine.live_sessions().await, 1);

        // Completed sessions are served from storage and stay out of memory.
        assert_eq!(engine.session(finished).await.unwrap().status, "completed");
        assert!(engine.result(finished).await.is_ok());
        assert_eq!(engine.live_sessions().await, 2);
        assert_eq!(engine.session(open).await.unwrap().status, "in_progress");
    }

    #[tokio::test]
    async fn test_reset_during_analysis_discards_late_enrichment() {
        let store = Arc::new(MemoryStore::new());
        let (service, entered, release) = gated();
        let engine = engine_with(store.clone(), service);
        let id = engine.create_session().await.session_id;
        reach_last_step(&engine, id).await;
        answer_step(&engine, id, Step::Skills, 3).await;

        let submission = tokio::spawn({
            let engine = engine.clone();
            async move { engine.advance(id).await }
        });

        entered.notified().await;
        assert_eq!(engine.session(id).await.unwrap().status, "analyzing");
        engine.reset(id).await.unwrap();
        release.notify_one();

        match submission.await.unwrap().unwrap() {
            AdvanceOutcome::Submitted { session } => assert_eq!(session.status, "not_started"),
            other => panic!("expected submission, got {other:?}"),
        }
        assert!(engine.result(id).await.is_err());
        let keys = StateKeys::for_session(id);
        assert!(store.get(&keys.result).await.unwrap().is_none());
        assert!(store.get(&keys.answers).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dropped_submission_still_completes() {
        let store = Arc::new(MemoryStore::new());
        let (service, entered, release) = gated();
        let engine = engine_with(store.clone(), service);
        let id = engine.create_session().await.session_id;
        reach_last_step(&engine, id).await;
        answer_step(&engine, id, Step::Skills, 4).await;

        let submission = tokio::spawn({
            let engine = engine.clone();
            async move { engine.advance(id).await }
        });
        entered.notified().await;

        // The caller goes away while enrichment is still pending.
        submission.abort();
        assert!(submission.await.unwrap_err().is_cancelled());
        assert_eq!(engine.session(id).await.unwrap().status, "analyzing");

        release.notify_one();
        wait_for_status(&engine, id, "completed").await;

        let result = engine.result(id).await.unwrap();
        assert_eq!(result.recommended_careers[0].title, "Late");
        assert!(store
            .get(&StateKeys::for_session(id).result)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_answers_rejected_after_completion() {
        let engine = offline_engine(Arc::new(MemoryStore::new()));
        let id = engine.create_session().await.session_id;
        reach_last_step(&engine, id).await;
        answer_step(&engine, id, Step::Skills, 3).await;
        engine.advance(id).await.unwrap();
        assert!(matches!(
            engine.submit_answer(id, "p1", 1).await,
            Err(AssessmentError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_back_moves_to_previous_step() {
        let engine = offline_engine(Arc::new(MemoryStore::new()));
        let id = engine.create_session().await.session_id;
        answer_step(&engine, id, Step::Personality, 3).await;
        engine.advance(id).await.unwrap();
        let view = engine.back(id).await.unwrap();
        assert_eq!(view.active_step, Step::Personality);
        assert_eq!(view.answers.len(), 10);
    }
}
