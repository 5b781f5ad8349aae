use std::sync::Arc;

use storage::repository::WalkSummaryRepository;
use tipswalk_core::model::{Trophy, WalkResult, WalkSettings};
use tipswalk_core::walk::{WalkError, WalkSession};
use tipswalk_core::waypoint::{RandomWaypoints, WaypointSource};
use tipswalk_core::{Clock, Coordinate};
use tracing::info;

use super::controller::WalkController;
use super::event_loop::WalkHandle;
use crate::content::QuizContentService;
use crate::error::WalkServiceError;
use crate::trophy_service::TrophyService;

/// Builds the waypoint source for each new walk.
pub type WaypointFactory = Arc<dyn Fn() -> Box<dyn WaypointSource> + Send + Sync>;

/// What a finished walk produced once it has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedWalk {
    pub result: WalkResult,
    pub summary_id: i64,
    /// Present only when this walk earned the week's first trophy.
    pub trophy: Option<Trophy>,
}

/// Orchestrates walk start (question bank + start position) and persistence
/// of the summary and trophy once the tenth answer is in.
#[derive(Clone)]
pub struct WalkLoopService {
    clock: Clock,
    settings: WalkSettings,
    content: Arc<QuizContentService>,
    summaries: Arc<dyn WalkSummaryRepository>,
    trophies: Arc<TrophyService>,
    waypoints: WaypointFactory,
}

impl WalkLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: WalkSettings,
        content: Arc<QuizContentService>,
        summaries: Arc<dyn WalkSummaryRepository>,
        trophies: Arc<TrophyService>,
    ) -> Self {
        Self {
            clock,
            settings,
            content,
            summaries,
            trophies,
            waypoints: Arc::new(|| -> Box<dyn WaypointSource> {
                Box::new(RandomWaypoints::from_os_rng())
            }),
        }
    }

    #[must_use]
    pub fn with_waypoints(mut self, waypoints: WaypointFactory) -> Self {
        self.waypoints = waypoints;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &WalkSettings {
        &self.settings
    }

    /// Fetch this week's questions and open round 0 without spawning a task.
    ///
    /// `start` is the last known position; the configured default start is used
    /// when there is none.
    pub async fn prepare_walk(&self, start: Option<Coordinate>) -> (WalkController, WalkSession) {
        let bank = self.content.weekly_bank().await;
        let start = start.unwrap_or_else(|| self.settings.default_start());
        let mut controller = WalkController::new(self.clock, self.settings, (self.waypoints)());
        let session = controller.start_session(bank, start);
        info!(walk_id = %session.id(), %start, "prepared walk");
        (controller, session)
    }

    /// Start a walk on its own event loop task.
    pub async fn start_walk(&self, start: Option<Coordinate>) -> WalkHandle {
        let (controller, session) = self.prepare_walk(start).await;
        WalkHandle::spawn(session, controller)
    }

    /// Stop the loop, then persist the finished walk.
    ///
    /// # Errors
    ///
    /// Returns `WalkServiceError::Walk(WalkError::NotFinished)` if rounds remain,
    /// or a storage error if persistence fails.
    pub async fn finish_walk(
        &self,
        handle: WalkHandle,
    ) -> Result<CompletedWalk, WalkServiceError> {
        let session = handle.join().await?;
        self.record_completed(&session).await
    }

    /// Award the weekly trophy for a finished walk and persist its summary.
    ///
    /// Safe to call again after a storage failure; a trophy stored by an earlier
    /// attempt is not awarded twice.
    ///
    /// # Errors
    ///
    /// Returns `WalkServiceError::Walk` if the walk is not finished, or a storage
    /// error if persistence fails.
    pub async fn record_completed(
        &self,
        session: &WalkSession,
    ) -> Result<CompletedWalk, WalkServiceError> {
        let result = session.finalize()?;
        let summary = session.summary()?;
        let completed_at = session.completed_at().ok_or(WalkError::NotFinished)?;

        // Trophy first: awarding is idempotent per week, appending a summary is not.
        let trophy = self.trophies.award_if_perfect(result, completed_at).await?;
        let summary_id = self.summaries.append_summary(&summary).await?;
        info!(
            walk_id = %session.id(),
            summary_id,
            score = result.final_score(),
            perfect = result.perfect(),
            "walk recorded"
        );

        Ok(CompletedWalk {
            result,
            summary_id,
            trophy,
        })
    }
}
