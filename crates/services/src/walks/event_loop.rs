//! Single-writer event loop for a running walk.
//!
//! Position fixes and answers are queued on one channel and applied in arrival
//! order by the task that owns the `WalkSession`. Every applied command publishes
//! a fresh `WalkView` on a watch channel.

use tipswalk_core::Coordinate;
use tipswalk_core::model::AnswerLabel;
use tipswalk_core::walk::{
    AnswerOutcome, WalkEffect, WalkError, WalkEvent, WalkSession, WalkView,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::controller::WalkController;
use crate::error::WalkServiceError;

const COMMAND_BUFFER: usize = 64;

/// One reading from a position source.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionUpdate {
    Fix(Coordinate),
    /// Permission denied, no signal or similar; the walk keeps its last known state.
    Unavailable(String),
}

impl From<PositionUpdate> for WalkEvent {
    fn from(update: PositionUpdate) -> Self {
        match update {
            PositionUpdate::Fix(position) => WalkEvent::PositionFix(position),
            PositionUpdate::Unavailable(reason) => WalkEvent::PositionUnavailable(reason),
        }
    }
}

enum WalkCommand {
    Position(PositionUpdate),
    Answer {
        choice: AnswerLabel,
        reply: oneshot::Sender<Result<AnswerOutcome, WalkError>>,
    },
    Stop,
}

/// Handle to a walk running on its own task.
pub struct WalkHandle {
    commands: mpsc::Sender<WalkCommand>,
    view: watch::Receiver<WalkView>,
    task: JoinHandle<WalkSession>,
}

impl WalkHandle {
    /// Move the session onto a new task. Must be called inside a tokio runtime.
    #[must_use]
    pub fn spawn(session: WalkSession, controller: WalkController) -> Self {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let (view_tx, view) = watch::channel(WalkView::of(&session));
        let task = tokio::spawn(run(session, controller, rx, view_tx));
        Self {
            commands,
            view,
            task,
        }
    }

    /// Receiver that observes every published view.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WalkView> {
        self.view.clone()
    }

    #[must_use]
    pub fn current_view(&self) -> WalkView {
        self.view.borrow().clone()
    }

    /// Queue a position update.
    ///
    /// # Errors
    ///
    /// Returns `WalkServiceError::Closed` once the walk has ended or been stopped.
    pub async fn send_position(&self, update: PositionUpdate) -> Result<(), WalkServiceError> {
        self.commands
            .send(WalkCommand::Position(update))
            .await
            .map_err(|_| WalkServiceError::Closed)
    }

    /// Answer the active round and wait for the outcome.
    ///
    /// # Errors
    ///
    /// Returns `WalkServiceError::Walk` for rejected answers, including
    /// `WalkError::Ended` once the tenth answer is in and the loop has exited.
    /// Returns `WalkServiceError::Closed` if the loop stopped before the walk ended.
    pub async fn answer(&self, choice: AnswerLabel) -> Result<AnswerOutcome, WalkServiceError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(WalkCommand::Answer { choice, reply })
            .await
            .map_err(|_| self.closed_error())?;
        let outcome = outcome.await.map_err(|_| self.closed_error())?;
        Ok(outcome?)
    }

    // The loop publishes the completed view before it exits.
    fn closed_error(&self) -> WalkServiceError {
        if self.view.borrow().is_complete {
            WalkServiceError::Walk(WalkError::Ended)
        } else {
            WalkServiceError::Closed
        }
    }

    /// Forward a position source into this walk until it closes or the
    /// subscription is cancelled.
    #[must_use]
    pub fn forward_positions(
        &self,
        mut source: mpsc::Receiver<PositionUpdate>,
    ) -> PositionSubscription {
        let commands = self.commands.clone();
        let task = tokio::spawn(async move {
            while let Some(update) = source.recv().await {
                if commands.send(WalkCommand::Position(update)).await.is_err() {
                    break;
                }
            }
        });
        PositionSubscription { task }
    }

    /// Stop the loop (if still running) and take the session back.
    ///
    /// # Errors
    ///
    /// Returns `WalkServiceError::Task` if the loop task panicked.
    pub async fn join(self) -> Result<WalkSession, WalkServiceError> {
        // The loop exits on its own after the final answer, so a closed channel is fine here.
        let _ = self.commands.send(WalkCommand::Stop).await;
        self.task
            .await
            .map_err(|err| WalkServiceError::Task(err.to_string()))
    }
}

/// Running position forwarder. Aborted on `cancel` or drop.
pub struct PositionSubscription {
    task: JoinHandle<()>,
}

impl PositionSubscription {
    pub fn cancel(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PositionSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    mut session: WalkSession,
    mut controller: WalkController,
    mut commands: mpsc::Receiver<WalkCommand>,
    view: watch::Sender<WalkView>,
) -> WalkSession {
    info!(walk_id = %session.id(), "walk started");

    while let Some(command) = commands.recv().await {
        let pending_reply = match command {
            WalkCommand::Position(update) => {
                if let PositionUpdate::Unavailable(reason) = &update {
                    warn!(walk_id = %session.id(), %reason, "position unavailable");
                }
                match controller.apply(&mut session, update.into()) {
                    Ok(WalkEffect::Unlocked) => info!(
                        walk_id = %session.id(),
                        round = session.current_index() + 1,
                        "question unlocked"
                    ),
                    Ok(_) => debug!(
                        walk_id = %session.id(),
                        moved_m = session.distance_moved_m(),
                        "position applied"
                    ),
                    Err(err) => warn!(walk_id = %session.id(), error = %err, "position rejected"),
                }
                None
            }
            WalkCommand::Answer { choice, reply } => {
                let result = controller.submit_answer(&mut session, choice);
                match &result {
                    Ok(outcome) => info!(
                        walk_id = %session.id(),
                        waypoint = %outcome.waypoint_id,
                        correct = outcome.correct,
                        score = outcome.score,
                        "answer recorded"
                    ),
                    Err(err) => debug!(walk_id = %session.id(), error = %err, "answer rejected"),
                }
                Some((reply, result))
            }
            WalkCommand::Stop => {
                debug!(walk_id = %session.id(), "walk loop stopped");
                break;
            }
        };

        // Publish before replying so callers see the post-answer view.
        view.send_replace(WalkView::of(&session));
        if let Some((reply, result)) = pending_reply {
            // The caller may have given up waiting.
            let _ = reply.send(result);
        }

        if session.is_complete() {
            info!(walk_id = %session.id(), score = session.score(), "walk completed");
            break;
        }
    }

    session
}
