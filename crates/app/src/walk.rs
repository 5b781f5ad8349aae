//! Simulated walk: a scripted walker that heads straight for each marker.

use rand::seq::IndexedRandom;
use services::walks::{CompletedWalk, PositionUpdate, WalkLoopService};
use tipswalk_core::geo::{destination, initial_bearing};
use tipswalk_core::model::AnswerLabel;
use tipswalk_core::walk::{QuestionView, WalkView};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStrategy {
    /// Always answers "1".
    First,
    Random,
}

impl AnswerStrategy {
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "first" => Some(Self::First),
            "random" => Some(Self::Random),
            _ => None,
        }
    }

    fn pick(self) -> AnswerLabel {
        match self {
            Self::First => AnswerLabel::One,
            Self::Random => AnswerLabel::ALL
                .choose(&mut rand::rng())
                .copied()
                .unwrap_or(AnswerLabel::One),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WalkPlan {
    pub step_m: f64,
    pub strategy: AnswerStrategy,
}

/// Play one full walk, printing progress to stdout, then persist it.
pub async fn simulate(
    walks: &WalkLoopService,
    plan: WalkPlan,
) -> Result<CompletedWalk, Box<dyn std::error::Error>> {
    let handle = walks.start_walk(None).await;
    let mut views = handle.subscribe();
    let (positions, source) = mpsc::channel(16);
    let subscription = handle.forward_positions(source);

    let mut steps_this_round = 0_u32;
    loop {
        let view = views.borrow_and_update().clone();
        if view.is_complete {
            break;
        }

        if !view.unlocked {
            let Some(target) = view.target else {
                break;
            };
            steps_this_round += 1;
            let heading = initial_bearing(view.checkpoint, target);
            let here = destination(
                view.checkpoint,
                heading,
                plan.step_m * f64::from(steps_this_round),
            );
            debug!(%here, step = steps_this_round, "walker moved");
            positions.send(PositionUpdate::Fix(here)).await?;
            views.changed().await?;
            print_progress(&views.borrow());
            continue;
        }

        steps_this_round = 0;
        if let Some(question) = &view.question {
            print_question(&view, question);
        }
        let choice = plan.strategy.pick();
        let outcome = handle.answer(choice).await?;
        println!(
            "  answered {choice}: {} (score {}/{})",
            if outcome.correct { "correct" } else { "wrong" },
            outcome.score,
            view.total_rounds
        );
    }

    subscription.cancel();
    Ok(walks.finish_walk(handle).await?)
}

fn print_progress(view: &WalkView) {
    if view.unlocked {
        println!(
            "Question {}/{} unlocked after {:.0} m",
            view.round_number, view.total_rounds, view.distance_moved_m
        );
    } else {
        println!(
            "  walked {:.0} m, {:.0} m to go",
            view.distance_moved_m, view.remaining_m
        );
    }
}

fn print_question(view: &WalkView, question: &QuestionView) {
    println!("  [{}] {}", view.round_number, question.prompt);
    for (label, text) in &question.options {
        println!("    {label}: {text}");
    }
}
