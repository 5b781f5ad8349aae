use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use services::ContentError;
use services::content::{
    BankSource, QuestionOptions, QuestionPayload, QuestionProvider, QuizContentService,
};
use tipswalk_core::model::{AnswerLabel, QuestionBank};
use tipswalk_core::time::{fixed_clock, fixed_now};
use tipswalk_core::Clock;

fn payloads(count: u64) -> Vec<QuestionPayload> {
    (1..=count)
        .map(|id| QuestionPayload {
            id,
            text: format!("Which river flows through city {id}?"),
            options: QuestionOptions {
                one: Some("Dalälven".into()),
                x: Some("Göta älv".into()),
                two: Some("Torne älv".into()),
            },
            correct: "X".into(),
        })
        .collect()
}

/// Replays a fixed reply and counts calls.
struct ScriptedProvider {
    reply: fn() -> Result<Vec<QuestionPayload>, ContentError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(reply: fn() -> Result<Vec<QuestionPayload>, ContentError>) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionProvider for ScriptedProvider {
    async fn fetch_weekly_questions(&self) -> Result<Vec<QuestionPayload>, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.reply)()
    }
}

fn service(provider: Arc<ScriptedProvider>, clock: Clock) -> QuizContentService {
    QuizContentService::new(clock, provider, Duration::from_millis(200))
}

#[tokio::test]
async fn valid_bank_is_cached_for_the_week() {
    let provider = Arc::new(ScriptedProvider::new(|| Ok(payloads(10))));
    let content = service(Arc::clone(&provider), fixed_clock());

    let (bank, source) = content.weekly_bank_with_source().await;
    assert_eq!(source, BankSource::Provider);
    assert_eq!(bank.get(0).unwrap().correct(), AnswerLabel::X);

    let (_, source) = content.weekly_bank_with_source().await;
    assert_eq!(source, BankSource::Cache);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn new_iso_week_refetches() {
    let provider = Arc::new(ScriptedProvider::new(|| Ok(payloads(10))));
    let first = service(Arc::clone(&provider), fixed_clock());
    first.weekly_bank().await;

    let next_week = Clock::fixed(fixed_now() + chrono::Duration::days(7));
    let second = QuizContentService::new(next_week, provider.clone(), Duration::from_secs(1));
    assert_eq!(second.weekly_bank_with_source().await.1, BankSource::Provider);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn provider_error_falls_back_and_is_not_cached() {
    let provider = Arc::new(ScriptedProvider::new(|| Err(ContentError::EmptyResponse)));
    let content = service(Arc::clone(&provider), fixed_clock());

    let (bank, source) = content.weekly_bank_with_source().await;
    assert_eq!(source, BankSource::Fallback);
    assert_eq!(bank, QuestionBank::fallback());

    let (_, source) = content.weekly_bank_with_source().await;
    assert_eq!(source, BankSource::Fallback);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn wrong_count_falls_back() {
    let provider = Arc::new(ScriptedProvider::new(|| Ok(payloads(9))));
    let content = service(provider, fixed_clock());
    assert_eq!(content.weekly_bank().await, QuestionBank::fallback());
}

#[tokio::test]
async fn bad_label_or_missing_option_falls_back() {
    let bad_label = Arc::new(ScriptedProvider::new(|| {
        let mut list = payloads(10);
        list[4].correct = "Y".into();
        Ok(list)
    }));
    assert_eq!(
        service(bad_label, fixed_clock()).weekly_bank().await,
        QuestionBank::fallback()
    );

    let missing_option = Arc::new(ScriptedProvider::new(|| {
        let mut list = payloads(10);
        list[7].options.two = None;
        Ok(list)
    }));
    assert_eq!(
        service(missing_option, fixed_clock()).weekly_bank().await,
        QuestionBank::fallback()
    );
}

#[tokio::test]
async fn slow_provider_times_out_to_fallback() {
    let provider = Arc::new(ScriptedProvider {
        delay: Duration::from_secs(5),
        ..ScriptedProvider::new(|| Ok(payloads(10)))
    });
    let content = service(provider, fixed_clock());
    let (bank, source) = content.weekly_bank_with_source().await;
    assert_eq!(source, BankSource::Fallback);
    assert_eq!(bank.len(), 10);
}
