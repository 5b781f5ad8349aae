use std::sync::Arc;
use std::time::Duration;

use tipswalk_core::model::QuestionBank;
use tipswalk_core::{Clock, WeekKey};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::provider::{QuestionProvider, bank_from_payloads};
use crate::error::ContentError;

/// Where the bank handed out by `weekly_bank` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankSource {
    Cache,
    Provider,
    Fallback,
}

/// Hands out one question bank per ISO week.
///
/// Provider results are validated and cached for the week they were fetched in.
/// Failures of any kind yield the static fallback bank, which is never cached so
/// the next walk retries the provider.
pub struct QuizContentService {
    clock: Clock,
    provider: Arc<dyn QuestionProvider>,
    timeout: Duration,
    cache: Mutex<Option<(WeekKey, QuestionBank)>>,
}

impl QuizContentService {
    #[must_use]
    pub fn new(clock: Clock, provider: Arc<dyn QuestionProvider>, timeout: Duration) -> Self {
        Self {
            clock,
            provider,
            timeout,
            cache: Mutex::new(None),
        }
    }

    /// This week's bank. Never fails.
    pub async fn weekly_bank(&self) -> QuestionBank {
        self.weekly_bank_with_source().await.0
    }

    pub async fn weekly_bank_with_source(&self) -> (QuestionBank, BankSource) {
        let week = self.clock.current_week();
        let mut cache = self.cache.lock().await;

        if let Some((_, bank)) = cache.as_ref().filter(|(cached, _)| *cached == week) {
            debug!(%week, "serving cached question bank");
            return (bank.clone(), BankSource::Cache);
        }

        match self.fetch_bank().await {
            Ok(bank) => {
                info!(%week, "fetched weekly question bank");
                *cache = Some((week, bank.clone()));
                (bank, BankSource::Provider)
            }
            Err(err) => {
                warn!(%week, error = %err, "quiz content unavailable, using fallback questions");
                (QuestionBank::fallback(), BankSource::Fallback)
            }
        }
    }

    async fn fetch_bank(&self) -> Result<QuestionBank, ContentError> {
        let payloads = tokio::time::timeout(self.timeout, self.provider.fetch_weekly_questions())
            .await
            .map_err(|_| ContentError::Timeout)??;
        Ok(bank_from_payloads(payloads)?)
    }
}
