use std::sync::Arc;

use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::config::WalkConfig;
use crate::content::{
    HttpQuestionProvider, QuestionProvider, QuizContentService, StaticQuestionProvider,
};
use crate::error::AppServicesError;
use crate::profile_service::ProfileService;
use crate::trophy_service::TrophyService;
use crate::walks::WalkLoopService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    config: WalkConfig,
    storage: Storage,
    profile: Arc<ProfileService>,
    trophies: Arc<TrophyService>,
    content: Arc<QuizContentService>,
    walks: Arc<WalkLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage at `config.db_url`.
    ///
    /// Uses the HTTP quiz provider when `TIPSWALK_QUIZ_API_KEY` is set and the
    /// static question set otherwise. The stored profile is loaded once so
    /// defaults are written on first start.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the profile bootstrap fails.
    pub async fn new_sqlite(config: WalkConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        Self::assemble(config, clock, storage, default_provider()).await
    }

    /// Build services over in-memory storage with the given question provider.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the profile bootstrap fails.
    pub async fn in_memory(
        config: WalkConfig,
        clock: Clock,
        provider: Arc<dyn QuestionProvider>,
    ) -> Result<Self, AppServicesError> {
        Self::assemble(config, clock, Storage::in_memory(), provider).await
    }

    async fn assemble(
        config: WalkConfig,
        clock: Clock,
        storage: Storage,
        provider: Arc<dyn QuestionProvider>,
    ) -> Result<Self, AppServicesError> {
        let profile = Arc::new(ProfileService::new(Arc::clone(&storage.profile)));
        profile.load().await?;

        let trophies = Arc::new(TrophyService::new(Arc::clone(&storage.trophies)));
        let content = Arc::new(QuizContentService::new(
            clock,
            provider,
            config.content_timeout,
        ));
        let walks = Arc::new(WalkLoopService::new(
            clock,
            config.settings,
            Arc::clone(&content),
            Arc::clone(&storage.summaries),
            Arc::clone(&trophies),
        ));

        Ok(Self {
            config,
            storage,
            profile,
            trophies,
            content,
            walks,
        })
    }

    #[must_use]
    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn profile(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profile)
    }

    #[must_use]
    pub fn trophies(&self) -> Arc<TrophyService> {
        Arc::clone(&self.trophies)
    }

    #[must_use]
    pub fn content(&self) -> Arc<QuizContentService> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn walks(&self) -> Arc<WalkLoopService> {
        Arc::clone(&self.walks)
    }
}

fn default_provider() -> Arc<dyn QuestionProvider> {
    let http = HttpQuestionProvider::from_env();
    if http.enabled() {
        info!("using HTTP quiz content provider");
        Arc::new(http)
    } else {
        info!("no quiz API key configured, using static questions");
        Arc::new(StaticQuestionProvider)
    }
}
