use std::sync::Arc;

use storage::repository::ProfileRepository;
use tipswalk_core::model::{PROFILE_AVATAR_KEY, PROFILE_NAME_KEY, Profile, ProfileDraft};
use tracing::info;

use crate::error::ProfileServiceError;

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    /// Load the stored profile. Missing fields are filled with defaults, which are
    /// written back so later loads see the same values.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError` on storage failures or if stored values no
    /// longer validate.
    pub async fn load(&self) -> Result<Profile, ProfileServiceError> {
        let display_name = self.repo.get_value(PROFILE_NAME_KEY).await?;
        let avatar_uri = self.repo.get_value(PROFILE_AVATAR_KEY).await?;
        let missing = display_name.is_none() || avatar_uri.is_none();

        let profile = ProfileDraft {
            display_name,
            avatar_uri,
        }
        .validate()?;

        if missing {
            info!("writing default profile fields");
            self.persist(&profile).await?;
        }
        Ok(profile)
    }

    /// Validate and persist a profile edit.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError` if validation fails or persistence fails.
    pub async fn save(&self, draft: ProfileDraft) -> Result<Profile, ProfileServiceError> {
        let profile = draft.validate()?;
        self.persist(&profile).await?;
        Ok(profile)
    }

    async fn persist(&self, profile: &Profile) -> Result<(), ProfileServiceError> {
        self.repo
            .set_value(PROFILE_NAME_KEY, profile.display_name())
            .await?;
        self.repo
            .set_value(PROFILE_AVATAR_KEY, profile.avatar_uri())
            .await?;
        Ok(())
    }
}
