use thiserror::Error;
use url::Url;

pub const PROFILE_NAME_KEY: &str = "profile.display_name";
pub const PROFILE_AVATAR_KEY: &str = "profile.avatar_uri";

pub const DEFAULT_DISPLAY_NAME: &str = "Walker #42";
pub const DEFAULT_AVATAR_URI: &str = "https://picsum.photos/seed/me/200";

const MAX_DISPLAY_NAME_CHARS: usize = 40;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("display name cannot be empty")]
    EmptyName,

    #[error("display name is longer than {max} characters")]
    NameTooLong { max: usize },

    #[error("invalid avatar URI")]
    InvalidAvatar,
}

/// Player-facing identity shown on the profile and leaderboard screens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    display_name: String,
    avatar_uri: String,
}

#[derive(Clone, Debug, Default)]
pub struct ProfileDraft {
    pub display_name: Option<String>,
    pub avatar_uri: Option<String>,
}

impl ProfileDraft {
    /// Validate the draft. Unset fields fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` for a blank or overly long name, or an avatar that is not a URL.
    /// Camera captures arrive as `data:` URLs and are accepted.
    pub fn validate(self) -> Result<Profile, ProfileError> {
        let display_name = match self.display_name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ProfileError::EmptyName);
                }
                if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
                    return Err(ProfileError::NameTooLong {
                        max: MAX_DISPLAY_NAME_CHARS,
                    });
                }
                name
            }
            None => DEFAULT_DISPLAY_NAME.to_string(),
        };

        let avatar_uri = match self.avatar_uri {
            Some(uri) => {
                let uri = uri.trim().to_string();
                if Url::parse(&uri).is_err() {
                    return Err(ProfileError::InvalidAvatar);
                }
                uri
            }
            None => DEFAULT_AVATAR_URI.to_string(),
        };

        Ok(Profile {
            display_name,
            avatar_uri,
        })
    }
}

impl Profile {
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn avatar_uri(&self) -> &str {
        &self.avatar_uri
    }

    /// Draft pre-filled with this profile, for partial edits.
    #[must_use]
    pub fn to_draft(&self) -> ProfileDraft {
        ProfileDraft {
            display_name: Some(self.display_name.clone()),
            avatar_uri: Some(self.avatar_uri.clone()),
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            avatar_uri: DEFAULT_AVATAR_URI.to_string(),
        }
    }
}
