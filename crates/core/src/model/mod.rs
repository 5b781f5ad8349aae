mod ids;
mod profile;
mod question;
mod settings;
mod summary;
mod trophy;

pub use ids::{ParseIdError, QuestionId, WalkId, WaypointId};

pub use profile::{
    DEFAULT_AVATAR_URI, DEFAULT_DISPLAY_NAME, PROFILE_AVATAR_KEY, PROFILE_NAME_KEY, Profile,
    ProfileDraft, ProfileError,
};
pub use question::{
    AnswerLabel, Question, QuestionBank, QuestionBankError, QuestionDraft, QuestionError,
    ROUNDS_PER_WALK,
};
pub use settings::{
    DEFAULT_START, DEFAULT_UNLOCK_DISTANCE_M, WalkSettings, WalkSettingsDraft, WalkSettingsError,
};
pub use summary::{WalkResult, WalkSummary, WalkSummaryError};
pub use trophy::Trophy;
