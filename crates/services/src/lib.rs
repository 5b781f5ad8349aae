#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod content;
pub mod error;
pub mod profile_service;
pub mod trophy_service;
pub mod walks;

pub use tipswalk_core::Clock;

pub use app_services::AppServices;
pub use config::WalkConfig;
pub use error::{
    AppServicesError, ConfigError, ContentError, ProfileServiceError, TrophyServiceError,
    WalkServiceError,
};
pub use profile_service::ProfileService;
pub use trophy_service::TrophyService;
pub use walks::{
    CompletedWalk, PositionSubscription, PositionUpdate, WalkController, WalkHandle,
    WalkLoopService,
};
