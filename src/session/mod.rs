//! Session and onboarding status.
//!
//! The auth provider and the profile table are external; this module only
//! mirrors what they publish so guards can observe it.

pub mod model;
pub mod service;

pub use model::{Identity, OnboardingSnapshot, Profile, ProfileSnapshot, SessionSnapshot};
pub use service::{OnboardingService, ProfileService, SessionService};
