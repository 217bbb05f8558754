//! Identity, profile and onboarding snapshot models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A signed-in staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    /// Create an identity with a fresh id.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Current session as published by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub user: Option<Identity>,
    /// True while the session is being resolved.
    pub loading: bool,
}

impl SessionSnapshot {
    /// The state before the auth provider has answered.
    pub fn resolving() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn signed_in(user: Identity) -> Self {
        Self {
            user: Some(user),
            loading: false,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: None,
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.user.is_some()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::resolving()
    }
}

/// Staff profile row for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Profile {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_completed_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// A profile is complete once the user has a name, belongs to a funeral
    /// home organization and has finished the onboarding wizard.
    pub fn is_complete(&self) -> bool {
        !self.full_name.trim().is_empty()
            && self.organization_id.is_some()
            && self.onboarding_completed_at.is_some()
    }
}

/// Current profile as published by the profile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub profile: Option<Profile>,
    pub loading: bool,
}

impl Default for ProfileSnapshot {
    fn default() -> Self {
        Self {
            profile: None,
            loading: true,
        }
    }
}

/// Onboarding status derived from the session and the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingSnapshot {
    pub needs_onboarding: bool,
    pub is_loading: bool,
    pub is_authenticated: bool,
}

impl Default for OnboardingSnapshot {
    fn default() -> Self {
        Self {
            needs_onboarding: false,
            is_loading: true,
            is_authenticated: false,
        }
    }
}

impl OnboardingSnapshot {
    /// Derive the onboarding status.
    ///
    /// Loading while either source is loading. A signed-out user never needs
    /// onboarding; a signed-in user needs it until the profile is complete.
    pub fn derive(session: &SessionSnapshot, profile: &ProfileSnapshot) -> Self {
        if session.loading {
            return Self::default();
        }
        let is_authenticated = session.user.is_some();
        if !is_authenticated {
            return Self {
                needs_onboarding: false,
                is_loading: false,
                is_authenticated: false,
            };
        }
        if profile.loading {
            return Self {
                needs_onboarding: false,
                is_loading: true,
                is_authenticated: true,
            };
        }
        Self {
            needs_onboarding: !profile.profile.as_ref().is_some_and(Profile::is_complete),
            is_loading: false,
            is_authenticated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_profile() -> Profile {
        Profile {
            full_name: "Margaret Holloway".to_string(),
            organization_id: Some(Uuid::new_v4()),
            onboarding_completed_at: Some(Utc::now()),
        }
    }

    fn loaded(profile: Option<Profile>) -> ProfileSnapshot {
        ProfileSnapshot {
            profile,
            loading: false,
        }
    }

    #[test]
    fn profile_completeness() {
        assert!(complete_profile().is_complete());
        assert!(!Profile::default().is_complete());

        let mut unnamed = complete_profile();
        unnamed.full_name = "   ".to_string();
        assert!(!unnamed.is_complete());

        let mut orphan = complete_profile();
        orphan.organization_id = None;
        assert!(!orphan.is_complete());
    }

    #[test]
    fn derive_loading_session() {
        let status = OnboardingSnapshot::derive(&SessionSnapshot::resolving(), &loaded(None));
        assert!(status.is_loading);
        assert!(!status.is_authenticated);
    }

    #[test]
    fn derive_signed_out() {
        let status = OnboardingSnapshot::derive(&SessionSnapshot::signed_out(), &loaded(None));
        assert_eq!(
            status,
            OnboardingSnapshot {
                needs_onboarding: false,
                is_loading: false,
                is_authenticated: false,
            }
        );
    }

    #[test]
    fn derive_waits_for_profile() {
        let session = SessionSnapshot::signed_in(Identity::new("director@example.com"));
        let status = OnboardingSnapshot::derive(&session, &ProfileSnapshot::default());
        assert!(status.is_loading);
        assert!(status.is_authenticated);
    }

    #[test]
    fn derive_needs_onboarding_until_complete() {
        let session = SessionSnapshot::signed_in(Identity::new("director@example.com"));

        let missing = OnboardingSnapshot::derive(&session, &loaded(None));
        assert!(missing.needs_onboarding);

        let partial = OnboardingSnapshot::derive(&session, &loaded(Some(Profile::default())));
        assert!(partial.needs_onboarding);

        let done = OnboardingSnapshot::derive(&session, &loaded(Some(complete_profile())));
        assert!(!done.needs_onboarding);
        assert!(!done.is_loading);
    }

    #[test]
    fn session_serde_roundtrip() {
        let session = SessionSnapshot::signed_in(
            Identity::new("director@example.com").with_display_name("Margaret"),
        );
        let json = serde_json::to_string(&session).unwrap();
        let parsed: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }
}
