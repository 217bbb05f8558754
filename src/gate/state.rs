//! Gate state machine: which guards exist and what state each is in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RedirectTargets;
use crate::error::GateError;
use crate::session::{OnboardingSnapshot, SessionSnapshot};

/// State of a guard.
///
/// Starts in `Resolving`. Every dependency change re-classifies, so any
/// state can follow any other; only the edge into `Denied` has a side
/// effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    /// Identity or onboarding status not yet known.
    #[default]
    Resolving,
    /// Predicate failed; the guard redirects and renders nothing.
    Denied,
    /// Predicate passed; children render.
    Granted,
}

impl GateStatus {
    /// Whether the underlying observables have answered.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Resolving)
    }

    /// Whether children may render in this state.
    pub fn renders_children(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl std::fmt::Display for GateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Resolving => "resolving",
            Self::Denied => "denied",
            Self::Granted => "granted",
        };
        write!(f, "{s}")
    }
}

/// The guards available to pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardKind {
    /// Requires a signed-in user.
    Auth,
    /// Requires a signed-in user to have finished onboarding.
    Onboarding,
    /// Placed on the onboarding page itself: sends users who have already
    /// finished onboarding to the dashboard.
    OnboardingPage,
}

impl GuardKind {
    pub const ALL: [GuardKind; 3] = [Self::Auth, Self::Onboarding, Self::OnboardingPage];

    /// Classify the current observable values.
    pub fn classify(
        &self,
        session: &SessionSnapshot,
        onboarding: &OnboardingSnapshot,
        targets: &RedirectTargets,
    ) -> Decision {
        match self {
            Self::Auth => {
                if session.loading {
                    Decision::Resolving
                } else if session.user.is_none() {
                    Decision::Deny {
                        redirect: targets.sign_in.clone(),
                    }
                } else {
                    Decision::Grant
                }
            }
            Self::Onboarding => {
                if onboarding.is_loading {
                    Decision::Resolving
                } else if onboarding.is_authenticated && onboarding.needs_onboarding {
                    Decision::Deny {
                        redirect: targets.onboarding.clone(),
                    }
                } else {
                    Decision::Grant
                }
            }
            Self::OnboardingPage => {
                if onboarding.is_loading {
                    Decision::Resolving
                } else if onboarding.is_authenticated && !onboarding.needs_onboarding {
                    Decision::Deny {
                        redirect: targets.dashboard.clone(),
                    }
                } else {
                    Decision::Grant
                }
            }
        }
    }
}

impl std::fmt::Display for GuardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Auth => "auth",
            Self::Onboarding => "onboarding",
            Self::OnboardingPage => "onboarding_page",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for GuardKind {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| GateError::UnknownGuard {
                name: s.to_string(),
            })
    }
}

/// Outcome of one classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Resolving,
    Deny { redirect: String },
    Grant,
}

impl Decision {
    pub fn status(&self) -> GateStatus {
        match self {
            Self::Resolving => GateStatus::Resolving,
            Self::Deny { .. } => GateStatus::Denied,
            Self::Grant => GateStatus::Granted,
        }
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            Self::Deny { redirect } => Some(redirect),
            _ => None,
        }
    }
}

/// A recorded state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateTransition {
    pub from: GateStatus,
    pub to: GateStatus,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}
