//! Guard: classifies observable state and redirects on denial.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::state::{GateStatus, GateTransition, GuardKind};
use crate::config::RedirectTargets;
use crate::routing::Navigator;
use crate::session::{OnboardingSnapshot, SessionSnapshot};

/// What a guard currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateView {
    pub guard: GuardKind,
    pub status: GateStatus,
    /// Set while denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl GateView {
    pub fn resolving(guard: GuardKind) -> Self {
        Self {
            guard,
            status: GateStatus::Resolving,
            redirect: None,
        }
    }
}

/// One guard instance sitting above a page.
pub struct Guard {
    kind: GuardKind,
    targets: RedirectTargets,
    navigator: Arc<dyn Navigator>,
    status: GateStatus,
    /// Target of the redirect already issued for the current denial.
    redirected_to: Option<String>,
    transitions: Vec<GateTransition>,
}

impl Guard {
    pub fn new(kind: GuardKind, targets: RedirectTargets, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            kind,
            targets,
            navigator,
            status: GateStatus::Resolving,
            redirected_to: None,
            transitions: Vec::new(),
        }
    }

    pub fn kind(&self) -> GuardKind {
        self.kind
    }

    pub fn status(&self) -> GateStatus {
        self.status
    }

    pub fn transitions(&self) -> &[GateTransition] {
        &self.transitions
    }

    pub fn view(&self) -> GateView {
        GateView {
            guard: self.kind,
            status: self.status,
            redirect: self.redirected_to.clone(),
        }
    }

    /// Re-classify against the latest observable values.
    ///
    /// Navigates only when entering `Denied` (or when the denial target
    /// changes); repeated evaluations that stay denied are silent.
    pub fn evaluate(
        &mut self,
        session: &SessionSnapshot,
        onboarding: &OnboardingSnapshot,
    ) -> GateView {
        let decision = self.kind.classify(session, onboarding, &self.targets);
        let next = decision.status();

        if next != self.status {
            debug!(guard = %self.kind, from = %self.status, to = %next, "Guard transition");
            self.transitions.push(GateTransition {
                from: self.status,
                to: next,
                at: Utc::now(),
                redirect: decision.redirect().map(str::to_string),
            });
            self.status = next;
        }

        match decision.redirect() {
            Some(target) if self.redirected_to.as_deref() != Some(target) => {
                info!(guard = %self.kind, redirect = target, "Guard denied access, redirecting");
                self.navigator.navigate_replace(target);
                self.redirected_to = Some(target.to_string());
            }
            Some(_) => {}
            None => self.redirected_to = None,
        }

        self.view()
    }

    /// Pass `children` through when granted; render nothing otherwise.
    pub fn render<T>(&self, children: T) -> Option<T> {
        self.status.renders_children().then_some(children)
    }
}
