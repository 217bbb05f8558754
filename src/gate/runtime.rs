//! Runs a guard against live session and onboarding feeds.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::guard::{GateView, Guard};
use crate::session::{OnboardingSnapshot, SessionSnapshot};

/// A mounted guard.
///
/// Dropping the handle aborts the guard task, but an evaluation already
/// running on another worker may still finish and navigate once. Use
/// [`GuardHandle::teardown`] when no navigation may follow the unmount.
pub struct GuardHandle {
    view: watch::Receiver<GateView>,
    task: JoinHandle<()>,
}

/// Mount `guard`: evaluate it once with the current values, then again on
/// every change of either feed. The task stops when a feed closes or the
/// handle is torn down.
pub fn spawn_guard(
    mut guard: Guard,
    mut session: watch::Receiver<SessionSnapshot>,
    mut onboarding: watch::Receiver<OnboardingSnapshot>,
) -> GuardHandle {
    let (tx, rx) = watch::channel(GateView::resolving(guard.kind()));

    let task = tokio::spawn(async move {
        loop {
            let current_session = session.borrow_and_update().clone();
            let current_onboarding = *onboarding.borrow_and_update();
            let view = guard.evaluate(&current_session, &current_onboarding);
            tx.send_if_modified(|shown| {
                if *shown == view {
                    false
                } else {
                    *shown = view;
                    true
                }
            });

            let open = tokio::select! {
                changed = session.changed() => changed.is_ok(),
                changed = onboarding.changed() => changed.is_ok(),
            };
            if !open {
                debug!(guard = %guard.kind(), "Guard feed closed, unmounting");
                break;
            }
        }
    });

    GuardHandle { view: rx, task }
}

impl GuardHandle {
    /// What the guard shows right now.
    pub fn view(&self) -> GateView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GateView> {
        self.view.clone()
    }

    /// Unmount the guard and wait for its task to stop. No navigation is
    /// issued after this returns.
    pub async fn teardown(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
    }
}

impl Drop for GuardHandle {
    /// Best-effort unmount; see [`GuardHandle::teardown`].
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::RedirectTargets;
    use crate::gate::state::{GateStatus, GuardKind};
    use crate::routing::RecordingNavigator;
    use crate::session::{Identity, OnboardingService, ProfileService, SessionService};

    const WAIT: Duration = Duration::from_secs(2);

    async fn wait_for_status(rx: &mut watch::Receiver<GateView>, status: GateStatus) {
        tokio::time::timeout(WAIT, rx.wait_for(|v| v.status == status))
            .await
            .expect("timed out waiting for guard")
            .expect("guard channel closed");
    }

    #[tokio::test]
    async fn auth_guard_redirects_once_after_resolution() {
        let session = SessionService::new();
        let profile = ProfileService::new();
        let onboarding = OnboardingService::follow(session.subscribe(), profile.subscribe());
        let nav = Arc::new(RecordingNavigator::new());

        let guard = Guard::new(GuardKind::Auth, RedirectTargets::default(), nav.clone());
        let handle = spawn_guard(guard, session.subscribe(), onboarding.subscribe());
        let mut rx = handle.subscribe();

        assert_eq!(handle.view().status, GateStatus::Resolving);
        assert!(nav.calls().is_empty());

        session.sign_out();
        wait_for_status(&mut rx, GateStatus::Denied).await;
        assert_eq!(nav.calls(), vec!["/auth/signin"]);

        // Profile churn while still signed out must not re-redirect.
        profile.set_profile(None);
        profile.clear();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.view().status, GateStatus::Denied);
        assert_eq!(nav.calls(), vec!["/auth/signin"]);
    }

    #[tokio::test]
    async fn sign_in_grants_after_resolving() {
        let session = SessionService::new();
        let profile = ProfileService::new();
        let onboarding = OnboardingService::follow(session.subscribe(), profile.subscribe());
        let nav = Arc::new(RecordingNavigator::new());

        let guard = Guard::new(GuardKind::Auth, RedirectTargets::default(), nav.clone());
        let handle = spawn_guard(guard, session.subscribe(), onboarding.subscribe());
        let mut rx = handle.subscribe();

        session.sign_in(Identity::new("director@example.com"));
        wait_for_status(&mut rx, GateStatus::Granted).await;
        assert!(nav.calls().is_empty());
    }

    #[tokio::test]
    async fn dropped_guard_stops_following_feeds() {
        let session = SessionService::new();
        let profile = ProfileService::new();
        let onboarding = OnboardingService::follow(session.subscribe(), profile.subscribe());
        let nav = Arc::new(RecordingNavigator::new());

        let guard = Guard::new(GuardKind::Auth, RedirectTargets::default(), nav.clone());
        let handle = spawn_guard(guard, session.subscribe(), onboarding.subscribe());
        let mut rx = handle.subscribe();
        drop(handle);

        // The task is gone once the view channel closes.
        let closed = tokio::time::timeout(WAIT, rx.wait_for(|_| false))
            .await
            .expect("guard task still running after drop")
            .is_err();
        assert!(closed);

        session.sign_out();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(nav.calls().is_empty());
    }

    #[tokio::test]
    async fn torn_down_guard_never_navigates() {
        let session = SessionService::new();
        let profile = ProfileService::new();
        let onboarding = OnboardingService::follow(session.subscribe(), profile.subscribe());
        let nav = Arc::new(RecordingNavigator::new());

        let guard = Guard::new(GuardKind::Auth, RedirectTargets::default(), nav.clone());
        let handle = spawn_guard(guard, session.subscribe(), onboarding.subscribe());
        handle.teardown().await;

        session.sign_out();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(nav.calls().is_empty());
    }
}
