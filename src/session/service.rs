//! Observable session, profile and onboarding services.
//!
//! Each service owns a `watch` channel. Guards subscribe to the receivers
//! and re-evaluate on every change.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::model::{Identity, OnboardingSnapshot, Profile, ProfileSnapshot, SessionSnapshot};

/// Publishes the current session.
pub struct SessionService {
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionService {
    /// Create a service in the resolving state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::resolving());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Mark the session as being resolved again (e.g. token refresh).
    pub fn begin_resolve(&self) {
        self.tx.send_replace(SessionSnapshot::resolving());
    }

    pub fn sign_in(&self, user: Identity) {
        info!(user_id = %user.id, "Session signed in");
        self.tx.send_replace(SessionSnapshot::signed_in(user));
    }

    pub fn sign_out(&self) {
        info!("Session signed out");
        self.tx.send_replace(SessionSnapshot::signed_out());
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes the signed-in user's profile.
pub struct ProfileService {
    tx: watch::Sender<ProfileSnapshot>,
}

impl ProfileService {
    /// Create a service in the loading state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProfileSnapshot::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ProfileSnapshot {
        self.tx.borrow().clone()
    }

    pub fn begin_load(&self) {
        self.tx.send_replace(ProfileSnapshot::default());
    }

    pub fn set_profile(&self, profile: Option<Profile>) {
        debug!(present = profile.is_some(), "Profile loaded");
        self.tx.send_replace(ProfileSnapshot {
            profile,
            loading: false,
        });
    }

    /// Drop the profile after sign-out.
    pub fn clear(&self) {
        self.set_profile(None);
    }
}

impl Default for ProfileService {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes the onboarding status derived from a session and a profile feed.
pub struct OnboardingService {
    rx: watch::Receiver<OnboardingSnapshot>,
    task: JoinHandle<()>,
}

impl OnboardingService {
    /// Spawn a task that re-derives the onboarding status whenever the
    /// session or the profile changes. The task ends when both sources are
    /// closed or the service is dropped.
    pub fn follow(
        mut session: watch::Receiver<SessionSnapshot>,
        mut profile: watch::Receiver<ProfileSnapshot>,
    ) -> Self {
        let initial = OnboardingSnapshot::derive(&session.borrow(), &profile.borrow());
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            let mut session_open = true;
            let mut profile_open = true;
            while session_open || profile_open {
                tokio::select! {
                    changed = session.changed(), if session_open => {
                        session_open = changed.is_ok();
                    }
                    changed = profile.changed(), if profile_open => {
                        profile_open = changed.is_ok();
                    }
                }
                let next = OnboardingSnapshot::derive(&session.borrow(), &profile.borrow());
                tx.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        debug!(
                            needs_onboarding = next.needs_onboarding,
                            is_loading = next.is_loading,
                            is_authenticated = next.is_authenticated,
                            "Onboarding status changed"
                        );
                        *current = next;
                        true
                    }
                });
            }
        });

        Self { rx, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<OnboardingSnapshot> {
        self.rx.clone()
    }

    pub fn snapshot(&self) -> OnboardingSnapshot {
        *self.rx.borrow()
    }
}

impl Drop for OnboardingService {
    fn drop(&mut self) {
        self.task.abort();
    }
}
