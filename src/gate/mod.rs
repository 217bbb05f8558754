//! Access gate: guards that keep protected pages hidden until the session
//! and onboarding status are known, and redirect when access is denied.
//!
//! - `state` — guard kinds, the Resolving/Denied/Granted state machine
//! - `guard` — a single guard instance with its redirect side effect
//! - `runtime` — mounts a guard on live `watch` feeds

pub mod guard;
pub mod runtime;
pub mod state;

pub use guard::{GateView, Guard};
pub use runtime::{GuardHandle, spawn_guard};
pub use state::{Decision, GateStatus, GateTransition, GuardKind};
