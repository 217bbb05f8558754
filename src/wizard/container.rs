//! Wizard container: owns the current step.

use tokio::sync::watch;
use tracing::debug;

use super::resolver::StepNavigator;

/// Multi-step form container. The current step only changes through
/// `go_to_step`, `next` and `back`.
pub struct Wizard {
    step_count: u32,
    tx: watch::Sender<u32>,
}

impl Wizard {
    /// Create a wizard positioned on step 0. A wizard always has at least
    /// one step.
    pub fn new(step_count: u32) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            step_count: step_count.max(1),
            tx,
        }
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn current(&self) -> u32 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.tx.subscribe()
    }

    pub fn is_last(&self) -> bool {
        self.current() + 1 == self.step_count
    }

    /// Advance one step. Returns false on the last step.
    pub fn next(&self) -> bool {
        let current = self.current();
        if current + 1 >= self.step_count {
            return false;
        }
        self.go_to_step(current + 1);
        true
    }

    /// Go back one step. Returns false on the first step.
    pub fn back(&self) -> bool {
        match self.current().checked_sub(1) {
            Some(previous) => {
                self.go_to_step(previous);
                true
            }
            None => false,
        }
    }
}

impl StepNavigator for Wizard {
    /// Out-of-range steps are clamped to the last step.
    fn go_to_step(&self, step: u32) {
        let clamped = step.min(self.step_count - 1);
        if clamped != step {
            debug!(requested = step, clamped, "Wizard step out of range");
        }
        self.tx.send_if_modified(|current| {
            if *current == clamped {
                false
            } else {
                *current = clamped;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::wizard::{ErrorNode, StepMap, WizardErrorResolver};

    #[test]
    fn next_and_back_stay_in_range() {
        let wizard = Wizard::new(3);
        assert!(!wizard.back());
        assert!(wizard.next());
        assert!(wizard.next());
        assert!(wizard.is_last());
        assert!(!wizard.next());
        assert_eq!(wizard.current(), 2);
        assert!(wizard.back());
        assert_eq!(wizard.current(), 1);
    }

    #[test]
    fn go_to_step_clamps() {
        let wizard = Wizard::new(5);
        wizard.go_to_step(42);
        assert_eq!(wizard.current(), 4);

        let single = Wizard::new(0);
        assert_eq!(single.step_count(), 1);
        single.go_to_step(3);
        assert_eq!(single.current(), 0);
    }

    #[tokio::test]
    async fn resolver_moves_wizard_to_first_error() {
        let wizard = Wizard::new(5);
        let mut rx = wizard.subscribe();
        wizard.go_to_step(4);
        let _ = rx.borrow_and_update();

        let resolver = WizardErrorResolver::new(
            StepMap::from_pairs([("deceased.date_of_death", 0), ("ceremony.date", 3)]).unwrap(),
        );
        let errors = ErrorNode::from_json(&json!({
            "ceremony": { "date": { "message": "Required" } },
            "deceased": { "date_of_death": { "message": "Must be after date of birth" } }
        }))
        .unwrap();

        resolver.resolve(&errors, &wizard);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 0);
    }
}
