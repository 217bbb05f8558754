//! Maps a failed submission back to the earliest wizard step with an error.

use serde::Serialize;
use tracing::debug;

use super::error_tree::ErrorNode;
use super::field_path::FieldPath;
use super::step_map::StepMap;

/// The wizard's step navigation API.
pub trait StepNavigator {
    /// Move to `step`. Range checking is the wizard's job.
    fn go_to_step(&self, step: u32);
}

/// Which step to show after a failed submit, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub step: u32,
    /// Mapped field that decided the step; `None` for a fallback jump.
    pub field: Option<String>,
    pub fallback: bool,
}

/// Resolves validation errors to wizard steps for one form.
#[derive(Debug, Clone)]
pub struct WizardErrorResolver {
    map: StepMap,
    fallback_step: Option<u32>,
}

impl WizardErrorResolver {
    pub fn new(map: StepMap) -> Self {
        Self {
            map,
            fallback_step: None,
        }
    }

    /// Jump to `step` when the tree has errors but none of them is mapped.
    pub fn with_fallback_step(mut self, step: u32) -> Self {
        self.fallback_step = Some(step);
        self
    }

    pub fn map(&self) -> &StepMap {
        &self.map
    }

    /// Find the lowest mapped step whose field has an error.
    ///
    /// Scans the whole map every call. Among fields on the same step the
    /// first in map order is reported.
    pub fn first_error_step(&self, tree: &ErrorNode) -> Option<Resolution> {
        if let Some((step, field)) = lowest_error_step(&self.map, tree) {
            return Some(Resolution {
                step,
                field: Some(field.to_string()),
                fallback: false,
            });
        }

        match self.fallback_step {
            Some(step) if !tree.is_empty() => Some(Resolution {
                step,
                field: None,
                fallback: true,
            }),
            _ => None,
        }
    }

    /// Leaf paths in `tree` that no map entry reaches.
    pub fn unmapped_errors(&self, tree: &ErrorNode) -> Vec<String> {
        tree.leaves()
            .into_iter()
            .filter(|(leaf, _)| !self.map.covers(leaf))
            .map(|(leaf, _)| leaf.join("."))
            .collect()
    }

    /// Resolve `tree` and, if a step is found, navigate to it once.
    pub fn resolve<N>(&self, tree: &ErrorNode, navigator: &N) -> Option<Resolution>
    where
        N: StepNavigator + ?Sized,
    {
        let unmapped = self.unmapped_errors(tree);
        if !unmapped.is_empty() {
            debug!(fields = ?unmapped, "Validation errors without a wizard step");
        }

        let resolution = self.first_error_step(tree);
        match &resolution {
            Some(found) => {
                debug!(
                    step = found.step,
                    field = ?found.field,
                    fallback = found.fallback,
                    "Navigating to first step with errors"
                );
                navigator.go_to_step(found.step);
            }
            None => debug!("No wizard step found for validation errors"),
        }
        resolution
    }

    /// A submit-failure handler bound to `navigator`.
    pub fn handler<'a, N>(&'a self, navigator: &'a N) -> impl Fn(&ErrorNode) -> Option<Resolution> + 'a
    where
        N: StepNavigator + ?Sized,
    {
        move |tree: &ErrorNode| self.resolve(tree, navigator)
    }
}

/// Build a submit-failure handler for `map` that navigates `navigator` to
/// the first step with errors and returns that step.
///
/// Shorthand for [`WizardErrorResolver::resolve`] without a fallback step.
pub fn resolve<'a, N>(
    map: &StepMap,
    navigator: &'a N,
) -> impl Fn(&ErrorNode) -> Option<u32> + use<'a, N>
where
    N: StepNavigator + ?Sized,
{
    let resolver = WizardErrorResolver::new(map.clone());
    move |tree: &ErrorNode| resolver.resolve(tree, navigator).map(|found| found.step)
}

fn lowest_error_step<'m>(map: &'m StepMap, tree: &ErrorNode) -> Option<(u32, &'m FieldPath)> {
    let mut best: Option<(u32, &FieldPath)> = None;
    for (path, step) in map.iter() {
        if tree.lookup(path).is_none() {
            continue;
        }
        if best.is_none_or(|(lowest, _)| step < lowest) {
            best = Some((step, path));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct RecordingSteps {
        calls: RefCell<Vec<u32>>,
    }

    impl StepNavigator for RecordingSteps {
        fn go_to_step(&self, step: u32) {
            self.calls.borrow_mut().push(step);
        }
    }

    fn tree(value: serde_json::Value) -> ErrorNode {
        ErrorNode::from_json(&value).unwrap()
    }

    fn funeral_map() -> StepMap {
        StepMap::from_pairs([
            ("contact.email", 4),
            ("partner.name", 1),
            ("deceased.first_names", 0),
            ("relatives.*.name", 2),
        ])
        .unwrap()
    }

    #[test]
    fn nested_path_selects_its_step() {
        let map = StepMap::from_pairs([("deceased.first_names", 0), ("partner.name", 1)]).unwrap();
        let nav = RecordingSteps::default();
        let handler = resolve(&map, &nav);

        let step = handler(&tree(json!({
            "deceased": { "first_names": { "message": "required" } }
        })));

        assert_eq!(step, Some(0));
        assert_eq!(*nav.calls.borrow(), vec![0]);
    }

    #[test]
    fn lowest_step_wins_regardless_of_map_order() {
        let resolver = WizardErrorResolver::new(funeral_map());
        let errors = tree(json!({
            "contact": { "email": { "message": "Invalid email" } },
            "relatives": [ { "name": { "message": "Required" } } ],
            "partner": { "name": { "message": "Required" } }
        }));

        let found = resolver.first_error_step(&errors).unwrap();
        assert_eq!(found.step, 1);
        assert_eq!(found.field.as_deref(), Some("partner.name"));
        assert!(!found.fallback);

        // Same input, same answer.
        for _ in 0..3 {
            assert_eq!(resolver.first_error_step(&errors), Some(found.clone()));
        }
    }

    #[test]
    fn tie_on_step_number() {
        let map = StepMap::from_pairs([("a", 2), ("b", 2)]).unwrap();
        let resolver = WizardErrorResolver::new(map);
        let errors = tree(json!({
            "a": { "message": "bad a" },
            "b": { "message": "bad b" }
        }));

        let found = resolver.first_error_step(&errors).unwrap();
        assert_eq!(found.step, 2);
        assert_eq!(found.field.as_deref(), Some("a"));
    }

    #[test]
    fn no_errors_means_no_navigation() {
        let resolver = WizardErrorResolver::new(funeral_map());
        let nav = RecordingSteps::default();

        assert_eq!(resolver.resolve(&ErrorNode::empty(), &nav), None);
        assert_eq!(
            resolver.resolve(&tree(json!({ "relatives": [null, {}] })), &nav),
            None
        );
        assert!(nav.calls.borrow().is_empty());

        let empty = WizardErrorResolver::new(StepMap::new());
        let errors = tree(json!({ "partner": { "name": { "message": "Required" } } }));
        assert_eq!(empty.resolve(&errors, &nav), None);
        assert!(nav.calls.borrow().is_empty());
    }

    #[test]
    fn unmapped_errors_are_invisible() {
        let resolver = WizardErrorResolver::new(funeral_map());
        let nav = RecordingSteps::default();
        let errors = tree(json!({
            "voice_notes": { "message": "Too long" },
            "contact": { "email": { "message": "Invalid email" } }
        }));

        let found = resolver.resolve(&errors, &nav).unwrap();
        assert_eq!(found.step, 4);
        assert_eq!(*nav.calls.borrow(), vec![4]);
        assert_eq!(resolver.unmapped_errors(&errors), vec!["voice_notes"]);

        let only_unmapped = tree(json!({ "voice_notes": { "message": "Too long" } }));
        assert_eq!(resolver.resolve(&only_unmapped, &nav), None);
        assert_eq!(*nav.calls.borrow(), vec![4]);
    }

    #[test]
    fn fallback_step_catches_unmapped_errors() {
        let resolver = WizardErrorResolver::new(funeral_map()).with_fallback_step(0);
        let nav = RecordingSteps::default();

        let found = resolver
            .resolve(&tree(json!({ "voice_notes": { "message": "Too long" } })), &nav)
            .unwrap();
        assert_eq!(found.step, 0);
        assert!(found.fallback);
        assert_eq!(found.field, None);

        // Mapped errors still take precedence; an empty tree still does nothing.
        let mapped = tree(json!({ "contact": { "email": { "message": "Invalid" } } }));
        assert_eq!(resolver.resolve(&mapped, &nav).map(|r| r.step), Some(4));
        assert_eq!(resolver.resolve(&ErrorNode::empty(), &nav), None);
        assert_eq!(*nav.calls.borrow(), vec![0, 4]);
    }

    #[test]
    fn handler_navigates_exactly_once_per_call() {
        let resolver = WizardErrorResolver::new(funeral_map());
        let nav = RecordingSteps::default();
        let on_invalid = resolver.handler(&nav);

        let errors = tree(json!({
            "deceased": { "first_names": { "message": "Required" } },
            "partner": { "name": { "message": "Required" } }
        }));
        on_invalid(&errors);
        on_invalid(&errors);

        assert_eq!(*nav.calls.borrow(), vec![0, 0]);
    }

    #[test]
    fn mapped_message_field_sits_beside_other_errors() {
        let map = StepMap::from_pairs([("contact.email", 4), ("message", 3)]).unwrap();
        let nav = RecordingSteps::default();
        let handler = resolve(&map, &nav);

        let step = handler(&tree(json!({
            "contact": { "email": { "message": "Invalid email" } },
            "message": { "message": "Required", "type": "required" }
        })));

        assert_eq!(step, Some(3));
        assert_eq!(*nav.calls.borrow(), vec![3]);
    }

    #[test]
    fn bare_handler_outlives_its_map() {
        let nav = RecordingSteps::default();
        let handler = {
            let map = StepMap::from_pairs([("partner.name", 1)]).unwrap();
            resolve(&map, &nav)
        };

        assert_eq!(
            handler(&tree(json!({ "partner": { "name": { "message": "Required" } } }))),
            Some(1)
        );
        assert_eq!(handler(&tree(json!({ "voice_notes": { "message": "Too long" } }))), None);
        assert_eq!(*nav.calls.borrow(), vec![1]);
    }

    #[test]
    fn indexed_list_errors_are_reachable() {
        let map = StepMap::from_pairs([("relatives.1.relationship", 2), ("ceremony.date", 3)])
            .unwrap();
        let nav = RecordingSteps::default();
        let handler = resolve(&map, &nav);

        let step = handler(&tree(json!({
            "relatives": [null, { "relationship": { "message": "Pick one" } }],
            "ceremony": { "date": { "message": "Required" } }
        })));
        assert_eq!(step, Some(2));
    }
}
