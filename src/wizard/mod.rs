//! Wizard error resolution.
//!
//! When a multi-step form fails validation on submit, the resolver finds the
//! earliest step holding an invalid field and moves the wizard there. Errors
//! on fields absent from the form's step map are ignored unless a fallback
//! step is configured.

pub mod container;
pub mod error_tree;
pub mod field_path;
pub mod forms;
pub mod resolver;
pub mod step_map;

pub use container::Wizard;
pub use error_tree::{ErrorNode, FieldError};
pub use field_path::{FieldPath, Segment};
pub use forms::WizardForm;
pub use resolver::{Resolution, StepNavigator, WizardErrorResolver, resolve};
pub use step_map::StepMap;
