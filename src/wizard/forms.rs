//! Wizard forms shipped with the application and their step maps.

use serde::Serialize;

use super::resolver::WizardErrorResolver;
use super::step_map::StepMap;
use crate::error::WizardError;

/// Static description of a wizard form.
#[derive(Debug, Clone, Copy)]
pub struct WizardForm {
    pub name: &'static str,
    pub steps: &'static [&'static str],
    fields: &'static [(&'static str, u32)],
}

/// New funeral record.
pub const FUNERAL_RECORD: WizardForm = WizardForm {
    name: "funeral_record",
    steps: &["Deceased", "Partner", "Relatives", "Ceremony", "Contact"],
    fields: &[
        ("deceased.first_names", 0),
        ("deceased.last_name", 0),
        ("deceased.gender", 0),
        ("deceased.date_of_birth", 0),
        ("deceased.place_of_birth", 0),
        ("deceased.date_of_death", 0),
        ("deceased.place_of_death", 0),
        ("deceased.address.street", 0),
        ("deceased.address.postal_code", 0),
        ("deceased.address.city", 0),
        ("partner.name", 1),
        ("partner.relationship", 1),
        ("partner.is_deceased", 1),
        ("relatives.*.name", 2),
        ("relatives.*.relationship", 2),
        ("relatives.*.phone", 2),
        ("ceremony.kind", 3),
        ("ceremony.date", 3),
        ("ceremony.location", 3),
        ("ceremony.officiant", 3),
        ("ceremony.message", 3),
        ("contact.name", 4),
        ("contact.relationship", 4),
        ("contact.email", 4),
        ("contact.phone", 4),
        ("billing.address.street", 4),
        ("billing.address.postal_code", 4),
        ("billing.address.city", 4),
    ],
};

/// First-launch onboarding for a new funeral home.
pub const ONBOARDING: WizardForm = WizardForm {
    name: "onboarding",
    steps: &["Your profile", "Organization", "Team"],
    fields: &[
        ("profile.full_name", 0),
        ("profile.phone", 0),
        ("organization.name", 1),
        ("organization.email", 1),
        ("organization.phone", 1),
        ("organization.address.street", 1),
        ("organization.address.postal_code", 1),
        ("organization.address.city", 1),
        ("invites.*.email", 2),
        ("invites.*.role", 2),
    ],
};

pub const ALL: [WizardForm; 2] = [FUNERAL_RECORD, ONBOARDING];

/// Look up a form by name.
pub fn find(name: &str) -> Result<WizardForm, WizardError> {
    ALL.into_iter()
        .find(|form| form.name == name)
        .ok_or_else(|| WizardError::UnknownForm {
            form: name.to_string(),
        })
}

impl WizardForm {
    pub fn step_count(&self) -> u32 {
        self.steps.len() as u32
    }

    pub fn step_map(&self) -> Result<StepMap, WizardError> {
        StepMap::from_pairs(self.fields.iter().copied())
    }

    /// Resolver for this form, optionally with a fallback step for unmapped
    /// errors.
    pub fn resolver(&self, fallback_step: Option<u32>) -> Result<WizardErrorResolver, WizardError> {
        let resolver = WizardErrorResolver::new(self.step_map()?);
        Ok(match fallback_step {
            Some(step) => resolver.with_fallback_step(step),
            None => resolver,
        })
    }

    pub fn describe(&self) -> Result<FormDescription, WizardError> {
        Ok(FormDescription {
            form: self.name,
            steps: self
                .steps
                .iter()
                .enumerate()
                .map(|(index, title)| StepDescription {
                    index: index as u32,
                    title,
                })
                .collect(),
            fields: self.step_map()?,
        })
    }
}

/// Wire form of a wizard definition.
#[derive(Debug, Clone, Serialize)]
pub struct FormDescription {
    pub form: &'static str,
    pub steps: Vec<StepDescription>,
    pub fields: StepMap,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepDescription {
    pub index: u32,
    pub title: &'static str,
}
