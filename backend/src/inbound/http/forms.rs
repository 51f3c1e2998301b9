//! Form descriptors returned by `GET` on form pages.
//!
//! A descriptor lists the fields a client must submit and the allowed values
//! for choice fields, so a renderer can build the form without hard-coding
//! the enumerations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BloodType, Specialization};

/// One selectable value of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChoiceOption {
    /// Value to submit.
    #[schema(example = "O+")]
    pub value: String,
    /// Label to display.
    #[schema(example = "O+")]
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Allowed values for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldChoices {
    #[schema(example = "blood_type")]
    pub field: String,
    pub options: Vec<ChoiceOption>,
}

/// Field list and choices for a form page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormDescriptor {
    /// Field names in display order.
    pub fields: Vec<String>,
    /// Enumerated values for choice fields.
    pub choices: Vec<FieldChoices>,
}

impl FormDescriptor {
    /// Descriptor with `fields` and no choices.
    pub fn new<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            fields: fields.into_iter().map(str::to_owned).collect(),
            choices: Vec::new(),
        }
    }

    /// Attach the allowed values of `field`.
    #[must_use]
    pub fn with_choices(mut self, field: &str, options: Vec<ChoiceOption>) -> Self {
        self.choices.push(FieldChoices {
            field: field.to_owned(),
            options,
        });
        self
    }
}

pub(crate) const ACCOUNT_FIELDS: [&str; 6] = [
    "username",
    "first_name",
    "last_name",
    "email",
    "password",
    "confirm_password",
];

pub(crate) fn blood_type_choices() -> Vec<ChoiceOption> {
    BloodType::ALL
        .iter()
        .map(|blood| ChoiceOption::new(blood.as_str(), blood.as_str()))
        .collect()
}

pub(crate) fn specialization_choices() -> Vec<ChoiceOption> {
    Specialization::ALL
        .iter()
        .map(|choice| ChoiceOption::new(choice.as_str(), choice.as_str()))
        .collect()
}
