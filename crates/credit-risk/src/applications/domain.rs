use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::AdminId;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub i64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Demographic record for a loan applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub application_number: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub birth_place: String,
    pub gender: Gender,
    pub address: String,
    pub postal_code: String,
    pub owner_id: AdminId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw create/update body. Every field is optional so missing values surface as
/// validation messages rather than deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInput {
    #[serde(default)]
    pub application_number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Application fields that passed validation, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationFields {
    pub application_number: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub birth_place: String,
    pub gender: Gender,
    pub address: String,
    pub postal_code: String,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
    label: &str,
) -> Result<&'a str, ValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ValidationError::new(field, format!("{label} is required")))
}

fn within_chars(
    value: &str,
    field: &'static str,
    label: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if (min..=max).contains(&length) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("{label} must be between {min} and {max} characters"),
        ))
    }
}

impl ApplicationInput {
    /// Validates every field in declaration order and returns the first failure.
    pub fn validate(&self, today: NaiveDate) -> Result<ApplicationFields, ValidationError> {
        let application_number = required(
            &self.application_number,
            "application_number",
            "Application number",
        )?;

        let name = required(&self.name, "name", "Name")?;
        within_chars(name, "name", "Name", 3, 10)?;

        let birth_date = required(&self.birth_date, "birth_date", "Birth date")?;
        let birth_date = parse_date(birth_date).map_err(|_| {
            ValidationError::new("birth_date", "Birth date must use the YYYY-MM-DD format")
        })?;
        if birth_date >= today {
            return Err(ValidationError::new(
                "birth_date",
                "Birth date must be before today",
            ));
        }

        let birth_place = required(&self.birth_place, "birth_place", "Birth place")?;
        within_chars(birth_place, "birth_place", "Birth place", 3, 50)?;

        let gender = required(&self.gender, "gender", "Gender")?;
        let gender = Gender::parse(gender)
            .ok_or_else(|| ValidationError::new("gender", "Gender must be male or female"))?;

        let address = required(&self.address, "address", "Address")?;
        within_chars(address, "address", "Address", 10, 500)?;

        let postal_code = required(&self.postal_code, "postal_code", "Postal code")?;
        if !postal_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new(
                "postal_code",
                "Postal code must contain only digits",
            ));
        }
        if postal_code.len() != 5 {
            return Err(ValidationError::new(
                "postal_code",
                "Postal code must be exactly 5 digits",
            ));
        }

        Ok(ApplicationFields {
            application_number: application_number.to_string(),
            name: name.to_string(),
            birth_date,
            birth_place: birth_place.to_string(),
            gender,
            address: address.to_string(),
            postal_code: postal_code.to_string(),
        })
    }

    /// Fills fields missing from a partial update with the stored values.
    pub fn merged_over(self, existing: &Application) -> Self {
        Self {
            application_number: self
                .application_number
                .or_else(|| Some(existing.application_number.clone())),
            name: self.name.or_else(|| Some(existing.name.clone())),
            birth_date: self
                .birth_date
                .or_else(|| Some(existing.birth_date.format("%Y-%m-%d").to_string())),
            birth_place: self
                .birth_place
                .or_else(|| Some(existing.birth_place.clone())),
            gender: self
                .gender
                .or_else(|| Some(existing.gender.label().to_string())),
            address: self.address.or_else(|| Some(existing.address.clone())),
            postal_code: self
                .postal_code
                .or_else(|| Some(existing.postal_code.clone())),
        }
    }
}
