//! User profiles.
//!
//! The dashboard stores a rich [`StoredProfile`]; live search consumes the
//! flat camelCase [`LegacyProfile`] derived from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

const STRING_FIELDS: &[&str] = &[
    "country",
    "gender",
    "citizenship",
    "education",
    "degreeType",
    "yearOfStudy",
    "fieldOfStudy",
    "gpa",
    "incomeBracket",
    "ethnicity",
];

/// Flat profile accepted by `POST /api/grants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProfile {
    pub age: f64,
    pub country: String,
    pub gender: String,
    pub citizenship: String,
    pub education: String,
    pub degree_type: String,
    pub year_of_study: String,
    pub field_of_study: String,
    pub gpa: String,
    pub income_bracket: String,
    pub ethnicity: String,
    pub financial_need: bool,
    pub identifiers: Vec<String>,
}

impl LegacyProfile {
    /// Build a profile from an untyped JSON body, checking the exact JSON
    /// type of every field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` naming the first field whose type does
    /// not match (missing fields count as mismatches).
    pub fn from_json(body: &Value) -> Result<Self, Error> {
        let obj = body
            .as_object()
            .ok_or_else(|| Error::InvalidInput("profile must be a JSON object".into()))?;

        let age = obj
            .get("age")
            .and_then(Value::as_f64)
            .ok_or_else(|| type_mismatch("age", "number"))?;

        for field in STRING_FIELDS {
            if !obj.get(*field).is_some_and(Value::is_string) {
                return Err(type_mismatch(field, "string"));
            }
        }

        let financial_need = obj
            .get("financialNeed")
            .and_then(Value::as_bool)
            .ok_or_else(|| type_mismatch("financialNeed", "boolean"))?;

        let identifiers = obj
            .get("identifiers")
            .and_then(Value::as_array)
            .and_then(|items| items.iter().map(|v| v.as_str().map(str::to_owned)).collect::<Option<Vec<_>>>())
            .ok_or_else(|| type_mismatch("identifiers", "array of strings"))?;

        Ok(Self {
            age,
            country: string_field(obj, "country"),
            gender: string_field(obj, "gender"),
            citizenship: string_field(obj, "citizenship"),
            education: string_field(obj, "education"),
            degree_type: string_field(obj, "degreeType"),
            year_of_study: string_field(obj, "yearOfStudy"),
            field_of_study: string_field(obj, "fieldOfStudy"),
            gpa: string_field(obj, "gpa"),
            income_bracket: string_field(obj, "incomeBracket"),
            ethnicity: string_field(obj, "ethnicity"),
            financial_need,
            identifiers,
        })
    }
}

fn type_mismatch(field: &str, expected: &str) -> Error {
    Error::InvalidInput(format!("Invalid profile data: {field} must be a {expected}"))
}

fn string_field(obj: &Map<String, Value>, field: &str) -> String {
    obj.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Profile as stored by the onboarding wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredProfile {
    pub age: Option<u32>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub citizenship: Option<String>,
    pub school_status: Option<String>,
    pub degree_type: Option<String>,
    pub year_of_study: Option<String>,
    pub field_of_study: Option<String>,
    pub gpa: Option<String>,
    pub income_bracket: Option<String>,
    pub ethnicity: Option<String>,
    pub financial_need: Option<bool>,
    pub identifiers: Vec<String>,
}

impl StoredProfile {
    /// Whether the dashboard has enough to run a personalized search.
    pub fn is_complete_enough(&self) -> bool {
        [&self.country, &self.school_status, &self.field_of_study]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// Flatten into the legacy shape consumed by live search.
    pub fn to_legacy(&self) -> LegacyProfile {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        LegacyProfile {
            age: f64::from(self.age.unwrap_or(0)),
            country: text(&self.country),
            gender: text(&self.gender),
            citizenship: text(&self.citizenship),
            education: text(&self.school_status),
            degree_type: text(&self.degree_type),
            year_of_study: text(&self.year_of_study),
            field_of_study: text(&self.field_of_study),
            gpa: text(&self.gpa),
            income_bracket: text(&self.income_bracket),
            ethnicity: text(&self.ethnicity),
            financial_need: self.financial_need.unwrap_or(false),
            identifiers: self.identifiers.clone(),
        }
    }
}
