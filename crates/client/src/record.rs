//! Grant records as returned by the completions API.
//!
//! Nothing about the reply is guaranteed: fields go missing, amounts come
//! back as numbers, lists come back as arrays. Every field is read as
//! optional free text.

use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One grant as described by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct RawGrantRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub amount: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub deadline: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub eligibility: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub organization: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub requirements: Option<String>,

    #[serde(default, deserialize_with = "lenient_tags")]
    #[schemars(with = "String")]
    pub tags: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "String")]
    pub link: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    #[schemars(with = "Option<String>")]
    pub difficulty: Option<String>,
}

/// Read any JSON value as text. Arrays become one line per item.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(Value::deserialize(deserializer)?, "\n"))
}

/// Like [`lenient_text`], but tag arrays read as one comma-separated line.
fn lenient_tags<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(Value::deserialize(deserializer)?, ", "))
}

fn value_text(value: Value, separator: &str) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(|item| value_text(item, separator)).collect();
            (!parts.is_empty()).then(|| parts.join(separator))
        }
        obj @ Value::Object(_) => Some(obj.to_string()),
    }
}

/// JSON schema for an array of grant records, with subschemas inlined.
pub fn grant_records_schema() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|s| {
            s.inline_subschemas = true;
            s.meta_schema = None;
        })
        .into_generator();
    let schema = generator.into_root_schema_for::<Vec<RawGrantRecord>>();

    serde_json::to_value(&schema).unwrap_or_default()
}
