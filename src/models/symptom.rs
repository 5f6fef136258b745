use serde::{Deserialize, Deserializer, Serialize};

/// Patient data submitted to the symptom checker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomRequest {
    pub age: i32,
    pub gender: String,
    #[serde(deserialize_with = "strings_only")]
    pub symptoms: Vec<String>,
    #[serde(default, deserialize_with = "optional_strings_only")]
    pub medical_history: Vec<String>,
    #[serde(default, deserialize_with = "optional_strings_only")]
    pub allergies: Vec<String>,
    #[serde(default, deserialize_with = "optional_strings_only")]
    pub medications: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub condition: String,
    pub probability: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomResponse {
    pub possible_conditions: Vec<Condition>,
    pub recommendations: Vec<String>,
    pub severity_level: String,
    pub seek_medical_attention: bool,
}

/// Accept a JSON array and keep only its string entries
fn strings_only<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// Like `strings_only`, but `null` becomes an empty list
fn optional_strings_only<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}
