// Symptom checker: prompt construction and completion parsing

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::models::openai::{ChatCompletionRequest, ChatMessage};
use crate::models::symptom::{Condition, SymptomRequest, SymptomResponse};

pub const SYSTEM_PROMPT: &str = "You are a helpful medical assistant. Analyze the symptoms provided \
and suggest possible conditions, recommendations, and whether medical attention should be sought. \
Format your response as JSON with keys 'possible_conditions' (array of objects with 'condition' \
and 'probability' fields), 'recommendations' (array of strings), 'severity_level' (string), and \
'seek_medical_attention' (boolean).";

const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: i32 = 1000;

const CONSULT_RECOMMENDATION: &str = "Please consult with a healthcare professional.";
const UNKNOWN: &str = "Unknown";

const RESPONSE_FORMAT: &str = r#"
Based on this information, provide:
1. Possible conditions or diagnoses with probability estimates
2. General recommendations for the patient
3. Severity level (Low, Medium, High)
4. Whether the patient should seek immediate medical attention

Provide your response in a structured JSON format with these exact keys:
{
  "possible_conditions": [
    {"condition": "Example Condition", "probability": "High/Medium/Low"}
  ],
  "recommendations": ["recommendation 1", "recommendation 2"],
  "severity_level": "Low/Medium/High",
  "seek_medical_attention": true/false
}
"#;

static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("valid regex"));
static ANY_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```\s*([\s\S]*?)\s*```").expect("valid regex"));
static BRACED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid regex"));

/// Coarse age bucket used in logs instead of the exact age
pub fn age_group(age: i32) -> String {
    if age >= 10 {
        format!("{}s", age / 10 * 10)
    } else {
        "child".to_string()
    }
}

pub fn create_symptom_prompt(data: &SymptomRequest) -> String {
    let mut prompt = format!(
        "Patient Information:\n- Age: {}\n- Gender: {}\n- Symptoms: {}\n",
        data.age,
        data.gender,
        data.symptoms.join(", ")
    );

    if !data.medical_history.is_empty() {
        prompt.push_str(&format!("- Medical History: {}\n", data.medical_history.join(", ")));
    }
    if !data.allergies.is_empty() {
        prompt.push_str(&format!("- Allergies: {}\n", data.allergies.join(", ")));
    }
    if !data.medications.is_empty() {
        prompt.push_str(&format!("- Current Medications: {}\n", data.medications.join(", ")));
    }

    prompt.push_str(RESPONSE_FORMAT);
    prompt
}

/// Chat completion request for a symptom analysis
pub fn build_request(model: &str, data: &SymptomRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(create_symptom_prompt(data)),
        ],
        temperature: Some(TEMPERATURE),
        max_tokens: Some(MAX_TOKENS),
    }
}

pub fn fallback_response() -> SymptomResponse {
    SymptomResponse {
        possible_conditions: vec![Condition {
            condition: "Could not determine".to_string(),
            probability: UNKNOWN.to_string(),
        }],
        recommendations: vec![CONSULT_RECOMMENDATION.to_string()],
        severity_level: UNKNOWN.to_string(),
        seek_medical_attention: true,
    }
}

/// Fixed answer served by the test endpoint
pub fn canned_response() -> SymptomResponse {
    SymptomResponse {
        possible_conditions: vec![Condition {
            condition: "Test Condition".to_string(),
            probability: "Medium".to_string(),
        }],
        recommendations: vec![
            "This is a test recommendation.".to_string(),
            CONSULT_RECOMMENDATION.to_string(),
        ],
        severity_level: "Low".to_string(),
        seek_medical_attention: false,
    }
}

/// Turn the assistant's message into a well-formed response
///
/// The model is asked for JSON but frequently wraps it in prose or a code
/// fence. Anything unparseable yields the fallback response.
pub fn parse_completion_content(content: Option<&str>) -> SymptomResponse {
    let Some(content) = content else {
        tracing::error!("Completion contained no message content");
        return fallback_response();
    };
    tracing::debug!("Raw completion content: {}", content);

    match extract_json(content) {
        Some(value) => normalize(value),
        None => {
            tracing::error!("Could not parse JSON from completion content");
            fallback_response()
        }
    }
}

fn extract_json(content: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Some(value);
    }

    let candidate = JSON_FENCE
        .captures(content)
        .or_else(|| ANY_FENCE.captures(content))
        .and_then(|caps| caps.get(1))
        .or_else(|| BRACED.find(content))?;

    serde_json::from_str(candidate.as_str()).ok()
}

/// Repair a parsed completion into the response shape
pub fn normalize(value: Value) -> SymptomResponse {
    let Value::Object(mut obj) = value else {
        return fallback_response();
    };

    let possible_conditions = match obj.remove("possible_conditions") {
        Some(Value::Array(items)) => items.into_iter().map(normalize_condition).collect(),
        _ => vec![Condition {
            condition: UNKNOWN.to_string(),
            probability: UNKNOWN.to_string(),
        }],
    };

    let recommendations = match obj.remove("recommendations") {
        Some(Value::Array(items)) => items.into_iter().map(value_text).collect(),
        _ => vec![CONSULT_RECOMMENDATION.to_string()],
    };

    let severity_level = match obj.remove("severity_level") {
        Some(Value::String(level)) => level,
        _ => UNKNOWN.to_string(),
    };

    let seek_medical_attention = match obj.remove("seek_medical_attention") {
        Some(Value::Bool(flag)) => flag,
        _ => true,
    };

    SymptomResponse {
        possible_conditions,
        recommendations,
        severity_level,
        seek_medical_attention,
    }
}

fn normalize_condition(item: Value) -> Condition {
    match item {
        Value::Object(mut entry) => Condition {
            condition: take_text(&mut entry, "condition")
                .unwrap_or_else(|| "Unknown condition".to_string()),
            probability: take_text(&mut entry, "probability")
                .unwrap_or_else(|| UNKNOWN.to_string()),
        },
        other => Condition {
            condition: value_text(other),
            probability: UNKNOWN.to_string(),
        },
    }
}

fn take_text(entry: &mut Map<String, Value>, key: &str) -> Option<String> {
    entry.remove(key).map(value_text)
}

/// Strings pass through unquoted, anything else is rendered as JSON
fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
