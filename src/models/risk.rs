use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Health parameters submitted for a risk assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessmentRequest {
    pub age: i32,
    pub gender: String,
    /// Height in centimetres
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    #[serde(default)]
    pub systolic_bp: Option<i32>,
    #[serde(default)]
    pub diastolic_bp: Option<i32>,
    #[serde(default)]
    pub cholesterol: Option<f64>,
    #[serde(default)]
    pub hdl: Option<f64>,
    #[serde(default)]
    pub ldl: Option<f64>,
    #[serde(default)]
    pub triglycerides: Option<f64>,
    #[serde(default)]
    pub fasting_glucose: Option<f64>,
    #[serde(default)]
    pub smoking: bool,
    #[serde(default)]
    pub alcohol_consumption: Option<String>,
    #[serde(default)]
    pub exercise_minutes_per_week: Option<i32>,
    #[serde(default)]
    pub family_history: Option<HashMap<String, bool>>,
    #[serde(default)]
    pub chronic_conditions: Option<Vec<String>>,
    #[serde(default)]
    pub medications: Option<Vec<String>>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub stress_level: Option<i32>,
}

impl RiskAssessmentRequest {
    /// Check field ranges, returning the first violation
    pub fn validate(&self) -> Result<(), String> {
        if self.age <= 0 || self.age >= 120 {
            return Err("age must be greater than 0 and less than 120".to_string());
        }
        if !(self.height > 0.0) {
            return Err("height must be greater than 0".to_string());
        }
        if !(self.weight > 0.0) {
            return Err("weight must be greater than 0".to_string());
        }
        for (name, value) in [("systolic_bp", self.systolic_bp), ("diastolic_bp", self.diastolic_bp)] {
            if matches!(value, Some(v) if v <= 0) {
                return Err(format!("{} must be greater than 0", name));
            }
        }
        for (name, value) in [
            ("cholesterol", self.cholesterol),
            ("hdl", self.hdl),
            ("ldl", self.ldl),
            ("triglycerides", self.triglycerides),
            ("fasting_glucose", self.fasting_glucose),
        ] {
            if matches!(value, Some(v) if !(v >= 0.0)) {
                return Err(format!("{} must be greater than or equal to 0", name));
            }
        }
        if matches!(self.exercise_minutes_per_week, Some(v) if v < 0) {
            return Err("exercise_minutes_per_week must be greater than or equal to 0".to_string());
        }
        if matches!(self.sleep_hours, Some(v) if !(0.0..=24.0).contains(&v)) {
            return Err("sleep_hours must be between 0 and 24".to_string());
        }
        if matches!(self.stress_level, Some(v) if !(0..=10).contains(&v)) {
            return Err("stress_level must be between 0 and 10".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskFactor {
    pub factor: String,
    pub value: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRisk {
    pub risk_score: i32,
    pub risk_level: String,
    pub risk_factors: Vec<RiskFactor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessmentResponse {
    pub bmi: f64,
    pub bmi_category: String,
    pub health_age: Option<i32>,
    pub overall_risk_score: f64,
    pub risk_categories: BTreeMap<String, CategoryRisk>,
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
}

/// A stored assessment as returned by the lookup endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAssessment {
    pub assessment_id: String,
    pub saved_at: String,
    pub assessment: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_request() -> RiskAssessmentRequest {
        serde_json::from_value(json!({
            "age": 35,
            "gender": "male",
            "height": 175.0,
            "weight": 70.0
        }))
        .unwrap()
    }

    #[test]
    fn test_minimal_request_is_valid() {
        let request = base_request();
        assert!(!request.smoking);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_age_bounds() {
        let mut request = base_request();
        request.age = 0;
        assert!(request.validate().unwrap_err().contains("age"));
        request.age = 120;
        assert!(request.validate().is_err());
        request.age = 119;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_optional_ranges() {
        let mut request = base_request();
        request.sleep_hours = Some(25.0);
        assert!(request.validate().unwrap_err().contains("sleep_hours"));

        let mut request = base_request();
        request.stress_level = Some(11);
        assert!(request.validate().unwrap_err().contains("stress_level"));

        let mut request = base_request();
        request.systolic_bp = Some(0);
        assert!(request.validate().unwrap_err().contains("systolic_bp"));

        let mut request = base_request();
        request.ldl = Some(-1.0);
        assert!(request.validate().unwrap_err().contains("ldl"));
    }

    #[test]
    fn test_non_positive_height_rejected() {
        let mut request = base_request();
        request.height = 0.0;
        assert!(request.validate().unwrap_err().contains("height"));
        request.height = f64::NAN;
        assert!(request.validate().is_err());
    }
}
