// Health risk scoring: BMI, cardiovascular and metabolic risk, health age

use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::models::risk::{CategoryRisk, RiskAssessmentRequest, RiskAssessmentResponse, RiskFactor};
use crate::utils::dedup_preserving_order;

const CARDIOVASCULAR_WEIGHT: f64 = 0.4;
const METABOLIC_WEIGHT: f64 = 0.3;

/// Weekly exercise target in minutes
const EXERCISE_TARGET_MINUTES: i32 = 150;

/// BMI from weight in kg and height in cm, rounded to one decimal
pub fn calculate_bmi(weight: f64, height: f64) -> f64 {
    let height_m = height / 100.0;
    round1(weight / (height_m * height_m))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 25.0 {
        "Normal weight"
    } else if bmi < 30.0 {
        "Overweight"
    } else {
        "Obesity"
    }
}

fn factor(name: &str, value: f64, recommendation: &str) -> RiskFactor {
    RiskFactor {
        factor: name.to_string(),
        value,
        recommendation: recommendation.to_string(),
    }
}

pub fn cardiovascular_risk(data: &RiskAssessmentRequest) -> CategoryRisk {
    let mut score = 0;
    let mut factors = Vec::new();

    if data.age > 55 {
        score += 2;
        factors.push(factor(
            "Age",
            data.age as f64,
            "Age is a non-modifiable risk factor. Focus on other health parameters.",
        ));
    }

    if let Some(systolic) = data.systolic_bp.filter(|bp| *bp > 140) {
        score += 3;
        factors.push(factor(
            "High Blood Pressure",
            systolic as f64,
            "Consider dietary changes and regular monitoring.",
        ));
    }

    if let Some(cholesterol) = data.cholesterol.filter(|c| *c > 200.0) {
        score += 2;
        factors.push(factor(
            "High Total Cholesterol",
            cholesterol,
            "Limit saturated fats and increase physical activity.",
        ));
    }

    if data.smoking {
        score += 4;
        factors.push(factor(
            "Smoking",
            1.0,
            "Quitting smoking significantly reduces cardiovascular risk.",
        ));
    }

    let level = if score > 5 {
        "High"
    } else if score > 2 {
        "Moderate"
    } else {
        "Low"
    };

    CategoryRisk {
        risk_score: score,
        risk_level: level.to_string(),
        risk_factors: factors,
    }
}

pub fn metabolic_risk(data: &RiskAssessmentRequest) -> CategoryRisk {
    let mut score = 0;
    let mut factors = Vec::new();

    let bmi = calculate_bmi(data.weight, data.height);
    if bmi > 30.0 {
        score += 3;
        factors.push(factor(
            "Obesity",
            bmi,
            "Focus on weight management through diet and exercise.",
        ));
    } else if bmi > 25.0 {
        score += 1;
        factors.push(factor(
            "Overweight",
            bmi,
            "Modest weight loss can improve metabolic health.",
        ));
    }

    if let Some(glucose) = data.fasting_glucose.filter(|g| *g > 100.0) {
        score += 2;
        factors.push(factor(
            "Elevated Fasting Glucose",
            glucose,
            "Monitor blood sugar and consider dietary adjustments.",
        ));
    }

    let level = if score > 4 {
        "High"
    } else if score > 1 {
        "Moderate"
    } else {
        "Low"
    };

    CategoryRisk {
        risk_score: score,
        risk_level: level.to_string(),
        risk_factors: factors,
    }
}

/// Weighted mean of category scores scaled to 0..=100
pub fn overall_score(cardiovascular: &CategoryRisk, metabolic: &CategoryRisk) -> f64 {
    let weights = CARDIOVASCULAR_WEIGHT + METABOLIC_WEIGHT;
    let weighted = cardiovascular.risk_score as f64 * CARDIOVASCULAR_WEIGHT
        + metabolic.risk_score as f64 * METABOLIC_WEIGHT;
    (weighted / weights * 10.0).clamp(0.0, 100.0)
}

/// Simplified biological age estimate
pub fn health_age(data: &RiskAssessmentRequest, bmi: f64) -> i32 {
    let mut age = data.age;
    if bmi > 30.0 {
        age += 5;
    }
    if data.smoking {
        age += 7;
    }
    if data
        .exercise_minutes_per_week
        .is_some_and(|m| m > EXERCISE_TARGET_MINUTES)
    {
        age -= 3;
    }
    age
}

/// Run the full assessment for a validated request
pub fn assess(data: &RiskAssessmentRequest) -> RiskAssessmentResponse {
    let bmi = calculate_bmi(data.weight, data.height);
    let cardiovascular = cardiovascular_risk(data);
    let metabolic = metabolic_risk(data);
    let overall = overall_score(&cardiovascular, &metabolic);

    let mut recommendations: Vec<String> = cardiovascular
        .risk_factors
        .iter()
        .chain(metabolic.risk_factors.iter())
        .map(|f| f.recommendation.clone())
        .collect();

    if data
        .exercise_minutes_per_week
        .map_or(true, |m| m < EXERCISE_TARGET_MINUTES)
    {
        recommendations
            .push("Aim for at least 150 minutes of moderate exercise per week.".to_string());
    }

    if recommendations.is_empty() {
        recommendations.push("Maintain your current healthy lifestyle.".to_string());
        recommendations.push("Regular check-ups are recommended.".to_string());
    }

    let next_steps = vec![
        "Consult with a healthcare provider to discuss these results".to_string(),
        "Set up regular health check-ups".to_string(),
        "Track your progress using our health tracker".to_string(),
    ];

    let mut risk_categories = BTreeMap::new();
    risk_categories.insert("cardiovascular".to_string(), cardiovascular);
    risk_categories.insert("metabolic".to_string(), metabolic);

    RiskAssessmentResponse {
        bmi,
        bmi_category: bmi_category(bmi).to_string(),
        health_age: Some(health_age(data, bmi)),
        overall_risk_score: overall,
        risk_categories,
        recommendations: dedup_preserving_order(recommendations),
        next_steps,
    }
}

/// Factors the assessment understands, with the inputs each one needs
pub fn assessable_factors() -> Value {
    json!({
        "risk_factors": [
            {
                "id": "bmi",
                "name": "Body Mass Index",
                "description": "A measure of body fat based on height and weight",
                "input_parameters": ["height", "weight"]
            },
            {
                "id": "blood_pressure",
                "name": "Blood Pressure",
                "description": "The pressure of blood against the walls of arteries",
                "input_parameters": ["systolic_bp", "diastolic_bp"]
            },
            {
                "id": "cholesterol",
                "name": "Cholesterol Levels",
                "description": "Levels of lipids in the blood",
                "input_parameters": ["cholesterol", "hdl", "ldl", "triglycerides"]
            }
        ]
    })
}

/// Tiered advice for a single risk factor
pub fn factor_recommendations(risk_factor: &str) -> Option<Value> {
    match risk_factor {
        "bmi" => Some(json!({
            "underweight": [
                "Consult with a nutritionist for a healthy weight gain plan",
                "Focus on nutrient-dense foods",
                "Include strength training in your exercise routine"
            ],
            "normal": [
                "Maintain your current healthy habits",
                "Regular exercise and balanced diet"
            ],
            "overweight": [
                "Aim for 150-300 minutes of moderate exercise per week",
                "Focus on portion control",
                "Increase intake of fruits, vegetables and whole grains"
            ],
            "obesity": [
                "Consult with healthcare provider for a personalized weight management plan",
                "Set realistic weight loss goals (1-2 pounds per week)",
                "Consider keeping a food and activity journal"
            ]
        })),
        "blood_pressure" => Some(json!({
            "normal": [
                "Maintain healthy lifestyle habits",
                "Check blood pressure annually"
            ],
            "elevated": [
                "Reduce sodium intake",
                "Regular physical activity",
                "Monitor blood pressure monthly"
            ],
            "high": [
                "Consult with a healthcare provider",
                "DASH diet (Dietary Approaches to Stop Hypertension)",
                "Limit alcohol consumption",
                "Stress management techniques"
            ]
        })),
        _ => None,
    }
}
