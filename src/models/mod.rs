// Data models for API formats

pub mod chat;
pub mod content;
pub mod openai;
pub mod papers;
pub mod risk;
pub mod search;
pub mod symptom;
