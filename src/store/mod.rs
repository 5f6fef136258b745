// In-process state shared by the route handlers

pub mod assessments;
pub mod chat;
pub mod papers;

pub use assessments::AssessmentStore;
pub use chat::ChatStore;
pub use papers::PaperStore;
