// Candidate screening: stage driver, field validation, question selection,
// session storage and profile export.
// LLM calls go through llm_client via the QuestionSelector only.

pub mod driver;
pub mod export;
pub mod handlers;
pub mod messages;
pub mod profile;
pub mod prompts;
pub mod question_bank;
pub mod question_selector;
pub mod stage;
pub mod store;
pub mod validators;
