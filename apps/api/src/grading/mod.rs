// Grading pipeline: reference corpora → prompt → completion → formatted report.
// All completion calls go through llm_client; nothing here talks HTTP upstream.

pub mod corpora;
pub mod formatter;
pub mod handlers;
pub mod prompts;
