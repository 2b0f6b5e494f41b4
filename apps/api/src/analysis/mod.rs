pub mod dispatcher;
pub mod feedback;
pub mod handlers;
pub mod json_recovery;
pub mod loose_fields;
pub mod normalizer;
pub mod prompts;
pub mod text_extract;
