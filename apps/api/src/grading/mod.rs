pub mod grader;
pub mod handlers;
pub mod parser;
pub mod prompts;
pub mod summary;
