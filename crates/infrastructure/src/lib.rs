//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_submission_sink;
mod in_memory_form_repository;
mod json_file_form_repository;

pub use console_submission_sink::ConsoleSubmissionSink;
pub use in_memory_form_repository::InMemoryFormRepository;
pub use json_file_form_repository::JsonFileFormRepository;
