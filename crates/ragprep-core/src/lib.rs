//! Configuration loading and sensitive-text redaction shared by all ragprep crates.

pub mod config;
pub mod redact;

pub use config::Config;
pub use redact::RedactionFilter;
