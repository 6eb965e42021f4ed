//! Secret redaction for subprocess output and diagnostics

pub mod redactor;
pub mod rules;

pub use redactor::Redactor;
