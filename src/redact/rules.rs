//! Pattern rules for credentials that may show up in subprocess output
//!
//! ORDER MATTERS: the Hugging Face pattern must come before the generic
//! assignment pattern so a bare `hf_...` token gets its specific marker.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Clone)]
pub struct RedactionRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub replacement: &'static str,
}

pub static DEFAULT_RULES: Lazy<Vec<RedactionRule>> = Lazy::new(|| {
    vec![
        RedactionRule {
            name: "huggingface_token",
            pattern: Regex::new(r"\bhf_[A-Za-z0-9]{30,}\b").expect("valid regex"),
            replacement: "[HF_TOKEN_REDACTED]",
        },
        RedactionRule {
            name: "token_assignment",
            pattern: Regex::new(
                r#"(?i)\b((?:hf|civitai)?_?(?:api_)?token)(\s*[:=]\s*)['"]?[A-Za-z0-9_\-]{16,}['"]?"#,
            )
            .expect("valid regex"),
            replacement: "${1}${2}[SECRET_REDACTED]",
        },
    ]
});
