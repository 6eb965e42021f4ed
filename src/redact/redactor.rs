//! Redactor implementation

use crate::domain::ResolvedConfig;
use crate::redact::rules::{RedactionRule, DEFAULT_RULES};
use std::collections::BTreeMap;

const LITERAL_REPLACEMENT: &str = "[SECRET_REDACTED]";

/// Scrubs credentials out of text before it reaches the terminal or a log.
///
/// Known secret values are replaced verbatim first, then the pattern rules run
/// over what is left.
pub struct Redactor {
    literals: Vec<String>,
    rules: Vec<RedactionRule>,
}

pub struct RedactionOutcome {
    pub content: String,
    pub counts: BTreeMap<String, usize>,
}

impl Redactor {
    pub fn new<I, S>(known_secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut literals: Vec<String> = known_secrets
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        // Longest first so a secret containing another is replaced whole.
        literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        literals.dedup();
        Self { literals, rules: DEFAULT_RULES.clone() }
    }

    pub fn for_config(config: &ResolvedConfig) -> Self {
        Self::new([
            config.tokens.hf_token.expose(),
            config.tokens.civitai_api_token.expose(),
        ])
    }

    pub fn redact(&self, content: &str) -> RedactionOutcome {
        let mut counts = BTreeMap::new();
        let mut text = content.to_string();

        let literal_hits: usize = self
            .literals
            .iter()
            .map(|secret| {
                let hits = text.matches(secret.as_str()).count();
                if hits > 0 {
                    text = text.replace(secret.as_str(), LITERAL_REPLACEMENT);
                }
                hits
            })
            .sum();
        if literal_hits > 0 {
            counts.insert("known_secret".to_string(), literal_hits);
        }

        for rule in &self.rules {
            let hits = rule.pattern.find_iter(&text).count();
            if hits > 0 {
                text = rule.pattern.replace_all(&text, rule.replacement).into_owned();
                *counts.entry(rule.name.to_string()).or_insert(0) += hits;
            }
        }

        RedactionOutcome { content: text, counts }
    }

    /// Scrubbed text only. Hit counts go to the debug log.
    pub fn scrub(&self, content: &str) -> String {
        let outcome = self.redact(content);
        for (rule, hits) in &outcome.counts {
            tracing::debug!("Redacted {} match(es) of {}", hits, rule);
        }
        outcome.content
    }
}
