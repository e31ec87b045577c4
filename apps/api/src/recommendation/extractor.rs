//! Playbook extraction: turns the model's free-text markdown back into a
//! structured list.
//!
//! Pattern matching on prose is brittle: if the model drifts from the requested
//! format the extractor silently finds nothing. Zero matches is a valid, empty
//! result, never an error. The `PlaybookExtractor` trait keeps the heuristic
//! swappable (e.g. for a provider's structured-output mode).

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::recommendation::prompts::PLAYBOOK_ICONS;

/// Known misspellings the model produces in titles, corrected before categorising.
const TITLE_CORRECTIONS: &[(&str, &str)] = &[
    ("Account Mannifesto", "Account Manifesto"),
    ("Accelaration", "Acceleration"),
];

/// One recommended playbook as parsed from the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedPlaybook {
    pub title: String,
    pub credits: String,
    pub category: String,
}

pub trait PlaybookExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<RecommendedPlaybook>;
}

/// Matches `**<icon> Title (N credits)**` segments. The credit word is matched
/// in any case and `N` may carry a decimal part.
pub struct MarkdownPlaybookExtractor {
    pattern: Regex,
}

impl MarkdownPlaybookExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        let icons = PLAYBOOK_ICONS
            .iter()
            .map(|icon| regex::escape(icon))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(
            r"\*\*\s*(?:{icons})\x{{FE0F}}?\s*([^*\n]+?)\s*\((\d+(?:\.\d+)?)\s*(?i:credits?)\)\s*\*\*"
        ))?;

        Ok(Self { pattern })
    }
}

impl PlaybookExtractor for MarkdownPlaybookExtractor {
    fn extract(&self, text: &str) -> Vec<RecommendedPlaybook> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let title = correct_title(caps.get(1)?.as_str().trim());
                let credits = caps.get(2)?.as_str().to_string();
                let category = categorize(&title).to_string();
                Some(RecommendedPlaybook {
                    title,
                    credits,
                    category,
                })
            })
            .collect()
    }
}

fn correct_title(title: &str) -> String {
    TITLE_CORRECTIONS
        .iter()
        .fold(title.to_string(), |acc, (wrong, right)| acc.replace(wrong, right))
}

/// Keyword heuristic on the title; first matching rule wins.
pub fn categorize(title: &str) -> &'static str {
    let lower = title.to_lowercase();
    if lower.contains("account manifesto") {
        "Personalised content and creative asset"
    } else if lower.contains("marketing") || lower.contains("awareness") {
        "Marketing/Awareness"
    } else if lower.contains("pipeline") || lower.contains("velocity") {
        "Pipeline acceleration"
    } else if lower.contains("stalled") || lower.contains("deal") {
        "Deal acceleration"
    } else {
        ""
    }
}
