//! Scenario overrides: a small rule table that forces a specific playbook to
//! the top of the recommendation when the query matches known language.
//!
//! Rules are evaluated in order; the first pattern found in the lower-cased
//! query wins. Adding a phrase means adding a row, not touching control flow.
//!
//! Every pattern names the deal or opportunity it is about, apart from a few
//! idioms ("gone cold", "unblock") that only occur in deal talk. Bare words
//! such as "stuck" or "stalled" are left out because they also fire on
//! unrelated queries. No pattern contains an earlier one, so every row can be
//! the first match.

use crate::models::catalog::{Catalog, CatalogItem, Playbook, PlaybookCategory};

/// Title of the playbook forced by the stalled-deal override.
pub const STALLED_DEAL_TITLE: &str = "Unblock a stalled deal";

const STALLED_DEAL_DEFAULT_DESCRIPTION: &str = "A rapid intervention for opportunities that \
    have lost momentum: diagnose why the deal stalled, re-engage the buying committee with \
    tailored content, and create a clear path to a decision.";

const STALLED_DEAL_DEFAULT_INCLUDES: &[&str] = &[
    "Stakeholder and buying-committee mapping",
    "Deal blocker diagnosis",
    "Personalised re-engagement content",
    "Executive outreach sequence",
    "Sales and marketing alignment session",
];

const STALLED_DEAL_DEFAULT_KPIS: &[&str] = &[
    "Stakeholders re-engaged",
    "Meetings booked with decision makers",
    "Deal stage progression",
    "Time to close",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    StalledDeal,
}

impl Scenario {
    /// Title of the catalog item this scenario promotes.
    pub fn priority_title(&self) -> &'static str {
        match self {
            Scenario::StalledDeal => STALLED_DEAL_TITLE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScenarioRule {
    /// Lower-case substring matched against the lower-cased query.
    pub pattern: &'static str,
    pub scenario: Scenario,
}

pub const SCENARIO_RULES: &[ScenarioRule] = &[
    ScenarioRule { pattern: "stalled deal", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "stuck deal", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "blocked deal", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal stalled", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal is stalled", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal has stalled", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal stalling", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal is stalling", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal stuck", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal is stuck", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal blocked", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal is blocked", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal not progressing", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "deal is not progressing", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "stalled opportunity", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "stuck opportunity", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "opportunity is stuck", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "opportunity has stalled", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "revive a deal", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "gone cold", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "gone quiet", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "lost momentum", scenario: Scenario::StalledDeal },
    ScenarioRule { pattern: "unblock", scenario: Scenario::StalledDeal },
];

/// Returns the first scenario whose pattern occurs in `query`, if any.
pub fn detect_scenario(query: &str) -> Option<Scenario> {
    detect_with(SCENARIO_RULES, query)
}

pub fn detect_with(rules: &[ScenarioRule], query: &str) -> Option<Scenario> {
    let query = query.to_lowercase();
    rules
        .iter()
        .find(|rule| query.contains(rule.pattern))
        .map(|rule| rule.scenario)
}

/// Finds the playbook a scenario promotes.
///
/// Playbooks win over activation items. A playbook's description comes from
/// the catalog's description map first, the same way the playbooks section
/// resolves it. An activation-only match is lifted into
/// a playbook, filling description/includes/KPIs from defaults when absent. With
/// no match anywhere the record is synthesized entirely from defaults.
pub fn resolve_priority_playbook(scenario: Scenario, catalog: &Catalog) -> Playbook {
    let title = scenario.priority_title();

    if let Some(playbook) = catalog.find_playbook(title) {
        let description = catalog.playbook_description(playbook).map(str::to_string);
        let mut playbook = playbook.clone();
        playbook.item.description = description;
        return playbook;
    }

    let item = catalog
        .find_activation_item(title)
        .cloned()
        .unwrap_or_else(|| CatalogItem {
            title: title.to_string(),
            ..Default::default()
        });

    let description = catalog
        .description_for(title, item.description.as_deref())
        .unwrap_or(STALLED_DEAL_DEFAULT_DESCRIPTION)
        .to_string();

    Playbook {
        item: CatalogItem {
            description: Some(description),
            ..item
        },
        category: PlaybookCategory::Custom,
        stage: "Activation".to_string(),
        subtitle: None,
        includes: to_owned_list(STALLED_DEAL_DEFAULT_INCLUDES),
        kpis: to_owned_list(STALLED_DEAL_DEFAULT_KPIS),
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activation(title: &str, credits: &str) -> CatalogItem {
        CatalogItem {
            title: title.to_string(),
            tactical_credits: credits.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_stuck_and_not_progressing_is_detected() {
        assert_eq!(
            detect_scenario("My deal is stuck and not progressing"),
            Some(Scenario::StalledDeal)
        );
    }

    #[test]
    fn test_unrelated_query_is_not_detected() {
        assert_eq!(detect_scenario("Tell me about training options"), None);
        assert_eq!(detect_scenario(""), None);
    }

    #[test]
    fn test_stuck_outside_deal_context_is_not_detected() {
        assert_eq!(detect_scenario("I'm stuck choosing a training option"), None);
        assert_eq!(detect_scenario("Our webinar series stalled last quarter"), None);
        assert_eq!(detect_scenario("Content production is not progressing"), None);
    }

    #[test]
    fn test_no_rule_is_shadowed_by_an_earlier_one() {
        for (i, later) in SCENARIO_RULES.iter().enumerate() {
            for earlier in &SCENARIO_RULES[..i] {
                assert!(
                    !later.pattern.contains(earlier.pattern),
                    "{:?} can never match first because of {:?}",
                    later.pattern,
                    earlier.pattern
                );
            }
        }
    }

    #[test]
    fn test_every_rule_pattern_triggers_case_insensitively() {
        for rule in SCENARIO_RULES {
            let query = format!("Help! Our {} situation", rule.pattern.to_uppercase());
            assert_eq!(
                detect_scenario(&query),
                Some(rule.scenario),
                "pattern {:?} did not trigger",
                rule.pattern
            );
        }
    }

    #[test]
    fn test_rules_are_evaluated_in_order() {
        let rules = [
            ScenarioRule { pattern: "zzz", scenario: Scenario::StalledDeal },
            ScenarioRule { pattern: "deal", scenario: Scenario::StalledDeal },
        ];
        assert_eq!(detect_with(&rules, "big deal"), Some(Scenario::StalledDeal));
        assert_eq!(detect_with(&[], "stalled deal"), None);
    }

    #[test]
    fn test_playbook_takes_precedence_over_activation_item() {
        let playbook = Playbook {
            item: CatalogItem {
                title: STALLED_DEAL_TITLE.to_string(),
                tactical_credits: "10".to_string(),
                description: Some("Playbook description".to_string()),
                ..Default::default()
            },
            stage: "Acceleration".to_string(),
            includes: vec!["Custom include".to_string()],
            kpis: vec!["Custom KPI".to_string()],
            ..Default::default()
        };
        let catalog = Catalog {
            playbooks: vec![playbook.clone()],
            activation_items: vec![activation(STALLED_DEAL_TITLE, "3")],
            ..Default::default()
        };

        let resolved = resolve_priority_playbook(Scenario::StalledDeal, &catalog);
        assert_eq!(resolved, playbook);
    }

    #[test]
    fn test_playbook_description_comes_from_description_map() {
        let playbook = Playbook {
            item: CatalogItem {
                title: STALLED_DEAL_TITLE.to_string(),
                ..Default::default()
            },
            includes: vec!["Custom include".to_string()],
            ..Default::default()
        };
        let mut catalog = Catalog {
            playbooks: vec![playbook],
            ..Default::default()
        };
        catalog
            .descriptions
            .insert(STALLED_DEAL_TITLE.to_string(), "Map description".to_string());

        let resolved = resolve_priority_playbook(Scenario::StalledDeal, &catalog);
        assert_eq!(resolved.item.description.as_deref(), Some("Map description"));
        assert_eq!(resolved.includes, vec!["Custom include".to_string()]);
    }

    #[test]
    fn test_activation_item_is_lifted_with_defaults() {
        let catalog = Catalog {
            activation_items: vec![activation(STALLED_DEAL_TITLE, "3")],
            ..Default::default()
        };

        let resolved = resolve_priority_playbook(Scenario::StalledDeal, &catalog);
        assert_eq!(resolved.item.tactical_credits, "3");
        assert_eq!(
            resolved.item.description.as_deref(),
            Some(STALLED_DEAL_DEFAULT_DESCRIPTION)
        );
        assert_eq!(resolved.includes.len(), STALLED_DEAL_DEFAULT_INCLUDES.len());
        assert_eq!(resolved.kpis.len(), STALLED_DEAL_DEFAULT_KPIS.len());
    }

    #[test]
    fn test_activation_item_keeps_supplied_description() {
        let mut catalog = Catalog {
            activation_items: vec![activation(STALLED_DEAL_TITLE, "3")],
            ..Default::default()
        };
        catalog
            .descriptions
            .insert(STALLED_DEAL_TITLE.to_string(), "From descriptions".to_string());

        let resolved = resolve_priority_playbook(Scenario::StalledDeal, &catalog);
        assert_eq!(resolved.item.description.as_deref(), Some("From descriptions"));
    }

    #[test]
    fn test_missing_item_is_fully_synthesized() {
        let resolved = resolve_priority_playbook(Scenario::StalledDeal, &Catalog::default());
        assert_eq!(resolved.title(), STALLED_DEAL_TITLE);
        assert!(resolved.item.tactical_credits.is_empty());
        assert!(!resolved.includes.is_empty());
    }
}
