//! Catalog Formatter: renders request catalog data into the markdown-like
//! document embedded in the system prompt.
//!
//! Pure and deterministic: identical inputs produce byte-identical output.
//! Sections are rendered independently and concatenated in a fixed order; an
//! empty collection contributes nothing, not even a heading.

use crate::models::catalog::{Catalog, CatalogItem, Playbook, NO_DESCRIPTION};
use crate::recommendation::scenario::STALLED_DEAL_TITLE;

/// Fixed description taxonomy, rendered in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionGroup {
    Playbooks,
    Activation,
    Insights,
    Content,
    Training,
    Other,
}

impl DescriptionGroup {
    const ORDER: [DescriptionGroup; 6] = [
        DescriptionGroup::Playbooks,
        DescriptionGroup::Activation,
        DescriptionGroup::Insights,
        DescriptionGroup::Content,
        DescriptionGroup::Training,
        DescriptionGroup::Other,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            DescriptionGroup::Playbooks => "Playbooks",
            DescriptionGroup::Activation => "Activation",
            DescriptionGroup::Insights => "Insights",
            DescriptionGroup::Content => "Content",
            DescriptionGroup::Training => "Training",
            DescriptionGroup::Other => "Other",
        }
    }
}

const INSIGHT_KEYWORDS: &[&str] = &["insight", "intelligence", "intent", "research", "analysis", "audit", "data"];
const CONTENT_KEYWORDS: &[&str] = &["content", "manifesto", "asset", "creative", "video", "copy", "ebook", "landing page"];
const TRAINING_KEYWORDS: &[&str] = &["training", "workshop", "enablement", "coaching", "masterclass"];

/// Renders every section in order. `priority` is the playbook forced by an
/// active scenario override, if any.
pub fn format_catalog(catalog: &Catalog, expanded_items: &[String], priority: Option<&Playbook>) -> String {
    let sections = [
        format_expanded_items(catalog, expanded_items),
        priority.map(format_priority_block).unwrap_or_default(),
        format_deliverables(catalog),
        format_playbooks(catalog),
        format_activation_items(catalog),
        format_descriptions(catalog),
    ];

    sections
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Items the user currently has open in the UI.
pub fn format_expanded_items(catalog: &Catalog, expanded_items: &[String]) -> String {
    if expanded_items.is_empty() {
        return String::new();
    }

    let mut out = String::from("## CURRENTLY EXPANDED ITEMS\n");
    out.push_str("The user is looking at these items right now. Weigh them heavily:\n");
    for title in expanded_items {
        let own = own_description(catalog, title);
        let description = catalog.description_for(title, own).unwrap_or(NO_DESCRIPTION);
        out.push_str(&format!("- {title}: {description}\n"));
    }
    out
}

/// The forced recommendation for an active scenario.
pub fn format_priority_block(playbook: &Playbook) -> String {
    let mut out = String::from("## PRIORITY PLAYBOOK FOR THIS QUERY\n");
    out.push_str(&format!(
        "The user's query describes a stalled deal. \"{}\" MUST be the primary recommendation.\n",
        playbook.identifier()
    ));
    out.push_str(&format!("- Title: {}\n", playbook.identifier()));
    out.push_str(&format!("- Credits: {}\n", playbook.item.credit_summary()));
    out.push_str(&format!(
        "- Description: {}\n",
        non_blank(playbook.item.description.as_deref()).unwrap_or(NO_DESCRIPTION)
    ));
    push_list(&mut out, "- Includes:", &playbook.includes);
    push_list(&mut out, "- KPIs:", &playbook.kpis);
    out
}

pub fn format_deliverables(catalog: &Catalog) -> String {
    if catalog.deliverables.is_empty() {
        return String::new();
    }

    let mut out = String::from("## AVAILABLE DELIVERABLES BY CATEGORY\n");
    for (category, items) in &catalog.deliverables {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("### {category}\n"));
        for item in items {
            push_item_line(&mut out, catalog, item);
        }
    }
    out
}

/// Playbooks grouped by stage, stages in first-seen order.
pub fn format_playbooks(catalog: &Catalog) -> String {
    if catalog.playbooks.is_empty() {
        return String::new();
    }

    let mut stages: Vec<&str> = Vec::new();
    for playbook in &catalog.playbooks {
        let stage = stage_name(playbook);
        if !stages.contains(&stage) {
            stages.push(stage);
        }
    }

    let mut out = String::from("## STRATEGIC PLAYBOOKS BY STAGE\n");
    for stage in stages {
        out.push_str(&format!("### Stage: {stage}\n"));
        for playbook in catalog.playbooks.iter().filter(|p| stage_name(p) == stage) {
            let description = catalog.playbook_description(playbook).unwrap_or(NO_DESCRIPTION);
            out.push_str(&format!(
                "- **{}** [{}] ({})\n",
                playbook.identifier(),
                playbook.category.label(),
                playbook.item.credit_summary()
            ));
            out.push_str(&format!("  Description: {description}\n"));
            if !playbook.includes.is_empty() {
                out.push_str(&format!("  Includes: {}\n", playbook.includes.join("; ")));
            }
            if !playbook.kpis.is_empty() {
                out.push_str(&format!("  KPIs: {}\n", playbook.kpis.join("; ")));
            }
        }
    }
    out
}

/// Activation items, with the stalled-deal item always listed first.
pub fn format_activation_items(catalog: &Catalog) -> String {
    if catalog.activation_items.is_empty() {
        return String::new();
    }

    let (hoisted, rest): (Vec<&CatalogItem>, Vec<&CatalogItem>) = catalog
        .activation_items
        .iter()
        .partition(|i| i.title == STALLED_DEAL_TITLE);

    let mut out = String::from("## ACTIVATION ITEMS\n");
    for item in hoisted.into_iter().chain(rest) {
        push_item_line(&mut out, catalog, item);
    }
    out
}

/// Free-text descriptions grouped into the fixed taxonomy.
pub fn format_descriptions(catalog: &Catalog) -> String {
    if catalog.descriptions.is_empty() {
        return String::new();
    }

    let mut out = String::from("## DETAILED DESCRIPTIONS\n");
    for group in DescriptionGroup::ORDER {
        let entries: Vec<(&String, &String)> = catalog
            .descriptions
            .iter()
            .filter(|(title, _)| classify_description(catalog, title) == group)
            .collect();
        if entries.is_empty() {
            continue;
        }
        out.push_str(&format!("### {}\n", group.heading()));
        for (title, description) in entries {
            let description = non_blank(Some(description.as_str())).unwrap_or(NO_DESCRIPTION);
            out.push_str(&format!("- {title}: {description}\n"));
        }
    }
    out
}

/// Membership in the playbook or activation sets wins; otherwise the title is
/// matched against keyword lists.
pub fn classify_description(catalog: &Catalog, title: &str) -> DescriptionGroup {
    if catalog.find_playbook(title).is_some() {
        return DescriptionGroup::Playbooks;
    }
    if catalog.find_activation_item(title).is_some() {
        return DescriptionGroup::Activation;
    }

    let lower = title.to_lowercase();
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if lower.contains("playbook") {
        DescriptionGroup::Playbooks
    } else if lower.contains("activation") || lower.contains("unblock") {
        DescriptionGroup::Activation
    } else if has_any(INSIGHT_KEYWORDS) {
        DescriptionGroup::Insights
    } else if has_any(CONTENT_KEYWORDS) {
        DescriptionGroup::Content
    } else if has_any(TRAINING_KEYWORDS) {
        DescriptionGroup::Training
    } else {
        DescriptionGroup::Other
    }
}

fn push_item_line(out: &mut String, catalog: &Catalog, item: &CatalogItem) {
    let description = catalog
        .description_for(&item.title, item.description.as_deref())
        .unwrap_or(NO_DESCRIPTION);
    out.push_str(&format!(
        "- {} ({}): {}\n",
        item.title,
        item.credit_summary(),
        description
    ));
}

fn push_list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(label);
    out.push('\n');
    for entry in items {
        out.push_str(&format!("  - {entry}\n"));
    }
}

fn own_description<'a>(catalog: &'a Catalog, title: &str) -> Option<&'a str> {
    catalog
        .find_playbook(title)
        .and_then(|p| p.item.description.as_deref())
        .or_else(|| {
            catalog
                .find_activation_item(title)
                .and_then(|i| i.description.as_deref())
        })
        .or_else(|| {
            catalog
                .find_deliverable(title)
                .and_then(|i| i.description.as_deref())
        })
}

fn stage_name(playbook: &Playbook) -> &str {
    let stage = playbook.stage.trim();
    if stage.is_empty() {
        "Unstaged"
    } else {
        stage
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
