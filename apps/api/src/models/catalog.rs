//! Request-scoped catalog types.
//!
//! The browser posts its whole catalog with every recommendation request. Decoding
//! is lenient throughout: missing collections, `null`s and numeric credits all
//! collapse to defaults instead of failing the request.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder rendered wherever an item has no description.
pub const NO_DESCRIPTION: &str = "No description available";

/// Pricing tier the user is browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Tactical,
    Impact,
    Enterprise,
}

impl Tier {
    /// Case-insensitive; also accepts labels such as "Impact tier".
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        if value.contains("tactical") {
            Some(Tier::Tactical)
        } else if value.contains("impact") {
            Some(Tier::Impact)
        } else if value.contains("enterprise") {
            Some(Tier::Enterprise)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Tactical => "Tactical",
            Tier::Impact => "Impact",
            Tier::Enterprise => "Enterprise",
        }
    }
}

/// One purchasable deliverable. Credit fields are kept as the strings the
/// client sent, since some tiers carry free text such as "POA".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub tactical_credits: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub impact_credits: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub enterprise_credits: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub custom_price: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CatalogItem {
    pub fn credits_for(&self, tier: Tier) -> &str {
        match tier {
            Tier::Tactical => &self.tactical_credits,
            Tier::Impact => &self.impact_credits,
            Tier::Enterprise => &self.enterprise_credits,
        }
    }

    /// Human-readable credit line, e.g. "Tactical 4 / Impact 8 / Enterprise 12 credits".
    pub fn credit_summary(&self) -> String {
        let tiers: Vec<String> = [Tier::Tactical, Tier::Impact, Tier::Enterprise]
            .into_iter()
            .filter(|t| !self.credits_for(*t).trim().is_empty())
            .map(|t| format!("{} {}", t.label(), self.credits_for(t).trim()))
            .collect();

        let mut summary = if tiers.is_empty() {
            "credits not listed".to_string()
        } else {
            format!("{} credits", tiers.join(" / "))
        };
        if !self.custom_price.trim().is_empty() {
            summary.push_str(&format!(", custom price {}", self.custom_price.trim()));
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PlaybookCategory {
    #[serde(rename = "net-new")]
    NetNew,
    #[serde(rename = "customer-growth")]
    CustomerGrowth,
    #[default]
    #[serde(rename = "custom")]
    Custom,
}

impl PlaybookCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PlaybookCategory::NetNew => "Net-new",
            PlaybookCategory::CustomerGrowth => "Customer growth",
            PlaybookCategory::Custom => "Custom",
        }
    }
}

impl<'de> Deserialize<'de> for PlaybookCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(match raw.trim().to_lowercase().as_str() {
            "net-new" | "netnew" | "net_new" => PlaybookCategory::NetNew,
            "customer-growth" | "customergrowth" | "customer_growth" => {
                PlaybookCategory::CustomerGrowth
            }
            _ => PlaybookCategory::Custom,
        })
    }
}

/// A bundled strategic offering. `identifier()` is unique across the playbook set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playbook {
    #[serde(flatten)]
    pub item: CatalogItem,
    #[serde(default)]
    pub category: PlaybookCategory,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub includes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kpis: Vec<String>,
}

impl Playbook {
    pub fn title(&self) -> &str {
        &self.item.title
    }

    /// Title combined with the subtitle when one is present.
    pub fn identifier(&self) -> String {
        match self.subtitle.as_deref().map(str::trim) {
            Some(sub) if !sub.is_empty() => format!("{}: {}", self.item.title, sub),
            _ => self.item.title.clone(),
        }
    }
}

/// Immutable snapshot of everything the client sent about its catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub deliverables: BTreeMap<String, Vec<CatalogItem>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub playbooks: Vec<Playbook>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activation_items: Vec<CatalogItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub descriptions: BTreeMap<String, String>,
}

impl Catalog {
    pub fn deliverable_count(&self) -> usize {
        self.deliverables.values().map(Vec::len).sum()
    }

    /// Resolves a description: explicit map entry first, then the item's own
    /// text. Blank values count as missing.
    pub fn description_for<'a>(&'a self, title: &str, own: Option<&'a str>) -> Option<&'a str> {
        self.descriptions
            .get(title)
            .map(String::as_str)
            .filter(|d| !d.trim().is_empty())
            .or_else(|| own.filter(|d| !d.trim().is_empty()))
    }

    /// Map entry under the playbook's identifier, then its own description,
    /// then a map entry under the bare title.
    pub fn playbook_description<'a>(&'a self, playbook: &'a Playbook) -> Option<&'a str> {
        self.description_for(&playbook.identifier(), playbook.item.description.as_deref())
            .or_else(|| self.description_for(playbook.title(), None))
    }

    pub fn find_playbook(&self, title: &str) -> Option<&Playbook> {
        self.playbooks
            .iter()
            .find(|p| p.title() == title || p.identifier() == title)
    }

    pub fn find_activation_item(&self, title: &str) -> Option<&CatalogItem> {
        self.activation_items.iter().find(|i| i.title == title)
    }

    /// Any deliverable, across categories, with this title.
    pub fn find_deliverable(&self, title: &str) -> Option<&CatalogItem> {
        self.deliverables
            .values()
            .flat_map(|items| items.iter())
            .find(|i| i.title == title)
    }
}

/// Wire body of both recommendation endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub query: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected_tier: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expanded_items: Vec<String>,
    #[serde(flatten)]
    pub catalog: Catalog,
}

/// Treats an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `"8"`, `8`, `8.5` or `null` and yields the string form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credits_accept_numbers_strings_and_null() {
        let item: CatalogItem = serde_json::from_value(json!({
            "title": "Account Manifesto",
            "tacticalCredits": 8,
            "impactCredits": "12",
            "enterpriseCredits": null
        }))
        .unwrap();

        assert_eq!(item.tactical_credits, "8");
        assert_eq!(item.impact_credits, "12");
        assert_eq!(item.enterprise_credits, "");
        assert_eq!(item.custom_price, "");
        assert!(item.description.is_none());
    }

    #[test]
    fn test_credit_summary_skips_blank_tiers() {
        let item = CatalogItem {
            title: "Intent data".into(),
            tactical_credits: "4".into(),
            enterprise_credits: "10".into(),
            ..Default::default()
        };
        assert_eq!(item.credit_summary(), "Tactical 4 / Enterprise 10 credits");

        let empty = CatalogItem::default();
        assert_eq!(empty.credit_summary(), "credits not listed");
    }

    #[test]
    fn test_unknown_playbook_category_decodes_as_custom() {
        let pb: Playbook = serde_json::from_value(json!({
            "title": "X",
            "category": "something-else",
            "stage": "Awareness"
        }))
        .unwrap();
        assert_eq!(pb.category, PlaybookCategory::Custom);

        let pb: Playbook =
            serde_json::from_value(json!({"title": "Y", "category": "customer-growth"})).unwrap();
        assert_eq!(pb.category, PlaybookCategory::CustomerGrowth);
    }

    #[test]
    fn test_playbook_identifier_includes_subtitle() {
        let pb: Playbook = serde_json::from_value(json!({
            "title": "Pipeline velocity",
            "subtitle": "Mid-funnel",
            "tacticalCredits": "8",
            "includes": null
        }))
        .unwrap();
        assert_eq!(pb.identifier(), "Pipeline velocity: Mid-funnel");
        assert_eq!(pb.item.tactical_credits, "8");
        assert!(pb.includes.is_empty());
    }

    #[test]
    fn test_request_optional_collections_default_to_empty() {
        let req: RecommendationRequest = serde_json::from_value(json!({
            "query": "help",
            "deliverables": {},
            "selectedTier": "impact",
            "playbooks": null
        }))
        .unwrap();

        assert_eq!(req.query, "help");
        assert!(req.catalog.playbooks.is_empty());
        assert!(req.catalog.activation_items.is_empty());
        assert!(req.catalog.descriptions.is_empty());
        assert!(req.expanded_items.is_empty());
    }

    #[test]
    fn test_description_lookup_prefers_map_and_tolerates_misses() {
        let mut catalog = Catalog::default();
        catalog
            .descriptions
            .insert("Known".into(), "From the map".into());
        catalog.descriptions.insert("Blank".into(), "  ".into());

        assert_eq!(
            catalog.description_for("Known", Some("own")),
            Some("From the map")
        );
        assert_eq!(catalog.description_for("Blank", Some("own")), Some("own"));
        assert_eq!(catalog.description_for("Missing", None), None);
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!(Tier::parse("Impact"), Some(Tier::Impact));
        assert_eq!(Tier::parse("enterprise tier"), Some(Tier::Enterprise));
        assert_eq!(Tier::parse(""), None);
    }
}
