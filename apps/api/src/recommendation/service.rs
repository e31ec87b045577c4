//! Recommendation pipeline: one request, one linear pass, no retries.
//!
//! Flow: credential gate → scenario detection → catalog formatting →
//!       prompt assembly → single provider call → playbook extraction.
//!
//! `Mode::Debug` runs the same preparation but stops before the provider and
//! reports what would have been sent instead.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, CompletionProvider, Usage};
use crate::models::catalog::{Playbook, RecommendationRequest, Tier};
use crate::recommendation::extractor::{PlaybookExtractor, RecommendedPlaybook};
use crate::recommendation::formatter::format_catalog;
use crate::recommendation::prompts::{
    ANY_TIER_INSTRUCTION, CALL_TO_ACTION, PRIORITY_DIRECTIVE_TEMPLATE, SYSTEM_PROMPT_TEMPLATE,
    TIER_INSTRUCTION_TEMPLATE,
};
use crate::recommendation::scenario::{detect_scenario, resolve_priority_playbook, Scenario};

const SAMPLE_SIZE: usize = 3;
const SYSTEM_PROMPT_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Live,
    Debug,
}

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    /// Raw markdown reply from the model.
    pub recommendation: String,
    pub recommended_playbooks: Vec<RecommendedPlaybook>,
    pub usage: Usage,
    pub model: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCounts {
    pub deliverable_categories: usize,
    pub deliverables: usize,
    pub playbooks: usize,
    pub activation_items: usize,
    pub descriptions: usize,
    pub expanded_items: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSamples {
    pub deliverables: Vec<String>,
    pub playbooks: Vec<String>,
    pub activation_items: Vec<String>,
    pub descriptions: Vec<String>,
    pub expanded_items: Vec<String>,
}

/// What the live path would send upstream, without sending it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugReport {
    pub query: String,
    pub selected_tier: String,
    pub stalled_deal_detected: bool,
    pub counts: CollectionCounts,
    pub samples: CollectionSamples,
    pub priority_playbook: Option<String>,
    pub formatted_catalog_length: usize,
    pub system_prompt_preview: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RecommendationOutcome {
    Live(RecommendationResponse),
    Debug(DebugReport),
}

/// Everything assembled before the provider call.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub scenario: Option<Scenario>,
    pub priority: Option<Playbook>,
    pub formatted_catalog: String,
    pub system: String,
    pub user: String,
}

impl PreparedPrompt {
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RecommendationService {
    provider: Arc<dyn CompletionProvider>,
    extractor: Arc<dyn PlaybookExtractor>,
}

impl RecommendationService {
    pub fn new(provider: Arc<dyn CompletionProvider>, extractor: Arc<dyn PlaybookExtractor>) -> Self {
        Self { provider, extractor }
    }

    pub fn provider_kind(&self) -> &'static str {
        self.provider.kind()
    }

    pub async fn run(
        &self,
        request: &RecommendationRequest,
        mode: Mode,
    ) -> Result<RecommendationOutcome, AppError> {
        match mode {
            Mode::Live => self.recommend(request).await.map(RecommendationOutcome::Live),
            Mode::Debug => Ok(RecommendationOutcome::Debug(debug_report(request))),
        }
    }

    /// Live path. Fails fast without a credential; any provider failure is
    /// surfaced once, unclassified and unretried.
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, AppError> {
        if !self.provider.has_credential() {
            return Err(AppError::Configuration(
                "OPENAI_API_KEY is not configured".to_string(),
            ));
        }

        let prepared = prepare_prompt(request);
        info!(
            "Recommendation request: query_len={}, stalled_deal={}, playbooks={}, activation_items={}",
            request.query.len(),
            prepared.scenario.is_some(),
            request.catalog.playbooks.len(),
            request.catalog.activation_items.len()
        );

        let completion = self.provider.complete(&prepared.messages()).await?;

        let recommended_playbooks = self.extractor.extract(&completion.text);
        if recommended_playbooks.is_empty() {
            warn!("No playbooks matched in completion text ({} chars)", completion.text.len());
        } else {
            info!("Extracted {} recommended playbooks", recommended_playbooks.len());
        }

        Ok(RecommendationResponse {
            recommendation: completion.text,
            recommended_playbooks,
            usage: completion.usage,
            model: completion.model,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt assembly
// ────────────────────────────────────────────────────────────────────────────

pub fn prepare_prompt(request: &RecommendationRequest) -> PreparedPrompt {
    let scenario = detect_scenario(&request.query);
    let priority = scenario.map(|s| resolve_priority_playbook(s, &request.catalog));

    let formatted_catalog =
        format_catalog(&request.catalog, &request.expanded_items, priority.as_ref());
    let system = build_system_prompt(&request.selected_tier, &formatted_catalog);
    let user = build_user_message(&request.query, scenario);

    PreparedPrompt {
        scenario,
        priority,
        formatted_catalog,
        system,
        user,
    }
}

pub fn build_system_prompt(selected_tier: &str, formatted_catalog: &str) -> String {
    let tier_instruction = match Tier::parse(selected_tier) {
        Some(tier) => TIER_INSTRUCTION_TEMPLATE.replace("{tier}", tier.label()),
        None => ANY_TIER_INSTRUCTION.to_string(),
    };

    SYSTEM_PROMPT_TEMPLATE
        .replace("{tier_instruction}", &tier_instruction)
        .replace("{call_to_action}", CALL_TO_ACTION)
        .replace("{catalog}", formatted_catalog)
}

/// The raw query, plus an imperative sentence when an override is active.
pub fn build_user_message(query: &str, scenario: Option<Scenario>) -> String {
    match scenario {
        Some(s) => format!(
            "{query}\n\n{}",
            PRIORITY_DIRECTIVE_TEMPLATE.replace("{title}", s.priority_title())
        ),
        None => query.to_string(),
    }
}

pub fn debug_report(request: &RecommendationRequest) -> DebugReport {
    let prepared = prepare_prompt(request);
    let catalog = &request.catalog;

    let counts = CollectionCounts {
        deliverable_categories: catalog.deliverables.len(),
        deliverables: catalog.deliverable_count(),
        playbooks: catalog.playbooks.len(),
        activation_items: catalog.activation_items.len(),
        descriptions: catalog.descriptions.len(),
        expanded_items: request.expanded_items.len(),
    };

    let samples = CollectionSamples {
        deliverables: catalog
            .deliverables
            .values()
            .flatten()
            .take(SAMPLE_SIZE)
            .map(|i| i.title.clone())
            .collect(),
        playbooks: catalog
            .playbooks
            .iter()
            .take(SAMPLE_SIZE)
            .map(Playbook::identifier)
            .collect(),
        activation_items: catalog
            .activation_items
            .iter()
            .take(SAMPLE_SIZE)
            .map(|i| i.title.clone())
            .collect(),
        descriptions: catalog.descriptions.keys().take(SAMPLE_SIZE).cloned().collect(),
        expanded_items: request.expanded_items.iter().take(SAMPLE_SIZE).cloned().collect(),
    };

    info!(
        "Debug recommendation: deliverables={}, playbooks={}, stalled_deal={}",
        counts.deliverables,
        counts.playbooks,
        prepared.scenario.is_some()
    );

    DebugReport {
        query: request.query.clone(),
        selected_tier: request.selected_tier.clone(),
        stalled_deal_detected: prepared.scenario == Some(Scenario::StalledDeal),
        counts,
        samples,
        priority_playbook: prepared.priority.as_ref().map(Playbook::identifier),
        formatted_catalog_length: prepared.formatted_catalog.len(),
        system_prompt_preview: prepared
            .system
            .chars()
            .take(SYSTEM_PROMPT_PREVIEW_CHARS)
            .collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::{Completion, LlmError};
    use crate::models::catalog::{Catalog, CatalogItem};
    use crate::recommendation::extractor::MarkdownPlaybookExtractor;
    use crate::recommendation::scenario::STALLED_DEAL_TITLE;

    /// Test double that records every call and replays a fixed reply.
    pub(crate) struct SpyProvider {
        pub credential: bool,
        pub reply: Result<String, String>,
        pub calls: AtomicUsize,
        pub last_messages: Mutex<Vec<ChatMessage>>,
    }

    impl SpyProvider {
        pub(crate) fn replying(text: &str) -> Self {
            Self {
                credential: true,
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                last_messages: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn without_credential() -> Self {
            Self {
                credential: false,
                ..Self::replying("unused")
            }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                ..Self::replying("unused")
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionProvider for SpyProvider {
        fn has_credential(&self) -> bool {
            self.credential
        }

        fn kind(&self) -> &'static str {
            "spy"
        }

        async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_messages.lock().unwrap() = messages.to_vec();
            match &self.reply {
                Ok(text) => Ok(Completion {
                    text: text.clone(),
                    usage: Usage {
                        prompt_tokens: 100,
                        completion_tokens: 20,
                        total_tokens: 120,
                    },
                    model: "spy-model".to_string(),
                }),
                Err(message) => Err(LlmError::Api {
                    status: 502,
                    message: message.clone(),
                }),
            }
        }
    }

    fn service(provider: Arc<SpyProvider>) -> RecommendationService {
        RecommendationService::new(
            provider,
            Arc::new(MarkdownPlaybookExtractor::new().unwrap()),
        )
    }

    fn request(query: &str) -> RecommendationRequest {
        let mut catalog = Catalog::default();
        catalog.deliverables.insert(
            "Content".to_string(),
            vec![CatalogItem {
                title: "Account Manifesto".to_string(),
                tactical_credits: "8".to_string(),
                ..Default::default()
            }],
        );
        catalog.activation_items = vec![CatalogItem {
            title: STALLED_DEAL_TITLE.to_string(),
            tactical_credits: "3".to_string(),
            ..Default::default()
        }];
        RecommendationRequest {
            query: query.to_string(),
            selected_tier: "impact".to_string(),
            expanded_items: vec![],
            catalog,
        }
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_upstream_call() {
        let provider = Arc::new(SpyProvider::without_credential());
        let err = service(provider.clone())
            .recommend(&request("grow pipeline"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_live_path_extracts_playbooks_and_passes_usage() {
        let provider = Arc::new(SpyProvider::replying(
            "## 🎯 Recommended Approach\n\n**💼 Pipeline velocity (8 credits)**",
        ));
        let response = service(provider.clone())
            .recommend(&request("grow pipeline"))
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(response.recommended_playbooks.len(), 1);
        assert_eq!(response.recommended_playbooks[0].category, "Pipeline acceleration");
        assert_eq!(response.usage.total_tokens, 120);
        assert_eq!(response.model, "spy-model");
    }

    #[tokio::test]
    async fn test_stalled_query_adds_directive_and_priority_block() {
        let provider = Arc::new(SpyProvider::replying("no structured output"));
        let response = service(provider.clone())
            .recommend(&request("Our deal is stuck in procurement"))
            .await
            .unwrap();
        assert!(response.recommended_playbooks.is_empty());

        let messages = provider.last_messages.lock().unwrap().clone();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("## PRIORITY PLAYBOOK FOR THIS QUERY"));
        assert!(messages[1].content.starts_with("Our deal is stuck in procurement"));
        assert!(messages[1]
            .content
            .contains("You MUST recommend \"Unblock a stalled deal\" as your primary recommendation."));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_reported_once() {
        let provider = Arc::new(SpyProvider::failing("bad gateway"));
        let err = service(provider.clone())
            .recommend(&request("grow pipeline"))
            .await
            .unwrap_err();

        assert_eq!(provider.call_count(), 1);
        match err {
            AppError::Upstream(msg) => assert!(msg.contains("bad gateway")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_debug_mode_never_calls_provider() {
        let provider = Arc::new(SpyProvider::without_credential());
        let outcome = service(provider.clone())
            .run(&request("deal not progressing"), Mode::Debug)
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 0);
        match outcome {
            RecommendationOutcome::Debug(report) => {
                assert!(report.stalled_deal_detected);
                assert_eq!(report.counts.deliverables, 1);
                assert_eq!(report.counts.activation_items, 1);
                assert_eq!(report.priority_playbook.as_deref(), Some(STALLED_DEAL_TITLE));
                assert_eq!(report.samples.deliverables, vec!["Account Manifesto"]);
                assert!(report.system_prompt_preview.chars().count() <= SYSTEM_PROMPT_PREVIEW_CHARS);
                assert!(report.formatted_catalog_length > 0);
            }
            RecommendationOutcome::Live(_) => panic!("debug mode returned a live response"),
        }
    }

    #[test]
    fn test_user_message_is_raw_query_without_scenario() {
        assert_eq!(build_user_message("Tell me about training", None), "Tell me about training");
    }

    #[test]
    fn test_system_prompt_contains_catalog_tier_and_call_to_action() {
        let system = build_system_prompt("Enterprise", "## AVAILABLE DELIVERABLES BY CATEGORY\n");
        assert!(system.contains("## AVAILABLE DELIVERABLES BY CATEGORY"));
        assert!(system.contains("The client is on the Enterprise tier."));
        assert!(system.contains(CALL_TO_ACTION));
        assert!(!system.contains("{catalog}"));
        assert!(!system.contains("{tier_instruction}"));

        let any = build_system_prompt("", "");
        assert!(any.contains(ANY_TIER_INSTRUCTION));
    }

    #[test]
    fn test_system_prompt_keeps_quoted_section_headings_and_ends_with_call_to_action() {
        let system = build_system_prompt("Tactical", "");
        assert!(system.contains("\"## 🎯 Recommended Approach\""));
        assert!(system.contains("\"## 📋 Recommended Playbooks\""));
        assert!(system.contains("\"## ✅ Next Steps\""));
        assert!(system.ends_with(CALL_TO_ACTION));

        // The format example shown to the model is one the extractor accepts
        let extractor = MarkdownPlaybookExtractor::new().unwrap();
        let found = extractor.extract(&system);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Account Manifesto");
    }

    #[test]
    fn test_prepare_prompt_is_deterministic() {
        let req = request("My deal is stuck and not progressing");
        let a = prepare_prompt(&req);
        let b = prepare_prompt(&req);
        assert_eq!(a.system, b.system);
        assert_eq!(a.user, b.user);
        assert_eq!(a.scenario, Some(Scenario::StalledDeal));
    }
}
