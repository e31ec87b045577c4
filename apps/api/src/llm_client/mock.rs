//! Deterministic local provider, selected with `USE_MOCK_RECOMMENDATIONS`.
//!
//! Returns canned markdown in the same shape the live prompt asks for, so the
//! extractor and the chat UI can be exercised without a provider account.

use async_trait::async_trait;

use super::{ChatMessage, Completion, CompletionProvider, LlmError, Role, Usage};

pub const MOCK_MODEL: &str = "mock-recommender";

const STALLED_DEAL_TITLE: &str = "Unblock a stalled deal";

const GENERAL_REPLY: &str = "## 🎯 Recommended Approach

Based on your goals, start by building awareness with your target accounts and then convert that attention into pipeline.

## 📋 Recommended Playbooks

**💼 Account Manifesto (8 credits)**
A personalised point of view for each priority account that frames the problem you solve.

**📈 Pipeline velocity (12 credits)**
Coordinated outreach to move engaged accounts into active opportunities.

**🚀 Marketing awareness sprint (6 credits)**
Targeted awareness activity across the buying committee.

## ✅ Next Steps

1. Confirm your priority account list.
2. Align sales and marketing on the first playbook.

Ready to move forward? [Generate your Statement of Work](/api/generate-sow-link)";

const STALLED_DEAL_REPLY: &str = "## 🎯 Recommended Approach

Your deal needs a targeted intervention to re-engage the buying committee.

## 📋 Recommended Playbooks

**⚡ Unblock a stalled deal (8 credits)**
A focused intervention that identifies the blocker and re-engages stakeholders.

**📈 Pipeline velocity (12 credits)**
Keeps the rest of your pipeline moving while the stalled deal is addressed.

## ✅ Next Steps

1. Map every stakeholder on the stalled opportunity.
2. Launch the intervention within the week.

Ready to move forward? [Generate your Statement of Work](/api/generate-sow-link)";

/// Provider that never leaves the process.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionProvider;

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    fn has_credential(&self) -> bool {
        true
    }

    fn kind(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, LlmError> {
        let stalled = messages
            .iter()
            .filter(|m| m.role == Role::User)
            .any(|m| m.content.contains(STALLED_DEAL_TITLE));

        let text = if stalled {
            STALLED_DEAL_REPLY
        } else {
            GENERAL_REPLY
        };

        Ok(Completion {
            text: text.to_string(),
            usage: Usage::default(),
            model: MOCK_MODEL.to_string(),
        })
    }
}
