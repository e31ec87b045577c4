// Recommendation pipeline: catalog formatting, scenario overrides, prompt
// assembly, the single provider call, and playbook extraction.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod extractor;
pub mod formatter;
pub mod handlers;
pub mod prompts;
pub mod scenario;
pub mod service;
