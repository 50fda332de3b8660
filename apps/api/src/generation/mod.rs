// Document generation: the quota-gated proxy in front of the model.
// All model calls go through llm_client, never directly to Anthropic.

pub mod generator;
pub mod handlers;
pub mod prompts;
