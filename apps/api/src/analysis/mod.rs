// Resume analysis: grading, optimization, job description parsing and matching.
// All model calls go through llm_client; no direct HTTP to Ollama here.

pub mod gateway;
pub mod handlers;
pub mod prompts;

pub use gateway::InferenceGateway;
