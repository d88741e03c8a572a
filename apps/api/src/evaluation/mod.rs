// Resume evaluation: candidate extraction, rubric weights, hybrid retrieval
// over the job description, and the final comparison.
// All LLM calls go through llm_client.

pub mod candidate;
pub mod compare;
pub mod handlers;
pub mod pipeline;
pub mod preprocess;
pub mod prompts;
pub mod rubrics;
