//! Title classification: the curated registry plus an ordered chain of
//! classifier stages (weighted LLM scoring, single-shot LLM heuristic,
//! local keyword matching).

pub mod chain;
pub mod heuristic;
pub mod hints;
pub mod keyword;
pub mod llm;
pub mod platform;
mod prompt;
pub mod registry;
pub mod stage;
pub mod weighted;

pub use chain::{ClassificationChain, ClassificationOutcome, StageAttempt};
pub use heuristic::HeuristicScorer;
pub use keyword::KeywordMatcher;
pub use llm::{AnthropicBackend, CompletionRequest, LlmBackend, LlmError, OpenAiBackend};
pub use registry::KnownTitleRegistry;
pub use stage::{ClassifierStage, ClassifyRequest, StageFailure, Verdict};
pub use weighted::WeightedScorer;
