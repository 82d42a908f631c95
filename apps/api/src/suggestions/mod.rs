// Suggestion Validation & Targeting Engine.
// Turns generated edit proposals into a safe, non-overlapping edit set:
// schema gate, markup validation, anchor resolution, keyword budget, application.
// Everything except `generation` and `handlers` is pure and synchronous.

pub mod anchor;
pub mod apply;
pub mod budget;
pub mod filter;
pub mod generation;
pub mod handlers;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod syntax;

pub use generation::GenerationService;
