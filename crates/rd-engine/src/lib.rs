// RiskDeck engine
// Fetches prices for each configured symbol and runs the risk metrics engine over them

pub mod dataset;
pub mod engine;

pub use dataset::{build_dataset, FetchOutcome};
pub use engine::RiskEngine;
