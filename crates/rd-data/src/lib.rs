//! Market data collaborators for RiskDeck.
//!
//! Providers hand the engine ordered closing prices for a symbol; a failed or
//! empty fetch is always an error so the caller can mark the symbol unavailable.

pub mod providers;
pub mod sources;

pub use providers::*;
pub use sources::*;
