pub mod market;
pub mod metrics;
pub mod dataset;
pub mod config;
pub mod errors;

pub use market::*;
pub use metrics::*;
pub use dataset::*;
pub use config::*;
pub use errors::*;
