//! Record filters for property valuation datasets
//!
//! Three predicates are applied in order with short-circuit semantics:
//! a value threshold, an address suffix exclusion, and a sampling gate
//! that drops every tenth record reaching it.

pub mod address_filter;
pub mod chain;
pub mod sampling;
pub mod value_filter;

pub use chain::{FilterChain, FilterStage, FilterStats, FilterVerdict};
pub use sampling::SamplingGate;
