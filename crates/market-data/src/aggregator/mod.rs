//! Quote aggregation.
//!
//! ```text
//! symbols --validate--> route --cache?--> hit:  echo cached quote
//!                                     \-> miss: group by provider
//!                                               --join_all(fetch)--> normalize, cache, echo
//! ```

#[allow(clippy::module_inception)]
mod aggregator;
mod batch;

pub use aggregator::QuoteAggregator;
pub use batch::{BatchStats, FailurePolicy, ProviderFailure, QuoteBatch};
