//! Result types for one aggregated quote request.

use std::fmt;
use std::str::FromStr;

use crate::errors::QuoteError;
use crate::models::{Asset, ProviderId};

/// A provider call that failed within a batch.
///
/// None of `symbols` were answered or cached.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider_id: ProviderId,
    /// Caller inputs that were routed to this provider
    pub symbols: Vec<String>,
    pub error: QuoteError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {} symbol(s): {}",
            self.provider_id,
            self.symbols.len(),
            self.error
        )
    }
}

/// Counters describing how a batch was served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Raw inputs received
    pub requested: usize,
    /// Inputs dropped by validation
    pub invalid: usize,
    /// Inputs with no source, answered with a null quote
    pub unroutable: usize,
    pub cache_hits: usize,
    /// Inputs a provider was asked for but returned nothing for
    pub unanswered: usize,
    /// Distinct upstream items requested across all providers
    pub fetched: usize,
    /// Provider calls issued
    pub provider_calls: usize,
}

impl BatchStats {
    /// Log-friendly summary line
    pub fn summary(&self) -> String {
        format!(
            "requested={} invalid={} unroutable={} cache_hits={} unanswered={} fetched={} provider_calls={}",
            self.requested,
            self.invalid,
            self.unroutable,
            self.cache_hits,
            self.unanswered,
            self.fetched,
            self.provider_calls
        )
    }
}

/// Outcome of [`QuoteAggregator::get_quotes`](super::QuoteAggregator::get_quotes).
///
/// `quotes` is unordered; callers should treat it as a set keyed by symbol.
#[derive(Debug, Default)]
pub struct QuoteBatch {
    pub quotes: Vec<Asset>,
    pub failures: Vec<ProviderFailure>,
    pub stats: BatchStats,
}

impl QuoteBatch {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ids of the providers that failed, in failure order
    pub fn failed_providers(&self) -> Vec<ProviderId> {
        self.failures.iter().map(|f| f.provider_id).collect()
    }

    /// Apply a [`FailurePolicy`].
    ///
    /// `Isolate` keeps partial results; `FailFast` turns the first provider
    /// failure into the error of the whole batch.
    pub fn into_result(self, policy: FailurePolicy) -> Result<QuoteBatch, QuoteError> {
        match policy {
            FailurePolicy::Isolate => Ok(self),
            FailurePolicy::FailFast => {
                let mut batch = self;
                if batch.failures.is_empty() {
                    Ok(batch)
                } else {
                    Err(batch.failures.swap_remove(0).error)
                }
            }
        }
    }
}

/// How provider failures affect a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return quotes from healthy providers and report the failed ones
    #[default]
    Isolate,
    /// Fail the whole batch when any provider fails
    FailFast,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" | "false" | "0" | "no" => Ok(FailurePolicy::Isolate),
            "fail_fast" | "failfast" | "true" | "1" | "yes" => Ok(FailurePolicy::FailFast),
            other => Err(format!("Unknown failure policy: {}", other)),
        }
    }
}
