//! Interception-chain building and the per-method chain cache.
//!
//! A chain is the ordered list of interceptors whose advisors match one
//! method. Chains are deterministic for a given configuration revision and
//! cached per method; any advisor mutation bumps the revision and clears
//! the cache.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::error;

use crate::advice::Interceptor;
use crate::advisor::Advisor;
use crate::contract::{MethodSpec, TypeContract};
use crate::proxy::ProxyError;

/// Immutable interceptor list shared between the cache and invocations.
pub type Chain = Arc<[Arc<dyn Interceptor>]>;

/// Filter an effective-ordered advisor snapshot down to the chain for one
/// method.
///
/// Sealed methods always yield an empty chain. A pointcut evaluation
/// failure aborts the build and surfaces as a configuration error, never as
/// a non-match.
pub fn build_chain(
    advisors: &[Arc<Advisor>],
    contract: &TypeContract,
    method: &MethodSpec,
) -> Result<Vec<Arc<dyn Interceptor>>, ProxyError> {
    if method.is_sealed() {
        return Ok(Vec::new());
    }
    let mut chain = Vec::new();
    for advisor in advisors {
        match advisor.applies_to(contract, method) {
            Ok(true) => chain.push(Arc::clone(advisor.interceptor())),
            Ok(false) => {}
            Err(e) => {
                error!(
                    advisor = %advisor.name(),
                    method = %contract.signature(method),
                    error = %e,
                    "Pointcut evaluation failed during chain build"
                );
                return Err(ProxyError::Pointcut(e));
            }
        }
    }
    Ok(chain)
}

struct CachedChain {
    revision: u64,
    chain: Chain,
}

/// Concurrent per-method chain cache keyed by method table index.
///
/// Entries are stamped with the revision they were built against and a hit
/// requires the stamp to equal the current revision. Mutation both bumps
/// the revision and clears the map, so an insert racing the clear leaves at
/// worst an entry whose stamp can never match again.
pub(crate) struct ChainCache {
    entries: DashMap<usize, CachedChain>,
}

impl ChainCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub(crate) fn get(&self, method_index: usize, revision: u64) -> Option<Chain> {
        let entry = self.entries.get(&method_index)?;
        if entry.revision == revision {
            Some(Arc::clone(&entry.chain))
        } else {
            None
        }
    }

    pub(crate) fn insert(&self, method_index: usize, revision: u64, chain: Chain) {
        self.entries
            .insert(method_index, CachedChain { revision, chain });
    }

    pub(crate) fn clear(&self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
