//! Shared interception configuration: the advisor list, revision counter,
//! and per-method chain cache behind every proxy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;
use uuid::Uuid;

use crate::advisor::{sort_by_effective_order, Advisor};
use crate::chain::{build_chain, Chain, ChainCache};
use crate::contract::{CallTarget, MethodSpec, TypeContract};

use super::{ProxyError, ProxyMode, Result};

struct AdvisorList {
    registered: Vec<Arc<Advisor>>,
    ordered: Arc<Vec<Arc<Advisor>>>,
    frozen: bool,
}

impl AdvisorList {
    fn rebuild_ordered(&mut self) {
        let mut view = self.registered.clone();
        sort_by_effective_order(&mut view);
        self.ordered = Arc::new(view);
    }
}

/// Interception configuration shared by a proxy and anything advising it at
/// runtime.
///
/// The advisor list is copy-on-write: readers clone the ordered snapshot
/// and never hold the lock while matching or running advice. Every
/// successful mutation bumps the revision and clears the chain cache.
pub struct Advised {
    id: Uuid,
    target: Arc<dyn CallTarget>,
    mode: ProxyMode,
    advisors: RwLock<AdvisorList>,
    revision: AtomicU64,
    cache: ChainCache,
}

impl Advised {
    pub(crate) fn new(target: Arc<dyn CallTarget>, mode: ProxyMode, advisors: Vec<Advisor>) -> Self {
        let mut list = AdvisorList {
            registered: advisors.into_iter().map(Arc::new).collect(),
            ordered: Arc::new(Vec::new()),
            frozen: false,
        };
        list.rebuild_ordered();
        Self {
            id: Uuid::new_v4(),
            target,
            mode,
            advisors: RwLock::new(list),
            revision: AtomicU64::new(0),
            cache: ChainCache::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> ProxyMode {
        self.mode
    }

    pub fn target(&self) -> &Arc<dyn CallTarget> {
        &self.target
    }

    /// Current configuration revision. Bumped on every advisor mutation.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn is_frozen(&self) -> bool {
        self.read_list().frozen
    }

    /// Freeze the configuration. One-way; later mutations fail.
    pub fn freeze(&self) {
        let mut list = self.write_list();
        list.frozen = true;
        debug!(advised = %self.id, "Configuration frozen");
    }

    /// Ordered advisor snapshot (effective order).
    pub fn advisors(&self) -> Arc<Vec<Arc<Advisor>>> {
        Arc::clone(&self.read_list().ordered)
    }

    /// Advisor names in effective order, for introspection.
    pub fn advisor_names(&self) -> Vec<String> {
        self.read_list()
            .ordered
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    /// Append an advisor. Fails on a frozen configuration.
    pub fn add_advisor(&self, advisor: Advisor) -> Result<()> {
        let mut list = self.write_list();
        if list.frozen {
            return Err(ProxyError::Frozen { id: self.id });
        }
        debug!(advised = %self.id, advisor = %advisor.name(), "Adding advisor");
        list.registered.push(Arc::new(advisor));
        list.rebuild_ordered();
        drop(list);
        self.bump_and_clear();
        Ok(())
    }

    /// Remove the advisor with `name`. Fails on a frozen configuration or
    /// when no advisor carries the name.
    pub fn remove_advisor(&self, name: &str) -> Result<()> {
        let mut list = self.write_list();
        if list.frozen {
            return Err(ProxyError::Frozen { id: self.id });
        }
        let position = list
            .registered
            .iter()
            .position(|a| a.name() == name)
            .ok_or_else(|| ProxyError::AdvisorNotFound {
                name: name.to_string(),
            })?;
        list.registered.remove(position);
        list.rebuild_ordered();
        drop(list);
        debug!(advised = %self.id, advisor = %name, "Removed advisor");
        self.bump_and_clear();
        Ok(())
    }

    /// Chain for the method at `index`, served from the cache when the
    /// entry's revision stamp matches.
    ///
    /// The revision is read before the advisor snapshot, so an entry built
    /// from a newer snapshot can carry a stale stamp; such an entry is
    /// rebuilt on the next call and a stale chain is never served.
    pub(crate) fn chain_for(
        &self,
        index: usize,
        contract: &TypeContract,
        method: &MethodSpec,
    ) -> Result<Chain> {
        let revision = self.revision();
        if let Some(chain) = self.cache.get(index, revision) {
            return Ok(chain);
        }
        let snapshot = self.advisors();
        let chain: Chain = build_chain(&snapshot, contract, method)?.into();
        self.cache.insert(index, revision, Arc::clone(&chain));
        Ok(chain)
    }

    fn bump_and_clear(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
        self.cache.clear();
    }

    fn read_list(&self) -> std::sync::RwLockReadGuard<'_, AdvisorList> {
        self.advisors.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_list(&self) -> std::sync::RwLockWriteGuard<'_, AdvisorList> {
        self.advisors.write().unwrap_or_else(|e| e.into_inner())
    }
}
