//! Advisor-driven auto-proxying of registry objects.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::advisor::Advisor;
use crate::contract::CallTarget;
use crate::proxy::{ProxyError, ProxyFactory, ProxyMode};

use super::{ObjectDefinition, Result, TargetPostProcessor};

/// Post-processor that replaces matching instances with proxies.
///
/// Holds advisor prototypes; an instance with at least one eligible advisor
/// (an *always* advisor, or a pointcut matching one of its open methods)
/// comes back proxied with every eligible advisor attached. Everything else
/// passes through untouched.
///
/// Re-processing is idempotent: a ledger keyed by target identity returns
/// the proxy already built for a singleton, and an instance that is
/// already advised gets eligible advisors appended to its existing
/// configuration instead of a second proxy layer. Prototype instances are
/// never remembered, so a dropped prototype frees with its last handle.
pub struct AutoProxy {
    mode: ProxyMode,
    order: i32,
    advisors: Vec<Advisor>,
    ledger: DashMap<usize, Arc<dyn CallTarget>>,
}

impl AutoProxy {
    pub fn new() -> Self {
        Self {
            mode: ProxyMode::TargetType,
            order: 1000,
            advisors: Vec::new(),
            ledger: DashMap::new(),
        }
    }

    pub fn with_mode(mut self, mode: ProxyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Add an advisor prototype, cloned onto every matching instance.
    pub fn with_advisor(mut self, advisor: Advisor) -> Self {
        self.advisors.push(advisor);
        self
    }

    /// Advisors applying to at least one open method of `target`.
    fn eligible(&self, target: &dyn CallTarget) -> Result<Vec<&Advisor>> {
        let contract = target.contract();
        let open: Vec<_> = contract
            .methods()
            .iter()
            .filter(|m| !m.is_sealed())
            .collect();
        if open.is_empty() {
            return Ok(Vec::new());
        }
        let mut eligible = Vec::new();
        for advisor in &self.advisors {
            if advisor.is_always() {
                eligible.push(advisor);
                continue;
            }
            for method in &open {
                if advisor
                    .applies_to(contract, method)
                    .map_err(ProxyError::from)?
                {
                    eligible.push(advisor);
                    break;
                }
            }
        }
        Ok(eligible)
    }
}

impl Default for AutoProxy {
    fn default() -> Self {
        Self::new()
    }
}

fn identity(instance: &Arc<dyn CallTarget>) -> usize {
    Arc::as_ptr(instance) as *const () as usize
}

impl TargetPostProcessor for AutoProxy {
    fn name(&self) -> &str {
        "auto-proxy"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn process(
        &self,
        definition: &ObjectDefinition,
        instance: Arc<dyn CallTarget>,
    ) -> Result<Arc<dyn CallTarget>> {
        // Prototype instances are minted per resolve; remembering them
        // would pin every one for the registry's lifetime. The advised
        // check below keeps re-processing idempotent without the ledger.
        let remember = definition.is_singleton();
        let key = identity(&instance);
        if remember {
            if let Some(existing) = self.ledger.get(&key) {
                return Ok(Arc::clone(&*existing));
            }
        }

        // Already behind a proxy: advise the existing configuration rather
        // than stacking a second layer.
        if let Some(advised) = instance.as_advised() {
            let eligible = self.eligible(advised.target().as_ref())?;
            let present = advised.advisor_names();
            for advisor in eligible {
                if present.iter().any(|name| name == advisor.name()) {
                    continue;
                }
                advised.add_advisor(advisor.clone())?;
            }
            if remember {
                self.ledger.insert(key, Arc::clone(&instance));
            }
            return Ok(instance);
        }

        let eligible = self.eligible(instance.as_ref())?;
        if eligible.is_empty() {
            return Ok(instance);
        }

        let mut factory = ProxyFactory::new(Arc::clone(&instance)).with_mode(self.mode);
        for advisor in &eligible {
            factory = factory.with_advisor((*advisor).clone());
        }
        let proxy = factory.build()?;
        debug!(
            object = %definition.name(),
            advisors = eligible.len(),
            "Auto-proxied"
        );
        let wrapped: Arc<dyn CallTarget> = Arc::new(proxy);
        if remember {
            self.ledger.insert(key, Arc::clone(&wrapped));
        }
        Ok(wrapped)
    }
}
