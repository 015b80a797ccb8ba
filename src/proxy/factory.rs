//! Proxy construction and configuration-time validation.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::advisor::Advisor;
use crate::contract::{CallTarget, TypeContract};

use super::{Advised, Proxy, ProxyError, ProxyMode, Result};

/// Builder for a [`Proxy`] over one target.
///
/// `build` validates the contract and mode, constructs the shared
/// [`Advised`] configuration, and warms the chain cache for every
/// interceptable method so pointcut evaluation errors surface here rather
/// than at first call.
pub struct ProxyFactory {
    target: Arc<dyn CallTarget>,
    mode: ProxyMode,
    advisors: Vec<Advisor>,
    freeze_on_build: bool,
}

impl ProxyFactory {
    pub fn new(target: Arc<dyn CallTarget>) -> Self {
        Self {
            target,
            mode: ProxyMode::TargetType,
            advisors: Vec::new(),
            freeze_on_build: false,
        }
    }

    pub fn with_mode(mut self, mode: ProxyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_advisor(mut self, advisor: Advisor) -> Self {
        self.advisors.push(advisor);
        self
    }

    /// Freeze the configuration once built; runtime advising is rejected.
    pub fn frozen(mut self) -> Self {
        self.freeze_on_build = true;
        self
    }

    pub fn build(self) -> Result<Proxy> {
        let contract = self.target.contract();
        validate_contract(contract)?;
        let exposed = exposed_contract(contract, self.mode)?;

        let advised = Arc::new(Advised::new(
            Arc::clone(&self.target),
            self.mode,
            self.advisors,
        ));

        // Warm the cache; sealed methods never build chains.
        for (index, method) in contract.methods().iter().enumerate() {
            if method.is_sealed() {
                continue;
            }
            advised.chain_for(index, contract, method)?;
        }

        if self.freeze_on_build {
            advised.freeze();
        }
        debug!(
            advised = %advised.id(),
            target = %contract.type_name(),
            mode = ?self.mode,
            advisors = advised.advisor_names().len(),
            "Proxy built"
        );
        Ok(Proxy::new(advised, exposed))
    }
}

fn validate_contract(contract: &TypeContract) -> Result<()> {
    if contract.methods().is_empty() {
        return Err(ProxyError::EmptyContract {
            type_name: contract.type_name().to_string(),
        });
    }
    let mut seen = HashSet::new();
    for method in contract.methods() {
        if !seen.insert(method.name()) {
            return Err(ProxyError::DuplicateMethod {
                type_name: contract.type_name().to_string(),
                method: method.name().to_string(),
            });
        }
    }
    Ok(())
}

fn exposed_contract(contract: &TypeContract, mode: ProxyMode) -> Result<TypeContract> {
    match mode {
        ProxyMode::TargetType => {
            if contract.methods().iter().all(|m| m.is_sealed()) {
                return Err(ProxyError::NothingToIntercept {
                    type_name: contract.type_name().to_string(),
                });
            }
            Ok(contract.clone())
        }
        ProxyMode::Interfaces => {
            let primary = contract
                .interfaces()
                .first()
                .ok_or_else(|| ProxyError::NoInterfaces {
                    type_name: contract.type_name().to_string(),
                })?
                .clone();
            let mut exposed = TypeContract::new(primary);
            for interface in contract.interfaces() {
                exposed = exposed.with_interface(interface.clone());
            }
            for tag in contract.tags() {
                exposed = exposed.with_tag(tag);
            }
            for method in contract.methods() {
                exposed = exposed.with_method(method.clone());
            }
            Ok(exposed)
        }
    }
}
