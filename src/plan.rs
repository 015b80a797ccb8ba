//! Declarative weave plans.
//!
//! A weave plan is a YAML document naming the advisors to stack on a
//! proxy: pointcut descriptors, registered advice names, order values,
//! and the proxy mode. Plans can be loaded from an explicit path or from
//! [`PLAN_ENV_VAR`], with [`PROXY_MODE_ENV_VAR`] overriding the mode
//! after parse.
//!
//! ```yaml
//! mode: target-type
//! frozen: false
//! advisors:
//!   - name: audit
//!     pointcut: "name:place_*"
//!     advice: call-log
//!     order: 10
//!   - name: shield
//!     advice: retry
//!     always: true
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::advisor::Advisor;
use crate::plugin;
use crate::pointcut::{self, PointcutError};
use crate::proxy::{ProxyFactory, ProxyMode};

/// Environment variable naming the plan file.
pub const PLAN_ENV_VAR: &str = "HEDDLE_PLAN";
/// Environment variable overriding the plan's proxy mode.
pub const PROXY_MODE_ENV_VAR: &str = "HEDDLE_PROXY_MODE";

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read plan file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse plan: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown proxy mode '{value}'; expected 'target-type' or 'interfaces'")]
    UnknownMode { value: String },

    #[error("unknown advice '{name}'; registered: {registered}")]
    UnknownAdvice { name: String, registered: String },

    #[error(transparent)]
    Pointcut(#[from] PointcutError),
}

pub type Result<T> = std::result::Result<T, PlanError>;

/// One advisor entry in a plan.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorSpec {
    /// Advisor name.
    pub name: String,
    /// Pointcut descriptor. Defaults to `true` (match everything).
    #[serde(default)]
    pub pointcut: Option<String>,
    /// Registered advice name to instantiate.
    pub advice: String,
    /// Explicit order value; unordered advisors run last.
    #[serde(default)]
    pub order: Option<i32>,
    /// Attach to every method, ignoring the pointcut.
    #[serde(default)]
    pub always: bool,
}

/// Declarative advisor wiring for one proxy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WeavePlan {
    /// Exposed contract mode: `target-type` (default) or `interfaces`.
    pub mode: Option<String>,
    /// Freeze the configuration after build.
    pub frozen: bool,
    /// Advisors in registration order.
    pub advisors: Vec<AdvisorSpec>,
}

impl WeavePlan {
    /// Load a plan.
    ///
    /// Sources, first match wins: the `path` argument, then the file named
    /// by [`PLAN_ENV_VAR`], then the empty default plan. A
    /// [`PROXY_MODE_ENV_VAR`] value overrides the parsed mode.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let chosen = path
            .map(str::to_string)
            .or_else(|| std::env::var(PLAN_ENV_VAR).ok());
        let mut plan = match chosen {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        if let Ok(mode) = std::env::var(PROXY_MODE_ENV_VAR) {
            plan.mode = Some(mode);
        }
        Ok(plan)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    fn proxy_mode(&self) -> Result<ProxyMode> {
        match self.mode.as_deref() {
            None => Ok(ProxyMode::default()),
            Some("target-type") | Some("target_type") => Ok(ProxyMode::TargetType),
            Some("interfaces") => Ok(ProxyMode::Interfaces),
            Some(other) => Err(PlanError::UnknownMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Materialize `plan` onto a factory.
///
/// Pointcut descriptors are parsed and advice names resolved against the
/// plugin registry here, so every configuration error in the plan surfaces
/// before the proxy is built.
pub fn apply(plan: &WeavePlan, factory: ProxyFactory) -> Result<ProxyFactory> {
    let mut factory = factory.with_mode(plan.proxy_mode()?);
    for spec in &plan.advisors {
        let interceptor =
            plugin::find_advice(&spec.advice).ok_or_else(|| PlanError::UnknownAdvice {
                name: spec.advice.clone(),
                registered: plugin::advice_names().join(", "),
            })?;
        let mut advisor = if spec.always {
            Advisor::always(&spec.name, interceptor)
        } else {
            let descriptor = spec.pointcut.as_deref().unwrap_or("true");
            Advisor::when(&spec.name, pointcut::parse(descriptor)?, interceptor)
        };
        if let Some(order) = spec.order {
            advisor = advisor.with_order(order);
        }
        debug!(advisor = %spec.name, advice = %spec.advice, "Planned advisor");
        factory = factory.with_advisor(advisor);
    }
    if plan.frozen {
        factory = factory.frozen();
    }
    Ok(factory)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use serial_test::serial;

    use super::*;
    use crate::contract::{Args, Value};
    use crate::test_utils::greeter_target;

    const PLAN_YAML: &str = r#"
frozen: true
advisors:
  - name: audit
    pointcut: "name:greet*"
    advice: call-log
  - name: shield
    advice: retry
    always: true
    order: 5
"#;

    #[test]
    fn test_parse_full_plan() {
        let plan = WeavePlan::from_yaml(PLAN_YAML).unwrap();
        assert!(plan.frozen);
        assert_eq!(plan.advisors.len(), 2);
        assert_eq!(plan.advisors[0].pointcut.as_deref(), Some("name:greet*"));
        assert_eq!(plan.advisors[1].order, Some(5));
        assert!(plan.advisors[1].always);
    }

    #[test]
    fn test_empty_document_is_the_default_plan() {
        let plan = WeavePlan::from_yaml("{}").unwrap();
        assert!(plan.mode.is_none());
        assert!(!plan.frozen);
        assert!(plan.advisors.is_empty());
    }

    #[test]
    fn test_apply_stacks_advisors_in_effective_order() {
        let plan = WeavePlan::from_yaml(PLAN_YAML).unwrap();
        let factory = apply(&plan, ProxyFactory::new(Arc::new(greeter_target()))).unwrap();
        let proxy = factory.build().unwrap();

        assert_eq!(proxy.advised().advisor_names(), vec!["shield", "audit"]);
        assert!(proxy.advised().is_frozen());

        let mut args = Args::new(vec![Value::new("ada".to_string())]);
        let result = proxy.invoke("greet", &mut args).unwrap();
        assert_eq!(result.downcast::<String>().unwrap(), "hello ada");
    }

    #[test]
    fn test_unknown_advice_is_a_plan_error() {
        let plan = WeavePlan::from_yaml(
            "advisors:\n  - name: x\n    advice: transmogrify\n",
        )
        .unwrap();
        let err = apply(&plan, ProxyFactory::new(Arc::new(greeter_target()))).err().unwrap();
        match err {
            PlanError::UnknownAdvice { name, registered } => {
                assert_eq!(name, "transmogrify");
                assert!(registered.contains("call-log"));
            }
            other => panic!("expected unknown advice, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_descriptor_is_a_plan_error() {
        let plan = WeavePlan::from_yaml(
            "advisors:\n  - name: x\n    pointcut: \"aspectj:foo\"\n    advice: call-log\n",
        )
        .unwrap();
        let err = apply(&plan, ProxyFactory::new(Arc::new(greeter_target()))).err().unwrap();
        assert!(matches!(err, PlanError::Pointcut(PointcutError::Parse { .. })));
    }

    #[test]
    fn test_unknown_mode_is_a_plan_error() {
        let plan = WeavePlan::from_yaml("mode: cglib\n").unwrap();
        let err = apply(&plan, ProxyFactory::new(Arc::new(greeter_target()))).err().unwrap();
        assert!(matches!(err, PlanError::UnknownMode { .. }));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let err = WeavePlan::from_path("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, PlanError::Read { .. }));
    }

    #[test]
    #[serial]
    fn test_load_reads_the_env_named_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLAN_YAML.as_bytes()).unwrap();
        std::env::set_var(PLAN_ENV_VAR, file.path());

        let plan = WeavePlan::load(None).unwrap();
        assert_eq!(plan.advisors.len(), 2);

        std::env::remove_var(PLAN_ENV_VAR);
    }

    #[test]
    #[serial]
    fn test_mode_env_var_overrides_the_plan() {
        std::env::remove_var(PLAN_ENV_VAR);
        std::env::set_var(PROXY_MODE_ENV_VAR, "interfaces");

        let plan = WeavePlan::load(None).unwrap();
        assert_eq!(plan.mode.as_deref(), Some("interfaces"));

        std::env::remove_var(PROXY_MODE_ENV_VAR);
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins_over_env() {
        let mut named = tempfile::NamedTempFile::new().unwrap();
        named.write_all(b"advisors: []\n").unwrap();
        std::env::set_var(PLAN_ENV_VAR, "/ignored/by/explicit/path.yaml");

        let plan = WeavePlan::load(named.path().to_str()).unwrap();
        assert!(plan.advisors.is_empty());

        std::env::remove_var(PLAN_ENV_VAR);
    }
}
