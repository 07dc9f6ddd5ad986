//! Label predicates and target resolution.
//!
//! ConfigMaps address the workloads that should receive their data through
//! labels. The canonical form is a selector pair: `target-key` names a label
//! key and `target-value` its required value, matching any number of
//! workloads. The single `target` label is the name-based special case,
//! resolving to exactly one workload.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ConfigMap;
use kube::ResourceExt;

use crate::error::OperatorError;

/// Label key naming the workload-label key to select on (selector mode).
pub const TARGET_KEY_LABEL: &str = "evops.microscaler.io/target-key";

/// Label key naming the workload-label value to select on (selector mode).
pub const TARGET_VALUE_LABEL: &str = "evops.microscaler.io/target-value";

/// Label key naming a single target workload (name mode).
pub const TARGET_LABEL: &str = "evops.microscaler.io/target";

/// Label key marking what a ConfigMap carries.
pub const KIND_LABEL: &str = "evops.microscaler.io/kind";

/// `KIND_LABEL` value marking a ConfigMap as an environment-variable source.
pub const KIND_ENV_VARS: &str = "ev";

/// A `key=value` equality filter over an object's labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPredicate {
    /// Label key to look up.
    pub key: String,
    /// Required label value.
    pub value: String,
}

impl LabelPredicate {
    /// Parses a `key=value` predicate string.
    ///
    /// Splits on the first `=`; anything after it, including further `=`
    /// characters, is the value.
    pub fn parse(spec: &str) -> Result<Self, OperatorError> {
        match spec.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Self {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(OperatorError::MalformedPredicate(spec.to_string())),
        }
    }

    /// True iff `labels` contains `key` with exactly `value`.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        labels.get(&self.key).is_some_and(|v| *v == self.value)
    }
}

impl std::fmt::Display for LabelPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// How a ConfigMap addresses its target workloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// A single workload, addressed by name.
    Name(String),
    /// Any workload matching a label equality selector.
    Selector(LabelPredicate),
}

/// Reads a label value, treating a missing map, missing key and empty value
/// all as absent.
#[must_use]
pub fn label_value<'a>(labels: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    labels
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Resolves a ConfigMap's target from its labels.
///
/// Selector mode wins when both selector labels are present; the name label
/// is the fallback. `None` means the ConfigMap carries no usable target
/// addressing - callers skip the event, they do not fail.
#[must_use]
pub fn resolve_target(config_map: &ConfigMap) -> Option<TargetSpec> {
    let labels = config_map.labels();

    if let (Some(key), Some(value)) = (
        label_value(labels, TARGET_KEY_LABEL),
        label_value(labels, TARGET_VALUE_LABEL),
    ) {
        return Some(TargetSpec::Selector(LabelPredicate {
            key: key.to_string(),
            value: value.to_string(),
        }));
    }

    label_value(labels, TARGET_LABEL).map(|name| TargetSpec::Name(name.to_string()))
}
