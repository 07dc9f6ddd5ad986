//! Environment-variable reconciliation core.
//!
//! The merge/remove algorithm applied to one container's env list given a
//! ConfigMap's key/value data. Both reconciliation directions - ConfigMap
//! events and workload events - funnel into [`apply_to_workload`], so the
//! resulting container state never depends on which side triggered.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Container, EnvVar};
use tracing::info;
use workloads::Workload;

/// Returns an uppercase version of the input with `.` replaced by `_`,
/// suitable for use as a UNIX environment variable name.
#[must_use]
pub fn sanitize_env_name(key: &str) -> String {
    key.replace('.', "_").to_uppercase()
}

/// Applies one already-sanitized `(name, value)` pair to a container.
///
/// Upserts treat an exact `(name, value)` match as a no-op; anything else
/// first purges every entry whose name matches case-insensitively, otherwise
/// the container would end up with duplicate names and unpredictable
/// behaviour at pod start. Removal requires an exact `(name, value)` match,
/// so a value that was independently overwritten is left untouched.
///
/// Returns true if the container's env list changed.
pub fn apply_env_var(container: &mut Container, name: &str, value: &str, remove: bool) -> bool {
    let env = container.env.get_or_insert_with(Vec::new);

    if remove {
        let before = env.len();
        env.retain(|entry| {
            !(entry.name == name
                && entry.value.as_deref() == Some(value)
                && entry.value_from.is_none())
        });
        let removed = env.len() != before;
        if removed {
            info!("Removing {}={} from container {}", name, value, container.name);
        }
        removed
    } else {
        let up_to_date = env.iter().any(|entry| {
            entry.name == name
                && entry.value.as_deref() == Some(value)
                && entry.value_from.is_none()
        });
        if up_to_date {
            return false;
        }

        info!(
            "Creating / updating {}={} in container {}",
            name, value, container.name
        );

        env.retain(|entry| entry.name.to_uppercase() != name.to_uppercase());
        env.push(EnvVar {
            name: name.to_string(),
            value: Some(value.to_string()),
            value_from: None,
        });
        true
    }
}

/// Applies a full ConfigMap data mapping to one container.
///
/// Keys are sanitized and processed in map iteration order. Two distinct
/// keys that sanitize to the same name are each applied independently, and
/// because every upsert purges same-name entries first, the last key
/// processed wins. That ordering dependence is documented behaviour.
pub fn apply_config_data(
    container: &mut Container,
    data: &BTreeMap<String, String>,
    remove: bool,
) -> bool {
    let mut changed = false;
    for (key, value) in data {
        let name = sanitize_env_name(key);
        changed |= apply_env_var(container, &name, value, remove);
    }
    changed
}

/// Applies a ConfigMap data mapping to every container of a workload.
///
/// The returned flag gates the full-object replace: an unchanged workload is
/// never written back.
pub fn apply_to_workload<K: Workload>(
    workload: &mut K,
    data: &BTreeMap<String, String>,
    remove: bool,
) -> bool {
    let Some(containers) = workload.containers_mut() else {
        return false;
    };

    let mut changed = false;
    for container in containers {
        changed |= apply_config_data(container, data, remove);
    }
    changed
}
