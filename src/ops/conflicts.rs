//! Detection of build settings that shadow the base configuration.
//!
//! A target that sets a key directly, without `$(inherited)`, silently drops
//! the value the base configuration provides for it. Such overrides are
//! reported, never repaired.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::project::NativeTarget;
use crate::core::xcconfig::BaseConfiguration;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// One overridden key of one target, with every configuration that sets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideWarning {
    pub target: String,
    pub key: String,
    pub configurations: Vec<String>,
    /// Base configuration path as shown to the user
    pub base_configuration: PathBuf,
}

impl OverrideWarning {
    pub fn message(&self) -> String {
        format!(
            "The target `{} [{}]` overrides the `{}` build setting defined in `{}`.",
            self.target,
            self.configurations.join(" - "),
            self.key,
            self.base_configuration.display()
        )
    }

    /// Remediation actions, in order.
    pub fn actions() -> [&'static str; 2] {
        [suggestions::USE_INHERITED, suggestions::REMOVE_OVERRIDE]
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Self::actions()
            .into_iter()
            .fold(Diagnostic::warning(self.message()), |diag, action| {
                diag.with_suggestion(action)
            })
    }
}

/// Scan every configuration of `target` for keys declared by `base`.
///
/// Returns one warning per overridden key, sorted by key name (not by
/// declaration order in the base configuration), each listing its
/// configurations in target order. `display_path` is the base configuration
/// path used in messages.
pub fn check_overridden_settings(
    base: &BaseConfiguration,
    target: &NativeTarget,
    display_path: &Path,
) -> Vec<OverrideWarning> {
    let mut configs_by_key: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for configuration in &target.build_configurations {
        for key in base.keys() {
            let Some(value) = configuration.setting(key) else {
                continue;
            };
            if !value.inherits() {
                configs_by_key
                    .entry(key)
                    .or_default()
                    .push(configuration.name.clone());
            }
        }
    }

    configs_by_key
        .into_iter()
        .map(|(key, configurations)| OverrideWarning {
            target: target.name.clone(),
            key: key.to_string(),
            configurations,
            base_configuration: display_path.to_path_buf(),
        })
        .collect()
}
