//! Running several integration units in sequence.
//!
//! Units run strictly one after another. Each gets fresh document handles,
//! so a unit sees everything the units before it wrote. The first failing
//! unit stops the run; units already finished keep their changes.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::descriptor::TargetDescriptor;
use crate::core::project::Project;
use crate::core::xcconfig::BaseConfiguration;
use crate::ops::conflicts::{check_overridden_settings, OverrideWarning};
use crate::ops::errors::IntegrateError;
use crate::ops::integrate::{IntegrationReport, Integrator};
use crate::util::config::IntegrateConfig;
use crate::util::shell::Shell;

/// Integrate every descriptor in order.
pub fn install(
    descriptors: &[TargetDescriptor],
    config: &IntegrateConfig,
    shell: &Arc<Shell>,
) -> Result<Vec<IntegrationReport>> {
    let mut progress = shell.progress(descriptors.len() as u64, "Integrating");
    let mut reports = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        tracing::info!("integrating `{}`", descriptor.name);
        let report = Integrator::new(descriptor, config, shell)
            .integrate()
            .with_context(|| format!("failed to integrate `{}`", descriptor.name))?;
        reports.push(report);
        progress.inc(1);
    }

    progress.finish();
    Ok(reports)
}

/// Report the settings of the user targets that shadow the base
/// configuration, without touching any document.
pub fn check_overrides(
    descriptor: &TargetDescriptor,
    config: &IntegrateConfig,
) -> Result<Vec<OverrideWarning>> {
    if !config.check_overrides {
        return Ok(Vec::new());
    }

    let base = BaseConfiguration::load(&descriptor.xcconfig_path)?;
    let project = Project::load(&descriptor.user_project_path)?;
    let display_path = descriptor.xcconfig_relative_path();

    let mut warnings = Vec::new();
    for target_id in &descriptor.user_target_ids {
        let target = project
            .target(target_id)
            .ok_or_else(|| IntegrateError::TargetNotFound {
                id: target_id.clone(),
                project: descriptor.user_project_path.clone(),
            })?;
        warnings.extend(check_overridden_settings(&base, target, &display_path));
    }
    Ok(warnings)
}
