//! `podlink check` command

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::CheckArgs;
use podlink::core::load_descriptors;
use podlink::ops::check_overrides;
use podlink::util::{Config, Shell, Status};

pub fn execute(args: CheckArgs, manifest: &Path, config: &Config, shell: &Arc<Shell>) -> Result<()> {
    let descriptors = super::select(load_descriptors(manifest)?, &args.only)?;
    let integrate_config = config.integrate_config();
    let span = shell.span(Status::Checking, format!("build settings in {}", manifest.display()));

    let mut total = 0;
    for descriptor in &descriptors {
        tracing::debug!("checking `{}`", descriptor.name);
        let warnings = check_overrides(descriptor, &integrate_config)
            .with_context(|| format!("failed to check `{}`", descriptor.name))?;
        for warning in &warnings {
            shell.diagnostic(&warning.to_diagnostic());
        }
        total += warnings.len();
    }

    span.finish_with_message(format!(
        "checked {} integration(s), {} warning(s)",
        descriptors.len(),
        total
    ));
    Ok(())
}
