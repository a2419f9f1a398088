//! `podlink integrate` command

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::IntegrateArgs;
use podlink::core::load_descriptors;
use podlink::ops::install;
use podlink::util::{Config, Shell, Status};

pub fn execute(args: IntegrateArgs, manifest: &Path, config: &Config, shell: &Arc<Shell>) -> Result<()> {
    let descriptors = super::select(load_descriptors(manifest)?, &args.only)?;
    if descriptors.is_empty() {
        shell.status(Status::Skipped, format!("no integrations in {}", manifest.display()));
        return Ok(());
    }

    let reports = install(&descriptors, &config.integrate_config(), shell)?;

    let mut warnings = 0;
    for report in &reports {
        warnings += report.warnings.len();
        shell.json_event(&serde_json::json!({
            "reason": "integration-finished",
            "name": report.name,
            "linked": report.linked,
            "warnings": report.warnings.len(),
            "created_phases": report
                .created_phases
                .iter()
                .map(|p| serde_json::json!({ "target": p.target, "phase": p.phase }))
                .collect::<Vec<_>>(),
            "persisted": report
                .persisted
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>(),
        }));
    }

    shell.status(
        Status::Finished,
        format!("{} integration(s), {} warning(s)", reports.len(), warnings),
    );
    Ok(())
}
