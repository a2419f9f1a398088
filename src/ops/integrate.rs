//! Integration of a generated dependency target into a consumer project.
//!
//! [`Integrator::integrate`] runs five steps in a fixed order:
//!
//! 1. attach the base configuration to every build configuration of the
//!    user targets, warning about settings that shadow it
//! 2. link the generated libraries (sandbox target) and the aggregate static
//!    library (user targets)
//! 3. install or refresh the "Copy Pods Resources" script phase
//! 4. install the "Check Pods Manifest.lock" script phase at the front
//! 5. save the consumer project, then the sandbox project
//!
//! Every step is idempotent in structure: re-running never duplicates file
//! references, link entries or script phases. Documents are only written in
//! the last step. When the consumer and sandbox paths name the same file,
//! both sides edit one in-memory document and it is written once.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::descriptor::TargetDescriptor;
use crate::core::document::LazyProject;
use crate::core::project::{ObjectId, Placement, Project, SourceTree};
use crate::core::xcconfig::BaseConfiguration;
use crate::ops::conflicts::{check_overridden_settings, OverrideWarning};
use crate::ops::errors::IntegrateError;
use crate::ops::scripts::{
    copy_resources_script, CHECK_MANIFEST_PHASE_NAME, CHECK_MANIFEST_SCRIPT,
    COPY_RESOURCES_PHASE_NAME,
};
use crate::util::config::IntegrateConfig;
use crate::util::fs;
use crate::util::shell::{Shell, Status};

/// A script phase created during integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPhase {
    pub target: String,
    pub phase: String,
}

/// What one integration run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationReport {
    /// Descriptor name
    pub name: String,
    /// Override warnings emitted while attaching the base configuration
    pub warnings: Vec<OverrideWarning>,
    /// Link-phase entries added across both projects
    pub linked: usize,
    /// Script phases that did not exist before this run
    pub created_phases: Vec<CreatedPhase>,
    /// Documents written, in write order
    pub persisted: Vec<PathBuf>,
}

/// Applies one [`TargetDescriptor`] to its consumer and sandbox projects.
pub struct Integrator<'a> {
    descriptor: &'a TargetDescriptor,
    config: &'a IntegrateConfig,
    shell: &'a Shell,
    user_project: LazyProject,
    /// `None` when the sandbox is the consumer document itself.
    sandbox_project: Option<LazyProject>,
    report: IntegrationReport,
}

/// The handle holding the sandbox document.
fn sandbox_handle<'h>(
    user: &'h mut LazyProject,
    sandbox: &'h mut Option<LazyProject>,
) -> &'h mut LazyProject {
    match sandbox {
        Some(handle) => handle,
        None => user,
    }
}

impl<'a> Integrator<'a> {
    pub fn new(descriptor: &'a TargetDescriptor, config: &'a IntegrateConfig, shell: &'a Shell) -> Self {
        let shared = fs::same_file(&descriptor.user_project_path, &descriptor.sandbox_project_path);
        if shared {
            tracing::debug!(
                "{} is both the consumer and the sandbox project",
                descriptor.user_project_path.display()
            );
        }
        Integrator {
            descriptor,
            config,
            shell,
            user_project: LazyProject::new(&descriptor.user_project_path),
            sandbox_project: (!shared).then(|| LazyProject::new(&descriptor.sandbox_project_path)),
            report: IntegrationReport {
                name: descriptor.name.clone(),
                ..IntegrationReport::default()
            },
        }
    }

    /// Run all five steps and persist both documents.
    pub fn integrate(mut self) -> Result<IntegrationReport> {
        let shell = self.shell;
        let section = shell.section(
            Status::Integrating,
            format!(
                "`{}` into {}",
                self.descriptor.name,
                self.descriptor.user_project_path.display()
            ),
        );

        self.attach_base_configuration()
            .context("failed to attach the base configuration")?;
        self.link_libraries()
            .context("failed to link the generated libraries")?;
        self.install_copy_resources_phase()
            .context("failed to install the copy resources phase")?;
        self.install_manifest_check_phase()
            .context("failed to install the manifest check phase")?;
        self.persist().context("failed to save the project documents")?;

        section.finish_with_message(format!(
            "`{}` ({} linked, {} warning(s))",
            self.report.name,
            self.report.linked,
            self.report.warnings.len()
        ));
        Ok(self.report)
    }

    /// Step 1: reference the base configuration from every build
    /// configuration of the user targets.
    pub fn attach_base_configuration(&mut self) -> Result<()> {
        let descriptor = self.descriptor;
        let shell = self.shell;
        let base = BaseConfiguration::load(&descriptor.xcconfig_path)?;
        let relative = descriptor.xcconfig_relative_path();

        let project = self.user_project.get_mut()?;
        let project_path = project.path().to_path_buf();
        let file_id = project.file_reference_or_create(
            None,
            &fs::to_document_path(&relative),
            SourceTree::Group,
        );

        for target_id in &descriptor.user_target_ids {
            let target = project
                .target_mut(target_id)
                .ok_or_else(|| IntegrateError::TargetNotFound {
                    id: target_id.clone(),
                    project: project_path.clone(),
                })?;

            if self.config.check_overrides {
                for warning in check_overridden_settings(&base, target, &relative) {
                    tracing::debug!("{} overrides {}", warning.target, warning.key);
                    shell.diagnostic(&warning.to_diagnostic());
                    self.report.warnings.push(warning);
                }
            }

            for configuration in &mut target.build_configurations {
                configuration.base_configuration_reference = Some(file_id.clone());
            }
            tracing::info!(
                "`{}` now based on {}",
                target.name,
                relative.display()
            );
        }

        Ok(())
    }

    /// Step 2: link every library into the sandbox target, and the aggregate
    /// static library into every user target.
    pub fn link_libraries(&mut self) -> Result<()> {
        self.link_sandbox_libraries()?;
        self.link_user_library()
    }

    fn link_sandbox_libraries(&mut self) -> Result<()> {
        let descriptor = self.descriptor;
        let products_group = self.config.products_group.as_str();
        let sandbox = sandbox_handle(&mut self.user_project, &mut self.sandbox_project).get_mut()?;
        let sandbox_path = sandbox.path().to_path_buf();

        if sandbox.target_named(&descriptor.name).is_none() {
            return Err(IntegrateError::SandboxTargetNotFound {
                name: descriptor.name.clone(),
                project: sandbox_path,
            }
            .into());
        }

        let mut products: Vec<ObjectId> = Vec::with_capacity(descriptor.libraries.len());
        for library in &descriptor.libraries {
            let product = sandbox
                .group(products_group)
                .and_then(|group| group.file_by_path(&library.product_name))
                .ok_or_else(|| IntegrateError::ProductNotFound {
                    library: library.name.clone(),
                    product: library.product_name.clone(),
                    group: products_group.to_string(),
                    project: sandbox_path.clone(),
                })?;
            products.push(product.id.clone());
        }

        let phase_id = sandbox.generate_id(&format!("phase:frameworks:{}", descriptor.name));
        let target = sandbox
            .target_named_mut(&descriptor.name)
            .ok_or_else(|| IntegrateError::SandboxTargetNotFound {
                name: descriptor.name.clone(),
                project: sandbox_path.clone(),
            })?;
        let phase = target.frameworks_phase_or_create(phase_id);
        for (product, library) in products.into_iter().zip(&descriptor.libraries) {
            if phase.add_file(product) {
                self.report.linked += 1;
                self.shell.status(
                    Status::Linking,
                    format!("{} into `{}`", library.product_name, descriptor.name),
                );
            }
        }

        Ok(())
    }

    fn link_user_library(&mut self) -> Result<()> {
        let descriptor = self.descriptor;
        let product_name = descriptor.product_name();
        let project = self.user_project.get_mut()?;
        let project_path = project.path().to_path_buf();
        let library_id = project.file_reference_or_create(
            Some(self.config.frameworks_group.as_str()),
            &product_name,
            SourceTree::BuiltProducts,
        );

        for target_id in &descriptor.user_target_ids {
            let phase_id = project.generate_id(&format!("phase:frameworks:{}", target_id));
            let target = project
                .target_mut(target_id)
                .ok_or_else(|| IntegrateError::TargetNotFound {
                    id: target_id.clone(),
                    project: project_path.clone(),
                })?;

            if target.frameworks_phase_or_create(phase_id).add_file(library_id.clone()) {
                self.report.linked += 1;
                self.shell
                    .status(Status::Linking, format!("{} into `{}`", product_name, target.name));
            }
        }

        Ok(())
    }

    /// Step 3: ensure each user target has the copy-resources phase and that
    /// its body points at the current script.
    pub fn install_copy_resources_phase(&mut self) -> Result<()> {
        let descriptor = self.descriptor;
        let script = copy_resources_script(&descriptor.copy_resources_script_path);
        let project = self.user_project.get_mut()?;
        let project_path = project.path().to_path_buf();

        for target_id in &descriptor.user_target_ids {
            let phase_id = project.generate_id(&format!(
                "phase:script:{}:{}",
                target_id, COPY_RESOURCES_PHASE_NAME
            ));
            let target = project
                .target_mut(target_id)
                .ok_or_else(|| IntegrateError::TargetNotFound {
                    id: target_id.clone(),
                    project: project_path.clone(),
                })?;
            let target_name = target.name.clone();

            let (phase, created) =
                target.shell_script_phase_or_create(COPY_RESOURCES_PHASE_NAME, phase_id, Placement::Back);
            phase.shell_script = script.clone();

            if created {
                self.shell.status(
                    Status::Added,
                    format!("`{}` phase to `{}`", COPY_RESOURCES_PHASE_NAME, target_name),
                );
                self.report.created_phases.push(CreatedPhase {
                    target: target_name,
                    phase: COPY_RESOURCES_PHASE_NAME.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Step 4: put the manifest check in front of every other phase of each
    /// user target, unless it is already there.
    pub fn install_manifest_check_phase(&mut self) -> Result<()> {
        let descriptor = self.descriptor;
        let project = self.user_project.get_mut()?;
        let project_path = project.path().to_path_buf();

        for target_id in &descriptor.user_target_ids {
            let phase_id = project.generate_id(&format!(
                "phase:script:{}:{}",
                target_id, CHECK_MANIFEST_PHASE_NAME
            ));
            let target = project
                .target_mut(target_id)
                .ok_or_else(|| IntegrateError::TargetNotFound {
                    id: target_id.clone(),
                    project: project_path.clone(),
                })?;

            if target.shell_script_phase(CHECK_MANIFEST_PHASE_NAME).is_some() {
                tracing::debug!("`{}` already checks the manifest", target.name);
                continue;
            }

            let target_name = target.name.clone();
            let (phase, _) =
                target.shell_script_phase_or_create(CHECK_MANIFEST_PHASE_NAME, phase_id, Placement::Front);
            phase.shell_script = CHECK_MANIFEST_SCRIPT.to_string();

            self.shell.status(
                Status::Added,
                format!("`{}` phase to `{}`", CHECK_MANIFEST_PHASE_NAME, target_name),
            );
            self.report.created_phases.push(CreatedPhase {
                target: target_name,
                phase: CHECK_MANIFEST_PHASE_NAME.to_string(),
            });
        }

        Ok(())
    }

    /// Step 5: write the consumer project, then the sandbox project. A shared
    /// document is written once.
    pub fn persist(&mut self) -> Result<()> {
        for handle in std::iter::once(&mut self.user_project).chain(self.sandbox_project.as_mut()) {
            handle.persist()?;
            self.shell.status(Status::Saved, handle.path().display());
            self.report.persisted.push(handle.path().to_path_buf());
        }
        Ok(())
    }

    /// The consumer project as currently held in memory.
    pub fn user_project(&mut self) -> Result<&Project> {
        self.user_project.get()
    }

    /// The sandbox project as currently held in memory.
    pub fn sandbox_project(&mut self) -> Result<&Project> {
        sandbox_handle(&mut self.user_project, &mut self.sandbox_project).get()
    }

    pub fn report(&self) -> &IntegrationReport {
        &self.report
    }
}

/// Integrate one descriptor; shorthand for [`Integrator::integrate`].
pub fn integrate(
    descriptor: &TargetDescriptor,
    config: &IntegrateConfig,
    shell: &Shell,
) -> Result<IntegrationReport> {
    Integrator::new(descriptor, config, shell).integrate()
}
