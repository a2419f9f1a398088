//! Command implementations

pub mod check;
pub mod integrate;

use anyhow::{bail, Result};

use podlink::core::TargetDescriptor;

/// Keep the descriptors named in `only`, or all of them when it is empty.
pub(crate) fn select(
    descriptors: Vec<TargetDescriptor>,
    only: &[String],
) -> Result<Vec<TargetDescriptor>> {
    if only.is_empty() {
        return Ok(descriptors);
    }

    if let Some(unknown) = only
        .iter()
        .find(|name| !descriptors.iter().any(|d| &d.name == *name))
    {
        let known: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        bail!(
            "no integration named `{}` (available: {})",
            unknown,
            known.join(", ")
        );
    }

    Ok(descriptors
        .into_iter()
        .filter(|d| only.contains(&d.name))
        .collect())
}
