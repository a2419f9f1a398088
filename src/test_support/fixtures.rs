//! Canned file contents for integration tests.

use crate::core::descriptor::TargetDescriptor;

/// Base configuration declaring the settings the generated target provides.
pub const BASE_XCCONFIG: &str = "\
// Generated by the dependency manager
OTHER_LDFLAGS = -ObjC -lPods-AFNetworking
HEADER_SEARCH_PATHS = ${PODS_ROOT}/Headers
PODS_ROOT = ${SRCROOT}/Pods
";

/// Manifest text describing `descriptor`, with paths relative to `root`.
pub fn manifest_for(descriptor: &TargetDescriptor, root: &std::path::Path) -> String {
    let relative = |path: &std::path::Path| {
        crate::util::fs::to_document_path(path.strip_prefix(root).unwrap_or(path))
    };
    let targets = descriptor
        .user_target_ids
        .iter()
        .map(|id| format!("\"{}\"", id))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = format!(
        r#"[[integration]]
name = "{name}"
user_project = "{user}"
sandbox_project = "{sandbox}"
xcconfig = "{xcconfig}"
copy_resources_script = "{script}"
user_targets = [{targets}]
"#,
        name = descriptor.name,
        user = relative(&descriptor.user_project_path),
        sandbox = relative(&descriptor.sandbox_project_path),
        xcconfig = relative(&descriptor.xcconfig_path),
        script = descriptor.copy_resources_script_path,
    );
    for library in &descriptor.libraries {
        out.push_str(&format!(
            "\n[[integration.library]]\nname = \"{}\"\nproduct_name = \"{}\"\n",
            library.name, library.product_name
        ));
    }
    out
}
