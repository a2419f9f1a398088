//! Generated shell script phases.
//!
//! The phase names and the manifest check body are matched by name and
//! content in existing projects, so they must not change.

/// Name of the phase that copies pod resources into the product.
pub const COPY_RESOURCES_PHASE_NAME: &str = "Copy Pods Resources";

/// Name of the phase that verifies the sandbox matches the lockfile.
pub const CHECK_MANIFEST_PHASE_NAME: &str = "Check Pods Manifest.lock";

/// Body of the manifest check phase.
pub const CHECK_MANIFEST_SCRIPT: &str = r#"diff "${PODS_ROOT}/../Podfile.lock" "${PODS_ROOT}/Manifest.lock" > /dev/null
if [[ $? != 0 ]] ; then
    cat << EOM
error: The sandbox is not in sync with the Podfile.lock. Run 'pod install' or update your CocoaPods installation.
EOM
    exit 1
fi
"#;

/// Body of the copy-resources phase: the quoted script path.
pub fn copy_resources_script(script_path: &str) -> String {
    format!("\"{}\"\n", script_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_resources_script() {
        assert_eq!(
            copy_resources_script("${SRCROOT}/Pods/Pods-resources.sh"),
            "\"${SRCROOT}/Pods/Pods-resources.sh\"\n"
        );
    }

    #[test]
    fn test_check_manifest_script_shape() {
        let lines: Vec<_> = CHECK_MANIFEST_SCRIPT.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines[0],
            r#"diff "${PODS_ROOT}/../Podfile.lock" "${PODS_ROOT}/Manifest.lock" > /dev/null"#
        );
        assert_eq!(lines[2], "    cat << EOM");
        assert!(lines[3].starts_with("error: The sandbox is not in sync"));
        assert_eq!(lines[5], "    exit 1");
        assert_eq!(lines[6], "fi");
        assert!(CHECK_MANIFEST_SCRIPT.ends_with("fi\n"));
    }
}
