//! Import classification.
//!
//! Decides what the walker does with each discovered import:
//!
//! | Kind        | Condition                                             | Action           |
//! |-------------|-------------------------------------------------------|------------------|
//! | Component   | a using-components path starts with the joined import | compile, recurse |
//! | PlainScript | resolved file has a script extension                  | rewrite, recurse |
//! | Asset       | anything else                                         | copy             |
//!
//! The component check is a plain string-prefix test, so an import whose
//! joined path is a prefix of an unrelated component path (`Logo` vs
//! `LogoBanner`) also classifies as a component.

use super::paths::join_normalized;
use serde_json::{Map, Value};
use std::path::Path;

/// What a discovered import becomes in the build graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Component,
    PlainScript,
    Asset,
}

/// Classify `specifier`, imported from a file in `resource_dir` and resolved to `resolved`.
///
/// `script_extensions` carry a leading dot (`.js`).
pub fn classify(
    resource_dir: &Path,
    specifier: &str,
    resolved: &Path,
    using_components: &Map<String, Value>,
    script_extensions: &[String],
) -> ImportKind {
    if is_custom_component(resource_dir, specifier, using_components) {
        ImportKind::Component
    } else if has_script_extension(resolved, script_extensions) {
        ImportKind::PlainScript
    } else {
        ImportKind::Asset
    }
}

/// Whether any using-components path has the joined import path as a string prefix.
pub fn is_custom_component(
    resource_dir: &Path,
    specifier: &str,
    using_components: &Map<String, Value>,
) -> bool {
    if using_components.is_empty() {
        return false;
    }
    let component_path = join_normalized(resource_dir, specifier);
    let component_path = component_path.to_string_lossy();

    using_components
        .values()
        .filter_map(Value::as_str)
        .any(|path| path.starts_with(component_path.as_ref()))
}

fn has_script_extension(path: &Path, script_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            script_extensions
                .iter()
                .any(|e| e.trim_start_matches('.') == ext)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn using(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn exts() -> Vec<String> {
        vec![".js".into(), ".jsx".into()]
    }

    #[test]
    fn test_component_prefix_match() {
        let using = using(json!({ "Logo": "/src/components/Logo" }));
        let kind = classify(
            Path::new("/src/pages/Home"),
            "../../components/Logo",
            Path::new("/src/components/Logo.jsx"),
            &using,
            &exts(),
        );
        assert_eq!(kind, ImportKind::Component);
    }

    #[test]
    fn test_script_not_in_using_components() {
        let using = using(json!({ "Logo": "/src/components/Logo" }));
        let kind = classify(
            Path::new("/src/pages/Home"),
            "../../utils",
            Path::new("/src/utils.js"),
            &using,
            &exts(),
        );
        assert_eq!(kind, ImportKind::PlainScript);
    }

    #[test]
    fn test_asset_extension() {
        let using = using(json!({ "Logo": "/src/components/Logo" }));
        let kind = classify(
            Path::new("/src/pages/Home"),
            "../../assets/rax.png",
            Path::new("/src/assets/rax.png"),
            &using,
            &exts(),
        );
        assert_eq!(kind, ImportKind::Asset);
    }

    #[test]
    fn test_substring_of_unrelated_component_still_matches() {
        // "/src/components/Logo" is a string prefix of "/src/components/LogoBanner"
        let using = using(json!({ "Banner": "/src/components/LogoBanner" }));
        assert!(is_custom_component(
            Path::new("/src/pages/Home"),
            "../../components/Logo",
            &using
        ));
    }

    #[test]
    fn test_component_path_longer_than_entry_does_not_match() {
        let using = using(json!({ "Logo": "/src/components/Logo" }));
        assert!(!is_custom_component(
            Path::new("/src/pages/Home"),
            "../../components/LogoBanner",
            &using
        ));
    }

    #[test]
    fn test_entry_containing_import_mid_string_does_not_match() {
        // Substring, but not a prefix
        let using = using(json!({ "Logo": "/vendor/src/components/Logo" }));
        assert!(!is_custom_component(
            Path::new("/src/pages/Home"),
            "../../components/Logo",
            &using
        ));
    }

    #[test]
    fn test_package_specifier_is_not_component() {
        let using = using(json!({ "Logo": "/src/components/Logo" }));
        let kind = classify(
            Path::new("/src/pages/Home"),
            "rax",
            Path::new("/node_modules/rax/lib/index.js"),
            &using,
            &exts(),
        );
        assert_eq!(kind, ImportKind::PlainScript);
    }

    #[test]
    fn test_empty_using_components_never_component() {
        let kind = classify(
            Path::new("/src/pages/Home"),
            "../../components/Logo",
            Path::new("/src/components/Logo.jsx"),
            &Map::new(),
            &exts(),
        );
        assert_eq!(kind, ImportKind::PlainScript);
    }

    #[test]
    fn test_non_string_entries_ignored() {
        let using = using(json!({ "Logo": 42, "Other": null }));
        assert!(!is_custom_component(
            Path::new("/src/pages/Home"),
            "../../components/Logo",
            &using
        ));
    }

    #[test]
    fn test_script_extensions_are_configurable() {
        let kind = classify(
            Path::new("/src"),
            "./view",
            Path::new("/src/view.jsx"),
            &Map::new(),
            &[".js".into()],
        );
        assert_eq!(kind, ImportKind::Asset);
    }
}
