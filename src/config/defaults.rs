//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn src() -> PathBuf {
        "src".into()
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }

    pub fn modules() -> PathBuf {
        "node_modules".into()
    }

    pub fn extensions() -> Vec<String> {
        vec![".js".into(), ".jsx".into()]
    }

    pub mod compiler {
        pub fn command() -> Vec<String> {
            vec!["node".into(), "scripts/jsx-compiler.js".into()]
        }
    }

    pub mod runtime {
        pub fn module() -> String {
            "jsx2mp-runtime/dist/jsx2mp-runtime.bytedance.esm.js".into()
        }

        pub fn name() -> String {
            "jsx2mp-runtime.js".into()
        }
    }
}
