//! Depth-first build-graph walk.
//!
//! # Flow
//!
//! ```text
//! build_page("./pages/Home/index")
//!     │
//!     └── compile ──► emit ──► for each imported specifier
//!                                  │
//!                                  ├── Component ──► compile (recurse)
//!                                  ├── Script    ──► transform, write, scan imports (recurse)
//!                                  └── Asset     ──► copy
//! ```
//!
//! Scripts never discover components. The first error stops the walk and
//! files written before it stay on disk. Import cycles are not detected.

use super::classify::{ImportKind, classify};
use super::emit::{copy_file_with_dir_check, emit, write_file_with_dir_check};
use super::error::{BuildError, BuildResult};
use super::imports::scan_imports;
use super::paths::{OutputPathSet, destination_path};
use super::resolve::Resolver;
use super::unit::{CompileRequest, ComponentCompiler, ScriptTransformer, TransformRequest};
use super::{BuildContext, BuildTask, TaskKind};
use crate::log;
use serde_json::{Map, Value};
use std::{fs, path::Path};

/// Walks one page at a time through its imports.
pub struct BuildGraph<'a> {
    ctx: &'a BuildContext,
    resolver: &'a Resolver,
    compiler: &'a dyn ComponentCompiler,
    transformer: &'a dyn ScriptTransformer,
    disable_copy_npm: bool,
}

impl<'a> BuildGraph<'a> {
    pub fn new(
        ctx: &'a BuildContext,
        resolver: &'a Resolver,
        compiler: &'a dyn ComponentCompiler,
        transformer: &'a dyn ScriptTransformer,
    ) -> Self {
        Self {
            ctx,
            resolver,
            compiler,
            transformer,
            disable_copy_npm: false,
        }
    }

    /// Leave package imports in scripts untouched.
    pub fn disable_copy_npm(mut self, disable: bool) -> Self {
        self.disable_copy_npm = disable;
        self
    }

    /// Build a page given as a specifier relative to the source root.
    pub fn build_page(&self, specifier: &str) -> BuildResult<()> {
        let resource = self.resolver.resolve(&self.ctx.src_root, specifier)?;
        self.build(&BuildTask::new(TaskKind::Page, resource, self.ctx))
    }

    /// Run one task and everything it discovers.
    pub fn build(&self, task: &BuildTask) -> BuildResult<()> {
        match task.kind {
            TaskKind::Page | TaskKind::Component => self.build_component(task),
            TaskKind::Script => self.build_script(task),
            TaskKind::Asset => self.build_asset(task),
        }
    }

    fn build_component(&self, task: &BuildTask) -> BuildResult<()> {
        let resource = &task.resource_path;
        log!(task.kind.name(); "{}", self.display(resource));

        let source_text = read_text(resource)?;
        let unit = self.compiler.compile(&CompileRequest {
            source_text: &source_text,
            r#type: task.kind,
            output_path: &task.dest_root,
            source_path: &task.source_root,
            resource_path: resource,
            platform: &self.ctx.platform,
            source_file_name: resource,
        })?;

        let paths = OutputPathSet::for_resource(resource, self.ctx)?;
        emit(&unit, &paths)?;

        let resource_dir = parent_dir(resource);
        for specifier in unit.imported.keys() {
            self.visit_import(resource_dir, specifier, &unit.using_components)?;
        }
        Ok(())
    }

    fn build_script(&self, task: &BuildTask) -> BuildResult<()> {
        let resource = &task.resource_path;
        log!("script"; "{}", self.display(resource));

        let source_text = read_text(resource)?;
        let dist_source_path = destination_path(resource, self.ctx)?;
        let output = self.transformer.transform(&TransformRequest {
            source_text: &source_text,
            dist_source_path: &dist_source_path,
            resource_path: resource,
            output_path: &task.dest_root,
            disable_copy_npm: self.disable_copy_npm,
            platform: &self.ctx.platform,
        })?;
        write_file_with_dir_check(&dist_source_path, output.code.as_bytes())?;

        let resource_dir = parent_dir(resource);
        let no_components = Map::new();
        for specifier in scan_imports(&source_text, resource)? {
            self.visit_import(resource_dir, &specifier, &no_components)?;
        }
        Ok(())
    }

    fn build_asset(&self, task: &BuildTask) -> BuildResult<()> {
        let resource = &task.resource_path;
        log!("asset"; "{}", self.display(resource));

        let dest = destination_path(resource, self.ctx)?;
        copy_file_with_dir_check(resource, &dest)
    }

    /// Resolve, classify and build one import of a file in `resource_dir`.
    fn visit_import(
        &self,
        resource_dir: &Path,
        specifier: &str,
        using_components: &Map<String, Value>,
    ) -> BuildResult<()> {
        let resolved = self.resolver.resolve(resource_dir, specifier)?;
        let kind = match classify(
            resource_dir,
            specifier,
            &resolved,
            using_components,
            self.resolver.extensions(),
        ) {
            ImportKind::Component => TaskKind::Component,
            ImportKind::PlainScript => TaskKind::Script,
            ImportKind::Asset => TaskKind::Asset,
        };
        self.build(&BuildTask::new(kind, resolved, self.ctx))
    }

    /// Path for logs, relative to the project when possible.
    fn display(&self, path: &Path) -> String {
        let base = self.ctx.src_root.parent().unwrap_or(&self.ctx.src_root);
        path.strip_prefix(base)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

fn read_text(path: &Path) -> BuildResult<String> {
    fs::read_to_string(path).map_err(BuildError::io(path))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::rename::RenameImports;
    use crate::compiler::unit::{CompiledUnit, TransformOutput};
    use crate::config::Platform;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Compiler returning canned units keyed by path relative to `src`.
    struct FakeCompiler {
        src: PathBuf,
        units: Vec<(&'static str, CompiledUnit)>,
        calls: Mutex<Vec<(TaskKind, PathBuf)>>,
    }

    impl ComponentCompiler for FakeCompiler {
        fn compile(&self, request: &CompileRequest<'_>) -> BuildResult<CompiledUnit> {
            self.calls
                .lock()
                .unwrap()
                .push((request.r#type, request.resource_path.to_path_buf()));
            let rel = request.resource_path.strip_prefix(&self.src).unwrap();
            let rel = rel.with_extension("");
            self.units
                .iter()
                .find(|(key, _)| Path::new(key) == rel)
                .map(|(_, unit)| unit.clone())
                .ok_or_else(|| BuildError::compile(request.resource_path, "no canned unit"))
        }
    }

    /// Transformer that prefixes the code with a marker.
    struct MarkTransformer;

    impl ScriptTransformer for MarkTransformer {
        fn transform(&self, request: &TransformRequest<'_>) -> BuildResult<TransformOutput> {
            Ok(TransformOutput {
                code: format!("/* transformed */\n{}", request.source_text),
            })
        }
    }

    struct Project {
        _dir: TempDir,
        root: PathBuf,
        ctx: BuildContext,
        resolver: Resolver,
    }

    impl Project {
        fn new(files: &[(&str, &str)]) -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path().to_path_buf();
            for (rel, content) in files {
                let path = root.join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, content).unwrap();
            }
            let ctx = BuildContext {
                src_root: root.join("src"),
                dest_root: root.join("dist"),
                modules_root: root.join("node_modules"),
                platform: Platform::default(),
            };
            let resolver = Resolver::new(vec![".js".into(), ".jsx".into()], "node_modules");
            Self {
                _dir: dir,
                root,
                ctx,
                resolver,
            }
        }

        fn read(&self, rel: &str) -> String {
            fs::read_to_string(self.root.join(rel)).unwrap()
        }

        fn exists(&self, rel: &str) -> bool {
            self.root.join(rel).exists()
        }
    }

    fn home_project() -> Project {
        Project::new(&[
            ("src/pages/Home/index.jsx", "export default () => <Logo/>"),
            ("src/components/Logo.jsx", "export default () => <image/>"),
            ("src/utils.js", "import { isObject } from './object';\nexport const a = 1;\n"),
            ("src/object.js", "export function isObject() {}\n"),
            ("src/assets/rax.png", "\u{89}PNG"),
            ("node_modules/rax/package.json", r#"{"main":"lib/index.js"}"#),
            ("node_modules/rax/lib/index.js", "module.exports = {};\n"),
        ])
    }

    fn home_compiler(p: &Project, home_imports: Value) -> FakeCompiler {
        let src = p.ctx.src_root.clone();
        let logo_path = format!("{}/components/Logo", src.display());
        let home = CompiledUnit {
            code: Some("Page({})".into()),
            template: Some("<Logo/>".into()),
            config: Some(json!({ "usingComponents": { "Logo": "../../components/Logo" } })),
            style: Some(String::new()),
            imported: home_imports.as_object().cloned().unwrap(),
            using_components: json!({ "Logo": logo_path }).as_object().cloned().unwrap(),
            ..Default::default()
        };
        let logo = CompiledUnit {
            code: Some("Component({})".into()),
            template: Some("<image/>".into()),
            style: Some(".title{color:red}".into()),
            config: Some(json!({ "component": true })),
            imported: json!({ "../assets/rax.png": [] }).as_object().cloned().unwrap(),
            ..Default::default()
        };
        FakeCompiler {
            src,
            units: vec![("pages/Home/index", home), ("components/Logo", logo)],
            calls: Mutex::new(Vec::new()),
        }
    }

    fn home_imports() -> Value {
        json!({
            "../../components/Logo": [],
            "../../utils": [],
            "rax": [],
        })
    }

    #[test]
    fn test_end_to_end_home_page() {
        let p = home_project();
        let compiler = home_compiler(&p, home_imports());
        let renamer = RenameImports::new(p.resolver.clone(), p.ctx.clone());
        let graph = BuildGraph::new(&p.ctx, &p.resolver, &compiler, &renamer);

        graph.build_page("./pages/Home/index").unwrap();

        assert_eq!(p.read("dist/pages/Home/index.js"), "Page({})");
        assert_eq!(p.read("dist/pages/Home/index.ttml"), "<Logo/>");
        assert!(p.exists("dist/pages/Home/index.json"));
        // empty style is skipped
        assert!(!p.exists("dist/pages/Home/index.ttss"));

        assert_eq!(p.read("dist/components/Logo.js"), "Component({})");
        assert_eq!(p.read("dist/components/Logo.ttml"), "<image/>");
        assert_eq!(p.read("dist/components/Logo.ttss"), ".title{color:red}");
        assert_eq!(p.read("dist/components/Logo.json"), "{\n  \"component\": true\n}\n");

        assert_eq!(p.read("dist/utils.js"), p.read("src/utils.js"));
        assert_eq!(p.read("dist/object.js"), p.read("src/object.js"));
        assert_eq!(p.read("dist/npm/rax/lib/index.js"), "module.exports = {};\n");
        assert_eq!(p.read("dist/assets/rax.png"), "\u{89}PNG");
    }

    #[test]
    fn test_compiler_sees_kinds_in_depth_first_order() {
        let p = home_project();
        let compiler = home_compiler(&p, home_imports());
        let graph = BuildGraph::new(&p.ctx, &p.resolver, &compiler, &MarkTransformer);

        graph.build_page("./pages/Home/index").unwrap();

        let calls = compiler.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                (TaskKind::Page, p.root.join("src/pages/Home/index.jsx")),
                (TaskKind::Component, p.root.join("src/components/Logo.jsx")),
            ]
        );
    }

    #[test]
    fn test_scripts_go_through_transformer() {
        let p = home_project();
        let compiler = home_compiler(&p, home_imports());
        let graph = BuildGraph::new(&p.ctx, &p.resolver, &compiler, &MarkTransformer);

        graph.build_page("./pages/Home/index").unwrap();

        assert!(p.read("dist/utils.js").starts_with("/* transformed */\n"));
        assert!(p.read("dist/npm/rax/lib/index.js").starts_with("/* transformed */\n"));
        // scanned from the original text, not the transformed one
        assert!(p.read("dist/object.js").starts_with("/* transformed */\n"));
    }

    #[test]
    fn test_missing_import_fails_and_keeps_earlier_outputs() {
        let p = home_project();
        let compiler = home_compiler(
            &p,
            json!({ "../../components/Logo": [], "../../missing": [], "../../utils": [] }),
        );
        let graph = BuildGraph::new(&p.ctx, &p.resolver, &compiler, &MarkTransformer);

        let err = graph.build_page("./pages/Home/index").unwrap_err();
        match err {
            BuildError::ModuleNotFound { specifier, base } => {
                assert_eq!(specifier, "../../missing");
                assert_eq!(base, p.root.join("src/pages/Home"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(p.exists("dist/pages/Home/index.js"));
        assert!(p.exists("dist/components/Logo.js"));
        assert!(p.exists("dist/assets/rax.png"));
        // never reached
        assert!(!p.exists("dist/utils.js"));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let p = home_project();
        let compiler = home_compiler(&p, home_imports());
        let renamer = RenameImports::new(p.resolver.clone(), p.ctx.clone());
        let graph = BuildGraph::new(&p.ctx, &p.resolver, &compiler, &renamer);

        graph.build_page("./pages/Home/index").unwrap();
        let first: Vec<(PathBuf, Vec<u8>)> = snapshot(&p.ctx.dest_root);
        graph.build_page("./pages/Home/index").unwrap();
        let second = snapshot(&p.ctx.dest_root);

        assert_eq!(first, second);
    }

    #[test]
    fn test_script_imports_never_become_components() {
        let p = Project::new(&[
            ("src/pages/Home/index.jsx", ""),
            ("src/helper.js", "import Logo from './components/Logo';\n"),
            ("src/components/Logo.jsx", "export default 1;\n"),
        ]);
        let src = p.ctx.src_root.clone();
        let home = CompiledUnit {
            code: Some("Page({})".into()),
            imported: json!({ "../../helper": [] }).as_object().cloned().unwrap(),
            using_components: json!({ "Logo": format!("{}/components/Logo", src.display()) })
                .as_object()
                .cloned()
                .unwrap(),
            ..Default::default()
        };
        let compiler = FakeCompiler {
            src,
            units: vec![("pages/Home/index", home)],
            calls: Mutex::new(Vec::new()),
        };
        let graph = BuildGraph::new(&p.ctx, &p.resolver, &compiler, &MarkTransformer);

        graph.build_page("./pages/Home/index").unwrap();

        assert_eq!(compiler.calls.lock().unwrap().len(), 1);
        assert!(p.read("dist/components/Logo.jsx").contains("export default 1;"));
    }

    #[test]
    fn test_compile_error_propagates() {
        let p = Project::new(&[("src/pages/Home/index.jsx", "<")]);
        let compiler = FakeCompiler {
            src: p.ctx.src_root.clone(),
            units: Vec::new(),
            calls: Mutex::new(Vec::new()),
        };
        let graph = BuildGraph::new(&p.ctx, &p.resolver, &compiler, &MarkTransformer);

        let err = graph.build_page("./pages/Home/index").unwrap_err();
        assert!(matches!(err, BuildError::Compile { .. }));
        assert!(!p.exists("dist"));
    }

    #[test]
    fn test_disable_copy_npm_reaches_transformer() {
        struct Capture(Mutex<Vec<bool>>);
        impl ScriptTransformer for Capture {
            fn transform(&self, request: &TransformRequest<'_>) -> BuildResult<TransformOutput> {
                self.0.lock().unwrap().push(request.disable_copy_npm);
                Ok(TransformOutput {
                    code: request.source_text.to_owned(),
                })
            }
        }

        let p = Project::new(&[("src/pages/Home/index.jsx", ""), ("src/utils.js", "")]);
        let home = CompiledUnit {
            imported: json!({ "../../utils": [] }).as_object().cloned().unwrap(),
            ..Default::default()
        };
        let compiler = FakeCompiler {
            src: p.ctx.src_root.clone(),
            units: vec![("pages/Home/index", home)],
            calls: Mutex::new(Vec::new()),
        };
        let capture = Capture(Mutex::new(Vec::new()));
        let graph =
            BuildGraph::new(&p.ctx, &p.resolver, &compiler, &capture).disable_copy_npm(true);

        graph.build_page("./pages/Home/index").unwrap();

        assert_eq!(*capture.0.lock().unwrap(), vec![true]);
    }

    #[test]
    fn test_import_text_inside_strings_is_not_followed() {
        let p = Project::new(&[
            ("src/pages/Home/index.jsx", ""),
            (
                "src/utils.js",
                "export const hint = \"import x from 'not-installed'\";\n\
                 export const doc = `usage: require('left-pad')`;\n\
                 loader.require('./plugin-name');\n",
            ),
        ]);
        let home = CompiledUnit {
            imported: json!({ "../../utils": [] }).as_object().cloned().unwrap(),
            ..Default::default()
        };
        let compiler = FakeCompiler {
            src: p.ctx.src_root.clone(),
            units: vec![("pages/Home/index", home)],
            calls: Mutex::new(Vec::new()),
        };
        let renamer = RenameImports::new(p.resolver.clone(), p.ctx.clone());
        let graph = BuildGraph::new(&p.ctx, &p.resolver, &compiler, &renamer);

        graph.build_page("./pages/Home/index").unwrap();

        assert_eq!(p.read("dist/utils.js"), p.read("src/utils.js"));
    }

    fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let content = fs::read(e.path()).unwrap();
                (e.into_path(), content)
            })
            .collect();
        files.sort();
        files
    }
}
