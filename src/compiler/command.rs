//! Compiler and transform backed by external commands.
//!
//! The request is written to the command's stdin as JSON and the command
//! prints its JSON result on stdout. A typical compiler wrapper:
//!
//! ```js
//! // scripts/jsx-compiler.js
//! const compiler = require('jsx-compiler');
//! let input = '';
//! process.stdin.on('data', (d) => (input += d));
//! process.stdin.on('end', () => {
//!   const req = JSON.parse(input);
//!   const out = compiler(req.sourceText, { ...compiler.baseOptions, ...req });
//!   process.stdout.write(JSON.stringify(out));
//! });
//! ```

use super::error::{BuildError, BuildResult};
use super::unit::{
    CompileRequest, CompiledUnit, ComponentCompiler, ScriptTransformer, TransformOutput,
    TransformRequest,
};
use crate::exec;
use crate::utils::exec::FilterRule;
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};

/// Node prints deprecation and experimental warnings on stderr.
static NODE_FILTER: FilterRule = FilterRule::new(&["(node:", "(Use `node --trace"]);

/// Runs a configured command once per page or component.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    command: Vec<String>,
    /// Working directory for the command (project root)
    root: PathBuf,
}

impl CommandCompiler {
    pub fn new(command: Vec<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            command,
            root: root.into(),
        }
    }
}

impl ComponentCompiler for CommandCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> BuildResult<CompiledUnit> {
        run_json(&self.command, &self.root, request.resource_path, request)
    }
}

/// Runs a configured command once per plain script.
#[derive(Debug, Clone)]
pub struct CommandTransformer {
    command: Vec<String>,
    root: PathBuf,
}

impl CommandTransformer {
    pub fn new(command: Vec<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            command,
            root: root.into(),
        }
    }
}

impl ScriptTransformer for CommandTransformer {
    fn transform(&self, request: &TransformRequest<'_>) -> BuildResult<TransformOutput> {
        run_json(&self.command, &self.root, request.resource_path, request)
    }
}

/// Send `request` as JSON, parse stdout as `T`.
///
/// Every failure is reported as a compile error of `resource`.
fn run_json<Req, T>(
    command: &[String],
    root: &Path,
    resource: &Path,
    request: &Req,
) -> BuildResult<T>
where
    Req: Serialize,
    T: DeserializeOwned,
{
    let payload = serde_json::to_vec(request)
        .map_err(|err| BuildError::compile(resource, format!("cannot encode request: {err}")))?;

    let output = exec!(filter=&NODE_FILTER; stdin=payload.as_slice(); root; command)
        .map_err(|err| BuildError::compile(resource, format!("{err:#}")))?;

    serde_json::from_slice(&output.stdout)
        .map_err(|err| BuildError::compile(resource, format!("unreadable compiler output: {err}")))
}
