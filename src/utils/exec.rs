//! External command execution utilities.
//!
//! Provides a macro and functions for running the compiler and transform
//! commands with piped input, proper output handling and error reporting.

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::OsStr,
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
    sync::OnceLock,
    thread,
};

/// Run an external command in `root`, feeding `stdin` and capturing its output.
///
/// Supports an optional `filter` argument for stderr noise.
///
/// # Examples
/// ```ignore
/// exec!(stdin=request.as_bytes(); root; &command)?;
///
/// const NODE_FILTER: FilterRule = FilterRule::new(&["(node:"]);
/// exec!(filter=&NODE_FILTER; stdin=request.as_bytes(); root; &command)?;
/// ```
#[macro_export]
macro_rules! exec {
    (filter=$filter:expr; stdin=$input:expr; $root:expr; $cmd:expr $(;)?) => {
        $crate::utils::exec::exec($root, $cmd, $input, $filter)
    };
    (stdin=$input:expr; $root:expr; $cmd:expr $(;)?) => {
        $crate::exec!(filter=&$crate::utils::exec::EMPTY_FILTER; stdin=$input; $root; $cmd)
    };
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute `cmd` in `root`, write `input` to its stdin, and capture its output.
///
/// # Errors
/// Returns error if command fails to execute or returns non-zero exit code.
pub fn exec<S: AsRef<OsStr>>(
    root: &Path,
    cmd: &[S],
    input: &[u8],
    filter: &'static FilterRule,
) -> Result<Output> {
    let (name, mut command) = prepare(root, cmd)?;

    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    // Written from a separate thread so a child that prints before draining
    // its stdin cannot block on a full pipe.
    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_vec();
        thread::spawn(move || stdin.write_all(&input))
    });

    let output = child
        .wait_with_output()
        .with_context(|| format!("`{name}` process failed"))?;

    // A write error only means the child stopped reading; its exit status decides
    if let Some(writer) = writer
        && writer.join().is_err()
    {
        log!("warn"; "`{name}` stdin writer panicked");
    }

    log_output(&name, &output, filter)?;
    Ok(output)
}

/// Prepare a Command from components.
fn prepare<S: AsRef<OsStr>>(root: &Path, cmd: &[S]) -> Result<(String, Command)> {
    let (program, args) = cmd.split_first().context("Empty command")?;
    let name = program.as_ref().to_string_lossy().into_owned();

    let mut command = Command::new(program);
    command.args(args).current_dir(root);

    Ok((name, command))
}

// ============================================================================
// Output Filtering
// ============================================================================

fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

/// Filter rule for skipping entire output blocks or specific prefixes.
///
/// Used to reduce noise in command output logging by ignoring known warnings
/// or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to match at the start of output lines.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule with the given prefixes.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if output should be skipped entirely.
    ///
    /// Returns true if output is empty or starts with any of the skip prefixes.
    fn should_skip(&self, output: &str) -> bool {
        output.is_empty() || self.skip_prefixes.iter().any(|p| output.starts_with(p))
    }

    /// Log output lines that are not skipped under the command's name.
    fn log(&self, name: &str, output: &str) {
        let valid_lines: Vec<&str> = output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                let trimmed = plain.trim();
                !trimmed.is_empty() && !self.should_skip(trimmed)
            })
            .collect();

        if !valid_lines.is_empty() {
            log!(name; "{}", valid_lines.join("\n"));
        }
    }
}

/// Stdout filter: skip JSON output.
const STDOUT_FILTER: FilterRule = FilterRule::new(&["{", "["]);

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Log command output, filtering known noise.
fn log_output(name: &str, output: &Output, filter: &'static FilterRule) -> Result<()> {
    if !output.status.success() {
        anyhow::bail!(format_error(name, output, filter));
    }

    // On success, only log stderr (warnings) to reduce noise
    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(name, stderr.trim());

    Ok(())
}

/// Format command error message with filtering.
fn format_error(name: &str, output: &Output, filter: &'static FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let error_msg: Vec<&str> = stderr
        .lines()
        .filter(|line| !filter.should_skip(line.trim()))
        .collect();

    let mut msg = format!("Command `{name}` failed with {}\n", output.status);
    msg.push_str(error_msg.join("\n").trim());

    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() && !STDOUT_FILTER.should_skip(stdout_trimmed) {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout_trimmed);
    }
    msg
}
