//! Pre and post injection hooks.
//!
//! Hooks are declared in the template configuration. Every step is a shell
//! command run inside the template tree, after its placeholders have been
//! substituted with the resolved values.

use crate::config::{HookPhase, HookSpec, VariableSpec};
use crate::error::Result;
use crate::pattern::{self, Values};
use crate::prompt::Prompter;
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// Result of running a step or a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Ok,
    Failed(String),
    Cancelled,
}

/// Runs a single hook command and reports its exit code.
pub trait StepExecutor {
    /// Returns the exit code, `None` when the process was terminated by a signal.
    fn run(&self, command: &str, cwd: &Path) -> Result<Option<i32>>;
}

/// Executes steps through the platform shell, streaming their output.
pub struct ShellExecutor;

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut shell = Command::new("cmd");
        shell.args(["/C", command]);
        shell
    } else {
        let mut shell = Command::new("sh");
        shell.args(["-c", command]);
        shell
    }
}

/// Copies `source` line by line into `sink` until the child closes it.
///
/// Once `sink` fails the remaining output is discarded, but the pipe keeps
/// being drained so the child never blocks on a full buffer.
fn stream<R: Read, W: Write>(source: R, mut sink: W) {
    let mut reader = BufReader::new(source);
    let mut line = Vec::new();
    let mut sink_open = true;
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) if sink_open => {
                if let Err(e) = sink.write_all(&line).and_then(|_| sink.flush()) {
                    debug!("Discarding hook output: {e}");
                    sink_open = false;
                }
            }
            Ok(_) => {}
        }
    }
}

impl StepExecutor for ShellExecutor {
    fn run(&self, command: &str, cwd: &Path) -> Result<Option<i32>> {
        let mut child = shell_command(command)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        thread::scope(|scope| {
            if let Some(stdout) = stdout {
                scope.spawn(move || stream(stdout, io::stdout()));
            }
            if let Some(stderr) = stderr {
                scope.spawn(move || stream(stderr, io::stderr()));
            }
        });

        Ok(child.wait()?.code())
    }
}

/// Capabilities a hook run needs.
pub struct HookContext<'a> {
    pub prompt: &'a dyn Prompter,
    pub executor: &'a dyn StepExecutor,
    /// Run steps without asking for confirmation
    pub unsafe_mode: bool,
}

impl HookContext<'_> {
    /// Runs one command in `cwd`, asking first unless in unsafe mode.
    pub fn run_step(&self, cwd: &Path, command: &str) -> HookOutcome {
        let question = format!("{}: `{}` will be executed. Continue?", cwd.display(), command);
        match self.prompt.confirm(self.unsafe_mode, question) {
            Ok(true) => {}
            Ok(false) => return HookOutcome::Cancelled,
            Err(e) => {
                warn!("Could not confirm `{command}`: {e}");
                return HookOutcome::Cancelled;
            }
        }

        debug!("Running `{}` in {}", command, cwd.display());
        match self.executor.run(command, cwd) {
            Ok(Some(0)) => HookOutcome::Ok,
            Ok(Some(code)) => HookOutcome::Failed(format!("`{command}` exited with code {code}")),
            Ok(None) => HookOutcome::Failed(format!("`{command}` was terminated by a signal")),
            Err(e) => HookOutcome::Failed(format!("`{command}` could not be started: {e}")),
        }
    }

    /// Runs the steps of a hook in order.
    ///
    /// A failed step stops the hook unless it ignores errors, in which case
    /// the failure is logged and the next step runs. A declined step always
    /// stops the hook.
    pub fn run_hook(
        &self,
        cwd: &Path,
        hook: &HookSpec,
        variables: &IndexMap<String, VariableSpec>,
        values: &Values,
    ) -> HookOutcome {
        for step in &hook.steps {
            let command = pattern::substitute(step, variables, values);
            match self.run_step(cwd, &command) {
                HookOutcome::Ok => {}
                HookOutcome::Failed(reason) if hook.ignore_error => {
                    warn!("Hook '{}': {} (error ignored)", hook.display_name(), reason);
                }
                outcome => return outcome,
            }
        }
        HookOutcome::Ok
    }

    /// Runs every hook of a phase in declaration order.
    ///
    /// # Returns
    /// * `bool` - `false` as soon as a hook fails or is declined without
    ///   `ignore_user_skip`; the remaining hooks of the phase do not run
    pub fn run_phase(
        &self,
        cwd: &Path,
        hooks: &[&HookSpec],
        phase: HookPhase,
        variables: &IndexMap<String, VariableSpec>,
        values: &Values,
    ) -> bool {
        if hooks.is_empty() {
            return true;
        }
        info!("Running {} hook(s) for '{}'", hooks.len(), phase);

        for hook in hooks {
            let mut properties = Vec::new();
            if hook.ignore_user_skip {
                properties.push("skippable");
            }
            if hook.ignore_error {
                properties.push("error non fatal");
            }
            if properties.is_empty() {
                info!("Hook '{}'", hook.display_name());
            } else {
                info!("Hook '{}' ({})", hook.display_name(), properties.join(", "));
            }
            match self.run_hook(cwd, hook, variables, values) {
                HookOutcome::Ok => {}
                HookOutcome::Cancelled if hook.ignore_user_skip => {
                    warn!("Hook '{}' skipped by user", hook.display_name());
                }
                HookOutcome::Cancelled => {
                    error!("Hook '{}' was cancelled", hook.display_name());
                    return false;
                }
                HookOutcome::Failed(reason) => {
                    error!("Hook '{}' failed: {}", hook.display_name(), reason);
                    return false;
                }
            }
        }
        true
    }
}
