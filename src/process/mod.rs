//! External command execution
//!
//! Hooks and the setup wizard only ever need "run this, tell me how it went".
//! [`CommandRunner`] is that seam; [`SystemRunner`] backs it with
//! `std::process`, tests swap in a scripted runner.

use std::io;
use std::process::{Command, Stdio};

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self { success: true, code: Some(0), ..Self::default() }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self { success: false, code: Some(code), stdout: String::new(), stderr: stderr.into() }
    }
}

pub trait CommandRunner {
    /// Run to completion with stdout/stderr captured.
    fn output(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;

    /// Run to completion with the terminal attached. Returns whether it exited successfully.
    fn status(&self, program: &str, args: &[&str]) -> io::Result<bool>;

    /// Start without waiting. Returns the child's process id.
    fn spawn(&self, program: &str, args: &[&str]) -> io::Result<u32>;
}

/// Runs commands on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        tracing::debug!("exec (captured): {} {}", program, args.join(" "));
        let out = Command::new(program).args(args).stdin(Stdio::null()).output()?;
        Ok(CommandOutput {
            success: out.status.success(),
            code: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }

    fn status(&self, program: &str, args: &[&str]) -> io::Result<bool> {
        tracing::debug!("exec: {} {}", program, args.join(" "));
        Ok(Command::new(program).args(args).status()?.success())
    }

    fn spawn(&self, program: &str, args: &[&str]) -> io::Result<u32> {
        tracing::debug!("spawn: {} {}", program, args.join(" "));
        Ok(Command::new(program).args(args).spawn()?.id())
    }
}

/// Like [`CommandRunner::output`], but a missing program reads as a failed run.
pub fn output_or_failed(runner: &dyn CommandRunner, program: &str, args: &[&str]) -> CommandOutput {
    match runner.output(program, args) {
        Ok(out) => out,
        Err(err) => {
            tracing::debug!("{} could not be started: {}", program, err);
            CommandOutput::failed(-1, err.to_string())
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted runner for unit tests.

    use super::{CommandOutput, CommandRunner};
    use std::cell::RefCell;
    use std::io;

    type Respond = Box<dyn Fn() -> io::Result<CommandOutput>>;
    type Rule = (String, Respond);

    /// Records every invocation as one space-joined line and answers from rules.
    ///
    /// A rule matches when the command line starts with its prefix; the last
    /// matching rule wins. Unmatched commands succeed with empty output.
    #[derive(Default)]
    pub struct ScriptedRunner {
        rules: Vec<Rule>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(mut self, prefix: &str, output: CommandOutput) -> Self {
            let respond: Respond = Box::new(move || Ok(output.clone()));
            self.rules.push((prefix.to_string(), respond));
            self
        }

        pub fn missing(mut self, prefix: &str) -> Self {
            let respond: Respond =
                Box::new(|| Err(io::Error::new(io::ErrorKind::NotFound, "not found")));
            self.rules.push((prefix.to_string(), respond));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn answer(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
            let line = std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>();
            let line = line.join(" ");
            self.calls.borrow_mut().push(line.clone());
            match self.rules.iter().rev().find(|(prefix, _)| line.starts_with(prefix.as_str())) {
                Some((_, respond)) => respond(),
                None => Ok(CommandOutput::ok()),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn output(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
            self.answer(program, args)
        }

        fn status(&self, program: &str, args: &[&str]) -> io::Result<bool> {
            self.answer(program, args).map(|out| out.success)
        }

        fn spawn(&self, program: &str, args: &[&str]) -> io::Result<u32> {
            self.answer(program, args).map(|_| 4242)
        }
    }
}
