//! Blocking host-command invocation

use std::process::Command;

use crate::error::{Error, Result};

/// Captured outcome of a host command.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Run a command, capturing combined stdout and stderr regardless of its
/// exit status. Spawn failures are still errors.
pub fn run_unchecked(program: &str, args: &[&str]) -> Result<CommandOutput> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::Command {
            command: command_line(program, args),
            message: e.to_string(),
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(CommandOutput {
        status: output.status.code(),
        output: combined,
    })
}

/// Run a command and require a zero exit status, returning its combined
/// output. The error carries the command line and captured output.
pub fn run(program: &str, args: &[&str]) -> Result<String> {
    let result = run_unchecked(program, args)?;
    if !result.success() {
        return Err(Error::Command {
            command: command_line(program, args),
            message: format!(
                "exit status {:?}: {}",
                result.status,
                result.output.trim()
            ),
        });
    }
    Ok(result.output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let out = run("echo", &["hello"]).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn nonzero_exit_is_an_error_with_command_line() {
        let err = run("false", &[]).unwrap_err();
        assert!(err.to_string().contains("running `false`"));
    }

    #[test]
    fn unchecked_reports_status_without_failing() {
        let result = run_unchecked("false", &[]).unwrap();
        assert!(!result.success());
        assert_eq!(result.status, Some(1));
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let err = run("definitely-not-a-real-binary", &[]).unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
    }
}
