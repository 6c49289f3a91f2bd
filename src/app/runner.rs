use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to start '{program}'")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Command '{command}' failed with {}\nstderr: {stderr}", exit_description(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

/// Everything the login workflow needs from the operating system's process
/// table. The production implementation shells out; tests swap in a fake.
#[async_trait]
pub trait CommandRunner {
    /// Find `program` on the executable search path.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run a command with captured output and return its trimmed stdout.
    async fn output(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;

    /// Run a command attached to the current terminal.
    async fn passthrough(&self, program: &str, args: &[&str]) -> Result<(), CommandError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        let search_path = std::env::var_os("PATH")?;
        std::env::split_paths(&search_path)
            .map(|dir| dir.join(program))
            .find(|candidate| is_executable(candidate))
    }

    async fn output(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let command = render(program, args);
        debug!("Running: {}", command);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn passthrough(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        let command = render(program, args);
        debug!("Running attached to terminal: {}", command);

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(CommandError::Failed {
                command,
                code: status.code(),
                stderr: String::new(),
            });
        }

        Ok(())
    }
}

pub fn render(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}
