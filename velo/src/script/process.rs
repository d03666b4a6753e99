//! Production script runner backed by package scripts and `sh`.

use super::{ScriptOutput, ScriptRunner, StdioPolicy};
use crate::errors::ScriptError;
use crate::output::OutputSink;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    scripts: HashMap<String, String>,
}

/// Runs scripts from the `scripts` table of the project's `package.json`.
///
/// The script's command line is executed via `sh -c` with the project
/// directory as the working directory and `node_modules/.bin` prepended to
/// `PATH`, mirroring how package managers invoke their scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageScriptRunner;

impl PackageScriptRunner {
    /// Creates a new runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn resolve(&self, script: &str, dir: &Path) -> Result<String, ScriptError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let bytes =
            tokio::fs::read(&manifest_path)
                .await
                .map_err(|source| ScriptError::ManifestRead {
                    manifest: manifest_path.clone(),
                    source,
                })?;
        let manifest: PackageManifest =
            serde_json::from_slice(&bytes).map_err(|source| ScriptError::ManifestParse {
                manifest: manifest_path.clone(),
                source,
            })?;

        manifest
            .scripts
            .get(script)
            .cloned()
            .ok_or_else(|| ScriptError::NotFound {
                script: script.to_string(),
                manifest: manifest_path,
            })
    }

    fn command(command_line: &str, dir: &Path) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(command_line).current_dir(dir);
        command.stdin(Stdio::inherit());

        // Local tool binaries resolve the way package managers resolve them.
        let bin_dir = dir.join("node_modules").join(".bin");
        if let Some(path) = std::env::var_os("PATH") {
            let mut paths = vec![bin_dir];
            paths.extend(std::env::split_paths(&path));
            if let Ok(joined) = std::env::join_paths(paths) {
                command.env("PATH", joined);
            }
        }

        command
    }
}

#[async_trait]
impl ScriptRunner for PackageScriptRunner {
    async fn run(
        &self,
        script: &str,
        dir: &Path,
        stdio: StdioPolicy,
    ) -> Result<ScriptOutput, ScriptError> {
        let command_line = self.resolve(script, dir).await?;
        let mut command = Self::command(&command_line, dir);

        match stdio {
            StdioPolicy::Stream { stdout, stderr } => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
                let mut child = command.spawn().map_err(|source| ScriptError::Spawn {
                    script: script.to_string(),
                    source,
                })?;

                let stdout_task = child
                    .stdout
                    .take()
                    .map(|reader| tokio::spawn(forward(reader, stdout)));
                let stderr_task = child
                    .stderr
                    .take()
                    .map(|reader| tokio::spawn(forward(reader, stderr)));

                let status = child.wait().await.map_err(|source| ScriptError::Io {
                    script: script.to_string(),
                    source,
                })?;

                if let Some(task) = stdout_task {
                    let _ = task.await;
                }
                if let Some(task) = stderr_task {
                    let _ = task.await;
                }

                Ok(ScriptOutput::from_code(status.code()))
            }
            StdioPolicy::Capture => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
                let child = command.spawn().map_err(|source| ScriptError::Spawn {
                    script: script.to_string(),
                    source,
                })?;

                let output =
                    child
                        .wait_with_output()
                        .await
                        .map_err(|source| ScriptError::Io {
                            script: script.to_string(),
                            source,
                        })?;

                Ok(ScriptOutput {
                    code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
            }
            StdioPolicy::Discard => {
                command.stdout(Stdio::null()).stderr(Stdio::null());
                let status = command.status().await.map_err(|source| ScriptError::Spawn {
                    script: script.to_string(),
                    source,
                })?;

                Ok(ScriptOutput::from_code(status.code()))
            }
        }
    }
}

/// Copies bytes from a child stream to a sink as they arrive.
async fn forward<R>(mut reader: R, sink: Arc<dyn OutputSink>)
where
    R: AsyncRead + Unpin + Send,
{
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => sink.write(&buf[..n]).await,
        }
    }
}
