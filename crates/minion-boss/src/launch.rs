use crate::{BossError, Result};
use minion_core::{Endpoint, RetryPolicy};
use minion_worker::{Minion, MinionConfig};

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How the boss starts its minions.
#[derive(Debug, Clone)]
pub enum MinionLaunch {
    /// One OS process per minion: `program [args..] --host .. --port ..`.
    /// The secret travels in `MINION_SECRET`.
    Process { program: PathBuf, args: Vec<String> },
    /// One tokio task per minion inside the boss process
    InProcess,
}

impl MinionLaunch {
    /// Re-run the current executable with the `minion` subcommand.
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(MinionLaunch::Process {
            program: std::env::current_exe()?,
            args: vec!["minion".to_string()],
        })
    }

    pub fn spawn(&self, index: usize, endpoint: &Endpoint, retry: RetryPolicy) -> Result<RunningMinion> {
        let name = format!("minion-{}", index);

        match self {
            MinionLaunch::Process { program, args } => {
                let child = Command::new(program)
                    .args(args)
                    .arg("--host")
                    .arg(&endpoint.host)
                    .arg("--port")
                    .arg(endpoint.port.to_string())
                    .arg("--retries")
                    .arg(retry.retries.to_string())
                    .arg("--retry-delay-ms")
                    .arg(retry.delay.as_millis().to_string())
                    .arg("--name")
                    .arg(&name)
                    .env("MINION_SECRET", &endpoint.secret)
                    .stdin(Stdio::null())
                    .kill_on_drop(true)
                    .spawn()
                    .map_err(|source| BossError::Spawn { index, source })?;

                debug!("Spawned {} as pid {:?}", name, child.id());
                Ok(RunningMinion::Process { index, child })
            }
            MinionLaunch::InProcess => {
                let mut config = MinionConfig::new(endpoint.clone());
                config.retry = retry;
                config.name = Some(name);

                let handle = tokio::spawn(async move { Minion::new(config).run().await });
                Ok(RunningMinion::Task { index, handle })
            }
        }
    }
}

pub enum RunningMinion {
    Process { index: usize, child: Child },
    Task { index: usize, handle: JoinHandle<anyhow::Result<usize>> },
}

impl RunningMinion {
    /// Wait for the minion to stop; a non-zero exit or an error is a failure.
    pub async fn join(self) -> Result<()> {
        match self {
            RunningMinion::Process { index, mut child } => {
                let status = child.wait().await.map_err(|e| BossError::Minion {
                    index,
                    reason: e.to_string(),
                })?;
                if status.success() {
                    Ok(())
                } else {
                    Err(BossError::Minion {
                        index,
                        reason: format!("exited with {}", status),
                    })
                }
            }
            RunningMinion::Task { index, handle } => match handle.await {
                Ok(Ok(completed)) => {
                    debug!("minion-{} completed {} tasks", index, completed);
                    Ok(())
                }
                Ok(Err(e)) => Err(BossError::Minion {
                    index,
                    reason: format!("{:#}", e),
                }),
                Err(e) => Err(BossError::Minion {
                    index,
                    reason: e.to_string(),
                }),
            },
        }
    }

    /// Best-effort termination
    pub async fn kill(self) {
        match self {
            RunningMinion::Process { index, mut child } => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill minion-{}: {}", index, e);
                }
            }
            RunningMinion::Task { handle, .. } => handle.abort(),
        }
    }
}
