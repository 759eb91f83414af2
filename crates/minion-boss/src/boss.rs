use crate::{BossConfig, BossError, MinionLaunch, Result, RunningMinion};
use minion_client::{collect_results, collect_results_within, enqueue_stops, enqueue_tasks, CollectError};
use minion_core::{Endpoint, TaskOutcome};
use minion_server::{QueueServer, ServerHandle};
use tracing::{error, info};

/// Drives one run: serve the queues, launch minions, seed work, gather results.
pub struct Boss {
    config: BossConfig,
    launch: MinionLaunch,
}

impl Boss {
    pub fn new(config: BossConfig, launch: MinionLaunch) -> Self {
        Boss { config, launch }
    }

    /// Execute `n_tasks` tasks of `task_size` on `n_minions` minions.
    ///
    /// Results come back sorted by identifier. Without a collect timeout
    /// this waits forever if a minion dies before finishing its share.
    pub async fn run(&self, n_tasks: u64, n_minions: usize, task_size: usize) -> Result<Vec<TaskOutcome>> {
        let server = QueueServer::start(
            self.config.endpoint.address(),
            self.config.endpoint.secret.clone(),
        )
        .await?;
        let endpoint = self.minion_endpoint(&server);

        info!(
            "Starting run: {} tasks of size {} on {} minions",
            n_tasks, task_size, n_minions
        );

        let mut minions = Vec::with_capacity(n_minions);
        for index in 0..n_minions {
            match self.launch.spawn(index, &endpoint, self.config.retry) {
                Ok(minion) => minions.push(minion),
                Err(e) => {
                    abandon(minions, server).await;
                    return Err(e);
                }
            }
        }

        let results = match self.dispatch(&server, n_tasks, n_minions, task_size).await {
            Ok(results) => results,
            Err(e) => {
                error!("Run failed: {}", e);
                abandon(minions, server).await;
                return Err(e);
            }
        };

        let mut failure = None;
        for minion in minions {
            if let Err(e) = minion.join().await {
                error!("{}", e);
                failure.get_or_insert(e);
            }
        }
        server.shutdown().await;

        if let Some(e) = failure {
            return Err(e);
        }

        info!("Run complete: {} results", results.len());
        Ok(results)
    }

    async fn dispatch(
        &self,
        server: &ServerHandle,
        n_tasks: u64,
        n_minions: usize,
        task_size: usize,
    ) -> Result<Vec<TaskOutcome>> {
        let tasks = server.task_queue();
        enqueue_tasks(&tasks, n_tasks, task_size).await?;
        enqueue_stops(&tasks, n_minions).await?;

        let results = server.result_queue();
        let expected = n_tasks as usize;

        match self.config.collect_timeout() {
            Some(deadline) => collect_results_within(&results, expected, true, deadline)
                .await
                .map_err(|e| match e {
                    CollectError::Queue(e) => BossError::Queue(e),
                    CollectError::Timeout { received, expected } => {
                        BossError::Timeout { received, expected }
                    }
                }),
            None => Ok(collect_results(&results, expected, true).await?),
        }
    }

    /// Where minions should connect: the bound port, and loopback when
    /// the server listens on every interface.
    fn minion_endpoint(&self, server: &ServerHandle) -> Endpoint {
        let bound = server.local_addr();
        let host = if bound.ip().is_unspecified() {
            "127.0.0.1".to_string()
        } else {
            bound.ip().to_string()
        };

        Endpoint {
            host,
            port: bound.port(),
            secret: self.config.endpoint.secret.clone(),
        }
    }
}

async fn abandon(minions: Vec<RunningMinion>, server: ServerHandle) {
    for minion in minions {
        minion.kill().await;
    }
    server.shutdown().await;
}
