use clap::{Parser, Subcommand};
use minion_boss::{render, Boss, BossConfig, Format, MinionLaunch};
use minion_client::{collect_results, collect_results_within, enqueue_stops, enqueue_tasks, QueueClient};
use minion_server::QueueServer;
use minion_worker::{Minion, MinionConfig};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "boss")]
#[command(about = "Distribute linear-system tasks to minions over a shared queue", long_about = None)]
struct Args {
    /// Queue server host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Queue server port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Shared secret
    #[arg(long, global = true, env = "MINION_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Connection attempts before giving up
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Delay between connection attempts
    #[arg(long, global = true)]
    retry_delay_ms: Option<u64>,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Output format for results
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the queues, launch minions and collect every result
    Run {
        /// Number of tasks
        #[arg(short = 'n', long, default_value = "10")]
        tasks: u64,

        /// Number of minions
        #[arg(short, long, default_value = "4")]
        minions: usize,

        /// Matrix size of each task
        #[arg(short, long, default_value = "200")]
        size: usize,

        /// Stop waiting for results after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Run minions as tasks in this process
        #[arg(long)]
        in_process: bool,
    },

    /// Serve the queues until Ctrl+C
    Serve {
        /// Companion command started alongside the server
        #[arg(long, num_args = 1.., allow_hyphen_values = true)]
        companion: Vec<String>,
    },

    /// Enqueue task descriptors on a running server
    Produce {
        /// Number of tasks
        #[arg(short = 'n', long, default_value = "20")]
        tasks: u64,

        /// Matrix size of each task
        #[arg(short, long, default_value = "200")]
        size: usize,

        /// Stop sentinels enqueued after the tasks
        #[arg(long, default_value = "0")]
        stops: usize,
    },

    /// Drain results from a running server
    Collect {
        /// Number of results to wait for
        #[arg(short = 'n', long)]
        count: usize,

        /// Keep arrival order
        #[arg(long)]
        unsorted: bool,

        /// Stop waiting after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Run a single minion
    Minion {
        /// Minion name (auto-generated if not provided)
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let mut config = if let Some(config_path) = &args.config {
        BossConfig::from_file(config_path)?
    } else {
        BossConfig::default()
    };

    // Override with CLI args
    if let Some(host) = args.host {
        config.endpoint.host = host;
    }
    if let Some(port) = args.port {
        config.endpoint.port = port;
    }
    if let Some(secret) = args.secret {
        config.endpoint.secret = secret;
    }
    if let Some(retries) = args.retries {
        config.retry.retries = retries;
    }
    if let Some(delay) = args.retry_delay_ms {
        config.retry.delay = Duration::from_millis(delay);
    }

    match args.command {
        Commands::Run { tasks, minions, size, timeout_secs, in_process } => {
            if timeout_secs.is_some() {
                config.collect_timeout_secs = timeout_secs;
            }
            let launch = if in_process {
                MinionLaunch::InProcess
            } else {
                MinionLaunch::current_exe()?
            };

            let boss = Boss::new(config, launch);
            tokio::select! {
                results = boss.run(tasks, minions, size) => {
                    println!("{}", render(&results?, args.format)?);
                }
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, stopping minions");
                }
            }
        }

        Commands::Serve { companion } => {
            let server = QueueServer::start(config.endpoint.address(), config.endpoint.secret.clone()).await?;

            let mut child = match companion.split_first() {
                Some((program, rest)) => {
                    info!("Starting companion: {}", companion.join(" "));
                    Some(
                        Command::new(program)
                            .args(rest)
                            .stdin(Stdio::null())
                            .kill_on_drop(true)
                            .spawn()?,
                    )
                }
                None => None,
            };

            tokio::signal::ctrl_c().await?;
            info!("Shutting down");

            if let Some(child) = child.as_mut() {
                child.start_kill()?;
                if tokio::time::timeout(Duration::from_secs(5), child.wait()).await.is_err() {
                    warn!("Companion did not exit within 5s");
                }
            }
            server.shutdown().await;
        }

        Commands::Produce { tasks, size, stops } => {
            let client = QueueClient::connect(&config.endpoint, config.retry).await?;

            enqueue_tasks(&client.task_queue, tasks, size).await?;
            enqueue_stops(&client.task_queue, stops).await?;

            info!(
                "Enqueued {} tasks and {} stops, task queue holds {}",
                tasks,
                stops,
                client.task_queue.len().await?
            );
        }

        Commands::Collect { count, unsorted, timeout_secs } => {
            let client = QueueClient::connect(&config.endpoint, config.retry).await?;

            let results = match timeout_secs {
                Some(secs) => {
                    collect_results_within(&client.result_queue, count, !unsorted, Duration::from_secs(secs)).await?
                }
                None => collect_results(&client.result_queue, count, !unsorted).await?,
            };
            println!("{}", render(&results, args.format)?);
        }

        Commands::Minion { name } => {
            let mut minion_config = MinionConfig::new(config.endpoint);
            minion_config.retry = config.retry;
            minion_config.name = name;

            Minion::new(minion_config).run().await?;
        }
    }

    Ok(())
}
