use clap::Parser;
use minion_worker::{Minion, MinionConfig};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "minion")]
#[command(about = "Pull tasks from a queue server and execute them", long_about = None)]
struct Args {
    /// Queue server host
    #[arg(long)]
    host: Option<String>,

    /// Queue server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Shared secret
    #[arg(long, env = "MINION_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Connection attempts before giving up
    #[arg(long)]
    retries: Option<u32>,

    /// Delay between connection attempts
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Minion name (auto-generated if not provided)
    #[arg(long)]
    name: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    config: Option<String>,
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
        MinionConfig::from_file(config_path)?
    } else {
        MinionConfig::default()
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
    if args.name.is_some() {
        config.name = args.name;
    }

    let minion = Minion::new(config);
    minion.run().await?;

    Ok(())
}
