use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

mod cli;
mod ingest;
mod model;
mod render;
mod store;
mod telemetry;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily("./logs", "tripsheet.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(appender);

    // Logs go to rolling files so they never mix with the rendered output.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .pretty();

    Registry::default().with(file_log).with(env_filter).init();

    cli::run(cli::Cli::parse()).await
}
