use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "checkin-backend")]
#[command(about = "Event check-in/check-out backend", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write daily-rolling log files into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_tracing(args: &Args) -> Option<WorkerGuard> {
    let log_dir = args
        .log_dir
        .clone()
        .or_else(|| std::env::var_os("CHECKIN_LOG_DIR").map(PathBuf::from));

    let Some(log_dir) = log_dir else {
        let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
        if args.log_json {
            builder.json().init();
        } else {
            builder.init();
        }
        return None;
    };

    let appender = tracing_appender::rolling::daily(log_dir, "checkin-backend.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(writer);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_tracing(&args);

    backend_bootstrap::run_standalone(args.config.as_deref()).await
}
