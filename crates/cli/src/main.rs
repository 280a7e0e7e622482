//! # Ferrous Lookup
//!
//! Resolves one name through the lookup runtime and prints a JSON report.

mod bootstrap;
mod di;

use clap::Parser;
use ferrous_lookup_application::{Completion, CompletionCallback};
use ferrous_lookup_domain::{
    CliOverrides, DispatchMode, Extensions, RecordType, RETURN_BOTH_V4_AND_V6,
};
use ferrous_lookup_infrastructure::AllocatorStats;
use serde::Serialize;
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::info;

#[derive(Parser)]
#[command(name = "ferrous-lookup")]
#[command(version)]
#[command(about = "Resolve a name through the ferrous lookup runtime")]
struct Cli {
    /// Name to resolve
    name: String,

    /// Record type (mnemonic or TYPEnnn)
    #[arg(short = 't', long = "type", default_value = "A")]
    record_type: RecordType,

    /// Path to the configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Also query the other address family
    #[arg(long)]
    both: bool,

    /// Dispatch one sub-query at a time
    #[arg(long)]
    sequential: bool,

    /// Request deadline in milliseconds (0 disables it)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Artificial answer latency of the local records engine
    #[arg(long, default_value = "0")]
    latency_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Serialize)]
struct ReplyReport {
    record_type: String,
    state: String,
    rcode: Option<String>,
    addresses: Vec<IpAddr>,
    error: Option<String>,
}

#[derive(Serialize)]
struct LookupReport {
    name: String,
    transaction_id: String,
    outcome: String,
    addresses: Vec<IpAddr>,
    replies: Vec<ReplyReport>,
    allocator: AllocatorStats,
}

impl LookupReport {
    fn new(completion: &Completion, allocator: AllocatorStats) -> Self {
        let replies = completion
            .replies
            .iter()
            .map(|reply| ReplyReport {
                record_type: reply.record_type.to_string(),
                state: reply.state.to_string(),
                rcode: reply.answer.as_ref().map(|a| a.rcode.as_str().to_string()),
                addresses: reply
                    .answer
                    .as_ref()
                    .map(|a| a.addresses().collect())
                    .unwrap_or_default(),
                error: reply.error.as_ref().map(ToString::to_string),
            })
            .collect();

        Self {
            name: completion.name.to_string(),
            transaction_id: completion.transaction_id.to_string(),
            outcome: completion.kind.to_string(),
            addresses: completion.addresses(),
            replies,
            allocator,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        timeout_ms: cli.timeout_ms,
        dispatch_mode: cli.sequential.then_some(DispatchMode::Sequential),
        return_both_v4_and_v6: cli.both.then_some(true),
        log_level: cli.log_level.clone(),
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    let mut services =
        di::LookupServices::build(&config, Duration::from_millis(cli.latency_ms))?;

    let extensions = if config.lookup.return_both_v4_and_v6 {
        Extensions::new().with_flag(RETURN_BOTH_V4_AND_V6, true)
    } else {
        Extensions::new()
    };

    let (tx, rx) = oneshot::channel();
    let callback: CompletionCallback = Box::new(move |completion| {
        let _ = tx.send(completion);
    });

    let id = services.event_loop.driver_mut().submit(
        &cli.name,
        cli.record_type,
        Some(&extensions),
        None,
        callback,
    )?;
    info!(request = %id, name = %cli.name, record_type = %cli.record_type, "Lookup submitted");

    services.event_loop.run_until_idle().await;
    let completion = rx.await?;

    let report = LookupReport::new(&completion, services.allocator.stats());
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !services.allocator.is_balanced() {
        anyhow::bail!("allocator reports unreleased blocks: {:?}", services.allocator.stats());
    }
    Ok(())
}
