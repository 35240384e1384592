// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use certwatch_kernel::config::MAINNET_ROOT_KEY_DER_HEX;
use certwatch_kernel::types::principal::Principal;
use certwatch_node::config::AuditConfig;
use certwatch_verify::{
    dump, read_certificate_file, read_record_file, run_offline, run_online, CheckOverrides,
    TrustOptions,
};

/// Exit status when the API disagrees with certified state.
const EXIT_DISCREPANCY: u8 = 2;

#[derive(Parser)]
#[command(name = "certwatch-verify", version)]
#[command(about = "Check indexing API records against certified replica state", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug)]
struct Trust {
    /// Root public key, hex (raw or DER). Defaults to the mainnet key.
    #[arg(long)]
    root_key: Option<String>,

    /// Skip the certificate freshness check
    #[arg(long)]
    ignore_time: bool,

    /// Evaluate freshness at this time (nanoseconds since the epoch)
    #[arg(long)]
    now_ns: Option<u64>,
}

impl Trust {
    fn options(&self) -> TrustOptions {
        TrustOptions {
            root_key_hex: self
                .root_key
                .clone()
                .unwrap_or_else(|| MAINNET_ROOT_KEY_DER_HEX.to_string()),
            ignore_time: self.ignore_time,
            now_ns: self.now_ns,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the certificate and the API record, then compare
    Check {
        canister_id: Principal,

        /// Replica host (overrides CERTWATCH_IC_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Indexing API base URL (overrides CERTWATCH_API_URL)
        #[arg(long)]
        api: Option<String>,

        #[command(flatten)]
        trust: Trust,
    },
    /// Compare a saved certificate with a saved API record
    Offline {
        canister_id: Principal,

        /// Certificate file, raw CBOR or hex
        certificate: PathBuf,

        /// API record JSON file
        record: PathBuf,

        #[command(flatten)]
        trust: Trust,
    },
    /// Print every revealed leaf of a saved certificate
    Dump {
        certificate: PathBuf,

        /// Also verify the signature chain
        #[arg(long)]
        verify: bool,

        #[command(flatten)]
        trust: Trust,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            canister_id,
            host,
            api,
            trust,
        } => {
            let mut cfg = AuditConfig::from_env()?;
            CheckOverrides {
                host,
                api,
                root_key_hex: trust.root_key,
                ignore_time: trust.ignore_time,
                now_ns: trust.now_ns,
            }
            .apply(&mut cfg);

            let summary = run_online(&cfg, &canister_id).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if let Some(error) = &summary.error {
                anyhow::bail!("Check of {} was inconclusive: {}", canister_id, error);
            }
            Ok(exit_for(summary.report.as_ref().map_or(true, |r| r.is_clean())))
        }
        Commands::Offline {
            canister_id,
            certificate,
            record,
            trust,
        } => {
            let certificate = read_certificate_file(&certificate)?;
            let record = read_record_file(&record)?;
            let report = run_offline(&canister_id, &certificate, &record, &trust.options())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(exit_for(report.is_clean()))
        }
        Commands::Dump {
            certificate,
            verify,
            trust,
        } => {
            let bytes = read_certificate_file(&certificate)?;
            let options = trust.options();
            let out = dump(&bytes, verify.then_some(&options))
                .with_context(|| format!("Failed to dump {}", certificate.display()))?;
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_for(clean: bool) -> ExitCode {
    if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_DISCREPANCY)
    }
}
