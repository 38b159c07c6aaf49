use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use walletscope::analysis::{AnalyzerSettings, WalletAnalyzer};
use walletscope::client::{HttpTransport, LedgerClient, LedgerTransport, SdkTransport};
use walletscope::config::{Config, TransportKind};
use walletscope::core::WalletAnalysisReport;
use walletscope::util::display;

fn init_tracing() -> Result<()> {
    // Create logs directory if it doesn't exist
    std::fs::create_dir_all("logs")?;

    // Create file appender for logs
    let file_appender = tracing_appender::rolling::daily("logs", "walletscope.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);

    // Create console layer with formatting
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    // Create file layer with JSON formatting
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .json()
        .with_current_span(false)
        .with_span_list(true);

    // Initialize subscriber with both console and file layers
    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Leak the guard to prevent the file appender from being dropped
    std::mem::forget(_guard);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("🔭 Walletscope - Solana Wallet Analyzer");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json_output = args.iter().any(|arg| arg == "--json");
    let address = match args.iter().find(|arg| !arg.starts_with("--")) {
        Some(address) => address.clone(),
        None => {
            eprintln!("Usage: walletscope <WALLET_ADDRESS> [--json]");
            std::process::exit(2);
        }
    };

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Using {:?} transport against {} (window {}, threshold {})",
        config.transport, config.rpc_url, config.signature_window, config.transfer_threshold
    );

    let report = match config.transport {
        TransportKind::Sdk => {
            let transport = SdkTransport::new(&config.rpc_url, config.rpc_timeout());
            run_analysis(transport, &config, &address).await?
        }
        TransportKind::Http => {
            let transport = HttpTransport::new(&config.rpc_url, config.rpc_timeout())?;
            run_analysis(transport, &config, &address).await?
        }
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display::print_analysis_report(&report);
    }

    Ok(())
}

async fn run_analysis<T: LedgerTransport>(
    transport: T,
    config: &Config,
    address: &str,
) -> Result<WalletAnalysisReport> {
    let settings = AnalyzerSettings {
        window_size: config.signature_window,
        transfer_threshold: config.transfer_threshold,
    };
    let analyzer = WalletAnalyzer::with_settings(LedgerClient::new(transport), settings);

    analyzer
        .analyze(address)
        .await
        .with_context(|| format!("Failed to analyze wallet {}", address))
}
