use clap::Parser;
use miette::{IntoDiagnostic, Result};
use poynt_pay::application::credentials::CredentialCache;
use poynt_pay::application::gateway::PaymentGateway;
use poynt_pay::config::PoyntConfig;
use poynt_pay::domain::payment::PaymentDefaults;
use poynt_pay::infrastructure::poynt::cloud_message::CloudMessageSender;
use poynt_pay::infrastructure::poynt::token::TokenClient;
use poynt_pay::interfaces::http::{self, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Poynt cloud configuration file (JSON)
    #[arg(long, default_value = "config/poynt.json")]
    config: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Seconds a payment waits for the terminal's callback
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Public URL the terminal posts results to. Defaults to this server's /callback.
    #[arg(long)]
    callback_url: Option<String>,

    /// ISO currency code sent with each sale
    #[arg(long, default_value = "NZD")]
    currency: String,

    /// Order identifier attached to each sale
    #[arg(long, default_value = "poynt-pay")]
    order_id: String,

    /// Dispatch sales as credit instead of debit
    #[arg(long)]
    credit: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = PoyntConfig::load(&cli.config).into_diagnostic()?;

    let defaults = PaymentDefaults {
        currency: cli.currency,
        callback_url: cli
            .callback_url
            .unwrap_or_else(|| format!("http://{}/callback", cli.bind)),
        order_id: cli.order_id,
        is_debit: !cli.credit,
    };

    let sender = Arc::new(CloudMessageSender::new(&config).into_diagnostic()?);
    let tokens = Arc::new(TokenClient::new(&config).into_diagnostic()?);
    let gateway = Arc::new(PaymentGateway::new(
        sender,
        Arc::new(CredentialCache::new(tokens)),
        defaults,
        Duration::from_secs(cli.timeout_secs),
    ));

    // Not fatal: the first payment retries the grant.
    if let Err(e) = gateway.authenticate().await {
        tracing::error!(error = %e, "initial authentication failed");
    }

    let listener = TcpListener::bind(cli.bind).await.into_diagnostic()?;
    tracing::info!(addr = %cli.bind, timeout_secs = cli.timeout_secs, "payment gateway listening");
    http::serve(listener, AppState::new(gateway))
        .await
        .into_diagnostic()?;

    Ok(())
}
