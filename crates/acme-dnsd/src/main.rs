// # acme-dnsd - ACME DNS-01 challenge driver
//
// This binary is a THIN integration layer:
// - DO NOT add record name, reconciliation, or retry logic here
// - All challenge logic lives in acme-dns-core
// - Configuration is via environment variables ONLY
//
// acme-dnsd is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers with the zone factory
// 4. Running one `set` or `remove` pass over the configured challenges
//
// ## Configuration
//
// ### Provider
// - `ACME_DNS_PROVIDER`: Provider type (azure, cloudflare)
//
// ### Azure
// - `ACME_DNS_AZURE_ZONE_RESOURCE_ID`: ARM resource id of the DNS zone
// - `ACME_DNS_AZURE_ZONE_OVERRIDE`: Zone name to use instead of the id's last segment (optional)
// - `ACME_DNS_AZURE_ACCESS_TOKEN`: Resource Manager bearer token
//
// ### Cloudflare
// - `ACME_DNS_CLOUDFLARE_API_TOKEN`: API token with DNS edit permission
// - `ACME_DNS_CLOUDFLARE_ZONE_ID`: Zone ID
//
// ### Challenges
// - `ACME_DNS_CHALLENGES`: Comma-separated `identifier=value` pairs
//
// ### Logging
// - `ACME_DNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export ACME_DNS_PROVIDER=cloudflare
// export ACME_DNS_CLOUDFLARE_API_TOKEN=your_token
// export ACME_DNS_CLOUDFLARE_ZONE_ID=your_zone_id
// export ACME_DNS_CHALLENGES=example.com=abc123,www.example.com=def456
//
// acme-dnsd set
// acme-dnsd remove
// ```

use acme_dns_core::{
    DnsChallenge, Order, ProviderKind, ReconcileReport, StaticTokenCredential, ZoneConfig,
    ZoneFactory,
};
use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: All challenge records reconciled
/// - 1: Configuration error (nothing was touched)
/// - 2: Runtime error (remote call failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcmeDnsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<AcmeDnsExitCode> for ExitCode {
    fn from(code: AcmeDnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Operation selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Set,
    Remove,
}

impl Action {
    fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            Some("set") => Ok(Action::Set),
            Some("remove") => Ok(Action::Remove),
            Some(other) => anyhow::bail!("Unknown command '{}'. Usage: acme-dnsd <set|remove>", other),
            None => anyhow::bail!("Missing command. Usage: acme-dnsd <set|remove>"),
        }
    }
}

/// Application configuration
struct Config {
    provider: String,
    azure_zone_resource_id: Option<String>,
    azure_zone_override: Option<String>,
    azure_access_token: Option<String>,
    cloudflare_api_token: Option<String>,
    cloudflare_zone_id: Option<String>,
    challenges: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            provider: env::var("ACME_DNS_PROVIDER").context("ACME_DNS_PROVIDER is required")?,
            azure_zone_resource_id: env::var("ACME_DNS_AZURE_ZONE_RESOURCE_ID").ok(),
            azure_zone_override: env::var("ACME_DNS_AZURE_ZONE_OVERRIDE").ok(),
            azure_access_token: env::var("ACME_DNS_AZURE_ACCESS_TOKEN").ok(),
            cloudflare_api_token: env::var("ACME_DNS_CLOUDFLARE_API_TOKEN").ok(),
            cloudflare_zone_id: env::var("ACME_DNS_CLOUDFLARE_ZONE_ID").ok(),
            challenges: env::var("ACME_DNS_CHALLENGES").unwrap_or_default(),
            log_level: env::var("ACME_DNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Provider-specific fields are checked again by the zone factory; this
    /// pass only gives friendlier messages naming the environment variable.
    fn validate(&self) -> Result<()> {
        let provider: ProviderKind = self.provider.parse().with_context(|| {
            format!(
                "ACME_DNS_PROVIDER '{}' is not supported. Supported providers: azure, cloudflare",
                self.provider
            )
        })?;

        match provider {
            ProviderKind::Azure => {
                require(&self.azure_zone_resource_id, "ACME_DNS_AZURE_ZONE_RESOURCE_ID")?;
                require(&self.azure_access_token, "ACME_DNS_AZURE_ACCESS_TOKEN")?;
            }
            ProviderKind::Cloudflare => {
                require(&self.cloudflare_api_token, "ACME_DNS_CLOUDFLARE_API_TOKEN")?;
                require(&self.cloudflare_zone_id, "ACME_DNS_CLOUDFLARE_ZONE_ID")?;
            }
        }

        if parse_challenges(&self.challenges)?.is_empty() {
            anyhow::bail!(
                "ACME_DNS_CHALLENGES must contain at least one challenge. \
                Set it via: export ACME_DNS_CHALLENGES=example.com=token"
            );
        }

        log_level(&self.log_level)?;
        Ok(())
    }

    /// Build the zone configuration for the selected provider
    fn zone_config(&self) -> Result<ZoneConfig> {
        let provider: ProviderKind = self.provider.parse()?;

        Ok(match provider {
            ProviderKind::Azure => ZoneConfig::azure(
                Arc::new(StaticTokenCredential::new(
                    self.azure_access_token.clone().unwrap_or_default(),
                )),
                self.azure_zone_resource_id.clone().unwrap_or_default(),
                self.azure_zone_override.clone(),
            ),
            ProviderKind::Cloudflare => ZoneConfig::cloudflare(
                self.cloudflare_api_token.clone().unwrap_or_default(),
                self.cloudflare_zone_id.clone().unwrap_or_default(),
            ),
        })
    }
}

fn require(value: &Option<String>, name: &str) -> Result<()> {
    if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
        anyhow::bail!("{} is required for the selected provider", name);
    }
    Ok(())
}

fn log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "ACME_DNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

/// Parse `identifier=value,identifier=value` into an order
fn parse_challenges(raw: &str) -> Result<Order> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (identifier, value) = pair
                .split_once('=')
                .with_context(|| format!("Challenge '{}' is not of the form identifier=value", pair))?;

            let (identifier, value) = (identifier.trim(), value.trim());
            if identifier.is_empty() || value.is_empty() {
                anyhow::bail!("Challenge '{}' has an empty identifier or value", pair);
            }
            Ok(DnsChallenge::new(identifier, value))
        })
        .collect()
}

fn main() -> ExitCode {
    let action = match Action::parse(env::args().nth(1).as_deref()) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", e);
            return AcmeDnsExitCode::ConfigError.into();
        }
    };

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return AcmeDnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return AcmeDnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config.log_level).unwrap_or(Level::INFO))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AcmeDnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AcmeDnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(action, config)).into()
}

/// Run one reconciliation pass
async fn run(action: Action, config: Config) -> AcmeDnsExitCode {
    let factory = ZoneFactory::new();

    #[cfg(feature = "azure")]
    {
        info!("Registering Azure provider");
        acme_dns_azure::register(&factory);
    }

    #[cfg(feature = "cloudflare")]
    {
        info!("Registering Cloudflare provider");
        acme_dns_cloudflare::register(&factory);
    }

    let zone = match config
        .zone_config()
        .and_then(|zc| factory.create(&zc).map_err(anyhow::Error::from))
    {
        Ok(zone) => zone,
        Err(e) => {
            error!("Failed to create DNS zone: {:#}", e);
            return AcmeDnsExitCode::ConfigError;
        }
    };

    let mut order = match parse_challenges(&config.challenges) {
        Ok(order) => order,
        Err(e) => {
            error!("Invalid challenges: {:#}", e);
            return AcmeDnsExitCode::ConfigError;
        }
    };

    let result = match action {
        Action::Set => zone.set_challenge_records(&mut order).await,
        Action::Remove => zone.remove_challenge_records(&mut order).await,
    };

    match result {
        Ok(report) => {
            log_report(&report);
            AcmeDnsExitCode::Success
        }
        Err(e) if e.is_configuration() || matches!(e, acme_dns_core::Error::Mapping { .. }) => {
            error!("Challenge records not touched: {}", e);
            AcmeDnsExitCode::ConfigError
        }
        Err(e) => {
            error!("Challenge reconciliation failed: {}", e);
            AcmeDnsExitCode::RuntimeError
        }
    }
}

fn log_report(report: &ReconcileReport) {
    for (record, change) in &report.changes {
        info!(record = record.as_str(), change = ?change, "TXT record set reconciled");
    }
    info!(
        records = report.changes.len(),
        mutations = report.mutations(),
        "Done"
    );
}
