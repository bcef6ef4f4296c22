mod config;

use campaigns::{CampaignRegistry, Destination, DestinationOrigin};
use clap::{Args, Parser};
use config::{Config, LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
enum CliCommand {
    /// Serve cloak redirects and locale pages
    Serve(ConfigArgs),
    /// Load and validate the configuration, then exit
    Check(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long, short)]
    config: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum SiteError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("invalid campaign configuration: {0}")]
    Campaigns(#[from] campaigns::ConfigError),
    #[error(transparent)]
    Cloak(#[from] cloak::CloakError),
    #[error("could not set up metrics: {0}")]
    Metrics(String),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

fn main() {
    let cli = CliCommand::parse();

    let result = match &cli {
        CliCommand::Serve(args) => serve(&args.config),
        CliCommand::Check(args) => check(&args.config),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "exiting");
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn serve(path: &Path) -> Result<(), SiteError> {
    let config = Config::from_file(path)?;
    let _sentry = init_logging(config.common.logging.as_ref());
    if let Some(metrics_config) = &config.common.metrics {
        init_metrics(metrics_config)?;
    }

    let registry = Arc::new(CampaignRegistry::from_process_env(config.campaigns)?);
    report_destinations(&registry);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(cloak::run(config.cloak, registry))?;
    Ok(())
}

/// Loads everything `serve` would load, against the process environment.
fn check(path: &Path) -> Result<(), SiteError> {
    init_logging(None);
    let config = Config::from_file(path)?;
    let registry = CampaignRegistry::from_process_env(config.campaigns)?;
    config
        .cloak
        .validate(&registry)
        .map_err(cloak::CloakError::from)?;

    report_destinations(&registry);
    println!("configuration ok: {} campaign(s)", registry.len());
    Ok(())
}

fn report_destinations(registry: &CampaignRegistry) {
    for campaign in registry.campaigns() {
        let locales: Vec<&str> = campaign.locale_codes().collect();
        match campaign.destination() {
            Destination::Configured { origin, .. } => {
                let source = match origin {
                    DestinationOrigin::Static => "affiliate_url",
                    DestinationOrigin::Env(var) => var.as_str(),
                };
                tracing::info!(
                    campaign = campaign.name(),
                    source,
                    ?locales,
                    "affiliate destination configured"
                );
            }
            Destination::Unset => tracing::warn!(
                campaign = campaign.name(),
                env_var = campaign.env_var(),
                ?locales,
                "affiliate destination not configured, cloak links will redirect to the site root"
            ),
        }
    }
}

fn init_logging(logging: Option<&LoggingConfig>) -> Option<sentry::ClientInitGuard> {
    let guard = logging.map(|logging| {
        sentry::init((
            logging.sentry_dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .try_init();

    guard
}

fn init_metrics(metrics_config: &MetricsConfig) -> Result<(), SiteError> {
    let recorder = StatsdBuilder::from(metrics_config.statsd_host.clone(), metrics_config.statsd_port)
        .build(Some("site"))
        .map_err(|e| SiteError::Metrics(e.to_string()))?;
    metrics::set_global_recorder(recorder).map_err(|e| SiteError::Metrics(e.to_string()))?;

    shared::metrics_defs::describe_all(cloak::metrics_defs::ALL_METRICS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaigns::testutils::locale_json;
    use cloak::config::ValidationError;
    use serde_json::{Value, json};
    use std::io::Write;

    // GATE_CHECK_AFFILIATE_URL is never set
    const CAMPAIGN: &str = "gate-check";

    fn site_config(default_campaign: &str, bundle: Value) -> Value {
        json!({
            "cloak": {
                "site_url": "https://bridge.example",
                "default_campaign": default_campaign,
            },
            "campaigns": [{
                "name": CAMPAIGN,
                "locales": {"en-US": bundle},
            }],
        })
    }

    fn write_config(config: &Value) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        let yaml = serde_yaml::to_string(config).expect("serialize yaml");
        write!(tmp, "{}", yaml).expect("write yaml");

        tmp
    }

    #[test]
    fn check_accepts_valid_config() {
        let tmp = write_config(&site_config(CAMPAIGN, locale_json("en-US")));
        assert!(check(tmp.path()).is_ok());
    }

    #[test]
    fn check_rejects_blank_content() {
        let mut bundle = locale_json("en-US");
        bundle["bridge_page"]["hero"]["title"] = json!("   ");
        let tmp = write_config(&site_config(CAMPAIGN, bundle));

        match check(tmp.path()) {
            Err(SiteError::Campaigns(campaigns::ConfigError::ContentSchemaInvalid {
                campaign,
                locale,
                reason,
            })) => {
                assert_eq!(campaign, CAMPAIGN);
                assert_eq!(locale, "en-US");
                assert!(reason.contains("bridge_page.hero.title"), "{reason}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn check_rejects_unknown_default_campaign() {
        let tmp = write_config(&site_config("unknown", locale_json("en-US")));

        assert!(matches!(
            check(tmp.path()),
            Err(SiteError::Cloak(cloak::CloakError::InvalidConfig(
                ValidationError::UnknownDefaultCampaign(_)
            )))
        ));
    }

    #[test]
    fn check_rejects_missing_file() {
        assert!(matches!(
            check(Path::new("/nonexistent/site.yaml")),
            Err(SiteError::Config(config::ConfigError::LoadError(_)))
        ));
    }
}
