// # zonectl - zone and record reconciliation
//
// This binary is a thin integration layer. It is responsible for:
// 1. Parsing arguments (with environment fallbacks)
// 2. Initializing logging and the runtime
// 3. Registering providers and building the configured one
// 4. Running exactly one reconciliation and printing its report
//
// No DNS logic lives here; all of it is in zonectl-core.
//
// ## Configuration
//
// - `ZONECTL_PROVIDER`: Provider type (google_cloud, memory)
// - `ZONECTL_PROVIDER_CONFIG`: JSON provider config file (overrides the flags below)
// - `GOOGLE_CLOUD_PROJECT`: Project owning the managed zones
// - `ZONECTL_ACCESS_TOKEN`: OAuth2 bearer token
// - `ZONECTL_DRY_RUN`: Report without mutating
// - `ZONECTL_LOG_LEVEL`: trace, debug, info, warn, error (default: warn)
//
// ## Example
//
// ```bash
// export GOOGLE_CLOUD_PROJECT=my-project
// export ZONECTL_ACCESS_TOKEN="$(gcloud auth print-access-token)"
//
// zonectl zone --zone example.com --description "primary"
// zonectl record --zone example.com --record www.example.com --type A --value 192.0.2.1
// ```
//
// The report is printed to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use zonectl_core::model::DEFAULT_TTL;
use zonectl_core::{
    DesiredState, Engine, EngineConfig, ProviderConfig, ProviderRegistry, RecordRequest,
    ZoneRequest,
};

/// Exit codes for the possible outcomes of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZonectlExitCode {
    /// Reconciled (changed or not)
    Success = 0,
    /// Bad arguments, configuration, or startup failure
    ConfigError = 1,
    /// The reconciliation itself failed
    ReconcileFailed = 2,
}

impl From<ZonectlExitCode> for ExitCode {
    fn from(code: ZonectlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "zonectl")]
#[command(about = "Reconcile DNS zones and records against a managed DNS service", long_about = None)]
#[command(version)]
struct Cli {
    /// Decide and report, but make no changes
    #[arg(long, global = true, env = "ZONECTL_DRY_RUN")]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "ZONECTL_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Provider type
    #[arg(long, global = true, env = "ZONECTL_PROVIDER", default_value = "google_cloud")]
    provider: String,

    /// JSON provider configuration file
    #[arg(long, global = true, env = "ZONECTL_PROVIDER_CONFIG")]
    provider_config: Option<PathBuf>,

    /// Google Cloud project ID
    #[arg(long, global = true, env = "GOOGLE_CLOUD_PROJECT")]
    project_id: Option<String>,

    /// Google Cloud OAuth2 access token
    #[arg(long, global = true, env = "ZONECTL_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Snapshot file for the memory provider
    #[arg(long, global = true)]
    snapshot: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile one record
    Record {
        #[arg(long, default_value = "present")]
        state: DesiredState,

        /// Fully-qualified record name
        #[arg(long, visible_alias = "name")]
        record: String,

        /// Domain of the zone holding the record
        #[arg(long)]
        zone: String,

        /// Record type (A, AAAA, CNAME, MX, ...)
        #[arg(long = "type")]
        record_type: String,

        /// Record value; repeat for multiple values
        #[arg(long = "value")]
        values: Vec<String>,

        #[arg(long, default_value_t = i64::from(DEFAULT_TTL), allow_negative_numbers = true)]
        ttl: i64,

        /// Replace a differing record, or remove one without matching values
        #[arg(long)]
        overwrite: bool,
    },

    /// Reconcile one zone
    Zone {
        #[arg(long, default_value = "present")]
        state: DesiredState,

        /// Zone domain
        #[arg(long)]
        zone: String,

        /// Description used when creating the zone
        #[arg(long, default_value = "")]
        description: String,

        /// Fail if an existing zone's description differs
        #[arg(long)]
        require_extra: bool,
    },
}

impl Cli {
    /// Build the provider configuration from the file or the flags
    fn provider_config(&self) -> Result<ProviderConfig> {
        if let Some(path) = &self.provider_config {
            return ProviderConfig::from_file(path)
                .with_context(|| format!("Failed to load provider config {}", path.display()));
        }

        let config = match self.provider.as_str() {
            "google_cloud" => ProviderConfig::GoogleCloud {
                project_id: self
                    .project_id
                    .clone()
                    .context("--project-id (or GOOGLE_CLOUD_PROJECT) is required")?,
                access_token: self
                    .access_token
                    .clone()
                    .context("--access-token (or ZONECTL_ACCESS_TOKEN) is required")?,
            },
            "memory" => ProviderConfig::Memory {
                snapshot: self.snapshot.clone(),
            },
            other => bail!(
                "Provider '{}' is not supported. Supported providers: google_cloud, memory",
                other
            ),
        };
        config.validate()?;
        Ok(config)
    }

    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            dry_run: self.dry_run,
        }
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => bail!(
            "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn registry() -> ProviderRegistry {
    let registry = ProviderRegistry::with_builtin();

    #[cfg(feature = "gcloud")]
    zonectl_provider_gcloud::register(&registry);

    debug!("Registered providers: {:?}", registry.list_providers());
    registry
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match parse_log_level(&cli.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ZonectlExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonectlExitCode::ConfigError.into();
    }

    let engine = match build_engine(&cli) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            eprintln!("Configuration error: {:#}", e);
            return ZonectlExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonectlExitCode::ConfigError.into();
        }
    };

    match rt.block_on(run(&engine, cli.command)) {
        Ok(code) => code.into(),
        Err(e) => {
            error!("Failed to write report: {}", e);
            ZonectlExitCode::ConfigError.into()
        }
    }
}

fn build_engine(cli: &Cli) -> Result<Engine> {
    let config = cli.provider_config()?;
    let provider = registry().create_provider(&config)?;

    info!(
        "Using provider {} [mode: {}]",
        provider.provider_name(),
        if cli.dry_run { "DRY-RUN" } else { "LIVE" }
    );

    Ok(Engine::new(provider, cli.engine_config()))
}

/// Run one reconciliation and print its report
async fn run(engine: &Engine, command: Command) -> Result<ZonectlExitCode> {
    let (report, failed) = match command {
        Command::Record {
            state,
            record,
            zone,
            record_type,
            values,
            ttl,
            overwrite,
        } => {
            let request = RecordRequest::new(record, zone, record_type)
                .with_state(state)
                .with_values(values)
                .with_ttl(ttl)
                .with_overwrite(overwrite);
            let report = engine.reconcile_record(&request).await;
            (serde_json::to_string_pretty(&report)?, report.failed())
        }
        Command::Zone {
            state,
            zone,
            description,
            require_extra,
        } => {
            let request = ZoneRequest::new(zone)
                .with_state(state)
                .with_description(description)
                .with_require_extra(require_extra);
            let report = engine.reconcile_zone(&request).await;
            (serde_json::to_string_pretty(&report)?, report.failed())
        }
    };

    println!("{}", report);

    Ok(if failed {
        ZonectlExitCode::ReconcileFailed
    } else {
        ZonectlExitCode::Success
    })
}
