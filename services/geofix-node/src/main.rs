use anyhow::Context;
use clap::Parser;
use geofix_acquisition::{
    CachedFixCallback, FixResolver, LocationProvider, PermissionStore, ProviderError,
    StaticPermissionStore, SubscriptionId, TokioTimer, UpdateCallback,
};
use geofix_analysis::{
    analyze, decode_block_info, evaluate_fix, report, share, FixAssessment, SpatialAnalysis,
};
use geofix_core::{logging, Coordinate, Fix, FixSource, GeoFixConfig, LiveRequestConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

const NODE_REPORT_VERSION: u32 = 1;
const NODE_RUNTIME_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct NodeVersionHandshake {
    version: &'static str,
    runtime_version: u32,
    report_version: u32,
}

#[derive(Serialize)]
struct NodeReport<'a> {
    assessment: &'a FixAssessment,
    analysis: SpatialAnalysis,
    maps_link: String,
}

#[derive(Debug, Parser)]
#[command(name = "geofix-node")]
#[command(about = "Acquire a location fix and print its geo-validation report", long_about = None)]
#[command(version)]
struct NodeArgs {
    /// Configuration file; JSON by extension, TOML otherwise
    #[arg(long, env = "GEOFIX_CONFIG")]
    config: Option<PathBuf>,

    /// Latitude served as the cached fix
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude served as the cached fix
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Accuracy radius of the given position in meters
    #[arg(long, default_value_t = 0.0)]
    accuracy: f32,

    /// Override the acquisition deadline
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print JSON instead of text reports
    #[arg(long)]
    json: bool,

    /// Act as if location permission was refused
    #[arg(long)]
    deny_permission: bool,

    /// Print the version handshake and exit
    #[arg(long)]
    version_json: bool,
}

impl NodeArgs {
    fn position(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}

/// Provider backed by a position given on the command line.
///
/// The position is served as the cached fix. There is no live source, so
/// without a position every acquisition runs into the deadline.
struct StaticProvider {
    fix: Option<Fix>,
}

impl LocationProvider for StaticProvider {
    fn last_known_fix(&self, on_complete: CachedFixCallback) -> Result<(), ProviderError> {
        on_complete(Ok(self.fix));
        Ok(())
    }

    fn subscribe(
        &self,
        request: &LiveRequestConfig,
        _on_update: UpdateCallback,
    ) -> Result<SubscriptionId, ProviderError> {
        debug!(priority = ?request.priority, "No live source; subscription stays silent");
        Ok(SubscriptionId(1))
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        debug!(subscription = subscription.0, "Unsubscribed");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let node_args = NodeArgs::parse();

    if node_args.version_json {
        let handshake = NodeVersionHandshake {
            version: env!("CARGO_PKG_VERSION"),
            runtime_version: NODE_RUNTIME_VERSION,
            report_version: NODE_REPORT_VERSION,
        };
        println!("{}", serde_json::to_string(&handshake)?);
        return Ok(());
    }

    let mut config = load_config(node_args.config.as_deref())?;
    if let Some(timeout_ms) = node_args.timeout_ms {
        config.acquisition.timeout_ms = timeout_ms;
        config.acquisition.validate()?;
    }
    logging::init_with(&config.logging);

    let fix = node_args.position().map(|(lat, lon)| {
        Fix::new(
            Coordinate::unchecked(lat, lon),
            node_args.accuracy,
            FixSource::Cached,
        )
    });
    let permissions: Arc<dyn PermissionStore> = if node_args.deny_permission {
        Arc::new(StaticPermissionStore::denied())
    } else {
        Arc::new(StaticPermissionStore::granted_all())
    };
    let resolver = FixResolver::new(
        Arc::new(StaticProvider { fix }),
        Arc::new(TokioTimer::new(Handle::current())),
        permissions,
        config.acquisition.clone(),
    );

    info!(timeout_ms = config.acquisition.timeout_ms, "Acquiring location fix");
    let fix = match resolver.acquire_async().await {
        Ok(fix) => fix,
        Err(err) => {
            warn!(code = err.code(), reason = %err.reason, "Acquisition failed");
            if node_args.json {
                println!("{}", serde_json::to_string_pretty(&err)?);
            }
            return Err(err.into());
        }
    };

    let assessment = evaluate_fix(&fix);
    let coordinate = fix.coordinate;

    if node_args.json {
        let node_report = NodeReport {
            assessment: &assessment,
            analysis: analyze(&coordinate),
            maps_link: share::maps_link(&coordinate),
        };
        println!("{}", serde_json::to_string_pretty(&node_report)?);
        return Ok(());
    }

    println!(
        "{} ({})",
        report::format_coordinates(&coordinate),
        report::format_accuracy(fix.accuracy_m)
    );
    println!();
    println!("{}", report::block_report(&decode_block_info(&coordinate)));
    println!();
    println!("{}", report::spatial_report(&analyze(&coordinate)));
    println!();
    println!("{}", report::verdict_report(&assessment.verdict));
    println!();
    println!("{}", share::share_text(&coordinate, None));

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GeoFixConfig> {
    let Some(path) = path else {
        return Ok(GeoFixConfig::default());
    };

    let config = if GeoFixConfig::is_json_path(path) {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        GeoFixConfig::from_json_str(&raw)?
    } else {
        GeoFixConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
    };
    Ok(config)
}
