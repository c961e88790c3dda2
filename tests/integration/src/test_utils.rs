//! Test utilities for end-to-end pipeline tests

use geofix_acquisition::testing::{CachedBehavior, ManualTimer, ScriptedProvider};
use geofix_acquisition::{AcquisitionError, FixResolver, StaticPermissionStore};
use geofix_core::{AcquisitionConfig, Coordinate, Fix, FixSource};
use std::sync::{Arc, Mutex};

/// Outcomes delivered to an acquisition callback
pub type Outcomes = Arc<Mutex<Vec<Result<Fix, AcquisitionError>>>>;

/// Install a test-friendly tracing subscriber once per process
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Build a fix from raw degrees
pub fn fix_at(latitude: f64, longitude: f64, accuracy_m: f32, source: FixSource) -> Fix {
    Fix::new(Coordinate::unchecked(latitude, longitude), accuracy_m, source)
}

/// Callback recording every outcome, plus the shared record
pub fn recorder() -> (
    Outcomes,
    impl FnOnce(Result<Fix, AcquisitionError>) + Send + 'static,
) {
    let outcomes: Outcomes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&outcomes);
    (outcomes, move |outcome| sink.lock().unwrap().push(outcome))
}

/// Resolver wired to scripted collaborators
pub struct Harness {
    pub provider: Arc<ScriptedProvider>,
    pub timer: Arc<ManualTimer>,
    pub permissions: Arc<StaticPermissionStore>,
    pub resolver: FixResolver,
}

impl Harness {
    /// Harness with all permissions granted and the default config
    pub fn new(cached: CachedBehavior) -> Self {
        Self::with_config(cached, AcquisitionConfig::default())
    }

    /// Harness with all permissions granted and a custom config
    pub fn with_config(cached: CachedBehavior, config: AcquisitionConfig) -> Self {
        let provider = Arc::new(ScriptedProvider::new(cached));
        let timer = Arc::new(ManualTimer::new());
        let permissions = Arc::new(StaticPermissionStore::granted_all());
        let resolver = FixResolver::new(
            provider.clone(),
            timer.clone(),
            permissions.clone(),
            config,
        );
        Self {
            provider,
            timer,
            permissions,
            resolver,
        }
    }
}
