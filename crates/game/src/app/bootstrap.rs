use controller::LoopConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

const PERF_OVERLAY_ENV_VAR: &str = "IRONWORKS_PERF_OVERLAY";
const SAVE_KEY: &str = "sandbox";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Ironworks Startup ===");

    let config = LoopConfig {
        window_title: format!("Ironworks {}", env!("CARGO_PKG_VERSION")),
        perf_overlay: parse_flag(std::env::var(PERF_OVERLAY_ENV_VAR).ok().as_deref()),
        save_key: SAVE_KEY.to_string(),
        ..LoopConfig::default()
    };

    AppWiring { config }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(str::trim)
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"))
}
