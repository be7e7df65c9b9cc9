//! Tracing / logging initialisation helpers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level per component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: component_name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            components: HashMap::new(),
            json: false,
        }
    }
}

/// Transport crates that flood debug output with frame-level noise. Held at
/// warn unless the config raises them explicitly.
const QUIET_COMPONENTS: &[&str] = &["tokio_tungstenite", "tungstenite", "hyper", "reqwest"];

/// Build the filter directive string: global level, then the quiet list,
/// then per-component overrides ("info,tungstenite=warn,chainrelay_stream=debug").
fn directive_string(config: &LogConfig) -> String {
    let mut directives = config.level.clone();
    for component in QUIET_COMPONENTS {
        let overridden = config
            .components
            .keys()
            .any(|k| k.replace('-', "_") == *component);
        if !overridden {
            directives.push_str(&format!(",{component}=warn"));
        }
    }
    for (component, level) in &config.components {
        directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
    }
    directives
}

/// Initialise tracing with the given log config.
/// Should be called once at application startup.
pub fn init_tracing(config: &LogConfig) {
    let filter =
        EnvFilter::try_new(directive_string(config)).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}
