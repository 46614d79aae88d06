//! Editor configuration.

use rf_core::graph::CanvasBounds;
use rf_store::config::StoreConfig;
use rf_store::StoreError;

#[derive(Debug, Clone, Default)]
pub struct EditorConfig {
    /// Area random node positions are drawn from.
    pub canvas: CanvasBounds,
    pub store: StoreConfig,
}

impl EditorConfig {
    /// Store settings from [`StoreConfig::from_env`], plus
    /// `RULEFLOW_CANVAS_WIDTH` / `RULEFLOW_CANVAS_HEIGHT`.
    pub fn from_env() -> Result<Self, StoreError> {
        let defaults = CanvasBounds::default();
        Ok(Self {
            canvas: CanvasBounds {
                width: dimension("RULEFLOW_CANVAS_WIDTH", defaults.width)?,
                height: dimension("RULEFLOW_CANVAS_HEIGHT", defaults.height)?,
            },
            store: StoreConfig::from_env()?,
        })
    }
}

fn dimension(var: &str, default: f64) -> Result<f64, StoreError> {
    match std::env::var(var) {
        Ok(raw) => parse_dimension(var, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_dimension(var: &str, raw: &str) -> Result<f64, StoreError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| StoreError::Config(format!("invalid {var}: {e}")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(StoreError::Config(format!("{var} must be a positive number")));
    }
    Ok(value)
}
