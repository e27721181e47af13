//! Threshold configuration assembly for the CLI.
//!
//! Effective thresholds are built in three layers: defaults, an optional
//! JSON file, then `key:value` overrides from the command line. The result
//! is validated once and never changed afterwards.

use std::path::Path;

use agroclim_core::quality::{ConfigValidationError, SeasonalBaseline, Thresholds};
use agroclim_core::{AgroclimError, Result};
use tracing::{debug, warn};

/// Reads thresholds from a JSON file.
///
/// Omitted keys keep their defaults; unknown keys are rejected.
pub async fn load_thresholds_file(path: &Path) -> Result<Thresholds> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AgroclimError::Io {
            context: format!("Failed to read thresholds from {}", path.display()),
            source: e,
        })?;
    serde_json::from_str(&text).map_err(|e| {
        AgroclimError::serialization(format!("parsing thresholds file {}", path.display()), e)
    })
}

/// Applies `key:value` overrides to `thresholds`.
///
/// Unknown keys and unparsable values are logged and skipped, matching how
/// other overrides are handled. Returns the number of overrides applied.
pub fn apply_overrides(thresholds: &mut Thresholds, overrides: &[String]) -> usize {
    let mut applied = 0;
    for entry in overrides {
        let Some((key, value)) = entry.split_once(':') else {
            warn!("Ignoring malformed threshold override '{}' (expected key:value)", entry);
            continue;
        };
        match thresholds.set(key, value) {
            Ok(()) => {
                debug!("Threshold override {} = {}", key.trim(), value.trim());
                applied += 1;
            }
            Err(ConfigValidationError::UnknownKey(name)) => {
                warn!(
                    "Unknown threshold: {} (known: {})",
                    name,
                    Thresholds::KEYS.join(", ")
                );
            }
            Err(e) => warn!("{}", e),
        }
    }
    applied
}

/// Builds validated thresholds from an optional file and overrides.
pub async fn resolve_thresholds(file: Option<&Path>, overrides: &[String]) -> Result<Thresholds> {
    let mut thresholds = match file {
        Some(path) => load_thresholds_file(path).await?,
        None => Thresholds::default(),
    };
    apply_overrides(&mut thresholds, overrides);
    thresholds.validate()?;
    Ok(thresholds)
}

/// Chooses the seasonal baseline from optional fixed per-season means.
pub fn resolve_baseline(kharif_mm: Option<f64>, rabi_mm: Option<f64>) -> Result<SeasonalBaseline> {
    match (kharif_mm, rabi_mm) {
        (None, None) => Ok(SeasonalBaseline::InSample),
        (Some(kharif_mm), Some(rabi_mm)) => {
            if kharif_mm > 0.0 && rabi_mm > 0.0 {
                Ok(SeasonalBaseline::Fixed { kharif_mm, rabi_mm })
            } else {
                Err(AgroclimError::configuration(
                    "fixed seasonal baselines must be positive",
                ))
            }
        }
        _ => Err(AgroclimError::configuration(
            "both --kharif-baseline and --rabi-baseline are required for a fixed baseline",
        )),
    }
}
