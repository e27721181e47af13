//! Validation threshold configuration.
//!
//! [`Thresholds`] is the single tunable input of the validation core. It is
//! built once (defaults, a JSON file, CLI overrides), validated, and then
//! passed by reference into every check for the rest of the run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation bounds and anomaly thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Maximum plausible daily rainfall (mm)
    pub rainfall_max: f64,
    /// Minimum plausible daily mean temperature (°C)
    pub temp_min: f64,
    /// Maximum plausible daily mean temperature (°C)
    pub temp_max: f64,
    /// Rainfall below this amount (mm) counts as a dry day
    pub dry_day_max_mm: f64,
    /// Minimum run of dry days reported as a dry spell
    pub dry_spell_min_days: u32,
    /// Seasonal ratio below which a season-year is a drought
    pub drought_ratio: f64,
    /// Seasonal ratio above which a season-year has excess rainfall
    pub excess_ratio: f64,
    /// Temperature above which a day is a heat-stress day (°C)
    pub heat_stress_c: f64,
    /// Temperature below which a day is a cold-stress day (°C)
    pub cold_stress_c: f64,
}

/// Validation errors for threshold configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("rainfall_max must be positive, got {0}")]
    InvalidRainfallMax(f64),
    #[error("temp_min ({min}) must be below temp_max ({max})")]
    InvalidTemperatureBounds { min: f64, max: f64 },
    #[error("cold_stress_c ({cold}) must be below heat_stress_c ({heat})")]
    InvalidStressBounds { cold: f64, heat: f64 },
    #[error("drought_ratio must be in (0.0, 1.0], got {0}")]
    InvalidDroughtRatio(f64),
    #[error("excess_ratio must be at least 1.0, got {0}")]
    InvalidExcessRatio(f64),
    #[error("dry_spell_min_days must be at least 1")]
    InvalidDrySpellLength,
    #[error("dry_day_max_mm must be non-negative, got {0}")]
    InvalidDryDay(f64),
    #[error("threshold values must be finite")]
    NonFinite,
    #[error("unknown threshold '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for threshold '{key}'")]
    InvalidValue { key: String, value: String },
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rainfall_max: 150.0,
            temp_min: -5.0,
            temp_max: 50.0,
            dry_day_max_mm: 1.0,
            dry_spell_min_days: 15,
            drought_ratio: 0.8,
            excess_ratio: 1.2,
            heat_stress_c: 35.0,
            cold_stress_c: 15.0,
        }
    }
}

impl Thresholds {
    /// Names accepted by [`Thresholds::set`].
    pub const KEYS: [&'static str; 9] = [
        "rainfall_max",
        "temp_min",
        "temp_max",
        "dry_day_max_mm",
        "dry_spell_min_days",
        "drought_ratio",
        "excess_ratio",
        "heat_stress_c",
        "cold_stress_c",
    ];

    /// Creates thresholds with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the rainfall upper bound.
    pub fn with_rainfall_max(mut self, mm: f64) -> Self {
        self.rainfall_max = mm;
        self
    }

    /// Builder method to set the temperature bounds.
    pub fn with_temperature_bounds(mut self, min: f64, max: f64) -> Self {
        self.temp_min = min;
        self.temp_max = max;
        self
    }

    /// Builder method to set the minimum dry-spell length.
    pub fn with_dry_spell_min_days(mut self, days: u32) -> Self {
        self.dry_spell_min_days = days;
        self
    }

    /// Builder method to set the dry-day rainfall cutoff.
    pub fn with_dry_day_max_mm(mut self, mm: f64) -> Self {
        self.dry_day_max_mm = mm;
        self
    }

    /// Builder method to set the seasonal drought and excess ratios.
    pub fn with_seasonal_ratios(mut self, drought: f64, excess: f64) -> Self {
        self.drought_ratio = drought;
        self.excess_ratio = excess;
        self
    }

    /// Builder method to set the heat and cold stress temperatures.
    pub fn with_stress_temperatures(mut self, heat: f64, cold: f64) -> Self {
        self.heat_stress_c = heat;
        self.cold_stress_c = cold;
        self
    }

    /// Sets one threshold by name from its textual value.
    ///
    /// Used for `key:value` overrides. The result is not validated; call
    /// [`Thresholds::validate`] once all overrides are applied.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigValidationError> {
        let key = key.trim().to_lowercase();
        let invalid = || ConfigValidationError::InvalidValue {
            key: key.clone(),
            value: value.to_string(),
        };

        if key == "dry_spell_min_days" {
            self.dry_spell_min_days = value.trim().parse::<u32>().map_err(|_| invalid())?;
            return Ok(());
        }

        let parsed = value.trim().parse::<f64>().map_err(|_| invalid())?;
        let slot = match key.as_str() {
            "rainfall_max" => &mut self.rainfall_max,
            "temp_min" => &mut self.temp_min,
            "temp_max" => &mut self.temp_max,
            "dry_day_max_mm" => &mut self.dry_day_max_mm,
            "drought_ratio" => &mut self.drought_ratio,
            "excess_ratio" => &mut self.excess_ratio,
            "heat_stress_c" => &mut self.heat_stress_c,
            "cold_stress_c" => &mut self.cold_stress_c,
            _ => return Err(ConfigValidationError::UnknownKey(key.clone())),
        };
        *slot = parsed;
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// Returns an error if any bound is non-finite or inconsistent.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let floats = [
            self.rainfall_max,
            self.temp_min,
            self.temp_max,
            self.dry_day_max_mm,
            self.drought_ratio,
            self.excess_ratio,
            self.heat_stress_c,
            self.cold_stress_c,
        ];
        if floats.iter().any(|v| !v.is_finite()) {
            return Err(ConfigValidationError::NonFinite);
        }
        if self.rainfall_max <= 0.0 {
            return Err(ConfigValidationError::InvalidRainfallMax(self.rainfall_max));
        }
        if self.temp_min >= self.temp_max {
            return Err(ConfigValidationError::InvalidTemperatureBounds {
                min: self.temp_min,
                max: self.temp_max,
            });
        }
        if self.cold_stress_c >= self.heat_stress_c {
            return Err(ConfigValidationError::InvalidStressBounds {
                cold: self.cold_stress_c,
                heat: self.heat_stress_c,
            });
        }
        if !(self.drought_ratio > 0.0 && self.drought_ratio <= 1.0) {
            return Err(ConfigValidationError::InvalidDroughtRatio(
                self.drought_ratio,
            ));
        }
        if self.excess_ratio < 1.0 {
            return Err(ConfigValidationError::InvalidExcessRatio(self.excess_ratio));
        }
        if self.dry_spell_min_days == 0 {
            return Err(ConfigValidationError::InvalidDrySpellLength);
        }
        if self.dry_day_max_mm < 0.0 {
            return Err(ConfigValidationError::InvalidDryDay(self.dry_day_max_mm));
        }
        Ok(())
    }
}
