//! Inbound request payload, defaults and validation.

use crate::error::GatewayError;
use serde::Deserialize;

/// Raw `/find_config` body as sent by the caller.
///
/// Integers are signed so that negative values reach [`ConfigPayload::validate`]
/// and get reported against their field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigPayload {
    #[serde(default = "default_target")]
    pub target: f64,
    #[serde(default = "default_branches")]
    pub branches: i64,
    #[serde(default = "default_fixed")]
    pub fixed: f64,
    #[serde(default = "default_max_parallel")]
    pub max_parallel: i64,
    /// `null` is treated like an omitted field.
    #[serde(default)]
    pub available: Option<Vec<f64>>,
}

fn default_target() -> f64 { 75.0 }
fn default_branches() -> i64 { 3 }
fn default_fixed() -> f64 { 2.5 }
fn default_max_parallel() -> i64 { 20 }
fn default_available() -> Vec<f64> { vec![5.0, 10.0, 50.0] }

impl Default for ConfigPayload {
    fn default() -> Self {
        Self {
            target: default_target(),
            branches: default_branches(),
            fixed: default_fixed(),
            max_parallel: default_max_parallel(),
            available: None,
        }
    }
}

/// A request that passed validation. Immutable from here on.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRequest {
    pub target: f64,
    pub branches: u64,
    pub fixed: f64,
    pub max_parallel: u64,
    pub available: Vec<f64>,
}

impl ConfigPayload {
    /// Check every field constraint, failing on the first violation.
    pub fn validate(self) -> Result<ConfigRequest, GatewayError> {
        let target = positive("target", self.target)?;

        let branches = u64::try_from(self.branches)
            .ok()
            .filter(|&b| b > 0)
            .ok_or_else(|| GatewayError::validation("branches", "must be greater than 0"))?;

        let fixed = positive("fixed", self.fixed)?;

        let max_parallel = u64::try_from(self.max_parallel).map_err(|_| {
            GatewayError::validation("max_parallel", "must be greater than or equal to 0")
        })?;

        let available = self.available.unwrap_or_else(default_available);
        if available.is_empty() {
            return Err(GatewayError::validation(
                "available",
                "must contain at least one value",
            ));
        }
        if let Some(index) = available.iter().position(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(GatewayError::validation(
                "available",
                format!("value at index {index} must be a positive number"),
            ));
        }

        Ok(ConfigRequest {
            target,
            branches,
            fixed,
            max_parallel,
            available,
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, GatewayError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GatewayError::validation(field, "must be a positive number"))
    }
}
