//! REST DTOs for calculator-gateway
//!
//! JSON shapes of `POST /add`.

use calculator_sdk::{CalculationRequest, CalculationResult, Constraints, Severity};
use chrono::SecondsFormat;
use serde::{Deserialize, Deserializer, Serialize};

/// Request to add a list of numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddRequest {
    /// A missing field is treated like an empty list.
    #[serde(default)]
    pub numbers: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Limits beyond `u32::MAX` are clamped to it.
    #[serde(
        default,
        deserialize_with = "saturating_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_numbers: Option<u32>,
}

fn saturating_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<u64>::deserialize(deserializer)?;
    Ok(value.map(|v| u32::try_from(v).unwrap_or(u32::MAX)))
}

impl AddRequest {
    /// Constraints are attached only when at least one bound is present.
    #[must_use]
    pub fn into_domain(self, request_id: String) -> CalculationRequest {
        CalculationRequest {
            numbers: self.numbers,
            request_id: Some(request_id),
            constraints: Constraints::from_parts(self.min_value, self.max_value, self.max_numbers),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationMetadata {
    pub calculation_time: String,
    pub numbers_processed: u32,
    pub calculation_method: String,
}

/// Successful addition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddResponse {
    pub result: f64,
    pub request_id: String,
    pub calculation_metadata: CalculationMetadata,
}

impl From<CalculationResult> for AddResponse {
    fn from(res: CalculationResult) -> Self {
        Self {
            result: res.value,
            request_id: res.request_id,
            calculation_metadata: CalculationMetadata {
                calculation_time: res
                    .metadata
                    .computed_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                numbers_processed: res.metadata.count_processed,
                calculation_method: res.metadata.method,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    pub severity: Severity,
}

/// Failed addition. `result` is always `0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub result: f64,
    pub request_id: String,
    pub error: ErrorInfo,
}
