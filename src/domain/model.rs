use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Horizon used when nothing else is configured.
pub const DEFAULT_HORIZON_YEARS: i32 = 5;
/// Upper bound applied by `SelectionController::set_horizon`.
pub const MAX_HORIZON_YEARS: i32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// Quarterly appreciation rows the backend keeps for this project, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quarterly_rows: Vec<serde_json::Value>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quarterly_rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub project: String,
    pub surface_area: f64,
    pub price: f64,
    pub down_payment_ratio: f64,
}

impl Unit {
    /// Dropdown-style label, e.g. `Superficie: 80 m², Precio: $200,000`.
    pub fn description(&self) -> String {
        format!(
            "Superficie: {} m², Precio: {}",
            crate::utils::format::format_amount(self.surface_area),
            crate::utils::format::format_money(self.price)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub selected_project: String,
    pub selected_unit_id: Option<i64>,
    pub horizon_years: i32,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            selected_project: String::new(),
            selected_unit_id: None,
            horizon_years: DEFAULT_HORIZON_YEARS,
        }
    }
}

/// Validated submission built from the selection and the matched unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub project: String,
    pub unit_id: i64,
    pub horizon_years: i32,
    pub price: f64,
    pub surface_area: f64,
    pub down_payment_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyValue {
    pub year: i32,
    pub value: f64,
}

/// Unit details as echoed back by the calculation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitInfo {
    pub id: i64,
    pub surface_area: f64,
    pub price: f64,
    pub down_payment_amount: f64,
    pub down_payment_percentage: f64,
}

/// Raw answer of the calculation service, before it is paired with the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub yearly_values: Vec<YearlyValue>,
    pub selected_project_name: String,
    pub annual_rates: Vec<f64>,
    pub unit_info: UnitInfo,
}

pub type RequestInputs = CalculationRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub yearly_values: Vec<YearlyValue>,
    pub selected_project_name: String,
    pub annual_rates: Vec<f64>,
    pub unit_info: UnitInfo,
    pub request_inputs: RequestInputs,
    pub calculated_at: DateTime<Utc>,
}

impl CalculationResult {
    pub fn from_response(response: CalculationResponse, request_inputs: RequestInputs) -> Self {
        Self {
            yearly_values: response.yearly_values,
            selected_project_name: response.selected_project_name,
            annual_rates: response.annual_rates,
            unit_info: response.unit_info,
            request_inputs,
            calculated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}
