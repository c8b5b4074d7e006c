//! Display aggregates derived from a `CalculationResult`. Pure functions, no I/O.

use crate::domain::model::CalculationResult;
use crate::utils::error::{Result, SimError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub dataset_label: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentSummary {
    pub project: String,
    pub surface_area: f64,
    pub horizon_years: i32,
    pub down_payment_ratio: f64,
    pub down_payment: f64,
    pub price: f64,
    pub final_value: f64,
    pub appreciation: f64,
    pub return_pct: f64,
}

/// `price * down_payment_ratio`. Ratios outside [0, 1] are not rejected.
pub fn down_payment(result: &CalculationResult) -> f64 {
    let inputs = &result.request_inputs;
    inputs.price * inputs.down_payment_ratio
}

/// Value of the last element in sequence order; the series is not re-sorted.
pub fn final_value(result: &CalculationResult) -> Result<f64> {
    result
        .yearly_values
        .last()
        .map(|v| v.value)
        .ok_or(SimError::EmptySeries)
}

pub fn appreciation(result: &CalculationResult) -> Result<f64> {
    Ok(final_value(result)? - result.request_inputs.price)
}

pub fn return_pct(result: &CalculationResult) -> Result<f64> {
    let price = result.request_inputs.price;
    if price == 0.0 {
        return Err(SimError::invalid_input(
            "price is zero; return percentage is undefined",
        ));
    }
    Ok((final_value(result)? / price - 1.0) * 100.0)
}

pub fn build_series(result: &CalculationResult) -> Vec<SeriesPoint> {
    result
        .yearly_values
        .iter()
        .map(|v| SeriesPoint {
            label: format!("Año {}", v.year),
            value: v.value,
        })
        .collect()
}

pub fn chart_spec(result: &CalculationResult) -> ChartSpec {
    let project = &result.selected_project_name;
    ChartSpec {
        title: format!("Evolución de la inversión en {}", project),
        dataset_label: format!("{} (Inversión Inmobiliaria)", project),
        points: build_series(result),
    }
}

pub fn summarize(result: &CalculationResult) -> Result<InvestmentSummary> {
    let inputs = &result.request_inputs;
    Ok(InvestmentSummary {
        project: result.selected_project_name.clone(),
        surface_area: inputs.surface_area,
        horizon_years: inputs.horizon_years,
        down_payment_ratio: inputs.down_payment_ratio,
        down_payment: down_payment(result),
        price: inputs.price,
        final_value: final_value(result)?,
        appreciation: appreciation(result)?,
        return_pct: return_pct(result)?,
    })
}
