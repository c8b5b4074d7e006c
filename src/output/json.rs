use crate::core::presenter::{self, ChartSpec, InvestmentSummary};
use crate::domain::model::CalculationResult;
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SimulationReport<'a> {
    pub summary: InvestmentSummary,
    pub chart: ChartSpec,
    pub result: &'a CalculationResult,
}

impl<'a> SimulationReport<'a> {
    pub fn build(result: &'a CalculationResult) -> Result<Self> {
        Ok(Self {
            summary: presenter::summarize(result)?,
            chart: presenter::chart_spec(result),
            result,
        })
    }
}

pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
