use crate::core::selection::SelectionController;
use crate::domain::model::CalculationResult;
use crate::domain::ports::{CalculationService, ProjectDirectory};
use crate::utils::error::Result;

/// Ties the selection controller to the calculation service and keeps the latest result.
pub struct Simulator<D: ProjectDirectory, C: CalculationService> {
    selection: SelectionController<D>,
    calculator: C,
    result: Option<CalculationResult>,
}

impl<D: ProjectDirectory, C: CalculationService> Simulator<D, C> {
    pub fn new(selection: SelectionController<D>, calculator: C) -> Self {
        Self {
            selection,
            calculator,
            result: None,
        }
    }

    pub fn selection(&self) -> &SelectionController<D> {
        &self.selection
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    pub fn result(&self) -> Option<&CalculationResult> {
        self.result.as_ref()
    }

    pub async fn start(&self) -> Result<usize> {
        tracing::info!("Starting simulator: loading projects");
        self.selection.load_projects().await
    }

    /// Validates the selection, calls the backend and replaces the current result.
    /// A failed call leaves the previous result in place.
    pub async fn submit(&mut self) -> Result<&CalculationResult> {
        let request = self.selection.submit()?;
        tracing::info!(
            "Calculating: project={} unit={} horizon={}",
            request.project,
            request.unit_id,
            request.horizon_years
        );

        let response = {
            let _busy = self.selection.busy_guard();
            self.calculator.calculate(&request).await
        };

        match response {
            Ok(response) => {
                tracing::info!(
                    "✅ Calculation returned {} yearly values",
                    response.yearly_values.len()
                );
                let result = self
                    .result
                    .insert(CalculationResult::from_response(response, request));
                Ok(&*result)
            }
            Err(e) => {
                tracing::error!("Calculation request failed: {}", e);
                Err(e)
            }
        }
    }
}
