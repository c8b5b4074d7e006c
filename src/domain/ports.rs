use crate::domain::model::{CalculationRequest, CalculationResponse, HealthStatus, Project, Unit};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Listing side of the backend: projects and the units belonging to each.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn list_units(&self, project: &str) -> Result<Vec<Unit>>;
}

#[async_trait]
pub trait CalculationService: Send + Sync {
    async fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResponse>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health(&self) -> Result<HealthStatus>;
}

pub trait ConfigProvider: Send + Sync {
    /// Fully resolved, absolute base URL (no trailing slash).
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
    fn default_horizon(&self) -> i32;
    fn alert_on_error(&self) -> bool;
}
