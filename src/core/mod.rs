pub mod presenter;
pub mod selection;
pub mod simulator;

pub use crate::domain::ports::{CalculationService, ConfigProvider, HealthCheck, ProjectDirectory};
pub use crate::utils::error::Result;
