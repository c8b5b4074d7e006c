use crate::domain::model::{
    CalculationRequest, CalculationResponse, HealthStatus, Project, Unit, UnitInfo, YearlyValue,
};
use crate::domain::ports::{CalculationService, ConfigProvider, HealthCheck, ProjectDirectory};
use crate::utils::error::{Result, SimError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

// Wire format of the backend (Spanish field names).

#[derive(Debug, Deserialize)]
struct ProjectsPayload {
    proyectos: Vec<ProjectDto>,
}

#[derive(Debug, Deserialize)]
struct ProjectDto {
    nombre: String,
    #[serde(default)]
    datos: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct UnitsPayload {
    unidades: Vec<UnitDto>,
}

#[derive(Debug, Deserialize)]
struct UnitDto {
    id: i64,
    proyecto: String,
    superficie: f64,
    precio: f64,
    enganche: f64,
}

#[derive(Debug, Serialize)]
struct CalculateBody<'a> {
    unidad_id: i64,
    tiempo: i32,
    proyecto: &'a str,
}

#[derive(Debug, Deserialize)]
struct CalculatePayload {
    valores: Vec<YearlyValueDto>,
    proyecto_seleccionado: String,
    #[serde(default)]
    plusvalias_anuales: Vec<f64>,
    unidad_info: UnitInfoDto,
}

#[derive(Debug, Deserialize)]
struct YearlyValueDto {
    #[serde(rename = "año")]
    anio: i32,
    valor: f64,
}

#[derive(Debug, Deserialize)]
struct UnitInfoDto {
    id: i64,
    superficie: f64,
    precio: f64,
    /// Down-payment amount here, not the ratio.
    enganche: f64,
    #[serde(default)]
    enganche_porcentaje: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    detail: Option<String>,
}

impl From<ProjectDto> for Project {
    fn from(dto: ProjectDto) -> Self {
        Self {
            name: dto.nombre,
            quarterly_rows: dto.datos,
        }
    }
}

impl From<UnitDto> for Unit {
    fn from(dto: UnitDto) -> Self {
        Self {
            id: dto.id,
            project: dto.proyecto,
            surface_area: dto.superficie,
            price: dto.precio,
            down_payment_ratio: dto.enganche,
        }
    }
}

impl From<CalculatePayload> for CalculationResponse {
    fn from(payload: CalculatePayload) -> Self {
        Self {
            yearly_values: payload
                .valores
                .into_iter()
                .map(|v| YearlyValue {
                    year: v.anio,
                    value: v.valor,
                })
                .collect(),
            selected_project_name: payload.proyecto_seleccionado,
            annual_rates: payload.plusvalias_anuales,
            unit_info: UnitInfo {
                id: payload.unidad_info.id,
                surface_area: payload.unidad_info.superficie,
                price: payload.unidad_info.precio,
                down_payment_amount: payload.unidad_info.enganche,
                down_payment_percentage: payload.unidad_info.enganche_porcentaje,
            },
        }
    }
}

/// reqwest-backed client for the `/api/*` endpoints.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    client: Client,
}

impl HttpApiClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Non-2xx responses become `SimError::Api`, carrying `{detail}` when the body has one.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorPayload>(&body)
            .ok()
            .and_then(|p| p.detail);
        Err(SimError::Api {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl ProjectDirectory for HttpApiClient {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let url = self.endpoint("/api/proyectos");
        tracing::debug!("Making API request to: {}", url);
        let response = Self::check_status(self.client.get(&url).send().await?).await?;
        let payload: ProjectsPayload = response.json().await?;
        Ok(payload.proyectos.into_iter().map(Project::from).collect())
    }

    async fn list_units(&self, project: &str) -> Result<Vec<Unit>> {
        let url = self.endpoint("/api/unidades");
        tracing::debug!("Making API request to: {} (proyecto={})", url, project);
        let response = Self::check_status(
            self.client
                .get(&url)
                .query(&[("proyecto", project)])
                .send()
                .await?,
        )
        .await?;
        let payload: UnitsPayload = response.json().await?;
        Ok(payload.unidades.into_iter().map(Unit::from).collect())
    }
}

#[async_trait]
impl CalculationService for HttpApiClient {
    async fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResponse> {
        let url = self.endpoint("/api/calcular");
        let body = CalculateBody {
            unidad_id: request.unit_id,
            tiempo: request.horizon_years,
            proyecto: &request.project,
        };
        tracing::debug!("Posting calculation to {}: {:?}", url, body);
        let response = Self::check_status(self.client.post(&url).json(&body).send().await?).await?;
        let payload: CalculatePayload = response.json().await?;
        Ok(payload.into())
    }
}

#[async_trait]
impl HealthCheck for HttpApiClient {
    async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint("/api/health");
        let response = Self::check_status(self.client.get(&url).send().await?).await?;
        Ok(response.json().await?)
    }
}
