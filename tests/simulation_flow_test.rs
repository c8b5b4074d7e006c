use anyhow::Result;
use httpmock::prelude::*;
use plusvalia_sim::config::ApiBase;
use plusvalia_sim::core::presenter;
use plusvalia_sim::core::selection::{UnitLoadOutcome, UnitsPhase};
use plusvalia_sim::domain::ports::HealthCheck;
use plusvalia_sim::output::csv::series_to_csv;
use plusvalia_sim::output::json::{render_json, SimulationReport};
use plusvalia_sim::utils::format::format_percent;
use plusvalia_sim::{
    HttpApiClient, ResolvedConfig, SelectionController, SimError, Simulator, SimulatorConfig,
};

fn client_for(server: &MockServer) -> HttpApiClient {
    HttpApiClient::new(&ResolvedConfig::for_base_url(server.base_url())).unwrap()
}

fn simulator_for(server: &MockServer) -> Simulator<HttpApiClient, HttpApiClient> {
    let client = client_for(server);
    Simulator::new(SelectionController::new(client.clone()), client)
}

/// 完整流程：載入專案 → 單位 → 提交計算 → 結果彙總
#[tokio::test]
async fn test_end_to_end_single_project() -> Result<()> {
    let server = MockServer::start();

    let projects_mock = server.mock(|when, then| {
        when.method(GET).path("/api/proyectos");
        then.status(200)
            .json_body(serde_json::json!({"proyectos": [{"nombre": "A"}]}));
    });

    let units_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/unidades")
            .query_param("proyecto", "A");
        then.status(200).json_body(serde_json::json!({
            "unidades": [
                {"id": 1, "proyecto": "A", "superficie": 80, "precio": 200000, "enganche": 0.25}
            ]
        }));
    });

    let calc_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/calcular")
            .json_body(serde_json::json!({"unidad_id": 1, "tiempo": 5, "proyecto": "A"}));
        then.status(200).json_body(serde_json::json!({
            "valores": [
                {"año": 1, "valor": 210000.0},
                {"año": 2, "valor": 222000.0},
                {"año": 3, "valor": 235000.0},
                {"año": 4, "valor": 247000.0},
                {"año": 5, "valor": 260000.0}
            ],
            "proyecto_seleccionado": "A",
            "plusvalias_anuales": [0.05, 0.057, 0.058, 0.051, 0.052],
            "unidad_info": {
                "id": 1,
                "superficie": 80,
                "precio": 200000,
                "enganche": 50000.0,
                "enganche_porcentaje": 25.0
            }
        }));
    });

    let mut simulator = simulator_for(&server);
    simulator.start().await?;
    simulator.selection().set_horizon(5);
    let result = simulator.submit().await?;

    projects_mock.assert();
    units_mock.assert();
    calc_mock.assert();

    let summary = presenter::summarize(result)?;
    assert_eq!(summary.final_value, 260000.0);
    assert_eq!(summary.appreciation, 60000.0);
    assert_eq!(summary.down_payment, 50000.0);
    assert!((summary.return_pct - 30.0).abs() < 1e-9);
    assert_eq!(format_percent(summary.return_pct), "30.00%");

    let series = presenter::build_series(result);
    assert_eq!(series.len(), 5);
    assert_eq!(series[0].label, "Año 1");
    assert_eq!(series[4].value, 260000.0);

    let csv = series_to_csv(result)?;
    assert!(csv.starts_with("year,label,value,annual_rate"));
    assert!(csv.contains("5,Año 5,260000.00,0.052000"));

    let json = render_json(&SimulationReport::build(result)?)?;
    let parsed: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(parsed["summary"]["final_value"], 260000.0);
    assert_eq!(parsed["chart"]["title"], "Evolución de la inversión en A");
    Ok(())
}

#[tokio::test]
async fn test_submit_without_units_sends_no_calculation() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/api/proyectos");
        then.status(200)
            .json_body(serde_json::json!({"proyectos": [{"nombre": "Sin Unidades"}]}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/unidades");
        then.status(200).json_body(serde_json::json!({"unidades": []}));
    });
    let calc_mock = server.mock(|when, then| {
        when.method(POST).path("/api/calcular");
        then.status(200);
    });

    let mut simulator = simulator_for(&server);
    simulator.start().await?;
    assert_eq!(
        simulator.selection().snapshot().phase,
        UnitsPhase::UnitsEmpty
    );

    let err = simulator.submit().await.unwrap_err();

    assert!(matches!(err, SimError::Validation { .. }));
    assert_eq!(calc_mock.hits(), 0);
    Ok(())
}

#[tokio::test]
async fn test_units_from_other_projects_are_dropped() -> Result<()> {
    let server = MockServer::start();

    // Backend ignores the filter and returns every unit
    server.mock(|when, then| {
        when.method(GET).path("/api/unidades");
        then.status(200).json_body(serde_json::json!({
            "unidades": [
                {"id": 0, "proyecto": "B", "superficie": 60, "precio": 150000, "enganche": 0.2},
                {"id": 1, "proyecto": "A", "superficie": 80, "precio": 200000, "enganche": 0.25},
                {"id": 2, "proyecto": "A", "superficie": 95, "precio": 240000, "enganche": 0.25}
            ]
        }));
    });

    let controller = SelectionController::new(client_for(&server));
    controller.select_project("A").await?;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.units.len(), 2);
    assert!(snapshot.units.iter().all(|u| u.project == "A"));
    assert_eq!(snapshot.selection.selected_unit_id, Some(1));
    Ok(())
}

#[tokio::test]
async fn test_backend_detail_surfaces_on_calculation_failure() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET).path("/api/proyectos");
        then.status(200)
            .json_body(serde_json::json!({"proyectos": [{"nombre": "A"}]}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/unidades");
        then.status(200).json_body(serde_json::json!({
            "unidades": [
                {"id": 3, "proyecto": "A", "superficie": 70, "precio": 180000, "enganche": 0.3}
            ]
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/calcular");
        then.status(404)
            .json_body(serde_json::json!({"detail": "Proyecto 'A' no encontrado"}));
    });

    let mut simulator = simulator_for(&server);
    simulator.start().await?;
    let err = simulator.submit().await.unwrap_err();

    assert_eq!(err.user_friendly_message(), "Error: Proyecto 'A' no encontrado");
    assert!(simulator.result().is_none());
    assert!(!simulator.selection().snapshot().busy);
    Ok(())
}

#[tokio::test]
async fn test_project_listing_failure_is_recoverable() -> Result<()> {
    let server = MockServer::start();

    let mut failing = server.mock(|when, then| {
        when.method(GET).path("/api/proyectos");
        then.status(500);
    });

    let controller = SelectionController::new(client_for(&server));
    assert!(controller.load_projects().await.is_err());
    assert!(controller.snapshot().projects.is_empty());

    failing.delete();
    server.mock(|when, then| {
        when.method(GET).path("/api/proyectos");
        then.status(200)
            .json_body(serde_json::json!({"proyectos": [{"nombre": "A"}, {"nombre": "B"}]}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/unidades");
        then.status(200).json_body(serde_json::json!({"unidades": []}));
    });

    assert_eq!(controller.load_projects().await?, 2);
    assert_eq!(controller.snapshot().selection.selected_project, "A");
    Ok(())
}

#[tokio::test]
async fn test_proxy_mode_uses_configured_origin() -> Result<()> {
    let server = MockServer::start();
    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/api/health");
        then.status(200)
            .json_body(serde_json::json!({"status": "OK", "message": "API is running"}));
    });

    let config = SimulatorConfig::from_toml_str(&format!(
        "[api]\nproxy = true\norigin = \"{}\"\n",
        server.base_url()
    ))?;
    let resolved = config.resolve_with_base(ApiBase::Relative)?;
    let client = HttpApiClient::new(&resolved)?;

    let health = client.health().await?;

    health_mock.assert();
    assert_eq!(health.message, "API is running");
    Ok(())
}

#[test]
fn test_horizon_truncation_reaches_the_wire() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/unidades");
        then.status(200).json_body(serde_json::json!({
            "unidades": [
                {"id": 8, "proyecto": "A", "superficie": 50, "precio": 100000, "enganche": 0.1}
            ]
        }));
    });
    let calc_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/calcular")
            .json_body(serde_json::json!({"unidad_id": 8, "tiempo": 10, "proyecto": "A"}));
        then.status(200).json_body(serde_json::json!({
            "valores": [{"año": 1, "valor": 103000.0}],
            "proyecto_seleccionado": "A",
            "unidad_info": {"id": 8, "superficie": 50, "precio": 100000, "enganche": 10000}
        }));
    });

    let mut simulator = simulator_for(&server);
    let outcome = tokio_test::block_on(simulator.selection().select_project("A")).unwrap();
    assert_eq!(outcome, UnitLoadOutcome::Ready(1));
    assert_eq!(simulator.selection().set_horizon(25), 10);

    let result = tokio_test::block_on(simulator.submit()).unwrap();

    calc_mock.assert();
    assert_eq!(result.request_inputs.horizon_years, 10);
    assert!(result.annual_rates.is_empty());
}
