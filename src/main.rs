use clap::Parser;
use plusvalia_sim::config::cli::Command;
use plusvalia_sim::core::presenter;
use plusvalia_sim::core::selection::UnitsPhase;
use plusvalia_sim::domain::ports::{ConfigProvider, HealthCheck, ProjectDirectory};
use plusvalia_sim::output::chart::{render_chart, DEFAULT_CHART_WIDTH};
use plusvalia_sim::output::csv::series_to_csv;
use plusvalia_sim::output::json::{render_json, SimulationReport};
use plusvalia_sim::output::table::{
    render_project_info, render_projects_table, render_series_table, render_summary_table,
    render_units_table,
};
use plusvalia_sim::output::OutputFormat;
use plusvalia_sim::utils::error::{ErrorSeverity, Result, SimError};
use plusvalia_sim::utils::logger;
use plusvalia_sim::{
    CliConfig, HttpApiClient, ResolvedConfig, SelectionController, Simulator, SimulatorConfig,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting plusvalia CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let overrides = cli.overrides();
    let file_config = match SimulatorConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e, true),
    };

    if let Command::Config { init: Some(path) } = &cli.command {
        match SimulatorConfig::write_template(path) {
            Ok(()) => {
                println!("✅ Configuration template written to {}", path.display());
                return;
            }
            Err(e) => exit_with(&e, true),
        }
    }

    // 驗證並解析配置
    let config = match file_config.resolve(&overrides) {
        Ok(config) => config,
        Err(e) => exit_with(&e, true),
    };
    tracing::debug!("Resolved API base URL: {}", config.api_base_url());

    let alert_on_error = config.alert_on_error();
    if let Err(e) = run(cli.command, config).await {
        exit_with(&e, alert_on_error);
    }
}

async fn run(command: Command, config: ResolvedConfig) -> Result<()> {
    let client = HttpApiClient::new(&config)?;

    match command {
        Command::Projects => {
            let projects = client.list_projects().await?;
            println!("{}", render_projects_table(&projects));
        }
        Command::Units { project } => {
            let controller = SelectionController::new(client);
            controller.load_projects().await?;
            if let Some(project) = project {
                controller.select_listed_project(&project).await?;
            }

            let snapshot = controller.snapshot();
            println!("Proyecto: {}", snapshot.selection.selected_project);
            if snapshot.phase == UnitsPhase::UnitsEmpty {
                println!("No hay unidades disponibles");
            } else {
                println!(
                    "{}",
                    render_units_table(&snapshot.units, snapshot.selection.selected_unit_id)
                );
            }
        }
        Command::Simulate {
            project,
            unit,
            years,
            format,
        } => {
            let selection =
                SelectionController::with_horizon(client.clone(), config.default_horizon());
            let mut simulator = Simulator::new(selection, client);
            simulator.start().await?;

            if let Some(project) = project {
                simulator.selection().select_listed_project(&project).await?;
            }
            if let Some(unit) = unit {
                simulator.selection().select_unit(unit)?;
            }
            if let Some(years) = years {
                let stored = simulator.selection().set_horizon(years);
                if stored != years {
                    tracing::info!("Horizon truncated from {} to {} years", years, stored);
                }
            }

            let result = simulator.submit().await?;
            match format {
                OutputFormat::Table => {
                    let summary = presenter::summarize(result)?;
                    println!("{}", render_project_info(result, &summary));
                    println!(
                        "{}",
                        render_chart(&presenter::chart_spec(result), DEFAULT_CHART_WIDTH)
                    );
                    println!("{}", render_series_table(result));
                    println!("Resumen de la Inversión");
                    println!("{}", render_summary_table(&summary));
                }
                OutputFormat::Json => {
                    println!("{}", render_json(&SimulationReport::build(result)?)?);
                }
                OutputFormat::Csv => {
                    print!("{}", series_to_csv(result)?);
                }
            }
        }
        Command::Health => {
            let health = client.health().await?;
            println!("✅ {}: {}", health.status, health.message);
        }
        Command::Config { .. } => {
            println!("API base URL: {}", config.api_base_url());
            println!("Base source:  {:?}", config.base);
            match config.request_timeout() {
                Some(timeout) => println!("Timeout:      {:?}", timeout),
                None => println!("Timeout:      transport default"),
            }
            println!("Horizon:      {} años", config.default_horizon());
            println!("Alerts:       {}", config.alert_on_error());
        }
    }

    Ok(())
}

fn exit_with(e: &SimError, alert: bool) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    if alert {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
    }

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
