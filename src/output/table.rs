use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Row, Table};

use crate::core::presenter::InvestmentSummary;
use crate::domain::model::{CalculationResult, Project, Unit};
use crate::utils::format::{format_amount, format_money, format_percent};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn money_cell(value: f64) -> Cell {
    Cell::new(format_money(value)).set_alignment(CellAlignment::Right)
}

pub fn render_projects_table(projects: &[Project]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Proyecto", "Trimestres"]);
    for project in projects {
        table.add_row(Row::from(vec![
            Cell::new(&project.name),
            Cell::new(project.quarterly_rows.len()).set_alignment(CellAlignment::Right),
        ]));
    }
    table.to_string()
}

pub fn render_units_table(units: &[Unit], selected: Option<i64>) -> String {
    let mut table = new_table();
    table.set_header(vec!["ID", "Superficie (m²)", "Precio", "Enganche", ""]);
    for unit in units {
        let marker = if Some(unit.id) == selected { "◀" } else { "" };
        table.add_row(Row::from(vec![
            Cell::new(unit.id),
            Cell::new(format_amount(unit.surface_area)).set_alignment(CellAlignment::Right),
            money_cell(unit.price),
            Cell::new(format!("{}%", format_amount(unit.down_payment_ratio * 100.0)))
                .set_alignment(CellAlignment::Right),
            Cell::new(marker).fg(Color::Green),
        ]));
    }
    table.to_string()
}

pub fn render_project_info(result: &CalculationResult, summary: &InvestmentSummary) -> String {
    format!(
        "Datos del Proyecto Seleccionado: {}\n  Superficie del departamento: {} m²\n  Precio total: {}\n  Tiempo: {} años\n  Valor final estimado: {}\n",
        result.selected_project_name,
        format_amount(summary.surface_area),
        format_money(summary.price),
        summary.horizon_years,
        format_money(summary.final_value),
    )
}

pub fn render_summary_table(summary: &InvestmentSummary) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Proyecto".to_string(),
        format!(
            "Enganche inicial ({}%)",
            format_amount(summary.down_payment_ratio * 100.0)
        ),
        "Precio total".to_string(),
        "Valor final".to_string(),
        "Plusvalía".to_string(),
        "Rendimiento".to_string(),
    ]);

    let return_cell = Cell::new(format_percent(summary.return_pct))
        .set_alignment(CellAlignment::Right)
        .fg(if summary.return_pct >= 0.0 {
            Color::Green
        } else {
            Color::Red
        });
    table.add_row(Row::from(vec![
        Cell::new(&summary.project),
        money_cell(summary.down_payment),
        money_cell(summary.price),
        money_cell(summary.final_value),
        money_cell(summary.appreciation),
        return_cell,
    ]));
    table.to_string()
}

pub fn render_series_table(result: &CalculationResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Año", "Valor", "Plusvalía anual"]);
    for (index, point) in result.yearly_values.iter().enumerate() {
        let rate = result
            .annual_rates
            .get(index)
            .map(|r| format_percent(r * 100.0))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(Row::from(vec![
            Cell::new(point.year),
            money_cell(point.value),
            Cell::new(rate).set_alignment(CellAlignment::Right),
        ]));
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> InvestmentSummary {
        InvestmentSummary {
            project: "A".to_string(),
            surface_area: 80.0,
            horizon_years: 5,
            down_payment_ratio: 0.25,
            down_payment: 50000.0,
            price: 200000.0,
            final_value: 260000.0,
            appreciation: 60000.0,
            return_pct: 30.0,
        }
    }

    #[test]
    fn test_summary_table_contains_formatted_values() {
        let rendered = render_summary_table(&summary());
        assert!(rendered.contains("Enganche inicial (25%)"));
        assert!(rendered.contains("$50,000"));
        assert!(rendered.contains("$260,000"));
        assert!(rendered.contains("$60,000"));
        assert!(rendered.contains("30.00%"));
    }

    #[test]
    fn test_units_table_marks_selected_unit() {
        let units = vec![
            Unit {
                id: 1,
                project: "A".to_string(),
                surface_area: 80.0,
                price: 200000.0,
                down_payment_ratio: 0.25,
            },
            Unit {
                id: 2,
                project: "A".to_string(),
                surface_area: 95.5,
                price: 260000.0,
                down_payment_ratio: 0.3,
            },
        ];
        let rendered = render_units_table(&units, Some(2));
        assert!(rendered.contains("95.5"));
        assert!(rendered.contains("$260,000"));
        assert!(rendered.contains("30%"));
        assert_eq!(rendered.matches('◀').count(), 1);
    }
}
