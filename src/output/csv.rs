use crate::domain::model::CalculationResult;
use crate::utils::error::Result;

/// One row per year: `year,label,value,annual_rate` (rate left blank when the backend sent none).
pub fn series_to_csv(result: &CalculationResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["year", "label", "value", "annual_rate"])?;
    for (index, point) in result.yearly_values.iter().enumerate() {
        writer.write_record([
            point.year.to_string(),
            format!("Año {}", point.year),
            format!("{:.2}", point.value),
            result
                .annual_rates
                .get(index)
                .map(|r| format!("{:.6}", r))
                .unwrap_or_default(),
        ])?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
