//! CSV and spreadsheet renderings of the monthly statistics.

use farol_common::{AppError, AppResult};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::services::analytics::{MONTHS, MonthlyStats};

/// Short month names, January first.
pub const MONTH_NAMES: [&str; MONTHS] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const HEADERS: [&str; 5] = ["Month", "Created", "Resolved", "FalseReports", "MeanHours"];

/// MIME type of [`render_csv`] output.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
/// MIME type of [`render_xlsx`] output.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Download name of the CSV export for `year`.
#[must_use]
pub fn csv_file_name(year: i32) -> String {
    format!("complaints_{year}.csv")
}

/// Download name of the spreadsheet export for `year`.
#[must_use]
pub fn xlsx_file_name(year: i32) -> String {
    format!("complaints_{year}.xlsx")
}

/// Semicolon-separated table, one row per month.
#[must_use]
pub fn render_csv(stats: &MonthlyStats) -> String {
    let mut out = HEADERS.join(";");
    out.push('\n');
    for (i, month) in MONTH_NAMES.iter().enumerate() {
        out.push_str(&format!(
            "{month};{};{};{};{:.2}\n",
            stats.created[i], stats.resolved[i], stats.false_reports[i], stats.mean_hours[i]
        ));
    }
    out
}

/// The same table as an `.xlsx` workbook with a single worksheet.
pub fn render_xlsx(stats: &MonthlyStats) -> AppResult<Vec<u8>> {
    build_workbook(stats).map_err(|e| AppError::Internal(format!("Spreadsheet export failed: {e}")))
}

fn build_workbook(stats: &MonthlyStats) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let hours = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(format!("Complaints {}", stats.year))?;

    for (col, header) in (0_u16..).zip(HEADERS) {
        sheet.write_string_with_format(0, col, header, &bold)?;
    }

    for ((row, month), i) in (1_u32..).zip(MONTH_NAMES).zip(0..MONTHS) {
        sheet.write_string(row, 0, month)?;
        sheet.write_number(row, 1, f64::from(stats.created[i]))?;
        sheet.write_number(row, 2, f64::from(stats.resolved[i]))?;
        sheet.write_number(row, 3, f64::from(stats.false_reports[i]))?;
        sheet.write_number_with_format(row, 4, stats.mean_hours[i], &hours)?;
    }
    sheet.set_column_width(0, 10)?;
    sheet.set_column_width(3, 14)?;

    workbook.save_to_buffer()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stats() -> MonthlyStats {
        let mut created = [0; MONTHS];
        created[0] = 4;
        let mut resolved = [0; MONTHS];
        resolved[0] = 2;
        let mut mean_hours = [0.0; MONTHS];
        mean_hours[0] = 12.5;
        MonthlyStats {
            year: 2025,
            created,
            resolved,
            false_reports: [0; MONTHS],
            mean_hours,
        }
    }

    #[test]
    fn test_render_csv() {
        let csv = render_csv(&stats());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "Month;Created;Resolved;FalseReports;MeanHours");
        assert_eq!(lines[1], "Jan;4;2;0;12.50");
        assert_eq!(lines[12], "Dec;0;0;0;0.00");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(csv_file_name(2025), "complaints_2025.csv");
        assert_eq!(xlsx_file_name(2025), "complaints_2025.xlsx");
    }

    #[test]
    fn test_render_xlsx_is_zip() {
        let bytes = render_xlsx(&stats()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
