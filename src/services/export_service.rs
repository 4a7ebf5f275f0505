//! Spreadsheet export of the case table.

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook, XlsxError};

use crate::database::models::Case;
use crate::search::CASE_EXPORT_HEADERS;

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "საქმეები";
const HEADER_FONT: &str = "Noto Sans Georgian";
const HEADER_FILL: u32 = 0xD9F2D9;
const COLUMN_WIDTHS: [f64; 9] = [6.0, 22.0, 24.0, 22.0, 24.0, 20.0, 24.0, 20.0, 40.0];

/// `cases_<unix millis>.xlsx`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("cases_{}.xlsx", now.timestamp_millis())
}

/// One sheet: a styled header row, then one row per case in the given order.
pub fn cases_workbook(cases: &[Case]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new()
        .set_bold()
        .set_font_name(HEADER_FONT)
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(HEADER_FILL));

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in CASE_EXPORT_HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, width)?;
    }

    for (idx, case) in cases.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_number(row, 0, (idx + 1) as f64)?;
        let cells = [
            Some(case.plaintiff.as_str()),
            case.plaintiff_id.as_deref(),
            Some(case.defendant.as_str()),
            case.defendant_id.as_deref(),
            case.amount.as_deref(),
            case.court.as_deref(),
            case.case_number.as_deref(),
            case.notes.as_deref(),
        ];
        for (offset, cell) in cells.into_iter().enumerate() {
            if let Some(text) = cell.filter(|t| !t.is_empty()) {
                sheet.write_string(row, offset as u16 + 1, text)?;
            }
        }
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn case(plaintiff: &str) -> Case {
        let now = Utc::now();
        Case {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            plaintiff: plaintiff.into(),
            plaintiff_id: Some("01001012345".into()),
            defendant: "შპს ბანკი".into(),
            defendant_id: None,
            plaintiff_customer_id: None,
            defendant_customer_id: None,
            client_customer_id: None,
            client_role: None,
            court: Some("თბილისის საქალაქო სასამართლო".into()),
            judge: None,
            case_number: Some("2/1234-24".into()),
            amount: Some("5 000 ₾".into()),
            initiation_date: None,
            hearing_date: None,
            hearing_dates: vec![],
            notes: None,
            created_by: None,
            modified_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn workbook_is_a_zip_container() {
        let bytes = cases_workbook(&[case("ნინო ბერიძე"), case("Levan")]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_export_still_has_headers() {
        let bytes = cases_workbook(&[]).unwrap();
        assert!(bytes.len() > 100);
    }

    #[test]
    fn filename_uses_millis() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(export_filename(at), "cases_1714521600000.xlsx");
    }
}
