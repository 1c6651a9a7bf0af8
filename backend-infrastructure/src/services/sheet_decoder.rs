use std::io::Cursor;

use anyhow::{anyhow, Result};
use calamine::{Data, Reader, Xlsx};

use backend_domain::ports::SheetDecoder;
use backend_domain::{normalize_header, SheetFormat, SheetRow};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads the first worksheet of an xlsx workbook, or a csv file, using the
/// first row as headers.
#[derive(Default)]
pub struct SpreadsheetDecoder;

impl SpreadsheetDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl SheetDecoder for SpreadsheetDecoder {
    fn decode(&self, format: SheetFormat, bytes: &[u8]) -> Result<Vec<SheetRow>> {
        match format {
            SheetFormat::Xlsx => decode_xlsx(bytes),
            SheetFormat::Csv => decode_csv(bytes),
        }
    }
}

fn decode_xlsx(bytes: &[u8]) -> Result<Vec<SheetRow>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook has no worksheets"))?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header
        .iter()
        .map(|cell| normalize_header(&cell_text(cell)))
        .collect();

    Ok(rows
        .map(|cells| to_row(&headers, cells.iter().map(cell_text)))
        .filter(|row| !row.is_empty())
        .collect())
}

fn decode_csv(bytes: &[u8]) -> Result<Vec<SheetRow>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = to_row(&headers, record.iter().map(ToString::to_string));
        if !row.is_empty() {
            out.push(row);
        }
    }
    Ok(out)
}

/// Blank headers and blank cells are left out, so an all-blank row maps to an empty row.
fn to_row(headers: &[String], cells: impl Iterator<Item = String>) -> SheetRow {
    headers
        .iter()
        .zip(cells)
        .filter(|(header, value)| !header.is_empty() && !value.trim().is_empty())
        .map(|(header, value)| (header.clone(), value.trim().to_string()))
        .collect()
}

// Phone numbers and seat ids typed as numbers come back as floats.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_are_keyed_by_normalized_header() {
        let input = "\u{feff}Name,Phone,QR  Payload,SeatID,Category\n\
                     Ada,555-0101,QR-1,A1,VIP\n\
                     , , , ,\n\
                     Grace,,QR-2,A2,\n";
        let rows = SpreadsheetDecoder::new()
            .decode(SheetFormat::Csv, input.as_bytes())
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("qr payload").map(String::as_str), Some("QR-1"));
        assert_eq!(rows[0].get("seatid").map(String::as_str), Some("A1"));
        assert_eq!(rows[1].get("name").map(String::as_str), Some("Grace"));
        assert!(rows[1].get("phone").is_none());
    }

    #[test]
    fn short_csv_rows_are_tolerated() {
        let rows = SpreadsheetDecoder::new()
            .decode(SheetFormat::Csv, b"name,qr payload,category\nLin,QR-7\n")
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
    }

    #[test]
    fn header_only_csv_has_no_rows() {
        let rows = SpreadsheetDecoder::new()
            .decode(SheetFormat::Csv, b"name,qr payload\n")
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn non_zip_bytes_are_not_a_workbook() {
        assert!(SpreadsheetDecoder::new()
            .decode(SheetFormat::Xlsx, b"name,qr payload\n")
            .is_err());
    }

    #[test]
    fn whole_floats_drop_the_fraction() {
        assert_eq!(cell_text(&Data::Float(5550101.0)), "5550101");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(12)), "12");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
