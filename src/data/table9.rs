//! EIA Weekly Petroleum Status Report "Table 9" CSV adapter.
//!
//! Report posted at: <https://www.eia.gov/petroleum/supply/weekly/>. The CSV
//! is Windows-1252 encoded, uses `– –` (en dashes) for withheld values, and
//! embeds the report date in the third header cell as `M/D/YY`.
//!
//! The table covers every petroleum product; this adapter extracts only the
//! propane rows and leaves vocabulary/unit normalization to the shared
//! normalizer:
//!
//! - inside the `Stocks (Million Barrels)` block, the `Propane/Propylene`
//!   row (U.S.) and the regional PADD rows that immediately follow it
//! - for each flow block (production/imports/exports/product supplied), the
//!   `Propane/Propylene` row; when the label repeats across subsections the
//!   last occurrence is the propane product detail, so the last one wins

use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::error::AppError;

const TABLE9_URL: &str = "https://ir.eia.gov/wpsr/table9.csv";

const STOCKS_COMMODITY: &str = "Stocks (Million Barrels)";
const FLOW_COMMODITIES: [&str; 4] = [
    "Refiner and Blender Net Production",
    "Imports",
    "Exports",
    "Product Supplied",
];
const PROPANE_CATEGORY: &str = "Propane/Propylene";
const REGIONAL_CATEGORIES: [&str; 4] = [
    "East Coast (PADD 1)",
    "Midwest (PADD 2)",
    "Gulf Coast (PADD 3)",
    "PADD's 4 & 5",
];

/// One extracted propane row, still in source-native vocabulary and units.
///
/// Value cells are optional because the published table withholds some
/// figures; rows that are not fully populated cannot form a complete
/// comparative and are dropped by the normalizer.
#[derive(Debug, Clone)]
pub struct Table9Row {
    pub commodity: String,
    pub category: String,
    pub current: Option<f64>,
    pub week_ago: Option<f64>,
    pub year_ago: Option<f64>,
    pub two_years_ago: Option<f64>,
}

/// The propane slice of one published Table 9.
#[derive(Debug, Clone)]
pub struct Table9Snapshot {
    /// Report date taken from the third header cell.
    pub date: NaiveDate,
    pub rows: Vec<Table9Row>,
}

pub struct Table9Client {
    client: Client,
    url: String,
}

impl Table9Client {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            url: TABLE9_URL.to_string(),
        }
    }

    pub fn fetch(&self) -> Result<Table9Snapshot, AppError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::fetch(format!("Table 9 request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "Table 9 request failed with status {}.",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| AppError::fetch(format!("Failed to read Table 9 body: {e}")))?;

        parse_table9(&decode_cp1252(&bytes))
    }
}

impl Default for Table9Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the decoded CSV text into the propane snapshot.
pub fn parse_table9(text: &str) -> Result<Table9Snapshot, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::fetch(format!("Failed to read Table 9 headers: {e}")))?
        .clone();

    let date_cell = headers
        .get(2)
        .ok_or_else(|| AppError::fetch("Table 9 header has no date cell."))?;
    let date = parse_report_date(date_cell)?;

    let mut rows = Vec::new();
    // Regional stock rows only count while we are inside the propane
    // subsection of the stocks block.
    let mut in_propane_stocks = false;
    // (index into `rows`) of the last flow row per commodity, so a repeated
    // Propane/Propylene label replaces the earlier occurrence.
    let mut flow_slots: [Option<usize>; 4] = [None; 4];

    for record in reader.records() {
        let record = record.map_err(|e| AppError::fetch(format!("Table 9 parse error: {e}")))?;
        let commodity = record.get(0).unwrap_or("").trim();
        let category = record.get(1).unwrap_or("").trim();

        let values = || -> [Option<f64>; 4] {
            [2, 3, 4, 5].map(|i| record.get(i).and_then(parse_cell))
        };

        if commodity == STOCKS_COMMODITY {
            if category == PROPANE_CATEGORY {
                in_propane_stocks = true;
                rows.push(make_row(commodity, category, values()));
            } else if in_propane_stocks
                && REGIONAL_CATEGORIES.iter().any(|r| *r == category)
            {
                rows.push(make_row(commodity, category, values()));
            } else {
                in_propane_stocks = false;
            }
            continue;
        }
        in_propane_stocks = false;

        if category != PROPANE_CATEGORY {
            continue;
        }
        if let Some(slot) = FLOW_COMMODITIES.iter().position(|c| *c == commodity) {
            let row = make_row(commodity, category, values());
            match flow_slots[slot] {
                Some(idx) => rows[idx] = row,
                None => {
                    flow_slots[slot] = Some(rows.len());
                    rows.push(row);
                }
            }
        }
    }

    if rows.is_empty() {
        return Err(AppError::fetch("No propane rows found in Table 9."));
    }

    Ok(Table9Snapshot { date, rows })
}

fn make_row(commodity: &str, category: &str, values: [Option<f64>; 4]) -> Table9Row {
    Table9Row {
        commodity: commodity.to_string(),
        category: category.to_string(),
        current: values[0],
        week_ago: values[1],
        year_ago: values[2],
        two_years_ago: values[3],
    }
}

/// Parse a value cell: strip thousands separators; `– –` and blanks are
/// missing.
fn parse_cell(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().replace(',', "");
    if cleaned.is_empty() || cleaned.contains('\u{2013}') {
        return None;
    }
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn parse_report_date(cell: &str) -> Result<NaiveDate, AppError> {
    let mut parts = cell.trim().split('/');
    let (m, d, y) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(d), Some(y), None) => (m, d, y),
        _ => {
            return Err(AppError::fetch(format!(
                "Table 9 date cell '{cell}' is not M/D/YY."
            )));
        }
    };
    let month: u32 = m
        .parse()
        .map_err(|_| AppError::fetch(format!("Invalid month in Table 9 date '{cell}'.")))?;
    let day: u32 = d
        .parse()
        .map_err(|_| AppError::fetch(format!("Invalid day in Table 9 date '{cell}'.")))?;
    let year: i32 = y
        .parse::<i32>()
        .map(|y| 2000 + y)
        .map_err(|_| AppError::fetch(format!("Invalid year in Table 9 date '{cell}'.")))?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::fetch(format!("Invalid Table 9 date '{cell}'.")))
}

/// Decode Windows-1252 bytes.
///
/// 0x00–0x7F and 0xA0–0xFF match Latin-1; the 0x80–0x9F block holds the
/// printable punctuation cp1252 is known for (the table's `–` dashes live
/// there at 0x96).
fn decode_cp1252(bytes: &[u8]) -> String {
    const HIGH: [char; 32] = [
        '\u{20ac}', '\u{fffd}', '\u{201a}', '\u{0192}', '\u{201e}', '\u{2026}', '\u{2020}',
        '\u{2021}', '\u{02c6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{fffd}',
        '\u{017d}', '\u{fffd}', '\u{fffd}', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}',
        '\u{2022}', '\u{2013}', '\u{2014}', '\u{02dc}', '\u{2122}', '\u{0161}', '\u{203a}',
        '\u{0153}', '\u{fffd}', '\u{017e}', '\u{0178}',
    ];
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9f => HIGH[(b - 0x80) as usize],
            _ => b as char,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_csv() -> String {
        let dash = "\u{2013} \u{2013}";
        format!(
            "STUB,Region,8/22/25,8/15/25,8/23/24,8/25/23\n\
             Stocks (Million Barrels) ,Crude Oil,420.2,426.7,425.0,433.5\n\
             Stocks (Million Barrels) ,Propane/Propylene,97.5,95.5,89.1,83.9\n\
             Stocks (Million Barrels) ,East Coast (PADD 1),5.8,5.6,5.4,5.0\n\
             Stocks (Million Barrels) ,Midwest (PADD 2),26.5,25.9,24.3,23.1\n\
             Stocks (Million Barrels) ,Gulf Coast (PADD 3),61.0,59.8,55.5,52.1\n\
             Stocks (Million Barrels) ,PADD's 4 & 5 ,4.2,4.1,3.9,3.7\n\
             Refiner and Blender Net Production ,Propane/Propylene,{dash},{dash},{dash},{dash}\n\
             Refiner and Blender Net Production ,Propane/Propylene,2168,2151,2093,2005\n\
             Imports ,Propane/Propylene,85,92,110,121\n\
             Exports ,Propane/Propylene,\"1,726\",\"1,856\",\"1,535\",\"1,410\"\n\
             Product Supplied ,Propane/Propylene,721,688,755,801\n"
        )
    }

    #[test]
    fn parses_report_date_from_header() {
        let snap = parse_table9(&sample_csv()).unwrap();
        assert_eq!(snap.date, NaiveDate::from_ymd_opt(2025, 8, 22).unwrap());
    }

    #[test]
    fn extracts_propane_stocks_and_regions_only() {
        let snap = parse_table9(&sample_csv()).unwrap();
        let stocks: Vec<_> = snap
            .rows
            .iter()
            .filter(|r| r.commodity == STOCKS_COMMODITY)
            .collect();
        // U.S. + 4 regional rows; the crude row is excluded.
        assert_eq!(stocks.len(), 5);
        assert_eq!(stocks[0].category, "Propane/Propylene");
        assert_eq!(stocks[0].current, Some(97.5));
        assert_eq!(stocks[4].category, "PADD's 4 & 5");
    }

    #[test]
    fn repeated_flow_label_keeps_last_occurrence() {
        let snap = parse_table9(&sample_csv()).unwrap();
        let production: Vec<_> = snap
            .rows
            .iter()
            .filter(|r| r.commodity == "Refiner and Blender Net Production")
            .collect();
        assert_eq!(production.len(), 1);
        assert_eq!(production[0].current, Some(2168.0));
    }

    #[test]
    fn thousands_separators_and_dashes() {
        let snap = parse_table9(&sample_csv()).unwrap();
        let exports = snap
            .rows
            .iter()
            .find(|r| r.commodity == "Exports")
            .unwrap();
        assert_eq!(exports.current, Some(1726.0));
        assert_eq!(parse_cell("\u{2013} \u{2013}"), None);
        assert_eq!(parse_cell(""), None);
    }

    #[test]
    fn decodes_cp1252_dashes() {
        let decoded = decode_cp1252(&[0x96, 0x20, 0x96]);
        assert_eq!(decoded, "\u{2013} \u{2013}");
    }
}
