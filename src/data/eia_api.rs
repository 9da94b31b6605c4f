//! EIA Open Data API v2 integration for weekly propane series.
//!
//! API documentation: <https://www.eia.gov/opendata/index.php>. Requires an
//! API key in `EIA_API_KEY` (loaded from the environment or a `.env` file).

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::AppError;

const BASE_URL: &str = "https://api.eia.gov/v2/petroleum/sum/sndw/data/";
const FREQUENCY: &str = "weekly";

/// Propane series codes from the Weekly Petroleum Status Report dataset.
///
/// Stock series cover 2020 onward; earlier vintages use different codes and
/// include propylene.
const SERIES: [&str; 10] = [
    // US imports
    "WPRIM_NUS-Z00_2",
    // US production
    "WPRTP_NUS_2",
    // US product supplied
    "WPRUP_NUS_2",
    // US exports
    "W_EPLLPZ_EEX_NUS-Z00_MBBLD",
    // US days of supply
    "W_EPLLPZ_VSD_NUS_DAYS",
    // US stocks
    "WPRSTUS1",
    // East Coast stocks (PADD 1)
    "WPRSTP11",
    // Midwest stocks (PADD 2)
    "WPRSTP21",
    // Gulf Coast stocks (PADD 3)
    "WPRSTP31",
    // PADD 4 & 5 stocks
    "WPRST_R4N5_1",
];

/// One raw API row, still in source-native vocabulary and units.
#[derive(Debug, Clone)]
pub struct ApiRow {
    pub period: NaiveDate,
    pub area_name: String,
    pub process_name: String,
    pub value: f64,
    pub units: String,
}

pub struct EiaClient {
    client: Client,
    api_key: String,
}

impl EiaClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("EIA_API_KEY")
            .map_err(|_| AppError::config("Missing EIA_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Fetch all propane series rows in `[start, end]`.
    pub fn fetch(&self, start: NaiveDate, end: Option<NaiveDate>) -> Result<Vec<ApiRow>, AppError> {
        let mut query: Vec<(String, String)> = vec![
            ("api_key".into(), self.api_key.clone()),
            ("frequency".into(), FREQUENCY.into()),
            ("data[0]".into(), "value".into()),
            ("start".into(), start.to_string()),
            ("length".into(), "5000".into()),
        ];
        for series in SERIES {
            query.push(("facets[series][]".into(), series.into()));
        }
        if let Some(end) = end {
            query.push(("end".into(), end.to_string()));
        }

        let resp = self
            .client
            .get(BASE_URL)
            .query(&query)
            .send()
            .map_err(|e| AppError::fetch(format!("EIA request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "EIA request failed with status {}.",
                resp.status()
            )));
        }

        let body: ApiEnvelope = resp
            .json()
            .map_err(|e| AppError::fetch(format!("Failed to parse EIA response: {e}")))?;

        let mut out = Vec::with_capacity(body.response.data.len());
        for row in body.response.data {
            // Rows with a withheld or not-yet-published value come back null;
            // they carry no information, so skip them.
            let value = match row.value {
                Some(v) => v.0,
                None => continue,
            };
            let period = NaiveDate::parse_from_str(&row.period, "%Y-%m-%d")
                .map_err(|e| AppError::fetch(format!("Invalid EIA date '{}': {e}", row.period)))?;
            out.push(ApiRow {
                period,
                area_name: row.area_name,
                process_name: row.process_name,
                value,
                units: row.units,
            });
        }

        if out.is_empty() {
            return Err(AppError::fetch("No observations returned by the EIA API."));
        }

        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    response: ApiResponse,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: Vec<RawRow>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    period: String,
    #[serde(rename = "area-name")]
    area_name: String,
    #[serde(rename = "process-name")]
    process_name: String,
    value: Option<Flexible>,
    units: String,
}

/// The API serializes values as numbers in some vintages and as strings in
/// others; accept both.
#[derive(Debug, Clone, Copy)]
struct Flexible(f64);

impl<'de> Deserialize<'de> for Flexible {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumOrStr {
            Num(f64),
            Str(String),
        }

        match NumOrStr::deserialize(deserializer)? {
            NumOrStr::Num(v) => Ok(Flexible(v)),
            NumOrStr::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Flexible)
                .map_err(|_| serde::de::Error::custom(format!("invalid numeric value '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_accepts_numeric_and_string_values() {
        let json = r#"{
            "response": {
                "data": [
                    {"period": "2025-08-22", "area-name": "U.S.", "process-name": "Imports", "value": 85, "units": "MBBL/D"},
                    {"period": "2025-08-22", "area-name": "PADD 3", "process-name": "Ending Stocks Excluding Propylene at Terminal", "value": "58321", "units": "MBBL"},
                    {"period": "2025-08-22", "area-name": "NA", "process-name": "Ending Stocks Excluding Propylene at Terminal", "value": null, "units": "MBBL"}
                ]
            }
        }"#;

        let body: ApiEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(body.response.data.len(), 3);
        assert_eq!(body.response.data[0].value.unwrap().0, 85.0);
        assert_eq!(body.response.data[1].value.unwrap().0, 58321.0);
        assert!(body.response.data[2].value.is_none());
    }
}
