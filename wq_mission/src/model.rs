//! WaterQualityRecord, Measurements, Precipitation and the loose input bags
//! they are built from.
//!
//! Core data types for the water-quality mission service.
//!
//! This module defines the shared domain model imported by the record
//! builder and by callers. It contains no logic beyond field inspection,
//! no I/O, and no state.
//!
//! Every field is an `Option`: `None` is the absent marker. It serializes
//! as JSON `null` and the key is always emitted, so the wire shape of a
//! record never depends on how complete its input was.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire keys
// ---------------------------------------------------------------------------

/// Top-level scalar keys of a `WaterQualityRecord`, in wire order.
pub const RECORD_KEYS: [&str; 13] = [
    "mission_idx",
    "water_q_idx",
    "zone_id",
    "device_id",
    "lat",
    "lon",
    "curr_wq_state",
    "target_wq_state",
    "curr_windspeed",
    "forecast_windspeed",
    "curr_precipitation",
    "forecast_precipitation",
    "curr_datetime",
];

/// Key of the nested measurements object.
pub const MEASUREMENTS_KEY: &str = "w_data";

/// Measurement keys inside `w_data`, in wire order.
pub const MEASUREMENT_KEYS: [&str; 13] = [
    "temp_c",
    "ph",
    "ec_us_cm",
    "do_mg_l",
    "toc_mg_l",
    "cod_mg_l",
    "t_n_mg_l",
    "t_p_mg_l",
    "ss_mg_l",
    "cl_mg_l",
    "chl_a_mg_m3",
    "cd_mg_l",
    "bod_mg_l",
];

// ---------------------------------------------------------------------------
// Precipitation
// ---------------------------------------------------------------------------

/// Precipitation as reported by the weather feed: either a yes/no flag or
/// an amount. On the wire this is the bare JSON boolean or number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Precipitation {
    Flag(bool),
    Amount(f64),
}

// ---------------------------------------------------------------------------
// Input bags
// ---------------------------------------------------------------------------

/// Loose measurement readings as supplied by a sampling device.
///
/// Unknown keys are ignored and missing keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeasurementParams {
    pub temp_c: Option<f64>,
    pub ph: Option<f64>,
    pub ec_us_cm: Option<f64>,
    pub do_mg_l: Option<f64>,
    pub toc_mg_l: Option<f64>,
    pub cod_mg_l: Option<f64>,
    pub t_n_mg_l: Option<f64>,
    pub t_p_mg_l: Option<f64>,
    pub ss_mg_l: Option<f64>,
    pub cl_mg_l: Option<f64>,
    pub chl_a_mg_m3: Option<f64>,
    pub cd_mg_l: Option<f64>,
    pub bod_mg_l: Option<f64>,
}

/// Loose input bag for `record::build_record`. Any subset of keys may be
/// present, including none at all.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecordParams {
    pub mission_idx: Option<String>,
    pub water_q_idx: Option<i64>,
    pub zone_id: Option<String>,
    pub device_id: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub curr_wq_state: Option<String>,
    pub target_wq_state: Option<String>,
    pub curr_windspeed: Option<f64>,
    pub forecast_windspeed: Option<f64>,
    pub curr_precipitation: Option<Precipitation>,
    pub forecast_precipitation: Option<Precipitation>,
    pub curr_datetime: Option<String>, // as supplied, not parsed
    pub w_data: Option<MeasurementParams>,
}

// ---------------------------------------------------------------------------
// Output record
// ---------------------------------------------------------------------------

/// The 13 water-quality readings of a record. Every key is always present
/// in the serialized form; missing readings are `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub temp_c: Option<f64>,
    pub ph: Option<f64>,
    pub ec_us_cm: Option<f64>,
    pub do_mg_l: Option<f64>,
    pub toc_mg_l: Option<f64>,
    pub cod_mg_l: Option<f64>,
    pub t_n_mg_l: Option<f64>,
    pub t_p_mg_l: Option<f64>,
    pub ss_mg_l: Option<f64>,
    pub cl_mg_l: Option<f64>,
    pub chl_a_mg_m3: Option<f64>,
    pub cd_mg_l: Option<f64>,
    pub bod_mg_l: Option<f64>,
}

impl Measurements {
    /// Readings paired with their wire key, in `MEASUREMENT_KEYS` order.
    pub fn readings(&self) -> [(&'static str, Option<f64>); 13] {
        [
            ("temp_c", self.temp_c),
            ("ph", self.ph),
            ("ec_us_cm", self.ec_us_cm),
            ("do_mg_l", self.do_mg_l),
            ("toc_mg_l", self.toc_mg_l),
            ("cod_mg_l", self.cod_mg_l),
            ("t_n_mg_l", self.t_n_mg_l),
            ("t_p_mg_l", self.t_p_mg_l),
            ("ss_mg_l", self.ss_mg_l),
            ("cl_mg_l", self.cl_mg_l),
            ("chl_a_mg_m3", self.chl_a_mg_m3),
            ("cd_mg_l", self.cd_mg_l),
            ("bod_mg_l", self.bod_mg_l),
        ]
    }

    /// Keys of readings that were not supplied.
    pub fn absent_fields(&self) -> Vec<&'static str> {
        self.readings()
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn present_count(&self) -> usize {
        self.readings().iter().filter(|(_, v)| v.is_some()).count()
    }
}

/// A fixed-shape water-quality record for one mission sample.
///
/// Produced by `record::build_record`. There is no mutating API; a record
/// is built once and handed to the caller, who must check each `Option`
/// before using the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterQualityRecord {
    pub mission_idx: Option<String>,
    pub water_q_idx: Option<i64>,
    pub zone_id: Option<String>,
    pub device_id: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub curr_wq_state: Option<String>,
    pub target_wq_state: Option<String>,
    pub curr_windspeed: Option<f64>,
    pub forecast_windspeed: Option<f64>,
    pub curr_precipitation: Option<Precipitation>,
    pub forecast_precipitation: Option<Precipitation>,
    pub curr_datetime: Option<String>,
    pub w_data: Measurements,
}

impl WaterQualityRecord {
    /// Wire keys of every absent field. Measurement keys are reported as
    /// `w_data.<key>`.
    pub fn absent_fields(&self) -> Vec<String> {
        let top_level = [
            ("mission_idx", self.mission_idx.is_none()),
            ("water_q_idx", self.water_q_idx.is_none()),
            ("zone_id", self.zone_id.is_none()),
            ("device_id", self.device_id.is_none()),
            ("lat", self.lat.is_none()),
            ("lon", self.lon.is_none()),
            ("curr_wq_state", self.curr_wq_state.is_none()),
            ("target_wq_state", self.target_wq_state.is_none()),
            ("curr_windspeed", self.curr_windspeed.is_none()),
            ("forecast_windspeed", self.forecast_windspeed.is_none()),
            ("curr_precipitation", self.curr_precipitation.is_none()),
            ("forecast_precipitation", self.forecast_precipitation.is_none()),
            ("curr_datetime", self.curr_datetime.is_none()),
        ];

        let mut absent: Vec<String> = top_level
            .iter()
            .filter(|(_, missing)| *missing)
            .map(|(key, _)| key.to_string())
            .collect();
        absent.extend(
            self.w_data
                .absent_fields()
                .into_iter()
                .map(|key| format!("{}.{}", MEASUREMENTS_KEY, key)),
        );
        absent
    }

    /// Grid (column, row) of the record's zone, when `zone_id` is present
    /// and names a tile.
    pub fn zone_tile(&self) -> Option<(usize, usize)> {
        self.zone_id
            .as_deref()
            .and_then(|id| crate::zone::parse_tile_id(id).ok())
    }

    /// Total number of fields a record carries (top-level plus measurements).
    pub fn field_count() -> usize {
        RECORD_KEYS.len() + MEASUREMENT_KEYS.len()
    }

    /// Serializes to a JSON value with every key present.
    pub fn to_json_value(&self) -> serde_json::Value {
        // Only strings, numbers, bools and nulls; this cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Serializes to a compact JSON string with every key present.
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when decoding a loose input bag from JSON.
#[derive(Debug, PartialEq)]
pub enum RecordError {
    /// The body was not valid JSON or a field had the wrong JSON type.
    Json(String),
    /// The body was valid JSON but not an object.
    NotAnObject,
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Json(msg) => write!(f, "JSON error: {}", msg),
            RecordError::NotAnObject => write!(f, "Input must be a JSON object"),
        }
    }
}

impl std::error::Error for RecordError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
