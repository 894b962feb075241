//! Water-quality record assembly.
//!
//! `build_record` maps a loose `RecordParams` bag onto the fixed-shape
//! `WaterQualityRecord`. It is total: any subset of inputs, including none,
//! produces a record, and every missing field comes out as `None`. Values
//! are moved across unchanged; nothing is validated, coerced or defaulted.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::logging::{self, Component};
use crate::model::{
    MEASUREMENTS_KEY, MeasurementParams, Measurements, RecordError, RecordParams, WaterQualityRecord,
};

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Maps a measurement bag onto `Measurements` field by field.
pub fn build_measurements(params: MeasurementParams) -> Measurements {
    Measurements {
        temp_c: params.temp_c,
        ph: params.ph,
        ec_us_cm: params.ec_us_cm,
        do_mg_l: params.do_mg_l,
        toc_mg_l: params.toc_mg_l,
        cod_mg_l: params.cod_mg_l,
        t_n_mg_l: params.t_n_mg_l,
        t_p_mg_l: params.t_p_mg_l,
        ss_mg_l: params.ss_mg_l,
        cl_mg_l: params.cl_mg_l,
        chl_a_mg_m3: params.chl_a_mg_m3,
        cd_mg_l: params.cd_mg_l,
        bod_mg_l: params.bod_mg_l,
    }
}

/// Builds a `WaterQualityRecord` from a loose input bag.
///
/// A missing `w_data` bag yields a `Measurements` with all 13 readings
/// absent, the same as an empty bag would.
pub fn build_record(params: RecordParams) -> WaterQualityRecord {
    let record = WaterQualityRecord {
        mission_idx: params.mission_idx,
        water_q_idx: params.water_q_idx,
        zone_id: params.zone_id,
        device_id: params.device_id,
        lat: params.lat,
        lon: params.lon,
        curr_wq_state: params.curr_wq_state,
        target_wq_state: params.target_wq_state,
        curr_windspeed: params.curr_windspeed,
        forecast_windspeed: params.forecast_windspeed,
        curr_precipitation: params.curr_precipitation,
        forecast_precipitation: params.forecast_precipitation,
        curr_datetime: params.curr_datetime,
        w_data: build_measurements(params.w_data.unwrap_or_default()),
    };

    logging::log_record_summary(&record);
    record
}

// ---------------------------------------------------------------------------
// JSON input
// ---------------------------------------------------------------------------

/// A decoded input bag plus the keys whose values had the wrong JSON type.
///
/// Mismatched keys are reported with their wire path (`lat`, `w_data.ph`,
/// or `w_data` itself when it is not an object) and decode as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedParams {
    pub params: RecordParams,
    pub mismatched: Vec<String>,
}

/// Reads typed fields out of one JSON object, one key at a time.
struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    prefix: &'static str,
    mismatched: &'a mut Vec<String>,
}

impl FieldReader<'_> {
    fn read<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        match self.map.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value::<T>(value.clone()) {
                Ok(v) => Some(v),
                Err(_) => {
                    self.mismatched.push(format!("{}{}", self.prefix, key));
                    None
                }
            },
        }
    }
}

fn decode_measurements(map: &Map<String, Value>, mismatched: &mut Vec<String>) -> MeasurementParams {
    let mut r = FieldReader {
        map,
        prefix: "w_data.",
        mismatched,
    };
    MeasurementParams {
        temp_c: r.read("temp_c"),
        ph: r.read("ph"),
        ec_us_cm: r.read("ec_us_cm"),
        do_mg_l: r.read("do_mg_l"),
        toc_mg_l: r.read("toc_mg_l"),
        cod_mg_l: r.read("cod_mg_l"),
        t_n_mg_l: r.read("t_n_mg_l"),
        t_p_mg_l: r.read("t_p_mg_l"),
        ss_mg_l: r.read("ss_mg_l"),
        cl_mg_l: r.read("cl_mg_l"),
        chl_a_mg_m3: r.read("chl_a_mg_m3"),
        cd_mg_l: r.read("cd_mg_l"),
        bod_mg_l: r.read("bod_mg_l"),
    }
}

/// Decodes an input bag from an already-parsed JSON object.
///
/// Unknown keys are ignored; `null` and missing keys both mean absent. A
/// value of the wrong JSON type (`"lat": "37.38"`, `"mission_idx": 40`) is
/// not coerced: that one field decodes as absent and its key is listed in
/// `mismatched`. Every other field is kept.
pub fn decode_params(map: &Map<String, Value>) -> DecodedParams {
    let mut mismatched = Vec::new();

    let w_data = match map.get(MEASUREMENTS_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::Object(inner)) => Some(decode_measurements(inner, &mut mismatched)),
        Some(_) => {
            mismatched.push(MEASUREMENTS_KEY.to_string());
            None
        }
    };

    let mut r = FieldReader {
        map,
        prefix: "",
        mismatched: &mut mismatched,
    };
    let params = RecordParams {
        mission_idx: r.read("mission_idx"),
        water_q_idx: r.read("water_q_idx"),
        zone_id: r.read("zone_id"),
        device_id: r.read("device_id"),
        lat: r.read("lat"),
        lon: r.read("lon"),
        curr_wq_state: r.read("curr_wq_state"),
        target_wq_state: r.read("target_wq_state"),
        curr_windspeed: r.read("curr_windspeed"),
        forecast_windspeed: r.read("forecast_windspeed"),
        curr_precipitation: r.read("curr_precipitation"),
        forecast_precipitation: r.read("forecast_precipitation"),
        curr_datetime: r.read("curr_datetime"),
        w_data,
    };

    // Keys come out in wire order with measurement keys first; sort for a stable report.
    mismatched.sort();
    DecodedParams { params, mismatched }
}

/// Decodes an input bag from a JSON body, reporting mismatched keys.
///
/// Fails only if the body is not JSON or is not a JSON object.
pub fn decode_params_json(body: &str) -> Result<DecodedParams, RecordError> {
    let value: Value = serde_json::from_str(body).map_err(|e| RecordError::Json(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(decode_params(&map)),
        _ => Err(RecordError::NotAnObject),
    }
}

/// Decodes a loose input bag from a JSON object body.
///
/// Mismatched keys are logged at warn level and decode as absent; see
/// `decode_params`.
pub fn params_from_json(body: &str) -> Result<RecordParams, RecordError> {
    match decode_params_json(body) {
        Ok(decoded) => {
            for key in &decoded.mismatched {
                logging::warn(Component::Record, Some(key.as_str()), "wrong JSON type, treated as absent");
            }
            Ok(decoded.params)
        }
        Err(e) => {
            logging::warn(Component::Record, None, &format!("rejected input bag: {}", e));
            Err(e)
        }
    }
}

/// Decodes a JSON body and builds a record from it.
pub fn build_record_from_json(body: &str) -> Result<WaterQualityRecord, RecordError> {
    params_from_json(body).map(build_record)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Precipitation;

    #[test]
    fn test_empty_input_yields_all_absent() {
        let record = build_record(RecordParams::default());
        assert_eq!(record, WaterQualityRecord::default());
        assert_eq!(record.absent_fields().len(), WaterQualityRecord::field_count());
    }

    #[test]
    fn test_mission_and_single_reading() {
        let params = RecordParams {
            mission_idx: Some("M1".to_string()),
            w_data: Some(MeasurementParams {
                ph: Some(7.2),
                ..Default::default()
            }),
            ..Default::default()
        };

        let record = build_record(params);

        assert_eq!(record.mission_idx.as_deref(), Some("M1"));
        assert_eq!(record.w_data.ph, Some(7.2));
        assert_eq!(record.w_data.temp_c, None);
        assert_eq!(record.zone_id, None);
        assert_eq!(record.curr_datetime, None);
        assert_eq!(record.absent_fields().len(), WaterQualityRecord::field_count() - 2);
    }

    #[test]
    fn test_zero_and_empty_values_are_kept_not_treated_as_absent() {
        let params = RecordParams {
            zone_id: Some(String::new()),
            curr_windspeed: Some(0.0),
            curr_precipitation: Some(Precipitation::Flag(false)),
            w_data: Some(MeasurementParams {
                cd_mg_l: Some(0.0),
                ..Default::default()
            }),
            ..Default::default()
        };

        let record = build_record(params);

        assert_eq!(record.zone_id.as_deref(), Some(""));
        assert_eq!(record.curr_windspeed, Some(0.0));
        assert_eq!(record.curr_precipitation, Some(Precipitation::Flag(false)));
        assert_eq!(record.w_data.cd_mg_l, Some(0.0));
    }

    #[test]
    fn test_full_input_maps_every_field() {
        let params = RecordParams {
            mission_idx: Some("MISSION_20240501_0040".into()),
            water_q_idx: Some(40),
            zone_id: Some("P18".into()),
            device_id: Some("wamv1".into()),
            lat: Some(37.382889),
            lon: Some(127.002551),
            curr_wq_state: Some("IV".into()),
            target_wq_state: Some("III".into()),
            curr_windspeed: Some(4.2),
            forecast_windspeed: Some(6.8),
            curr_precipitation: Some(Precipitation::Amount(0.0)),
            forecast_precipitation: Some(Precipitation::Flag(true)),
            curr_datetime: Some("2024-05-01T12:00:00Z".into()),
            w_data: Some(MeasurementParams {
                temp_c: Some(19.5),
                ph: Some(7.4),
                ec_us_cm: Some(230.0),
                do_mg_l: Some(7.2),
                toc_mg_l: Some(2.7),
                cod_mg_l: Some(10.6),
                t_n_mg_l: Some(1.9),
                t_p_mg_l: Some(0.8),
                ss_mg_l: Some(5.6),
                cl_mg_l: Some(5.6),
                chl_a_mg_m3: Some(6.5),
                cd_mg_l: Some(0.5),
                bod_mg_l: Some(2.0),
            }),
        };

        let record = build_record(params);

        assert!(record.absent_fields().is_empty());
        assert_eq!(record.zone_id.as_deref(), Some("P18"));
        assert_eq!(record.target_wq_state.as_deref(), Some("III"));
        assert_eq!(record.forecast_precipitation, Some(Precipitation::Flag(true)));
        assert_eq!(record.w_data.chl_a_mg_m3, Some(6.5));
        assert_eq!(record.w_data.present_count(), 13);
    }

    #[test]
    fn test_params_from_json_ignores_unknown_keys_and_nulls() {
        let params = params_from_json(
            r#"{"mission_idx": "M1", "reason": "extra", "lat": null, "w_data": {"ph": 7.2, "turb": 3}}"#,
        )
        .expect("object body should decode");

        assert_eq!(params.mission_idx.as_deref(), Some("M1"));
        assert_eq!(params.lat, None);
        assert_eq!(params.w_data.and_then(|w| w.ph), Some(7.2));
    }

    #[test]
    fn test_params_from_json_rejects_non_objects() {
        assert_eq!(params_from_json("[1, 2]"), Err(RecordError::NotAnObject));
        assert_eq!(params_from_json("null"), Err(RecordError::NotAnObject));
        assert!(matches!(params_from_json("{"), Err(RecordError::Json(_))));
    }

    #[test]
    fn test_wrong_typed_value_keeps_the_other_fields() {
        let record = build_record_from_json(r#"{"zone_id": "P18", "w_data": {"ph": "7.2", "do_mg_l": 8.0}}"#)
            .expect("object body should decode");

        assert_eq!(record.zone_id.as_deref(), Some("P18"));
        assert_eq!(record.w_data.ph, None);
        assert_eq!(record.w_data.do_mg_l, Some(8.0));
    }

    #[test]
    fn test_decode_params_reports_mismatched_keys_without_coercion() {
        let decoded = decode_params_json(
            r#"{"mission_id": 40, "mission_idx": 40, "lat": "37.382889", "lon": 127.002551,
                "curr_precipitation": "heavy", "w_data": {"ph": "7.2", "temp_c": 19.5}}"#,
        )
        .unwrap();

        assert_eq!(decoded.mismatched, vec!["curr_precipitation", "lat", "mission_idx", "w_data.ph"]);
        assert_eq!(decoded.params.mission_idx, None);
        assert_eq!(decoded.params.lat, None);
        assert_eq!(decoded.params.lon, Some(127.002551));
        assert_eq!(decoded.params.w_data.as_ref().and_then(|w| w.temp_c), Some(19.5));
    }

    #[test]
    fn test_non_object_w_data_is_mismatched_not_fatal() {
        let decoded = decode_params_json(r#"{"zone_id": "C7", "w_data": [7.2]}"#).unwrap();
        assert_eq!(decoded.mismatched, vec!["w_data"]);
        assert_eq!(decoded.params.w_data, None);
        assert_eq!(decoded.params.zone_id.as_deref(), Some("C7"));
    }

    #[test]
    fn test_well_typed_body_has_no_mismatches() {
        let decoded = decode_params_json(r#"{"water_q_idx": 3, "curr_precipitation": 0, "w_data": null}"#).unwrap();
        assert!(decoded.mismatched.is_empty());
        assert_eq!(decoded.params.water_q_idx, Some(3));
        assert_eq!(decoded.params.curr_precipitation, Some(Precipitation::Amount(0.0)));
    }

    #[test]
    fn test_build_record_from_empty_object() {
        let record = build_record_from_json("{}").expect("empty object is valid input");
        assert_eq!(record, WaterQualityRecord::default());
    }
}
