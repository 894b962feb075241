//! Water-quality mission utilities.
//!
//! - `record` assembles fixed-shape `WaterQualityRecord`s from loose inputs.
//! - `id_gen` issues `MISSION_...` tracking ids from a per-instance counter.
//! - `zone` names survey tiles (`C7`, `P18`) and maps them to a local metric grid.
//! - `config` and `logging` carry the ambient service setup.

pub mod config;
pub mod id_gen;
pub mod logging;
pub mod model;
pub mod record;
pub mod zone;

pub use id_gen::{MissionIdGenerator, SharedMissionIdGenerator};
pub use model::{Measurements, Precipitation, WaterQualityRecord};
pub use record::build_record;
