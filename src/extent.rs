//! Spatial and temporal extent of a dataset.
//!
//! Coordinate variables declare their role with the CF `axis` attribute.
//! `X` gives the left/right bounds, `Y` the bottom/top bounds and `T` the
//! start/end instants. Any other axis value is ignored, and when two
//! dimensions claim the same axis the later one wins.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::data_loader::{open_source, read_coordinate};
use crate::error::Result;
use crate::metadata::Coordinate;

/// Role of a coordinate variable, from its `axis` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    T,
}

impl Axis {
    /// Case-sensitive; anything but `X`, `Y` or `T` has no role here
    pub fn from_attribute(axis: Option<&str>) -> Option<Self> {
        match axis? {
            "X" => Some(Axis::X),
            "Y" => Some(Axis::Y),
            "T" => Some(Axis::T),
            _ => None,
        }
    }
}

/// A time bound: a decoded instant, or the raw coordinate value when the
/// units cannot be interpreted as a CF time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeValue {
    Instant(NaiveDateTime),
    Raw(f64),
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeValue::Instant(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.9f")),
            TimeValue::Raw(v) => write!(f, "{:?}", v),
        }
    }
}

impl Serialize for TimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Bounds found among the inspected coordinates; unset keys mean the axis
/// was not present
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<TimeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<TimeValue>,
}

impl Bounds {
    /// Names of the keys that are still unset
    pub fn missing_keys(&self) -> Vec<String> {
        let keys = [
            ("left", self.left.is_none()),
            ("right", self.right.is_none()),
            ("top", self.top.is_none()),
            ("bottom", self.bottom.is_none()),
            ("start", self.start.is_none()),
            ("end", self.end.is_none()),
        ];
        keys.iter()
            .filter(|(_, missing)| *missing)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_keys().is_empty()
    }
}

/// CF time units of the form `<unit> since <reference>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    step_seconds: f64,
    epoch: NaiveDateTime,
}

impl TimeUnits {
    pub fn parse(units: &str) -> Option<Self> {
        let (unit, reference) = units.trim().split_once(" since ")?;
        let step_seconds = match unit.trim().to_ascii_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3600.0,
            "days" | "day" | "d" => 86400.0,
            _ => return None,
        };
        let epoch = parse_reference(reference)?;
        Some(Self {
            step_seconds,
            epoch,
        })
    }

    pub fn decode(&self, value: f64) -> Option<NaiveDateTime> {
        let millis = (value * self.step_seconds * 1000.0).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return None;
        }
        let delta = TimeDelta::try_milliseconds(millis as i64)?;
        self.epoch.checked_add_signed(delta)
    }
}

fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    let reference = reference.trim();
    let reference = reference.strip_suffix("UTC").unwrap_or(reference).trim_end();
    let reference = reference.strip_suffix('Z').unwrap_or(reference);

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(reference, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(reference, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
}

fn is_gregorian(calendar: Option<&str>) -> bool {
    match calendar {
        None => true,
        Some(calendar) => matches!(
            calendar.to_ascii_lowercase().as_str(),
            "standard" | "gregorian" | "proleptic_gregorian"
        ),
    }
}

/// Smallest and largest finite value
fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn time_bounds(coord: &Coordinate, min: f64, max: f64) -> (TimeValue, TimeValue) {
    let units = coord
        .attributes
        .units
        .as_deref()
        .filter(|_| is_gregorian(coord.attributes.calendar.as_deref()))
        .and_then(TimeUnits::parse);

    match units {
        Some(units) => {
            let decode = |v: f64| units.decode(v).map_or(TimeValue::Raw(v), TimeValue::Instant);
            (decode(min), decode(max))
        }
        None => {
            warn!(
                coordinate = %coord.name,
                units = coord.attributes.units.as_deref().unwrap_or("none"),
                "Time units not decodable, keeping raw values"
            );
            (TimeValue::Raw(min), TimeValue::Raw(max))
        }
    }
}

/// Compute bounds from already loaded coordinates, in order
pub fn bounds_from_coordinates(coordinates: &[Coordinate]) -> Bounds {
    let mut bounds = Bounds::default();

    for coord in coordinates {
        let Some(axis) = Axis::from_attribute(coord.attributes.axis.as_deref()) else {
            debug!(coordinate = %coord.name, axis = ?coord.attributes.axis, "Ignoring coordinate");
            continue;
        };
        let Some((min, max)) = min_max(&coord.values) else {
            warn!(coordinate = %coord.name, "Coordinate has no values, ignoring");
            continue;
        };

        match axis {
            Axis::X => {
                bounds.left = Some(min);
                bounds.right = Some(max);
            }
            Axis::Y => {
                bounds.top = Some(max);
                bounds.bottom = Some(min);
            }
            Axis::T => {
                let (start, end) = time_bounds(coord, min, max);
                bounds.start = Some(start);
                bounds.end = Some(end);
            }
        }
    }

    bounds
}

/// Open `path`, read the coordinate variables of `dims` and compute bounds
///
/// The file is closed before the bounds are computed, on success and on error.
pub fn find_bounds<S: AsRef<str>>(path: &Path, dims: &[S]) -> Result<Bounds> {
    let coordinates = {
        let file = open_source(path)?;
        dims.iter()
            .filter_map(|dim| read_coordinate(&file, dim.as_ref()).transpose())
            .collect::<Result<Vec<_>>>()?
    };

    Ok(bounds_from_coordinates(&coordinates))
}
