//! Strongly typed NetCDF metadata records.
//!
//! Variables are read once into [`VariableMetadata`] so that the grouping,
//! product and extent logic never touches the NetCDF handle. The CF attributes
//! the ingest relies on are lifted out of the raw attribute bag into explicit
//! optional fields; a missing attribute is a `None`, not a lookup failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute marking a variable as carrying gridded data
pub const GRID_MAPPING: &str = "grid_mapping";
/// Attribute declaring the role of a coordinate variable
pub const AXIS: &str = "axis";
/// Physical units
pub const UNITS: &str = "units";
/// Fill value for missing data
pub const FILL_VALUE: &str = "_FillValue";
/// Calendar of a time coordinate
pub const CALENDAR: &str = "calendar";

/// Possible attribute values in NetCDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String attribute
    Text(String),
    /// Signed integer attribute
    Int(i64),
    /// Unsigned integer attribute
    UInt(u64),
    /// Floating point attribute
    Float(f64),
    /// Array of numbers
    NumberArray(Vec<f64>),
    /// Array of strings
    TextArray(Vec<String>),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::UInt(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::NumberArray(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AttributeValue::TextArray(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// A fill value kept in its native numeric kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl FillValue {
    /// Interpret a raw attribute as a fill value; text and arrays do not qualify
    pub fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Int(v) => Some(FillValue::Int(*v)),
            AttributeValue::UInt(v) => Some(FillValue::UInt(*v)),
            AttributeValue::Float(v) => Some(FillValue::Float(*v)),
            AttributeValue::NumberArray(values) if values.len() == 1 => {
                Some(FillValue::Float(values[0]))
            }
            _ => None,
        }
    }
}

/// The CF attributes the ingest depends on, plus everything else verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CfAttributes {
    /// Grid mapping variable name; presence marks gridded data
    pub grid_mapping: Option<String>,
    /// Axis designation: "X", "Y", "Z" or "T"
    pub axis: Option<String>,
    /// Physical units, coerced to text
    pub units: Option<String>,
    /// Fill value in its native type
    pub fill_value: Option<FillValue>,
    /// Calendar of a time coordinate
    pub calendar: Option<String>,
    /// All attributes as read from the file
    pub raw: BTreeMap<String, AttributeValue>,
}

impl CfAttributes {
    /// Lift the known CF attributes out of a raw attribute bag
    pub fn from_raw(raw: BTreeMap<String, AttributeValue>) -> Self {
        let text = |name: &str| raw.get(name).map(|v| v.to_string());
        Self {
            grid_mapping: text(GRID_MAPPING),
            axis: text(AXIS),
            units: text(UNITS),
            fill_value: raw.get(FILL_VALUE).and_then(FillValue::from_attribute),
            calendar: text(CALENDAR),
            raw,
        }
    }
}

/// Metadata about a NetCDF variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableMetadata {
    /// Name of the variable
    pub name: String,
    /// Ordered dimension names
    pub dimensions: Vec<String>,
    /// numpy-style data type name
    pub dtype: String,
    /// Variable attributes
    pub attributes: CfAttributes,
}

impl VariableMetadata {
    /// Whether the variable carries the grid-mapping marker
    pub fn is_gridded(&self) -> bool {
        self.attributes.grid_mapping.is_some()
    }
}

/// A coordinate variable read for extent computation
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    /// Name of the dimension / coordinate variable
    pub name: String,
    /// Attributes of the coordinate variable
    pub attributes: CfAttributes,
    /// Coordinate values converted to f64
    pub values: Vec<f64>,
}
