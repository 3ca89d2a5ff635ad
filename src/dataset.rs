//! Dataset documents.
//!
//! The dataset document is the JSON record consumers of the output bucket
//! index. Its field names and nesting follow the Open Data Cube "eo" dataset
//! layout and must not change.

use chrono::{DateTime, Local, NaiveDateTime, SubsecRound, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

use crate::error::{IngestError, Result};
use crate::extent::{find_bounds, Bounds};
use crate::product::Format;

pub const PROCESSING_LEVEL: &str = "modelled";
pub const PRODUCT_TYPE: &str = "gamma_ray";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: Uuid,
    pub processing_level: String,
    pub product_type: String,
    pub creation_dt: String,
    pub extent: Extent,
    pub format: Format,
    pub image: Image,
    pub lineage: Lineage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub coord: CornerCoords,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_dt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_dt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerCoords {
    pub ul: Corner,
    pub ur: Corner,
    pub ll: Corner,
    pub lr: Corner,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub bands: BTreeMap<String, Band>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub path: String,
    pub layername: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lineage {
    pub source_datasets: BTreeMap<String, serde_json::Value>,
}

impl Extent {
    pub fn from_bounds(bounds: &Bounds) -> Self {
        let corner = |lon: Option<f64>, lat: Option<f64>| Corner { lon, lat };
        Self {
            coord: CornerCoords {
                ul: corner(bounds.left, bounds.top),
                ur: corner(bounds.right, bounds.top),
                ll: corner(bounds.left, bounds.bottom),
                lr: corner(bounds.right, bounds.bottom),
            },
            from_dt: bounds.start.map(|t| t.to_string()),
            to_dt: bounds.end.map(|t| t.to_string()),
        }
    }
}

/// Assemble a document from bounds already computed
///
/// In strict mode an incomplete extent is an error; otherwise the missing
/// fields are left out of the document.
pub fn assemble_dataset(
    path: &str,
    bounds: &Bounds,
    modified: NaiveDateTime,
    variables: &[String],
    strict: bool,
) -> Result<Dataset> {
    let missing = bounds.missing_keys();
    if strict && !missing.is_empty() {
        return Err(IngestError::ExtentIncomplete { missing });
    }

    let bands = variables
        .iter()
        .map(|name| {
            let band = Band {
                path: path.to_string(),
                layername: name.clone(),
            };
            (name.clone(), band)
        })
        .collect();

    Ok(Dataset {
        id: Uuid::new_v4(),
        processing_level: PROCESSING_LEVEL.to_string(),
        product_type: PRODUCT_TYPE.to_string(),
        creation_dt: creation_timestamp(modified),
        extent: Extent::from_bounds(bounds),
        format: Format::netcdf(),
        image: Image { bands },
        lineage: Lineage::default(),
    })
}

/// ISO 8601 timestamp rounded to the microsecond; the fraction is only
/// written when it is non-zero
pub fn creation_timestamp(modified: NaiveDateTime) -> String {
    let rounded = modified.round_subsecs(6);
    if rounded.nanosecond() == 0 {
        rounded.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        rounded.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Local modification time of the file
pub fn modification_time(path: &Path) -> Result<NaiveDateTime> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

/// Build the dataset document for the variables of one dimension group
///
/// `dims` and `variables` must come from the same group, otherwise the
/// document pairs the bounds of one group with the bands of another.
pub fn make_dataset<S: AsRef<str>>(
    path: &Path,
    dims: &[S],
    variables: &[String],
    strict: bool,
) -> Result<Dataset> {
    let bounds = find_bounds(path, dims)?;
    let modified = modification_time(path)?;
    assemble_dataset(
        &path.to_string_lossy(),
        &bounds,
        modified,
        variables,
        strict,
    )
}
