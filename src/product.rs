//! Product definitions.
//!
//! A product describes one dimension group as an Open Data Cube product: its
//! name is every member variable joined with `_`, and it lists one measurement
//! per variable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::grouping::{DimensionGroups, DimensionKey};
use crate::metadata::{FillValue, VariableMetadata, FILL_VALUE, UNITS};

pub const PLATFORM_CODE: &str = "mogreps";
pub const METADATA_TYPE: &str = "eo";
pub const FORMAT_NAME: &str = "NETCDF";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub metadata_type: String,
    pub metadata: ProductMetadata,
    pub measurements: Vec<Measurement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub platform: Platform,
    pub product_type: String,
    pub format: Format,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub code: String,
}

/// File format block shared by products and datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub name: String,
}

impl Format {
    pub fn netcdf() -> Self {
        Self {
            name: FORMAT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub dtype: String,
    pub units: String,
    pub nodata: FillValue,
}

impl Measurement {
    /// Fails when the variable lacks `units` or `_FillValue`
    pub fn from_variable(var: &VariableMetadata) -> Result<Self> {
        let units = var
            .attributes
            .units
            .clone()
            .ok_or_else(|| IngestError::missing(&var.name, UNITS))?;
        let nodata = var
            .attributes
            .fill_value
            .ok_or_else(|| IngestError::missing(&var.name, FILL_VALUE))?;

        Ok(Self {
            name: var.name.clone(),
            dtype: var.dtype.clone(),
            units,
            nodata,
        })
    }
}

/// Build the product describing one dimension group
///
/// The key is not part of the product itself; it travels alongside so that
/// callers keep groups and keys paired.
pub fn generate_product(_dims: &DimensionKey, variables: &[VariableMetadata]) -> Result<Product> {
    let name = variables
        .iter()
        .map(|var| var.name.as_str())
        .collect::<Vec<_>>()
        .join("_");

    let measurements = variables
        .iter()
        .map(Measurement::from_variable)
        .collect::<Result<Vec<_>>>()?;

    Ok(Product {
        description: name.clone(),
        metadata_type: METADATA_TYPE.to_string(),
        metadata: ProductMetadata {
            platform: Platform {
                code: PLATFORM_CODE.to_string(),
            },
            product_type: name.clone(),
            format: Format::netcdf(),
        },
        name,
        measurements,
    })
}

/// One product per group, in group order
pub fn synthesize_products(groups: &DimensionGroups) -> Result<Vec<Product>> {
    let products = groups
        .iter()
        .map(|(dims, variables)| generate_product(dims, variables))
        .collect::<Result<Vec<_>>>()?;

    debug!(product_count = products.len(), "Synthesized products");
    Ok(products)
}
