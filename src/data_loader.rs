//! NetCDF data loading functionality.
//!
//! This module is the only place that talks to the NetCDF library. It turns
//! variables into [`VariableMetadata`] records and coordinate variables into
//! [`Coordinate`] values; the rest of the crate works on those records.

use netcdf::{self, Attribute, Variable as NetCDFVariable};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};
use crate::metadata::{AttributeValue, CfAttributes, Coordinate, VariableMetadata};

/// Open a NetCDF file for reading
///
/// The returned handle closes the file when dropped.
pub fn open_source(path: &Path) -> Result<netcdf::File> {
    // Check if the file exists
    if !path.exists() {
        return Err(IngestError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let file = netcdf::open(path)?;

    info!("Opened NetCDF file: {}", path.display());
    debug!("File has {} variables", file.variables().count());
    debug!("File has {} dimensions", file.dimensions().count());

    Ok(file)
}

/// Read the metadata of every variable, in file order
pub fn read_variables(file: &netcdf::File) -> Result<Vec<VariableMetadata>> {
    file.variables().map(|var| read_variable(&var)).collect()
}

/// Open `path` and read its variable metadata, closing the file afterwards
pub fn load_variables(path: &Path) -> Result<Vec<VariableMetadata>> {
    let file = open_source(path)?;
    read_variables(&file)
}

fn read_variable(var: &NetCDFVariable) -> Result<VariableMetadata> {
    let dimensions: Vec<String> = var
        .dimensions()
        .iter()
        .map(|dim| dim.name().to_string())
        .collect();

    Ok(VariableMetadata {
        name: var.name().to_string(),
        dimensions,
        dtype: dtype_name(var),
        attributes: CfAttributes::from_raw(read_attributes(var)?),
    })
}

/// Read the coordinate variable backing dimension `name`
///
/// Returns `None` when the file has no variable of that name, which is the
/// case for plain index dimensions.
pub fn read_coordinate(file: &netcdf::File, name: &str) -> Result<Option<Coordinate>> {
    let Some(var) = file.variable(name) else {
        debug!(dimension = name, "No coordinate variable for dimension");
        return Ok(None);
    };

    let attributes = CfAttributes::from_raw(read_attributes(&var)?);
    let values = extract_coordinate_values(&var)?;

    Ok(Some(Coordinate {
        name: name.to_string(),
        attributes,
        values,
    }))
}

fn read_attributes(var: &NetCDFVariable) -> Result<BTreeMap<String, AttributeValue>> {
    let mut attributes = BTreeMap::new();
    for attr in var.attributes() {
        let value = convert_attribute(&attr)?;
        attributes.insert(attr.name().to_string(), value);
    }
    Ok(attributes)
}

/// Extract coordinate values as f64, reading each type natively
fn extract_coordinate_values(var: &NetCDFVariable) -> Result<Vec<f64>> {
    use netcdf::types::{BasicType, VariableType};

    let values = match var.vartype() {
        VariableType::Basic(BasicType::Byte) => widen(var.get_values::<i8, _>(..)?),
        VariableType::Basic(BasicType::Ubyte) => widen(var.get_values::<u8, _>(..)?),
        VariableType::Basic(BasicType::Short) => widen(var.get_values::<i16, _>(..)?),
        VariableType::Basic(BasicType::Ushort) => widen(var.get_values::<u16, _>(..)?),
        VariableType::Basic(BasicType::Int) => widen(var.get_values::<i32, _>(..)?),
        VariableType::Basic(BasicType::Uint) => widen(var.get_values::<u32, _>(..)?),
        VariableType::Basic(BasicType::Int64) => var
            .get_values::<i64, _>(..)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        VariableType::Basic(BasicType::Uint64) => var
            .get_values::<u64, _>(..)?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        VariableType::Basic(BasicType::Float) => widen(var.get_values::<f32, _>(..)?),
        VariableType::Basic(BasicType::Double) => var.get_values::<f64, _>(..)?,
        other => {
            warn!(
                coordinate = %var.name(),
                vartype = ?other,
                "Unsupported coordinate variable type, values ignored"
            );
            Vec::new()
        }
    };

    Ok(values)
}

fn widen<T: Into<f64>>(values: Vec<T>) -> Vec<f64> {
    values.into_iter().map(Into::into).collect()
}

/// numpy-style name of the variable's data type
fn dtype_name(var: &NetCDFVariable) -> String {
    use netcdf::types::{BasicType, VariableType};

    let name = match var.vartype() {
        VariableType::Basic(BasicType::Byte) => "int8",
        VariableType::Basic(BasicType::Ubyte) => "uint8",
        VariableType::Basic(BasicType::Short) => "int16",
        VariableType::Basic(BasicType::Ushort) => "uint16",
        VariableType::Basic(BasicType::Int) => "int32",
        VariableType::Basic(BasicType::Uint) => "uint32",
        VariableType::Basic(BasicType::Int64) => "int64",
        VariableType::Basic(BasicType::Uint64) => "uint64",
        VariableType::Basic(BasicType::Float) => "float32",
        VariableType::Basic(BasicType::Double) => "float64",
        VariableType::Basic(BasicType::Char) => "|S1",
        VariableType::String => "str",
        other => return format!("{:?}", other),
    };
    name.to_string()
}

/// Convert a NetCDF attribute to our AttributeValue enum
fn convert_attribute(attr: &Attribute) -> Result<AttributeValue> {
    use netcdf::AttributeValue as NcAttributeValue;

    let value = attr.value()?;

    let converted = match value {
        NcAttributeValue::Str(s) => AttributeValue::Text(s),
        NcAttributeValue::Strs(s) => AttributeValue::TextArray(s),

        NcAttributeValue::Schar(v) => AttributeValue::Int(v.into()),
        NcAttributeValue::Short(v) => AttributeValue::Int(v.into()),
        NcAttributeValue::Int(v) => AttributeValue::Int(v.into()),
        NcAttributeValue::Longlong(v) => AttributeValue::Int(v),
        NcAttributeValue::Uchar(v) => AttributeValue::UInt(v.into()),
        NcAttributeValue::Ushort(v) => AttributeValue::UInt(v.into()),
        NcAttributeValue::Uint(v) => AttributeValue::UInt(v.into()),
        NcAttributeValue::Ulonglong(v) => AttributeValue::UInt(v),
        NcAttributeValue::Float(v) => AttributeValue::Float(v.into()),
        NcAttributeValue::Double(v) => AttributeValue::Float(v),

        NcAttributeValue::Floats(v) => {
            AttributeValue::NumberArray(v.into_iter().map(f64::from).collect())
        }
        NcAttributeValue::Doubles(v) => AttributeValue::NumberArray(v),
        NcAttributeValue::Shorts(v) => {
            AttributeValue::NumberArray(v.into_iter().map(f64::from).collect())
        }
        NcAttributeValue::Ints(v) => {
            AttributeValue::NumberArray(v.into_iter().map(f64::from).collect())
        }

        // Remaining array kinds are kept as text
        other => AttributeValue::Text(format!("{:?}", other)),
    };

    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FillValue;
    use tempfile::tempdir;

    /// Create a small NetCDF file with one gridded and one auxiliary variable
    fn create_test_netcdf_file(path: &Path) -> Result<()> {
        let mut file = netcdf::create(path)?;

        file.add_dimension("lat", 3)?;
        file.add_dimension("lon", 4)?;

        {
            let mut lat = file.add_variable::<f64>("lat", &["lat"])?;
            lat.put_attribute("axis", "Y")?;
            lat.put_attribute("units", "degrees_north")?;
            lat.put_values(&[50.0, 51.0, 52.0], ..)?;
        }
        {
            let mut lon = file.add_variable::<f32>("lon", &["lon"])?;
            lon.put_attribute("axis", "X")?;
            lon.put_values(&[-3.0f32, -2.0, -1.0, 0.0], ..)?;
        }
        {
            let mut temp = file.add_variable::<f32>("temperature", &["lat", "lon"])?;
            temp.put_attribute("_FillValue", -999.0f32)?;
            temp.put_attribute("units", "K")?;
            temp.put_attribute("grid_mapping", "latitude_longitude")?;
            temp.put_values(&[280.0f32; 12], ..)?;
        }
        {
            let mut count = file.add_variable::<i16>("counts", &["lat", "lon"])?;
            count.put_attribute("_FillValue", -1i16)?;
            count.put_values(&[1i16; 12], ..)?;
        }

        Ok(())
    }

    #[test]
    fn test_file_not_found() {
        let result = open_source(Path::new("/nonexistent/file.nc"));
        match result {
            Err(IngestError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected IO error"),
        }
    }

    #[test]
    fn test_read_variables() -> Result<()> {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.nc");
        create_test_netcdf_file(&file_path)?;

        let variables = load_variables(&file_path)?;
        let temp = variables
            .iter()
            .find(|v| v.name == "temperature")
            .expect("temperature variable");

        assert_eq!(temp.dimensions, vec!["lat", "lon"]);
        assert_eq!(temp.dtype, "float32");
        assert_eq!(temp.attributes.units.as_deref(), Some("K"));
        assert_eq!(temp.attributes.fill_value, Some(FillValue::Float(-999.0)));
        assert!(temp.is_gridded());

        let counts = variables.iter().find(|v| v.name == "counts").unwrap();
        assert_eq!(counts.dtype, "int16");
        assert_eq!(counts.attributes.fill_value, Some(FillValue::Int(-1)));
        assert!(!counts.is_gridded());

        Ok(())
    }

    #[test]
    fn test_dtype_names_and_integer_coordinates() -> Result<()> {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("types.nc");
        {
            let mut file = netcdf::create(&file_path)?;
            file.add_dimension("x", 3)?;
            file.add_variable::<i8>("v_i8", &["x"])?.put_values(&[1i8, 2, 3], ..)?;
            file.add_variable::<u8>("v_u8", &["x"])?.put_values(&[1u8, 2, 3], ..)?;
            file.add_variable::<i16>("v_i16", &["x"])?.put_values(&[1i16, 2, 3], ..)?;
            file.add_variable::<u16>("v_u16", &["x"])?.put_values(&[1u16, 2, 3], ..)?;
            file.add_variable::<i32>("v_i32", &["x"])?.put_values(&[-4i32, 0, 7], ..)?;
            file.add_variable::<u32>("v_u32", &["x"])?.put_values(&[1u32, 2, 3], ..)?;
            file.add_variable::<i64>("v_i64", &["x"])?.put_values(&[1i64, 2, 3], ..)?;
            file.add_variable::<u64>("v_u64", &["x"])?.put_values(&[1u64, 2, 9], ..)?;
            file.add_variable::<f32>("v_f32", &["x"])?.put_values(&[1f32, 2.0, 3.0], ..)?;
            file.add_variable::<f64>("v_f64", &["x"])?.put_values(&[1f64, 2.0, 3.0], ..)?;
        }

        let dtypes: BTreeMap<String, String> = load_variables(&file_path)?
            .into_iter()
            .map(|v| (v.name, v.dtype))
            .collect();
        for (name, dtype) in [
            ("v_i8", "int8"),
            ("v_u8", "uint8"),
            ("v_i16", "int16"),
            ("v_u16", "uint16"),
            ("v_i32", "int32"),
            ("v_u32", "uint32"),
            ("v_i64", "int64"),
            ("v_u64", "uint64"),
            ("v_f32", "float32"),
            ("v_f64", "float64"),
        ] {
            assert_eq!(dtypes[name], dtype, "dtype of {}", name);
        }

        let file = open_source(&file_path)?;
        let ints = read_coordinate(&file, "v_i32")?.unwrap();
        assert_eq!(ints.values, vec![-4.0, 0.0, 7.0]);
        let longs = read_coordinate(&file, "v_u64")?.unwrap();
        assert_eq!(longs.values, vec![1.0, 2.0, 9.0]);
        Ok(())
    }

    #[test]
    fn test_read_coordinate() -> Result<()> {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.nc");
        create_test_netcdf_file(&file_path)?;

        let file = open_source(&file_path)?;
        let lon = read_coordinate(&file, "lon")?.expect("lon coordinate");
        assert_eq!(lon.attributes.axis.as_deref(), Some("X"));
        assert_eq!(lon.values, vec![-3.0, -2.0, -1.0, 0.0]);

        assert!(read_coordinate(&file, "height")?.is_none());
        Ok(())
    }
}
