//! Test data generation utilities.
//!
//! This module writes small NetCDF files shaped like MOGREPS-UK output:
//! rotated-pole grid coordinates, an hourly time axis and grid-mapped fields.

use std::path::Path;

// Use the netcdf crate's error type directly
use netcdf::Error;
type Result<T> = std::result::Result<T, Error>;

pub const TIME_STEPS: usize = 24;
pub const GRID_SIZE: usize = 13;

/// Latitudes 49.0 ..= 61.0 and longitudes -10.0 ..= 2.0, one degree apart
fn grid_values(start: f32) -> Vec<f32> {
    (0..GRID_SIZE).map(|i| start + i as f32).collect()
}

/// Add the grid_latitude/grid_longitude coordinates and the grid mapping
fn add_grid(file: &mut netcdf::FileMut) -> Result<()> {
    file.add_dimension("grid_latitude", GRID_SIZE)?;
    file.add_dimension("grid_longitude", GRID_SIZE)?;

    {
        let mut lat_var = file.add_variable::<f32>("grid_latitude", &["grid_latitude"])?;
        lat_var.put_attribute("axis", "Y")?;
        lat_var.put_attribute("units", "degrees")?;
        lat_var.put_attribute("standard_name", "grid_latitude")?;
        lat_var.put_values(&grid_values(49.0), ..)?;
    }

    {
        let mut lon_var = file.add_variable::<f32>("grid_longitude", &["grid_longitude"])?;
        lon_var.put_attribute("axis", "X")?;
        lon_var.put_attribute("units", "degrees")?;
        lon_var.put_attribute("standard_name", "grid_longitude")?;
        lon_var.put_values(&grid_values(-10.0), ..)?;
    }

    {
        let mut crs_var = file.add_variable::<i32>("rotated_latitude_longitude", &[])?;
        crs_var.put_attribute("grid_mapping_name", "rotated_latitude_longitude")?;
        crs_var.put_attribute("grid_north_pole_latitude", 37.5f32)?;
        crs_var.put_attribute("grid_north_pole_longitude", 177.5f32)?;
    }

    Ok(())
}

/// Add a grid-mapped f32 field filled with a constant
fn add_field(
    file: &mut netcdf::FileMut,
    name: &str,
    dims: &[&str],
    units: &str,
    value: f32,
) -> Result<()> {
    let len: usize = dims
        .iter()
        .map(|d| if *d == "time" { TIME_STEPS } else { GRID_SIZE })
        .product();

    let mut var = file.add_variable::<f32>(name, dims)?;
    var.put_attribute("_FillValue", -999.0f32)?;
    var.put_attribute("units", units)?;
    var.put_attribute("grid_mapping", "rotated_latitude_longitude")?;
    var.put_values(&vec![value; len], ..)?;
    Ok(())
}

/// Creates a MOGREPS-like file.
///
/// Dimension groups, in sorted key order:
/// 0. `(grid_latitude, grid_longitude)`: `surface_altitude`
/// 1. `(time, grid_latitude, grid_longitude)`: `air_temperature`, `precipitation_flux`
///
/// Time runs hourly from 2014-01-01T00:00 to 2014-01-01T23:00.
pub fn create_mogreps_nc(path: &Path) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_attribute("title", "MOGREPS-UK test data")?;
    file.add_attribute("Conventions", "CF-1.5")?;

    add_grid(&mut file)?;

    file.add_dimension("time", TIME_STEPS)?;
    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("axis", "T")?;
        time_var.put_attribute("units", "hours since 2014-01-01 00:00:00")?;
        time_var.put_attribute("calendar", "gregorian")?;
        let time_values: Vec<f64> = (0..TIME_STEPS).map(|i| i as f64).collect();
        time_var.put_values(&time_values, ..)?;
    }

    let cube = ["time", "grid_latitude", "grid_longitude"];
    add_field(&mut file, "air_temperature", &cube, "K", 280.0)?;
    add_field(&mut file, "surface_altitude", &cube[1..], "m", 120.0)?;
    add_field(&mut file, "precipitation_flux", &cube, "kg m-2 s-1", 0.0)?;

    Ok(())
}

/// Creates a file whose variables carry no grid_mapping attribute.
pub fn create_ungridded_nc(path: &Path) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("station", 3)?;
    let mut var = file.add_variable::<f32>("station_height", &["station"])?;
    var.put_attribute("units", "m")?;
    var.put_values(&[10.0f32, 20.0, 30.0], ..)?;

    Ok(())
}
