//! # mogreps-ingest
//!
//! Index the newest MOGREPS NetCDF file of an S3 bucket as an Open Data Cube
//! dataset document.
//!
//! ## Architecture
//!
//! - **Storage**: finds the newest source object, downloads it and uploads the result
//! - **Grouping**: partitions gridded variables by their dimension tuple
//! - **Products**: describes every dimension group as a product
//! - **Extent**: derives spatial and temporal bounds from coordinate variables
//! - **Dataset**: assembles the JSON document written to the output bucket

pub mod config;
pub mod data_loader;
pub mod dataset;
pub mod error;
pub mod extent;
pub mod grouping;
pub mod logging;
pub mod metadata;
pub mod pipeline;
pub mod product;
pub mod storage;

pub use config::Config;
pub use dataset::{make_dataset, Dataset};
pub use error::{IngestError, Result};
pub use extent::{find_bounds, Bounds, TimeValue};
pub use grouping::{group_by_dimensions, DimensionGroups, DimensionKey};
pub use logging::{init_tracing, log_error, log_operation_end, log_operation_start, log_timed_operation};
pub use metadata::{AttributeValue, CfAttributes, Coordinate, FillValue, VariableMetadata};
pub use pipeline::{run, run_with_storage, RunSummary};
pub use product::{generate_product, synthesize_products, Product};
pub use storage::ObjectStorage;
