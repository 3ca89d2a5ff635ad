//! The ingest run: select, download, describe, upload.
//!
//! Every step runs to completion before the next one starts. The output
//! object is written by a single put at the very end, so a failed run never
//! leaves a partial document behind.

use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::data_loader::load_variables;
use crate::dataset::{make_dataset, Dataset};
use crate::error::{IngestError, Result};
use crate::grouping::{group_by_dimensions, group_names, DimensionGroups, DimensionKey};
use crate::logging::{log_dataset_stats, log_operation_end, log_operation_start, log_timed_operation};
use crate::product::{synthesize_products, Product};
use crate::storage::{output_key, ObjectStorage};

/// What a successful run selected and wrote
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub source_key: String,
    pub local_path: PathBuf,
    pub output_key: String,
    pub products: Vec<Product>,
    pub dataset: Dataset,
}

/// Run against the S3 buckets named in the config
pub async fn run(config: &Config) -> Result<RunSummary> {
    let source = ObjectStorage::s3(&config.storage, &config.storage.source_bucket)?;
    let output = ObjectStorage::s3(&config.storage, &config.storage.output_bucket)?;
    run_with_storage(config, &source, &output).await
}

/// Run against explicit source and output stores
pub async fn run_with_storage(
    config: &Config,
    source: &ObjectStorage,
    output: &ObjectStorage,
) -> Result<RunSummary> {
    let start = Instant::now();
    log_operation_start("ingest", Some(config.storage.prefix.as_str()));

    let result = ingest(config, source, output).await;
    log_operation_end("ingest", start, result.is_ok());
    result
}

async fn ingest(
    config: &Config,
    source: &ObjectStorage,
    output: &ObjectStorage,
) -> Result<RunSummary> {
    let source_key = source.latest_key(&config.storage.prefix).await?;
    info!(key = %source_key, "Selected newest source file");

    if !config.staging_dir.exists() {
        std::fs::create_dir_all(&config.staging_dir)?;
    }
    let local_path = source.download_to(&source_key, &config.staging_dir).await?;

    let variables = log_timed_operation("read_variables", || load_variables(&local_path))?;
    let groups = group_by_dimensions(&variables);
    let products = synthesize_products(&groups)?;
    for product in &products {
        let definition = serde_json::to_string(product)?;
        debug!(product = %definition, "Product definition");
    }

    let (dims, names) = select_group(&groups, config.processing.group_index)?;
    let dataset = log_timed_operation("make_dataset", || {
        make_dataset(
            &local_path,
            &dims,
            &names,
            config.processing.strict_extent,
        )
    })?;

    let output_key = output_key(&source_key);
    log_dataset_stats(&dataset, &output_key);
    output.put_json(&output_key, &dataset).await?;
    info!(
        bucket = %output.bucket(),
        key = %output_key,
        "Wrote dataset document"
    );

    Ok(RunSummary {
        source_key,
        local_path,
        output_key,
        products,
        dataset,
    })
}

/// Dimension key and variable names of the `index`-th group, taken together
pub fn select_group(groups: &DimensionGroups, index: usize) -> Result<(DimensionKey, Vec<String>)> {
    groups
        .iter()
        .nth(index)
        .map(|(dims, variables)| (dims.clone(), group_names(variables)))
        .ok_or_else(|| IngestError::DataNotFound {
            message: format!(
                "Dimension group {} requested but the file has {} group(s)",
                index,
                groups.len()
            ),
        })
}
