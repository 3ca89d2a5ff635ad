//! Print the dimension groups, products and bounds of a local NetCDF file.
//!
//! Useful to check what a run would publish without touching any bucket:
//!
//! ```text
//! inspect_groups prods_op_mogreps-uk_20140101_03_00_003.nc --group 1
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use mogreps_ingest::data_loader::load_variables;
use mogreps_ingest::extent::find_bounds;
use mogreps_ingest::grouping::{group_by_dimensions, group_names};
use mogreps_ingest::pipeline::select_group;
use mogreps_ingest::{init_tracing, make_dataset, synthesize_products};

#[derive(Parser, Debug)]
#[command(name = "inspect_groups", about = "Inspect grid-mapped variable groups of a NetCDF file")]
struct Args {
    /// Path to the NetCDF file
    netcdf_file: PathBuf,

    /// Also build the dataset document for this group
    #[arg(long)]
    group: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let variables = load_variables(&args.netcdf_file)
        .with_context(|| format!("reading {}", args.netcdf_file.display()))?;
    let groups = group_by_dimensions(&variables);

    println!("Inspecting NetCDF file: {}", args.netcdf_file.display());
    println!("\nDimension groups:");
    for (index, (dims, members)) in groups.iter().enumerate() {
        println!("  [{}] ({}): {}", index, dims.join(", "), group_names(members).join(", "));
        let bounds = find_bounds(&args.netcdf_file, dims)?;
        println!("      bounds: {}", serde_json::to_string(&bounds)?);
    }

    let products = synthesize_products(&groups).context("synthesizing products")?;
    println!("\nProducts:");
    println!("{}", serde_json::to_string_pretty(&products)?);

    if let Some(index) = args.group {
        let (dims, names) = select_group(&groups, index)?;
        let dataset = make_dataset(&args.netcdf_file, &dims, &names, false)?;
        println!("\nDataset document for group {}:", index);
        println!("{}", serde_json::to_string_pretty(&dataset)?);
    }

    Ok(())
}
