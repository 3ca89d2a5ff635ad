//! Variable grouping.
//!
//! Gridded variables that share exactly the same dimension tuple describe the
//! same kind of field and end up in one product. Groups are kept in an ordered
//! map so iteration follows the element-wise lexicographic order of the
//! dimension tuples, and variables inside a group keep their file order.

use std::collections::BTreeMap;
use tracing::debug;

use crate::metadata::VariableMetadata;

/// Ordered dimension names shared by every variable of a group
pub type DimensionKey = Vec<String>;

/// Interesting variables partitioned by their dimension tuple
pub type DimensionGroups = BTreeMap<DimensionKey, Vec<VariableMetadata>>;

/// Keep only the variables carrying the grid-mapping marker, in input order
pub fn interesting_variables<'a, I>(variables: I) -> Vec<VariableMetadata>
where
    I: IntoIterator<Item = &'a VariableMetadata>,
{
    variables
        .into_iter()
        .filter(|var| {
            let keep = var.is_gridded();
            if !keep {
                debug!(variable = %var.name, "Skipping variable without grid_mapping");
            }
            keep
        })
        .cloned()
        .collect()
}

/// Partition the interesting variables by dimension tuple
pub fn group_by_dimensions<'a, I>(variables: I) -> DimensionGroups
where
    I: IntoIterator<Item = &'a VariableMetadata>,
{
    let mut groups = DimensionGroups::new();
    for var in interesting_variables(variables) {
        groups.entry(var.dimensions.clone()).or_default().push(var);
    }

    debug!(group_count = groups.len(), "Grouped variables by dimensions");
    groups
}

/// Variable names of one group, in group order
pub fn group_names(group: &[VariableMetadata]) -> Vec<String> {
    group.iter().map(|var| var.name.clone()).collect()
}
