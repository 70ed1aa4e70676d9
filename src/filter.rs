use crate::sources::{get_source, DataSource};
use anyhow::{bail, Result};
use std::collections::HashSet;
use tracing::info;

/// Resolves which sources to process based on include/exclude filters.
/// The result keeps catalog order.
pub fn resolve_sources(
    catalog: &[DataSource],
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
) -> Result<Vec<DataSource>> {
    match (include, exclude) {
        (Some(_), Some(_)) => {
            bail!("Cannot use both --include and --exclude at the same time");
        }
        (Some(include_list), None) => {
            check_known(catalog, &include_list)?;
            let wanted: HashSet<&str> = include_list.iter().map(|s| s.as_str()).collect();
            let sources: Vec<DataSource> = catalog
                .iter()
                .filter(|s| wanted.contains(s.name.as_str()))
                .cloned()
                .collect();

            info!("Including {} sources: {:?}", sources.len(), include_list);
            Ok(sources)
        }
        (None, Some(exclude_list)) => {
            check_known(catalog, &exclude_list)?;
            let unwanted: HashSet<&str> = exclude_list.iter().map(|s| s.as_str()).collect();
            let sources: Vec<DataSource> = catalog
                .iter()
                .filter(|s| !unwanted.contains(s.name.as_str()))
                .cloned()
                .collect();

            info!(
                "Including {} sources (after excluding {:?})",
                sources.len(),
                exclude_list
            );
            Ok(sources)
        }
        (None, None) => {
            info!("Including all {} sources", catalog.len());
            Ok(catalog.to_vec())
        }
    }
}

fn check_known(catalog: &[DataSource], names: &[String]) -> Result<()> {
    for name in names {
        if get_source(catalog, name).is_none() {
            bail!("Unknown source: {}", name);
        }
    }
    Ok(())
}
