//! Series Combiner
//!
//! Loads every dataset of a [`Registry`], aligns the results into a
//! [`Panel`] keyed by semantic labels and persists it without overwriting
//! earlier outputs.

mod registry;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::io::csv::write_panel;
use crate::loader::{LoadReport, SeriesLoader};
use crate::panel::Panel;

pub use self::registry::{Registry, RegistryEntry};

/// A persisted panel and how its inputs were loaded
#[derive(Debug, Clone)]
pub struct CombinedPanel {
    pub panel: Panel,
    /// File actually written
    pub path: PathBuf,
    /// Load report per registry entry, in registry order
    pub reports: Vec<(String, LoadReport)>,
}

/// Builds the panel from a registry of datasets
#[derive(Debug, Clone)]
pub struct SeriesCombiner {
    loader: SeriesLoader,
    registry: Registry,
}

impl SeriesCombiner {
    pub fn new(loader: SeriesLoader, registry: Registry) -> Self {
        SeriesCombiner { loader, registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Load, align and label every series; nothing is written
    pub fn build(&self) -> Result<(Panel, Vec<(String, LoadReport)>)> {
        let mut keyed = Vec::with_capacity(self.registry.len());
        let mut reports = Vec::with_capacity(self.registry.len());

        for entry in self.registry.entries() {
            let loaded = self.loader.load(&entry.descriptor)?;
            let key = entry.descriptor.key();
            reports.push((entry.label.clone(), loaded.report));
            keyed.push((key, loaded.series));
        }

        let panel = Panel::concat(keyed)?;

        let keys = self.registry.keys();
        if panel.column_names() != keys.as_slice() {
            return Err(Error::Data(format!(
                "panel columns {:?} are out of step with registry keys {:?}",
                panel.column_names(),
                keys
            )));
        }
        let panel = panel.rename_columns(&self.registry.labels())?;

        log::info!(
            "combined {} series into {} aligned months",
            panel.ncols(),
            panel.nrows()
        );
        Ok((panel, reports))
    }

    /// Build the panel and persist it under `output`, or a timestamped sibling if taken
    pub fn build_and_persist(&self, output: &Path) -> Result<CombinedPanel> {
        let (panel, reports) = self.build()?;
        let path = write_panel(&panel, output)?;
        log::info!("file saved as '{}'", path.display());
        Ok(CombinedPanel {
            panel,
            path,
            reports,
        })
    }
}

/// Build a panel from a registry with the default month locales and persist it under `output`
pub fn build_panel(registry: &Registry, output: &Path) -> Result<Panel> {
    let combiner = SeriesCombiner::new(SeriesLoader::with_default_locales()?, registry.clone());
    combiner.build_and_persist(output).map(|combined| combined.panel)
}
