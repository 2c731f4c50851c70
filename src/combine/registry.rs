use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::loader::DatasetDescriptor;

/// A dataset descriptor paired with the semantic label of its panel column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub label: String,
    #[serde(flatten)]
    pub descriptor: DatasetDescriptor,
}

impl RegistryEntry {
    pub fn new(label: impl Into<String>, descriptor: DatasetDescriptor) -> Self {
        RegistryEntry {
            label: label.into(),
            descriptor,
        }
    }
}

/// Ordered, fixed set of datasets that make up the panel
///
/// Each label travels with its descriptor, so the positional rename from
/// `{file-stem}_{value_column}` keys to labels cannot drift out of order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    /// Validate and wrap registry entries
    pub fn new(entries: Vec<RegistryEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Data("registry has no datasets".to_string()));
        }

        let mut labels = HashSet::new();
        let mut keys = HashSet::new();
        for entry in &entries {
            if !labels.insert(entry.label.as_str()) {
                return Err(Error::Data(format!("duplicate registry label '{}'", entry.label)));
            }
            let key = entry.descriptor.key();
            if !keys.insert(key.clone()) {
                return Err(Error::Data(format!("duplicate registry key '{}'", key)));
            }
        }

        Ok(Registry { entries })
    }

    /// The nine macroeconomic series of the default panel, paths relative to the raw data directory
    pub fn macro_default() -> Self {
        let entry = |label: &str, file: &str, date: &str, value: &str, format: &str| {
            RegistryEntry::new(
                label,
                DatasetDescriptor::new(file, date, value).with_date_format(format),
            )
        };

        Registry {
            entries: vec![
                entry(
                    "Official Exchange Rate",
                    "exchange_rate.csv",
                    "Mes",
                    "Tipo de cambio nominal promedio mensual",
                    "%b-%y",
                ),
                entry(
                    "Informal Exchange Rate",
                    "informal_exchange_rate.csv",
                    "Fecha",
                    "Venta",
                    "%d/%m/%Y",
                ),
                entry("Inflation", "inflation_data.csv", "Fecha", "Valor", "%d/%m/%Y"),
                entry("Monetary Supply (M2)", "M2_variation.csv", "Fecha", "Valor", "%d/%m/%Y"),
                entry("Interest Rate", "interest_rate.csv", "Fecha", "Valor", "%d/%m/%Y"),
                entry("General IPMP", "IPMP.csv", "Período", "IPMP (dic-01=100)", "%b-%y"),
                entry(
                    "Agriculture IPMP",
                    "IPMP.csv",
                    "Período",
                    "IPMP Agropecuario (dic-01=100)",
                    "%b-%y",
                ),
                entry(
                    "Metals IPMP",
                    "IPMP.csv",
                    "Período",
                    "IPMP Metales (dic-01=100)",
                    "%b-%y",
                ),
                entry(
                    "Crude Oil IPMP",
                    "IPMP.csv",
                    "Período",
                    "IPMP Petróleo (dic-01=100)",
                    "%b-%y",
                ),
            ],
        }
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column labels in registry order
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.label.clone()).collect()
    }

    /// Intermediate keys in registry order
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.descriptor.key()).collect()
    }

    /// Registry with relative paths resolved against `base`
    pub fn resolved(&self, base: &Path) -> Self {
        Registry {
            entries: self
                .entries
                .iter()
                .map(|e| RegistryEntry::new(e.label.clone(), e.descriptor.resolved(base)))
                .collect(),
        }
    }
}
