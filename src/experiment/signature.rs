use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::panel::Panel;

/// Name and type of one model input or output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ColumnSpec {
    fn double(name: &str) -> Self {
        ColumnSpec {
            name: name.to_string(),
            kind: "double".to_string(),
        }
    }
}

/// Input and output schema of a logged model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSignature {
    pub inputs: Vec<ColumnSpec>,
    pub outputs: Vec<ColumnSpec>,
}

impl ModelSignature {
    /// Infer the schema from the training slice
    ///
    /// Inputs are the feature columns, in panel order; the output is the target.
    pub fn infer(train: &Panel, target: &str, features: &[&str]) -> Result<Self> {
        if !train.has_column(target) {
            return Err(Error::Data(format!("target column '{}' not in panel", target)));
        }
        if let Some(missing) = features.iter().find(|f| !train.has_column(f)) {
            return Err(Error::Data(format!("feature column '{}' not in panel", missing)));
        }

        Ok(ModelSignature {
            inputs: features.iter().map(|f| ColumnSpec::double(f)).collect(),
            outputs: vec![ColumnSpec::double(target)],
        })
    }

    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|c| c.name.as_str()).collect()
    }
}
