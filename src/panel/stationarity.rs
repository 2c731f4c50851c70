use std::ops::Deref;

use crate::error::{Error, Result};
use crate::panel::Panel;

/// A panel after first-order differencing
///
/// Row `i` holds `panel[i + 1] - panel[i]` of the source panel and is keyed
/// by the later month.
#[derive(Debug, Clone, PartialEq)]
pub struct StationaryPanel(Panel);

impl StationaryPanel {
    /// Unwrap the differenced panel
    pub fn into_inner(self) -> Panel {
        self.0
    }
}

impl Deref for StationaryPanel {
    type Target = Panel;

    fn deref(&self) -> &Panel {
        &self.0
    }
}

/// Difference every column once and drop the undefined first row
pub fn differ(panel: &Panel) -> Result<StationaryPanel> {
    if panel.nrows() < 2 {
        return Err(Error::Data(format!(
            "differencing needs at least 2 rows, panel has {}",
            panel.nrows()
        )));
    }

    let index = panel.index()[1..].to_vec();
    let columns = panel
        .columns()
        .map(|(name, values)| {
            let diffs = values.windows(2).map(|w| w[1] - w[0]).collect();
            (name.to_string(), diffs)
        })
        .collect();

    Panel::new(index, columns).map(StationaryPanel)
}
