//! Test utilities for temporary files and fixtures

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use macropanel::{MonthPeriod, Panel};

static TEST_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Generate a unique test directory path
///
/// Respects TMPDIR, then falls back to std::env::temp_dir()
pub fn test_temp_dir(test_name: &str) -> PathBuf {
    let counter = TEST_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dirname = format!(
        "macropanel_test_{}_{}_{}",
        test_name,
        std::process::id(),
        counter
    );
    env::var("TMPDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
        .join(dirname)
}

/// RAII wrapper for temporary test directories with automatic cleanup
pub struct TempTestDir {
    path: PathBuf,
}

impl TempTestDir {
    pub fn new(test_name: &str) -> std::io::Result<Self> {
        let path = test_temp_dir(test_name);
        fs::create_dir_all(&path)?;
        Ok(TempTestDir { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the directory
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempTestDir {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}

/// Write `contents` to `dir/name` and return the path
pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

/// Semicolon-separated file with one `dd/mm/yyyy` row per month
///
/// Values use a decimal comma; `value(i)` gives the value of month `i`.
pub fn monthly_csv<F>(year: i32, months: usize, value: F) -> String
where
    F: Fn(usize) -> f64,
{
    let mut out = String::from("Fecha;Valor\n");
    for i in 0..months {
        let y = year + (i / 12) as i32;
        let m = i % 12 + 1;
        let v = format!("{:.2}", value(i)).replace('.', ",");
        out.push_str(&format!("01/{:02}/{};{}\n", m, y, v));
    }
    out
}

/// Panel of `rows` months where column `c` is `start_c + slope_c * i`
pub fn linear_trend_panel(rows: usize, columns: &[(&str, f64, f64)]) -> Panel {
    let mut index = Vec::with_capacity(rows);
    let mut period = MonthPeriod::new(2020, 1).expect("valid month");
    for _ in 0..rows {
        index.push(period);
        period = period.succ();
    }
    Panel::new(
        index,
        columns
            .iter()
            .map(|(name, start, slope)| {
                (
                    name.to_string(),
                    (0..rows).map(|i| start + slope * i as f64).collect(),
                )
            })
            .collect(),
    )
    .expect("valid panel")
}
