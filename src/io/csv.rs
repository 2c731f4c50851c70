use chrono::Local;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::panel::Panel;
use crate::temporal::MonthPeriod;

/// Header of the index column in persisted panels
pub const DATE_HEADER: &str = "date";

/// One (date, value) row pulled from a raw input file
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number in the source file
    pub line: u64,
    pub date: String,
    pub value: String,
}

/// Parsed delimited file: normalized headers plus text rows
#[derive(Debug, Clone)]
pub struct RawTable {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<(u64, Vec<String>)>,
}

impl RawTable {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by its normalized header
    pub fn column_index(&self, name: &str) -> Result<usize> {
        let wanted = normalize_header(name);
        self.headers
            .iter()
            .position(|h| *h == wanted)
            .ok_or_else(|| Error::ColumnNotFound {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    /// Project the table onto a date column and a value column
    ///
    /// Date text is trimmed. Fields missing from short rows read as empty.
    pub fn records(&self, date_column: &str, value_column: &str) -> Result<Vec<RawRecord>> {
        let date_idx = self.column_index(date_column)?;
        let value_idx = self.column_index(value_column)?;

        Ok(self
            .rows
            .iter()
            .map(|(line, fields)| RawRecord {
                line: *line,
                date: fields.get(date_idx).map(|s| s.trim().to_string()).unwrap_or_default(),
                value: fields.get(value_idx).cloned().unwrap_or_default(),
            })
            .collect())
    }
}

/// Strip embedded line breaks from a header
pub fn normalize_header(header: &str) -> String {
    header.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Read a delimited text file with the given single-byte separator
///
/// Fields that are not valid UTF-8 are decoded as Latin-1, which is how
/// many of the published statistics files are encoded. Rows carrying more
/// fields than the header are a parse error.
pub fn read_delimited<P: AsRef<Path>>(path: P, separator: char) -> Result<RawTable> {
    let path = path.as_ref();
    let delimiter = separator_byte(separator)?;
    let parse_err = |message: String| Error::Parse {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| Error::file(path, e))?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = rdr
        .byte_headers()
        .map_err(|e| parse_err(e.to_string()))?
        .iter()
        .map(|field| normalize_header(&decode_field(field)))
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(parse_err("file has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result.map_err(|e| parse_err(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() > headers.len() {
            return Err(parse_err(format!(
                "line {} has {} fields but the header has {}; check the separator {:?}",
                line,
                record.len(),
                headers.len(),
                separator
            )));
        }
        rows.push((line, record.iter().map(decode_field).collect()));
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

fn separator_byte(separator: char) -> Result<u8> {
    if separator.is_ascii() {
        Ok(separator as u8)
    } else {
        Err(Error::InvalidInput(format!(
            "separator must be a single ASCII character, got {:?}",
            separator
        )))
    }
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// First free path derived from `path`
///
/// Returns `path` itself when nothing exists there; otherwise appends a
/// `_%Y%m%d_%H%M%S` timestamp to the file stem, and a counter if that name is
/// taken as well. Existing files are never overwritten.
pub fn unique_output_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

    let build = |suffix: String| {
        let name = match &extension {
            Some(ext) => format!("{}_{}.{}", stem, suffix, ext),
            None => format!("{}_{}", stem, suffix),
        };
        path.with_file_name(name)
    };

    let mut candidate = build(timestamp.clone());
    let mut counter = 1;
    while candidate.exists() {
        candidate = build(format!("{}_{}", timestamp, counter));
        counter += 1;
    }
    candidate
}

/// Persist a panel as CSV without overwriting an existing file
///
/// Returns the path actually written.
pub fn write_panel<P: AsRef<Path>>(panel: &Panel, path: P) -> Result<PathBuf> {
    let target = unique_output_path(path.as_ref());
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
        }
    }

    let file = File::create(&target).map_err(|e| Error::file(&target, e))?;
    let write_err = |e: csv::Error| Error::file(&target, e.into());
    let mut wtr = WriterBuilder::new().from_writer(file);

    let mut header = Vec::with_capacity(panel.ncols() + 1);
    header.push(DATE_HEADER.to_string());
    header.extend(panel.column_names().iter().cloned());
    wtr.write_record(&header).map_err(write_err)?;

    for (i, period) in panel.index().iter().enumerate() {
        let mut row = Vec::with_capacity(panel.ncols() + 1);
        row.push(period.to_string());
        if let Some(values) = panel.row(i) {
            row.extend(values.iter().map(|v| v.to_string()));
        }
        wtr.write_record(&row).map_err(write_err)?;
    }

    wtr.flush().map_err(|e| Error::file(&target, e))?;
    Ok(target)
}

/// Read a panel previously written by [`write_panel`]
pub fn read_panel<P: AsRef<Path>>(path: P) -> Result<Panel> {
    let path = path.as_ref();
    let table = read_delimited(path, ',')?;

    if table.headers().first().map(String::as_str) != Some(DATE_HEADER) {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            message: format!("first column must be '{}'", DATE_HEADER),
        });
    }

    let labels = &table.headers()[1..];
    let mut index = Vec::with_capacity(table.len());
    let mut data: Vec<Vec<f64>> = vec![Vec::with_capacity(table.len()); labels.len()];

    for (row, (_, fields)) in table.rows.iter().enumerate() {
        let period_text = fields.first().map(String::as_str).unwrap_or_default();
        let period: MonthPeriod = period_text.parse().map_err(|_| Error::Conversion {
            path: path.to_path_buf(),
            column: DATE_HEADER.to_string(),
            row,
            value: period_text.to_string(),
        })?;
        index.push(period);

        for (c, label) in labels.iter().enumerate() {
            let text = fields.get(c + 1).map(String::as_str).unwrap_or_default();
            let value: f64 = text.trim().parse().map_err(|_| Error::Conversion {
                path: path.to_path_buf(),
                column: label.clone(),
                row,
                value: text.to_string(),
            })?;
            data[c].push(value);
        }
    }

    Panel::new(index, labels.iter().cloned().zip(data).collect())
}
