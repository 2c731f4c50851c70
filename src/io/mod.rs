pub mod csv;

// Re-export commonly used functions
pub use self::csv::{
    normalize_header, read_delimited, read_panel, unique_output_path, write_panel, RawRecord,
    RawTable,
};
