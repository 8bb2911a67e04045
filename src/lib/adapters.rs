pub mod csv_source;
pub mod json_sink;
pub mod memory;
