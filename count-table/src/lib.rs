pub mod common_io;
pub mod matrix;
pub mod parquet;
pub mod table;
