pub use count_table::common_io as io;

pub use clap::{Args, Parser, Subcommand};
pub use env_logger;

pub use log::info;
pub use std::path::Path;

pub use indicatif::{ParallelProgressIterator, ProgressIterator};
pub use rayon::prelude::*;
