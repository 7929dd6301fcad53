pub mod bed;
pub mod record;
pub mod util_htslib;
