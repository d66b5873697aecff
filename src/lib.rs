pub mod cli;
pub mod commands;
pub mod error;

pub mod core {
    pub mod caller;
    pub mod consensus;
    pub mod file_set;
    pub mod high_confidence;
    pub mod merge;
    pub mod record;
    pub mod tags;
}

pub mod io {
    pub mod readers;
    pub mod vcf_reader;
    pub mod vcf_writer;
}

pub mod utils {
    pub mod util;
}

pub mod constants;

pub use constants::*;
