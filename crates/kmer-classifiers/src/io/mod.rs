//! IO utilities for k-mer training files.

pub mod kmer_csv;

pub use kmer_csv::{read_kmer_csv, read_kmer_csv_with_config, KmerCsvConfig, KmerTrainingWriter};
