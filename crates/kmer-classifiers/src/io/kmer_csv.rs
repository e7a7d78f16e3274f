//! Reader and writer for `;`-delimited k-mer training files.
//!
//! The header row names every column; feature columns are picked by name and
//! the integer class code lives in the `type` column.
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use ndarray::{Array1, Array2};

use crate::data_handling::KmerDataset;
use crate::error::{ClassifierError, Result};
use crate::features::{KmerFeatures, KMER_FEATURE_NAMES, LABEL_COLUMN};
use crate::kmer_type::{KmerType, Label};

/// Configuration for reading k-mer training files.
#[derive(Debug, Clone)]
pub struct KmerCsvConfig {
    pub delimiter: u8,
    /// Column holding the integer class code.
    pub label_column: String,
    /// Feature columns to load, in order.
    pub feature_columns: Vec<String>,
}

impl Default for KmerCsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b';',
            label_column: LABEL_COLUMN.to_string(),
            feature_columns: KMER_FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Read the given feature columns and the `type` column of a training file.
pub fn read_kmer_csv<P: AsRef<Path>>(path: P, feature_columns: &[String]) -> Result<KmerDataset> {
    let config = KmerCsvConfig {
        feature_columns: feature_columns.to_vec(),
        ..KmerCsvConfig::default()
    };
    read_kmer_csv_with_config(path, &config)
}

pub fn read_kmer_csv_with_config<P: AsRef<Path>>(
    path: P,
    config: &KmerCsvConfig,
) -> Result<KmerDataset> {
    if config.feature_columns.is_empty() {
        return Err(ClassifierError::Misconfigured(
            "no feature columns configured".to_string(),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path)?;

    let headers = reader.headers()?.clone();

    let label_idx = find_column(&headers, &config.label_column).ok_or_else(|| {
        ClassifierError::InvalidData(format!(
            "Missing label column '{}' in {}",
            config.label_column,
            path.as_ref().display()
        ))
    })?;

    let mut feature_indices = Vec::with_capacity(config.feature_columns.len());
    for name in &config.feature_columns {
        let idx = find_column(&headers, name).ok_or_else(|| {
            ClassifierError::InvalidData(format!("Missing feature column '{}'", name))
        })?;
        feature_indices.push(idx);
    }

    let mut features = Vec::new();
    let mut labels = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;

        let label = parse_field::<Label>(&record, label_idx, row_idx, &config.label_column)?;
        labels.push(label);

        for (&idx, name) in feature_indices.iter().zip(&config.feature_columns) {
            features.push(parse_field::<f64>(&record, idx, row_idx, name)?);
        }
    }

    let n_samples = labels.len();
    let n_features = feature_indices.len();
    let x = Array2::from_shape_vec((n_samples, n_features), features)
        .map_err(|e| {
            ClassifierError::InvalidData(format!("Failed to build feature matrix: {}", e))
        })?;

    log::debug!(
        "Read {} rows with {} features from {}",
        n_samples,
        n_features,
        path.as_ref().display()
    );

    KmerDataset::new(x, Array1::from_vec(labels), config.feature_columns.clone())
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| header == name)
}

fn parse_field<T: std::str::FromStr>(
    record: &StringRecord,
    idx: usize,
    row_idx: usize,
    column: &str,
) -> Result<T> {
    let value = record.get(idx).ok_or_else(|| {
        ClassifierError::InvalidData(format!("Missing '{}' value at row {}", column, row_idx + 1))
    })?;
    value.parse::<T>().map_err(|_| {
        ClassifierError::InvalidData(format!(
            "Invalid '{}' value '{}' at row {}",
            column,
            value,
            row_idx + 1
        ))
    })
}

/// Writes training rows in the format read by [`read_kmer_csv`].
pub struct KmerTrainingWriter {
    writer: csv::Writer<File>,
}

impl KmerTrainingWriter {
    /// Create `path` and write the header row.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
        let mut header: Vec<&str> = KMER_FEATURE_NAMES.to_vec();
        header.push(LABEL_COLUMN);
        writer.write_record(&header)?;
        Ok(KmerTrainingWriter { writer })
    }

    pub fn write_row(&mut self, features: &KmerFeatures, kmer_type: KmerType) -> Result<()> {
        let mut record: Vec<String> = features.to_vector().iter().map(|v| v.to_string()).collect();
        record.push(kmer_type.code().to_string());
        self.writer.write_record(&record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_selected_columns_in_configured_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "train.csv",
            "a;b;c;type\n1.0;2.0;3.0;0\n4.0;5.0;6.0;2\n",
        );
        let columns = vec!["c".to_string(), "a".to_string()];
        let data = read_kmer_csv(&path, &columns).unwrap();
        assert_eq!(data.x.shape(), &[2, 2]);
        assert_eq!(data.x[(0, 0)], 3.0);
        assert_eq!(data.x[(1, 1)], 4.0);
        assert_eq!(data.y.to_vec(), vec![0, 2]);
        assert_eq!(data.feature_names, columns);
    }

    #[test]
    fn missing_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "train.csv", "a;type\n1.0;0\n");
        assert!(read_kmer_csv(&path, &["b".to_string()]).is_err());

        let path = write_file(&dir, "nolabel.csv", "a;b\n1.0;0\n");
        assert!(read_kmer_csv(&path, &["a".to_string()]).is_err());
    }

    #[test]
    fn unparsable_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "train.csv", "a;type\nfoo;0\n");
        assert!(matches!(
            read_kmer_csv(&path, &["a".to_string()]),
            Err(ClassifierError::InvalidData(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_kmer_csv(dir.path().join("absent.csv"), &["a".to_string()]);
        assert!(matches!(result, Err(ClassifierError::Csv(_))));
    }

    #[test]
    fn writer_output_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kmerTrainData.csv");
        let features = KmerFeatures::from_counts("ACGT", 2.5, 30.0, 1.0, 10.0);
        {
            let mut writer = KmerTrainingWriter::create(&path).unwrap();
            writer.write_row(&features, KmerType::Repeat).unwrap();
            writer.write_row(&features, KmerType::Untrusted).unwrap();
            writer.flush().unwrap();
        }
        let config = KmerCsvConfig::default();
        let data = read_kmer_csv_with_config(&path, &config).unwrap();
        assert_eq!(data.nrows(), 2);
        assert_eq!(data.y.to_vec(), vec![0, 2]);
        assert_eq!(data.x.row(0).to_vec(), features.to_vector());
    }
}
