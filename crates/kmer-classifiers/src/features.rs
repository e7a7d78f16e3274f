//! The six-slot k-mer feature vector shared by the rule-based baselines,
//! the training files and the learned models.

/// Feature column names in slot order.
pub const KMER_FEATURE_NAMES: [&str; 6] = [
    "ZScore",
    "gcContent",
    "size",
    "observedCount",
    "biasCorrectedObservedCount",
    "expectedCountPusm",
];

/// Number of slots the rule-based classifiers expect.
pub const KMER_FEATURE_COUNT: usize = KMER_FEATURE_NAMES.len();

pub const Z_SCORE_SLOT: usize = 0;
pub const BIAS_CORRECTED_OBSERVED_SLOT: usize = 4;
pub const EXPECTED_PUSM_SLOT: usize = 5;

/// Name of the label column in training files.
pub const LABEL_COLUMN: &str = "type";

/// Observation statistics of a single k-mer.
#[derive(Debug, Clone, PartialEq)]
pub struct KmerFeatures {
    pub z_score: f64,
    pub gc_content: f64,
    pub size: f64,
    pub observed_count: f64,
    pub bias_corrected_observed_count: f64,
    pub expected_count_pusm: f64,
}

impl KmerFeatures {
    /// Build the features of `kmer` from its counting statistics.
    ///
    /// The bias-corrected count is `observed_count / bias`, with `bias` the
    /// coverage bias of the k-mer (1.0 means unbiased).
    pub fn from_counts(
        kmer: &str,
        z_score: f64,
        observed_count: f64,
        bias: f64,
        expected_count_pusm: f64,
    ) -> Self {
        KmerFeatures {
            z_score,
            gc_content: gc_content(kmer),
            size: kmer.len() as f64,
            observed_count,
            bias_corrected_observed_count: (1.0 / bias) * observed_count,
            expected_count_pusm,
        }
    }

    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.z_score,
            self.gc_content,
            self.size,
            self.observed_count,
            self.bias_corrected_observed_count,
            self.expected_count_pusm,
        ]
    }

    /// Inverse of [`KmerFeatures::to_vector`]; `None` unless exactly six slots are given.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            &[z_score, gc_content, size, observed_count, bias_corrected, expected_pusm] => {
                Some(KmerFeatures {
                    z_score,
                    gc_content,
                    size,
                    observed_count,
                    bias_corrected_observed_count: bias_corrected,
                    expected_count_pusm: expected_pusm,
                })
            }
            _ => None,
        }
    }
}

/// Fraction of `G`/`C` bases in `kmer`.
pub fn gc_content(kmer: &str) -> f64 {
    if kmer.is_empty() {
        return 0.0;
    }
    let gc = kmer.bytes().filter(|&b| b == b'G' || b == b'C').count();
    gc as f64 / kmer.len() as f64
}
