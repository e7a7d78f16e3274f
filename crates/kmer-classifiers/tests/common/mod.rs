use std::path::Path;

use kmer_classifiers::features::KmerFeatures;
use kmer_classifiers::io::KmerTrainingWriter;
use kmer_classifiers::KmerType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Features of a synthetic k-mer whose counts agree with `kmer_type`.
pub fn synthetic_kmer<R: Rng>(rng: &mut R, kmer_type: KmerType) -> KmerFeatures {
    let kmer: String = (0..21).map(|_| BASES[rng.gen_range(0..4)]).collect();
    let expected = rng.gen_range(15.0..25.0);
    let bias = rng.gen_range(0.9..1.1);
    let (ratio, z_score) = match kmer_type {
        KmerType::Trusted => (rng.gen_range(0.7..1.3), rng.gen_range(-1.5..1.5)),
        KmerType::Repeat => (rng.gen_range(2.0..4.0), rng.gen_range(2.5..6.0)),
        KmerType::Untrusted => (rng.gen_range(0.05..0.4), rng.gen_range(-6.0..-2.5)),
    };
    KmerFeatures::from_counts(&kmer, z_score, ratio * expected * bias, bias, expected)
}

/// Write a skewed training file: 60% TRUSTED, 25% REPEAT, 15% UNTRUSTED.
pub fn write_training_file(path: &Path, n_rows: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = KmerTrainingWriter::create(path).unwrap();
    for i in 0..n_rows {
        let kmer_type = match i % 20 {
            0..=11 => KmerType::Trusted,
            12..=16 => KmerType::Repeat,
            _ => KmerType::Untrusted,
        };
        writer.write_row(&synthetic_kmer(&mut rng, kmer_type), kmer_type).unwrap();
    }
    writer.flush().unwrap();
}
