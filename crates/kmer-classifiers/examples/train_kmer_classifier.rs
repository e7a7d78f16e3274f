use anyhow::{Context, Result};
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use kmer_classifiers::config::load_classifier_config;
use kmer_classifiers::features::KmerFeatures;
use kmer_classifiers::io::KmerTrainingWriter;
use kmer_classifiers::{ClassifierConfig, KmerClassifier, KmerType};

/// Usage: train_kmer_classifier [training.csv] [config.json]
///
/// Without a training file a synthetic one is generated in a temporary directory.
fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("KMER_LOG", "error,kmer_classifiers=info"))
        .init();

    let mut args = std::env::args().skip(1);
    let workdir = tempfile::tempdir()?;
    let training_file = match args.next() {
        Some(path) => std::path::PathBuf::from(path),
        None => {
            let path = workdir.path().join("kmer_training.csv");
            write_synthetic_training_file(&path, 600)?;
            path
        }
    };
    let config = match args.next() {
        Some(path) => load_classifier_config(&path)
            .with_context(|| format!("failed to read config {}", path))?,
        None => ClassifierConfig {
            seed: Some(1),
            ..ClassifierConfig::kmer_default()
        },
    };

    let mut classifier = KmerClassifier::with_config(config)?;
    let score = classifier
        .train_from_csv(&training_file)
        .with_context(|| format!("training on {} failed", training_file.display()))?;

    for s in classifier.last_scores() {
        log::info!("{:>28}  {:.4}", s.name, s.f1);
    }
    log::info!(
        "Best model: {} (macro F1 {:.4})",
        classifier.best_model_name().unwrap_or("none"),
        score
    );

    let model_file = workdir.path().join("best_model.json");
    classifier.store(&model_file)?;
    let mut served = KmerClassifier::with_config(classifier.config().clone())?;
    served.load(&model_file)?;

    let probe = KmerFeatures::from_counts("ACGTACGTACGTACGTACGTA", 4.2, 60.0, 1.0, 20.0);
    let label = served.classify(&probe.to_vector())?;
    log::info!("Probe k-mer classified as {}", KmerType::from_code(label)?);
    Ok(())
}

fn write_synthetic_training_file(path: &std::path::Path, n_rows: usize) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut writer = KmerTrainingWriter::create(path)?;
    for i in 0..n_rows {
        let kmer_type = match i % 20 {
            0..=11 => KmerType::Trusted,
            12..=16 => KmerType::Repeat,
            _ => KmerType::Untrusted,
        };
        // overlapping ranges so the learned models have something to do
        let expected: f64 = rng.gen_range(10.0..30.0);
        let (ratio, z): (f64, f64) = match kmer_type {
            KmerType::Trusted => (rng.gen_range(0.4..1.6), rng.gen_range(-2.5..2.5)),
            KmerType::Repeat => (rng.gen_range(1.3..5.0), rng.gen_range(1.0..8.0)),
            KmerType::Untrusted => (rng.gen_range(0.0..0.7), rng.gen_range(-8.0..-1.0)),
        };
        let kmer: String = (0..21).map(|_| ['A', 'C', 'G', 'T'][rng.gen_range(0..4)]).collect();
        let features = KmerFeatures::from_counts(&kmer, z, ratio * expected, 1.0, expected);
        writer.write_row(&features, kmer_type)?;
    }
    writer.flush()?;
    Ok(())
}
