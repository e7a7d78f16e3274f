//! Fit every pool member, score it on the held-out split and keep the best.
use rand::Rng;

use crate::data_handling::KmerDataset;
use crate::error::Result;
use crate::kmer_type::Label;
use crate::metrics::{ClassificationReport, ConfusionMatrix};
use crate::models::ClassifierModel;
use crate::pool::ModelPool;
use crate::preprocessing::balance_classes;

/// Macro-F1 of one pool member in a selection run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScore {
    pub index: usize,
    pub name: String,
    pub f1: f64,
}

/// The fitted winner of a selection run, moved out of the pool.
pub struct SelectedModel {
    pub index: usize,
    pub name: String,
    pub score: f64,
    pub model: Box<dyn ClassifierModel>,
}

pub struct SelectionOutcome {
    /// Highest score seen, or the incoming best when nothing beat it.
    pub best_score: f64,
    /// `None` when no member strictly improved on the incoming best score.
    pub winner: Option<SelectedModel>,
    /// Scores of every member, in pool order.
    pub scores: Vec<ModelScore>,
}

/// Run one selection pass over `pool`.
///
/// Members are fitted on `train` (rebalanced over `classes` first when
/// `use_balancing` is set) and scored by macro-F1 on `test`. A member wins
/// only with a score strictly greater than the running best, which starts at
/// `current_best_score`, so earlier members keep ties. A fit or predict
/// failure aborts the whole run.
pub fn choose_best_classifier<R: Rng + ?Sized>(
    pool: &mut ModelPool,
    train: &KmerDataset,
    test: &KmerDataset,
    current_best_score: f64,
    use_balancing: bool,
    classes: &[Label],
    rng: &mut R,
) -> Result<SelectionOutcome> {
    let balanced;
    let train = if use_balancing {
        balanced = balance_classes(train, classes, rng)?;
        &balanced
    } else {
        train
    };
    train.log_input_data_summary("Training set");
    test.log_input_data_summary("Test set");

    let expected = test.y.to_vec();
    let mut best_score = current_best_score;
    let mut best_index = None;
    let mut scores = Vec::with_capacity(pool.len());

    for (index, entry) in pool.entries_mut().iter_mut().enumerate() {
        log::debug!("Fitting {} on {} rows", entry.name, train.nrows());
        entry.model.fit(&train.x, &train.y)?;

        let predicted = entry.model.predict(&test.x)?.to_vec();
        let matrix = ConfusionMatrix::new(&expected, &predicted)?;
        let f1 = matrix.f1_macro();
        log::debug!("Confusion matrix for {}:\n{}", entry.name, matrix);
        log::debug!(
            "Classification report for {}:\n{}",
            entry.name,
            ClassificationReport(&matrix.class_scores())
        );
        log::info!("{}: macro F1 = {:.4}", entry.name, f1);

        if f1 > best_score {
            best_score = f1;
            best_index = Some(index);
        }
        scores.push(ModelScore {
            index,
            name: entry.name.clone(),
            f1,
        });
    }

    let winner = match best_index {
        Some(index) => {
            let name = pool.entries()[index].name.clone();
            log::info!("Selected {} with macro F1 {:.4}", name, best_score);
            pool.take_model(index).map(|model| SelectedModel {
                index,
                name,
                score: best_score,
                model,
            })
        }
        None => {
            log::info!(
                "No model improved on the current best score {:.4}",
                current_best_score
            );
            None
        }
    };

    Ok(SelectionOutcome {
        best_score,
        winner,
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::error::ClassifierError;
    use crate::features::KMER_FEATURE_NAMES;
    use crate::models::ModelKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names() -> Vec<String> {
        KMER_FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    /// Labels follow the z-score rule exactly, so the statistical baseline is perfect.
    fn z_score_data(n: usize) -> KmerDataset {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n {
            let z = (i % 3) as f64 * 3.0 - 3.0;
            let label = match i % 3 {
                0 => 2,
                1 => 1,
                _ => 0,
            };
            // observed == expected keeps the naive baseline at TRUSTED
            rows.push(vec![z, 0.5, 21.0, 10.0, 10.0, 10.0]);
            labels.push(label);
        }
        KmerDataset::from_rows(&rows, &labels, names()).unwrap()
    }

    fn rule_pool() -> ModelPool {
        ModelPool::from_configs(&[ModelConfig::naive(), ModelConfig::statistical()]).unwrap()
    }

    #[test]
    fn picks_best_baseline() {
        let data = z_score_data(30);
        let mut pool = rule_pool();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome =
            choose_best_classifier(&mut pool, &data, &data, 0.0, false, &[0, 1, 2], &mut rng)
                .unwrap();

        assert_eq!(outcome.best_score, 1.0);
        let winner = outcome.winner.unwrap();
        assert_eq!(winner.index, 1);
        assert_eq!(winner.name, "statistical");
        assert_eq!(winner.model.kind(), ModelKind::Statistical);
        assert_eq!(outcome.scores.len(), 2);
        assert!(outcome.scores[0].f1 < 1.0);
    }

    #[test]
    fn impossible_current_best_is_kept() {
        let data = z_score_data(12);
        let mut pool = ModelPool::from_configs(&[ModelConfig::statistical()]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome =
            choose_best_classifier(&mut pool, &data, &data, 1.1, false, &[0, 1, 2], &mut rng)
                .unwrap();
        assert_eq!(outcome.best_score, 1.1);
        assert!(outcome.winner.is_none());
        assert_eq!(outcome.scores[0].f1, 1.0);
    }

    #[test]
    fn ties_keep_the_first_entry() {
        let data = z_score_data(12);
        let mut pool = ModelPool::from_configs(&[
            ModelConfig::statistical(),
            ModelConfig::new("statistical again", "statistical".parse().unwrap()),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome =
            choose_best_classifier(&mut pool, &data, &data, 0.0, false, &[0, 1, 2], &mut rng)
                .unwrap();
        assert_eq!(outcome.winner.unwrap().index, 0);
    }

    #[test]
    fn fit_failure_aborts_the_run() {
        let data = z_score_data(12);
        // a single-class training set cannot fit logistic regression
        let single = data.retain_classes(&[1]);
        let mut pool = ModelPool::from_configs(&[
            ModelConfig::naive(),
            ModelConfig::new("lr", "logisticregression".parse().unwrap()),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let result =
            choose_best_classifier(&mut pool, &single, &data, 0.0, false, &[1], &mut rng);
        assert!(matches!(result, Err(ClassifierError::Fit { .. })));
    }

    #[test]
    fn balancing_errors_surface() {
        let data = z_score_data(12);
        let mut pool = rule_pool();
        let mut rng = StdRng::seed_from_u64(1);
        let result =
            choose_best_classifier(&mut pool, &data, &data, 0.0, true, &[0, 1, 5], &mut rng);
        assert!(matches!(result, Err(ClassifierError::EmptyClass(5))));
    }
}
