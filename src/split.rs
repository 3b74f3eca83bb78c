//! Stratified k-fold assignment.
//!
//! Rows are dealt to folds class by class so that every fold receives
//! either ⌊k/f⌋ or ⌈k/f⌉ rows of a class with k rows, then each class's fold
//! ids are shuffled with a seeded RNG.  The result is one fold id per row.

use std::collections::HashMap;

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::SplitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    pub seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self { n_splits, seed }
    }

    /// Assign a fold id in `0..n_splits` to every row, given each row's
    /// class id.  The same labels, split count and seed always produce the
    /// same assignment.
    pub fn assign(&self, labels: &[usize]) -> Result<Vec<usize>, SplitError> {
        let n_splits = self.n_splits;
        if n_splits < 2 {
            return Err(SplitError::TooFewSplits(n_splits));
        }
        if n_splits > labels.len() {
            return Err(SplitError::MoreSplitsThanRows {
                n_splits,
                n_rows: labels.len(),
            });
        }

        // Classes in order of first appearance, with their row indices.
        let mut order: Vec<usize> = Vec::new();
        let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
        for (row, &class_id) in labels.iter().enumerate() {
            members
                .entry(class_id)
                .or_insert_with(|| {
                    order.push(class_id);
                    Vec::new()
                })
                .push(row);
        }

        for &class_id in &order {
            let count = members[&class_id].len();
            if count < n_splits {
                return Err(SplitError::ClassTooSmall {
                    class_id,
                    count,
                    n_splits,
                });
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut folds = vec![0; labels.len()];

        // Rows sorted by class are dealt round-robin: position p goes to
        // fold p % n_splits.
        let mut offset = 0;
        for class_id in order {
            let rows = &members[&class_id];
            let mut class_folds: Vec<usize> = (offset..offset + rows.len())
                .map(|p| p % n_splits)
                .collect();
            class_folds.sort_unstable();
            class_folds.shuffle(&mut rng);

            for (&row, fold) in rows.iter().zip(class_folds) {
                folds[row] = fold;
            }
            offset += rows.len();
        }

        Ok(folds)
    }
}
