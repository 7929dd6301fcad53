use fnv::FnvHashMap;
use nalgebra::DMatrix;
use std::hash::Hash;

/// Sparse two-level count accumulator: `sample -> feature -> weight`.
///
/// Weights accumulate through `increment` and `merge`; cells start at
/// zero on first touch and are never decremented. The dense pivot
/// orders both axes by key so that any processing order of the same
/// increments yields an identical matrix.
pub struct CountTable<S, F> {
    counts: FnvHashMap<S, FnvHashMap<F, f64>>,
}

impl<S, F> Default for CountTable<S, F> {
    fn default() -> Self {
        Self {
            counts: FnvHashMap::default(),
        }
    }
}

impl<S, F> CountTable<S, F>
where
    S: Clone + Eq + Hash + Ord,
    F: Clone + Eq + Hash + Ord,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` at `(sample, feature)`, starting from zero
    pub fn increment(&mut self, sample: S, feature: F, weight: f64) {
        let cell = self
            .counts
            .entry(sample)
            .or_default()
            .entry(feature)
            .or_default();
        *cell += weight;
    }

    /// Cell-wise sum of two tables; commutative and associative, so
    /// per-source tables can be combined in any order
    pub fn merge(&mut self, other: CountTable<S, F>) {
        for (sample, features) in other.counts {
            let into = self.counts.entry(sample).or_default();
            for (feature, weight) in features {
                *into.entry(feature).or_default() += weight;
            }
        }
    }

    pub fn get(&self, sample: &S, feature: &F) -> f64 {
        self.counts
            .get(sample)
            .and_then(|features| features.get(feature))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn num_samples(&self) -> usize {
        self.counts.len()
    }

    /// number of non-zero-touched cells
    pub fn num_entries(&self) -> usize {
        self.counts.values().map(|features| features.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn sorted_samples(&self) -> Vec<S> {
        let mut ret: Vec<S> = self.counts.keys().cloned().collect();
        ret.sort();
        ret
    }

    pub fn sorted_features(&self) -> Vec<F> {
        let mut ret: Vec<F> = self
            .counts
            .values()
            .flat_map(|features| features.keys().cloned())
            .collect();
        ret.sort();
        ret.dedup();
        ret
    }

    /// Pivot into a dense `features x samples` matrix with sorted axes;
    /// untouched cells become zero
    pub fn to_dense(&self) -> DenseCounts<S, F> {
        let samples = self.sorted_samples();
        let features = self.sorted_features();

        let mut values = DMatrix::<f64>::zeros(features.len(), samples.len());

        for (j, sample) in samples.iter().enumerate() {
            if let Some(cells) = self.counts.get(sample) {
                for (i, feature) in features.iter().enumerate() {
                    if let Some(weight) = cells.get(feature) {
                        values[(i, j)] = *weight;
                    }
                }
            }
        }

        DenseCounts {
            samples,
            features,
            values,
        }
    }
}

/// Dense pivot of a `CountTable`: rows are features, columns are samples
pub struct DenseCounts<S, F> {
    pub samples: Vec<S>,
    pub features: Vec<F>,
    pub values: DMatrix<f64>,
}
