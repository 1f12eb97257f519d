//! CART random forests: a gini classifier and a variance-reduction regressor sharing one tree
//! builder. Trees are stored as flat node arrays so a fitted forest serializes as plain JSON.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestSettings {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl ForestSettings {
    pub fn new(n_trees: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            n_trees: n_trees.max(1),
            max_depth,
            min_samples_split: 2,
            seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node<L> {
    Leaf(L),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree<L> {
    nodes: Vec<Node<L>>,
}

impl<L> DecisionTree<L> {
    /// Builds a tree from nodes whose root sits at index 0.
    pub fn from_nodes(nodes: Vec<Node<L>>) -> Self {
        Self { nodes }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn leaf_for(&self, features: &[f64]) -> Option<&L> {
        let mut cursor = 0;
        loop {
            match self.nodes.get(cursor)? {
                Node::Leaf(value) => return Some(value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    cursor = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Averaging ensemble of regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestRegressor {
    n_features: usize,
    trees: Vec<DecisionTree<f64>>,
}

impl ForestRegressor {
    pub fn from_trees(n_features: usize, trees: Vec<DecisionTree<f64>>) -> Self {
        Self { n_features, trees }
    }

    pub fn fit(
        features: &[Vec<f64>],
        targets: &[f64],
        settings: &ForestSettings,
    ) -> Result<Self, ModelError> {
        let n_features = check_training_set(features, targets.len())?;
        let objective = Variance;
        let trees = fit_trees(&objective, features, targets, settings, n_features);
        Ok(Self { n_features, trees })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_dimension(self.n_features, features)?;
        let leaves: Vec<f64> = self
            .trees
            .iter()
            .filter_map(|tree| tree.leaf_for(features).copied())
            .collect();
        if leaves.is_empty() {
            return Err(ModelError::EmptyModel);
        }
        Ok(leaves.iter().sum::<f64>() / leaves.len() as f64)
    }
}

/// Probability-averaging ensemble of classification trees over `n_classes` labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestClassifier {
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree<Vec<f64>>>,
}

impl ForestClassifier {
    pub fn fit(
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
        settings: &ForestSettings,
    ) -> Result<Self, ModelError> {
        let n_features = check_training_set(features, labels.len())?;
        if let Some(label) = labels.iter().find(|label| **label >= n_classes) {
            return Err(ModelError::InvalidLabel(*label));
        }
        let objective = Gini { n_classes };
        let trees = fit_trees(&objective, features, labels, settings, n_features);
        Ok(Self {
            n_features,
            n_classes,
            trees,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_dimension(self.n_features, features)?;
        let mut totals = vec![0.0; self.n_classes];
        let mut voters = 0usize;
        for distribution in self.trees.iter().filter_map(|tree| tree.leaf_for(features)) {
            for (total, share) in totals.iter_mut().zip(distribution) {
                *total += share;
            }
            voters += 1;
        }
        if voters == 0 {
            return Err(ModelError::EmptyModel);
        }
        Ok(totals.into_iter().map(|total| total / voters as f64).collect())
    }

    /// Most probable class; ties resolve to the lower index.
    pub fn predict(&self, features: &[f64]) -> Result<usize, ModelError> {
        let probabilities = self.predict_proba(features)?;
        let mut best = 0;
        for (class, probability) in probabilities.iter().enumerate() {
            if *probability > probabilities[best] {
                best = class;
            }
        }
        Ok(best)
    }
}

fn check_training_set(features: &[Vec<f64>], targets: usize) -> Result<usize, ModelError> {
    let first = features.first().ok_or(ModelError::EmptyTrainingSet)?;
    if features.len() != targets {
        return Err(ModelError::DimensionMismatch {
            expected: features.len(),
            got: targets,
        });
    }
    let width = first.len();
    if let Some(row) = features.iter().find(|row| row.len() != width) {
        return Err(ModelError::DimensionMismatch {
            expected: width,
            got: row.len(),
        });
    }
    Ok(width)
}

fn check_dimension(expected: usize, features: &[f64]) -> Result<(), ModelError> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            expected,
            got: features.len(),
        })
    }
}

/// Split quality bookkeeping for one kind of target.
trait Objective {
    type Target: Copy;
    type Leaf;
    type Stats: Clone;

    fn empty(&self) -> Self::Stats;
    fn add(&self, stats: &mut Self::Stats, target: Self::Target);
    fn remove(&self, stats: &mut Self::Stats, target: Self::Target);
    /// Impurity multiplied by sample count, so children can be summed directly.
    fn weighted_impurity(&self, stats: &Self::Stats) -> f64;
    fn leaf(&self, stats: &Self::Stats) -> Self::Leaf;
    /// Features examined per split.
    fn max_features(&self, n_features: usize) -> usize;
}

struct Variance;

#[derive(Clone)]
struct MomentStats {
    count: f64,
    sum: f64,
    sum_sq: f64,
}

impl Objective for Variance {
    type Target = f64;
    type Leaf = f64;
    type Stats = MomentStats;

    fn empty(&self) -> MomentStats {
        MomentStats {
            count: 0.0,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    fn add(&self, stats: &mut MomentStats, target: f64) {
        stats.count += 1.0;
        stats.sum += target;
        stats.sum_sq += target * target;
    }

    fn remove(&self, stats: &mut MomentStats, target: f64) {
        stats.count -= 1.0;
        stats.sum -= target;
        stats.sum_sq -= target * target;
    }

    fn weighted_impurity(&self, stats: &MomentStats) -> f64 {
        if stats.count <= 0.0 {
            return 0.0;
        }
        (stats.sum_sq - stats.sum * stats.sum / stats.count).max(0.0)
    }

    fn leaf(&self, stats: &MomentStats) -> f64 {
        if stats.count > 0.0 {
            stats.sum / stats.count
        } else {
            0.0
        }
    }

    fn max_features(&self, n_features: usize) -> usize {
        n_features
    }
}

struct Gini {
    n_classes: usize,
}

#[derive(Clone)]
struct ClassCounts {
    total: f64,
    counts: Vec<f64>,
}

impl Objective for Gini {
    type Target = usize;
    type Leaf = Vec<f64>;
    type Stats = ClassCounts;

    fn empty(&self) -> ClassCounts {
        ClassCounts {
            total: 0.0,
            counts: vec![0.0; self.n_classes],
        }
    }

    fn add(&self, stats: &mut ClassCounts, target: usize) {
        stats.total += 1.0;
        stats.counts[target] += 1.0;
    }

    fn remove(&self, stats: &mut ClassCounts, target: usize) {
        stats.total -= 1.0;
        stats.counts[target] -= 1.0;
    }

    fn weighted_impurity(&self, stats: &ClassCounts) -> f64 {
        if stats.total <= 0.0 {
            return 0.0;
        }
        let squares: f64 = stats.counts.iter().map(|count| count * count).sum();
        stats.total - squares / stats.total
    }

    fn leaf(&self, stats: &ClassCounts) -> Vec<f64> {
        if stats.total <= 0.0 {
            return vec![0.0; self.n_classes];
        }
        stats
            .counts
            .iter()
            .map(|count| count / stats.total)
            .collect()
    }

    fn max_features(&self, n_features: usize) -> usize {
        ((n_features as f64).sqrt().floor() as usize).max(1)
    }
}

struct TreeBuilder<'a, O: Objective> {
    objective: &'a O,
    features: &'a [Vec<f64>],
    targets: &'a [O::Target],
    settings: &'a ForestSettings,
    n_features: usize,
    nodes: Vec<Node<O::Leaf>>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn fit_trees<O: Objective>(
    objective: &O,
    features: &[Vec<f64>],
    targets: &[O::Target],
    settings: &ForestSettings,
    n_features: usize,
) -> Vec<DecisionTree<O::Leaf>> {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let n_samples = features.len();

    (0..settings.n_trees.max(1))
        .map(|_| {
            let mut bootstrap: Vec<usize> = (0..n_samples)
                .map(|_| rng.random_range(0..n_samples))
                .collect();
            let mut builder = TreeBuilder {
                objective,
                features,
                targets,
                settings,
                n_features,
                nodes: Vec::new(),
            };
            builder.grow(&mut bootstrap, 0, &mut rng);
            DecisionTree::from_nodes(builder.nodes)
        })
        .collect()
}

impl<O: Objective> TreeBuilder<'_, O> {
    fn grow(&mut self, samples: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let mut stats = self.objective.empty();
        for &sample in samples.iter() {
            self.objective.add(&mut stats, self.targets[sample]);
        }

        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf(self.objective.leaf(&stats)));

        let impurity = self.objective.weighted_impurity(&stats);
        if depth >= self.settings.max_depth
            || samples.len() < self.settings.min_samples_split.max(2)
            || impurity <= f64::EPSILON
        {
            return slot;
        }

        let Some(split) = self.best_split(samples, &stats, rng) else {
            return slot;
        };

        let mut boundary = 0;
        for position in 0..samples.len() {
            if self.features[samples[position]][split.feature] <= split.threshold {
                samples.swap(boundary, position);
                boundary += 1;
            }
        }
        if boundary == 0 || boundary == samples.len() {
            return slot;
        }

        let (left_samples, right_samples) = samples.split_at_mut(boundary);
        let left = self.grow(left_samples, depth + 1, rng);
        let right = self.grow(right_samples, depth + 1, rng);
        self.nodes[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        slot
    }

    fn best_split(
        &self,
        samples: &[usize],
        parent: &O::Stats,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let amount = self.objective.max_features(self.n_features).min(self.n_features);
        // Constant features do not count towards the per-split budget.
        let order = index::sample(rng, self.n_features, self.n_features);

        let mut best: Option<SplitCandidate> = None;
        let mut ordered = samples.to_vec();
        let mut examined = 0;

        for feature in order.iter() {
            if examined >= amount {
                break;
            }
            ordered.sort_by(|a, b| {
                self.features[*a][feature].total_cmp(&self.features[*b][feature])
            });
            let lowest = self.features[ordered[0]][feature];
            let highest = self.features[ordered[ordered.len() - 1]][feature];
            if highest <= lowest {
                continue;
            }
            examined += 1;

            let mut left = self.objective.empty();
            let mut right = parent.clone();
            for position in 0..ordered.len() - 1 {
                let sample = ordered[position];
                self.objective.add(&mut left, self.targets[sample]);
                self.objective.remove(&mut right, self.targets[sample]);

                let here = self.features[sample][feature];
                let next = self.features[ordered[position + 1]][feature];
                if next <= here {
                    continue;
                }

                let impurity = self.objective.weighted_impurity(&left)
                    + self.objective.weighted_impurity(&right);
                if best
                    .as_ref()
                    .map_or(true, |current| impurity < current.impurity)
                {
                    let midpoint = here + (next - here) / 2.0;
                    let threshold = if midpoint < next { midpoint } else { here };
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ForestSettings {
        ForestSettings::new(15, 6, 42)
    }

    #[test]
    fn regressor_learns_step_function() {
        let features: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let targets: Vec<f64> = (0..200).map(|i| if i < 100 { 10.0 } else { 50.0 }).collect();

        let forest = ForestRegressor::fit(&features, &targets, &settings()).expect("fits");
        assert_eq!(forest.tree_count(), 15);

        let low = forest.predict(&[20.0, 3.0]).expect("predicts");
        let high = forest.predict(&[180.0, 3.0]).expect("predicts");
        assert!((low - 10.0).abs() < 1.0, "low side predicted {low}");
        assert!((high - 50.0).abs() < 1.0, "high side predicted {high}");
    }

    #[test]
    fn classifier_separates_bands() {
        let features: Vec<Vec<f64>> = (0..300).map(|i| vec![i as f64, 1.0]).collect();
        let labels: Vec<usize> = (0..300).map(|i| i / 100).collect();

        let forest = ForestClassifier::fit(&features, &labels, 3, &settings()).expect("fits");
        assert_eq!(forest.predict(&[10.0, 1.0]).expect("predicts"), 0);
        assert_eq!(forest.predict(&[150.0, 1.0]).expect("predicts"), 1);
        assert_eq!(forest.predict(&[290.0, 1.0]).expect("predicts"), 2);

        let probabilities = forest.predict_proba(&[150.0, 1.0]).expect("predicts");
        assert!((probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fitting_is_deterministic_for_a_seed() {
        let features: Vec<Vec<f64>> = (0..120)
            .map(|i| vec![(i * 37 % 101) as f64, (i * 13 % 17) as f64])
            .collect();
        let targets: Vec<f64> = features.iter().map(|row| row[0] * 2.0 - row[1]).collect();

        let first = ForestRegressor::fit(&features, &targets, &settings()).expect("fits");
        let second = ForestRegressor::fit(&features, &targets, &settings()).expect("fits");
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_empty_and_mismatched_input() {
        assert!(matches!(
            ForestRegressor::fit(&[], &[], &settings()),
            Err(ModelError::EmptyTrainingSet)
        ));

        let forest = ForestRegressor::fit(&[vec![1.0], vec![2.0]], &[1.0, 2.0], &settings())
            .expect("fits");
        assert!(matches!(
            forest.predict(&[1.0, 2.0]),
            Err(ModelError::DimensionMismatch {
                expected: 1,
                got: 2
            })
        ));

        assert!(matches!(
            ForestClassifier::fit(&[vec![1.0]], &[4], 3, &settings()),
            Err(ModelError::InvalidLabel(4))
        ));
    }

    #[test]
    fn hand_built_tree_routes_on_threshold() {
        let tree = DecisionTree::from_nodes(vec![
            Node::Split {
                feature: 0,
                threshold: 5.0,
                left: 1,
                right: 2,
            },
            Node::Leaf(1.0),
            Node::Leaf(9.0),
        ]);
        let forest = ForestRegressor::from_trees(1, vec![tree]);
        assert_eq!(forest.predict(&[5.0]).expect("predicts"), 1.0);
        assert_eq!(forest.predict(&[5.5]).expect("predicts"), 9.0);
    }
}
