use ndarray::{Array1, ArrayView1, ArrayView2};

/// The final regression stage of a pipeline.
#[derive(Debug, Clone)]
pub enum Estimator {
    /// Ordinary linear model: `x · w + b`.
    Linear {
        coefficients: Array1<f64>,
        intercept: f64,
    },
    /// Averaged ensemble of regression trees.
    Forest { trees: Vec<Tree> },
}

impl Estimator {
    /// Scores every row of `x`.
    pub fn predict(&self, x: ArrayView2<f64>) -> Array1<f64> {
        match self {
            Estimator::Linear {
                coefficients,
                intercept,
            } => x.dot(coefficients) + *intercept,
            Estimator::Forest { trees } => x
                .rows()
                .into_iter()
                .map(|row| {
                    let sum: f64 = trees.iter().map(|tree| tree.eval(row)).sum();
                    sum / trees.len() as f64
                })
                .collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::Linear { .. } => "linear",
            Estimator::Forest { .. } => "forest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A binary regression tree stored as a flat node array rooted at index 0.
///
/// Every child index is strictly greater than its parent's, so evaluation
/// always reaches a leaf.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walks the tree for one sample; `x[feature] <= threshold` goes left.
    pub fn eval(&self, x: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> Tree {
        Tree::new(vec![
            Node::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: low },
            Node::Leaf { value: high },
        ])
    }

    #[test]
    fn linear_is_dot_plus_intercept() {
        let est = Estimator::Linear {
            coefficients: array![2.0, -1.0],
            intercept: 0.5,
        };
        let x = array![[1.0, 1.0], [3.0, 0.0]];
        assert_eq!(est.predict(x.view()), array![1.5, 6.5]);
    }

    #[test]
    fn tree_split_sends_equal_values_left() {
        let tree = stump(0, 1.0, 10.0, 20.0);
        assert_eq!(tree.eval(array![1.0].view()), 10.0);
        assert_eq!(tree.eval(array![1.5].view()), 20.0);
    }

    #[test]
    fn forest_averages_trees() {
        let est = Estimator::Forest {
            trees: vec![stump(0, 0.0, 1.0, 3.0), stump(1, 0.0, 5.0, 7.0)],
        };
        let x = array![[1.0, -1.0], [-1.0, 1.0]];
        assert_eq!(est.predict(x.view()), array![4.0, 4.0]);
    }

    #[test]
    fn forest_on_zero_rows_is_empty() {
        let est = Estimator::Forest {
            trees: vec![stump(0, 0.0, 1.0, 3.0)],
        };
        let x = ndarray::Array2::<f64>::zeros((0, 1));
        assert!(est.predict(x.view()).is_empty());
    }
}
