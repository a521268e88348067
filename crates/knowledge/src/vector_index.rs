//! Vector index abstraction and the exact in-memory implementation.
//!
//! Rows are numbered by insertion order. Search is brute force over every
//! row, so results are exact and reproducible.

use crate::error::{KnowledgeError, KnowledgeResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// How distance between two vectors is measured. Smaller is closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Sum of squared component differences
    #[default]
    SquaredL2,
    /// `1 - cosine similarity`; zero vectors sit at distance 1
    Cosine,
}

impl DistanceMetric {
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::SquaredL2 => a
                .iter()
                .zip(b)
                .map(|(x, y)| {
                    let d = x - y;
                    d * d
                })
                .sum(),
            Self::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (norm_a * norm_b)
                }
            }
        }
    }
}

/// One search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row (insertion position) of the matched vector
    pub row: usize,
    /// Distance to the query under the index's metric
    pub distance: f32,
}

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Appending batches of equal-length vectors
/// - Exact top-k search, nearest first
/// - Resetting to the empty state
pub trait VectorIndex: Send + Sync {
    /// Append vectors in order.
    ///
    /// The first vector ever added fixes the dimension. A batch containing
    /// any vector of another length is rejected whole.
    fn add(&mut self, vectors: &[Vec<f32>]) -> KnowledgeResult<()>;

    /// The `min(k, len)` rows closest to `query`, ascending by distance,
    /// ties broken by row.
    fn search(&self, query: &[f32], k: usize) -> KnowledgeResult<Vec<Neighbor>>;

    /// Number of stored rows.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension fixed by the first insertion, if any.
    fn dimension(&self) -> Option<usize>;

    /// Drop every row and forget the dimension.
    fn reset(&mut self);
}

/// Brute-force index over a contiguous row-major buffer.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    metric: DistanceMetric,
    dimension: Option<usize>,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            dimension: None,
            data: Vec::new(),
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn row(&self, row: usize, dim: usize) -> &[f32] {
        &self.data[row * dim..(row + 1) * dim]
    }
}

/// Heap entry ordered by (distance, row); the heap's top is the worst kept hit.
#[derive(Debug, PartialEq)]
struct Candidate(Neighbor);

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .distance
            .total_cmp(&other.0.distance)
            .then_with(|| self.0.row.cmp(&other.0.row))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl VectorIndex for FlatIndex {
    fn add(&mut self, vectors: &[Vec<f32>]) -> KnowledgeResult<()> {
        let Some(first) = vectors.first() else {
            return Ok(());
        };

        let expected = self.dimension.unwrap_or(first.len());
        if expected == 0 {
            return Err(KnowledgeError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(KnowledgeError::DimensionMismatch {
                expected,
                actual: bad.len(),
            });
        }

        self.dimension = Some(expected);
        self.data.reserve(vectors.len() * expected);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }

        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> KnowledgeResult<Vec<Neighbor>> {
        let Some(dim) = self.dimension.filter(|_| !self.data.is_empty()) else {
            return Err(KnowledgeError::EmptyIndex);
        };
        if query.len() != dim {
            return Err(KnowledgeError::DimensionMismatch {
                expected: dim,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        for row in 0..self.len() {
            let distance = self.metric.distance(query, self.row(row, dim));
            heap.push(Candidate(Neighbor { row, distance }));
            if heap.len() > k {
                heap.pop();
            }
        }

        Ok(heap.into_sorted_vec().into_iter().map(|c| c.0).collect())
    }

    fn len(&self) -> usize {
        match self.dimension {
            Some(dim) if dim > 0 => self.data.len() / dim,
            _ => 0,
        }
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn reset(&mut self) {
        self.data.clear();
        self.dimension = None;
    }
}
