//! Distance-adjusted edge weights from node feature vectors.
//!
//! The metric variant of Louvain does not change the optimizer. It rescales
//! every edge once, before the first level:
//!
//! ```text
//! w'(u, v) = w(u, v) · f(‖x_u - x_v‖₂ / s)
//! ```
//!
//! where `x` are per-node features (typically a 2-D or spectral layout), `s`
//! is the distance scale, and `f` is a decreasing kernel with `f(0) = 1`.
//! Edges between nearby nodes keep most of their weight; long edges fade.
//!
//! Because `f(0) = 1`, identical features leave the graph unchanged, and the
//! metric run is the plain run.
//!
//! Aggregated nodes never get features of their own: the adjusted weights are
//! computed at level 0 and carried up by aggregation like any other weight.

use ndarray::{Array2, ArrayView1};

use crate::error::{Error, Result};
use crate::graph::Graph;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-node feature vectors, one row per node.
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    data: Array2<f64>,
}

impl Features {
    /// Build from row vectors.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if rows differ in length
    /// - [`Error::InvalidFeature`] if a value is NaN or infinite
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dim = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|r| r.len() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: row.len(),
            });
        }

        let mut data = Array2::zeros((rows.len(), dim));
        for (i, row) in rows.iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                data[[i, j]] = x;
            }
        }
        Self::from_array(data)
    }

    /// Build from an `n × d` matrix.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFeature`] if a value is NaN or infinite.
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if let Some(((row, column), _)) = data.indexed_iter().find(|(_, x)| !x.is_finite()) {
            return Err(Error::InvalidFeature { row, column });
        }
        Ok(Self { data })
    }

    /// Number of rows (nodes).
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    /// Feature dimension.
    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    /// Feature vector of `node`.
    pub fn row(&self, node: usize) -> ArrayView1<'_, f64> {
        self.data.row(node)
    }

    /// Euclidean distance between the feature vectors of `u` and `v`.
    pub fn distance(&self, u: usize, v: usize) -> f64 {
        self.data
            .row(u)
            .iter()
            .zip(self.data.row(v).iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

/// Decreasing transform of a scaled distance `t = d / s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceKernel {
    /// `exp(-t)`
    #[default]
    Exponential,
    /// `exp(-t²)`
    Gaussian,
    /// `1 / (1 + t)`
    InverseDistance,
}

impl DistanceKernel {
    /// Kernel value at scaled distance `t >= 0`.
    pub fn eval(self, t: f64) -> f64 {
        match self {
            DistanceKernel::Exponential => (-t).exp(),
            DistanceKernel::Gaussian => (-t * t).exp(),
            DistanceKernel::InverseDistance => 1.0 / (1.0 + t),
        }
    }
}

/// Edge reweighting by feature distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricWeighting {
    /// Distance scale `s`.
    scale: f64,
    kernel: DistanceKernel,
}

impl MetricWeighting {
    /// Exponential decay with scale 1.
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            kernel: DistanceKernel::Exponential,
        }
    }

    /// Set distance scale. Larger values weaken the distance penalty.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set kernel.
    pub fn with_kernel(mut self, kernel: DistanceKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Distance scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Kernel.
    pub fn kernel(&self) -> DistanceKernel {
        self.kernel
    }

    /// Adjusted weight for a raw weight `w` at feature distance `d`.
    ///
    /// Clamped to `[0, ∞)`; non-finite results become zero.
    pub fn adjust(&self, w: f64, d: f64) -> f64 {
        let adjusted = w * self.kernel.eval(d / self.scale);
        if adjusted.is_finite() && adjusted > 0.0 {
            adjusted
        } else {
            0.0
        }
    }

    /// Graph with every edge weight rescaled by feature distance.
    ///
    /// # Errors
    ///
    /// - [`Error::FeatureCountMismatch`] if `features` has a row count other than `graph.node_count()`
    /// - [`Error::InvalidParameter`] if the scale is not finite and positive
    pub fn apply(&self, graph: &Graph, features: &Features) -> Result<Graph> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::InvalidParameter {
                name: "distance_scale",
                message: "must be finite and positive",
            });
        }
        if features.n_rows() != graph.node_count() {
            return Err(Error::FeatureCountMismatch {
                expected: graph.node_count(),
                found: features.n_rows(),
            });
        }

        let edges: Vec<(usize, usize, f64)> = graph.edges().collect();

        #[cfg(feature = "parallel")]
        let adjusted: Vec<(usize, usize, f64)> = edges
            .par_iter()
            .map(|&(u, v, w)| (u, v, self.adjust(w, features.distance(u, v))))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let adjusted: Vec<(usize, usize, f64)> = edges
            .iter()
            .map(|&(u, v, w)| (u, v, self.adjust(w, features.distance(u, v))))
            .collect();

        Graph::from_edges(graph.node_count(), adjusted)
    }
}

impl Default for MetricWeighting {
    fn default() -> Self {
        Self::new()
    }
}
