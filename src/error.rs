use core::fmt;

/// Result alias for `metric_louvain`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by graph construction, feature weighting, and community detection.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Graph has no nodes, so there is nothing to partition.
    EmptyGraph,

    /// Edge weight was negative or not finite.
    InvalidWeight {
        /// First endpoint.
        source: usize,
        /// Second endpoint.
        target: usize,
        /// Offending weight.
        weight: f64,
    },

    /// Edge endpoint outside `0..node_count`.
    NodeOutOfBounds {
        /// Offending node index.
        node: usize,
        /// Number of nodes in the graph.
        node_count: usize,
    },

    /// Feature rows do not share one dimension.
    DimensionMismatch {
        /// Expected dimension (length of the first row).
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Number of feature rows differs from the number of nodes.
    FeatureCountMismatch {
        /// Number of nodes in the graph.
        expected: usize,
        /// Number of feature rows supplied.
        found: usize,
    },

    /// Feature value was NaN or infinite.
    InvalidFeature {
        /// Row (node) of the offending value.
        row: usize,
        /// Column of the offending value.
        column: usize,
    },

    /// Partition length differs from the number of nodes.
    PartitionLengthMismatch {
        /// Number of nodes in the graph.
        expected: usize,
        /// Partition length.
        found: usize,
    },

    /// Requested dendrogram level does not exist.
    LevelOutOfRange {
        /// Requested level.
        level: usize,
        /// Number of recorded levels.
        n_levels: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyGraph => write!(f, "graph has no nodes"),
            Error::InvalidWeight {
                source,
                target,
                weight,
            } => write!(
                f,
                "invalid weight {weight} on edge ({source}, {target}): weights must be finite and non-negative"
            ),
            Error::NodeOutOfBounds { node, node_count } => {
                write!(f, "node {node} out of bounds for graph with {node_count} nodes")
            }
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::FeatureCountMismatch { expected, found } => {
                write!(f, "expected {expected} feature rows (one per node), found {found}")
            }
            Error::InvalidFeature { row, column } => {
                write!(f, "feature ({row}, {column}) is not finite")
            }
            Error::PartitionLengthMismatch { expected, found } => {
                write!(f, "partition covers {found} nodes, graph has {expected}")
            }
            Error::LevelOutOfRange { level, n_levels } => {
                write!(f, "level {level} out of range ({n_levels} levels recorded)")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

impl std::error::Error for Error {}
