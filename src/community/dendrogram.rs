//! Level hierarchy produced by multi-level Louvain.
//!
//! Level `k` maps every node of the level-`k` graph to a node of the
//! level-`k + 1` graph (its community). Level 0 is indexed by original
//! nodes. Composing levels `0..=k` gives the partition of the original graph
//! after `k + 1` rounds of moving and aggregation.

use crate::error::{Error, Result};

/// Per-level partitions with the modularity reached at each level.
#[derive(Debug, Clone, PartialEq)]
pub struct Dendrogram {
    n_nodes: usize,
    levels: Vec<Vec<usize>>,
    modularity: Vec<f64>,
}

impl Dendrogram {
    /// Empty hierarchy over `n_nodes` original nodes.
    pub fn new(n_nodes: usize) -> Self {
        Self {
            n_nodes,
            levels: Vec::new(),
            modularity: Vec::new(),
        }
    }

    /// Record the next level.
    ///
    /// `partition` must have one entry per node of the current top level and
    /// use dense community ids.
    ///
    /// # Errors
    ///
    /// [`Error::PartitionLengthMismatch`] if the length does not match.
    pub fn push_level(&mut self, partition: Vec<usize>, modularity: f64) -> Result<()> {
        let expected = self.n_top_nodes();
        if partition.len() != expected {
            return Err(Error::PartitionLengthMismatch {
                expected,
                found: partition.len(),
            });
        }
        self.levels.push(partition);
        self.modularity.push(modularity);
        Ok(())
    }

    /// Number of original nodes.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Number of recorded levels.
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// Whether no level has been recorded.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Raw per-level partitions.
    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    /// Modularity after `level`.
    pub fn modularity_at(&self, level: usize) -> Result<f64> {
        self.modularity
            .get(level)
            .copied()
            .ok_or(Error::LevelOutOfRange {
                level,
                n_levels: self.n_levels(),
            })
    }

    /// Number of communities after `level`.
    pub fn n_communities_at(&self, level: usize) -> Result<usize> {
        let partition = self.levels.get(level).ok_or(Error::LevelOutOfRange {
            level,
            n_levels: self.n_levels(),
        })?;
        Ok(partition.iter().copied().max().map_or(0, |c| c + 1))
    }

    /// Community of every original node after `level`.
    pub fn partition_at_level(&self, level: usize) -> Result<Vec<usize>> {
        if level >= self.n_levels() {
            return Err(Error::LevelOutOfRange {
                level,
                n_levels: self.n_levels(),
            });
        }
        Ok(self.compose(&self.levels[..=level]))
    }

    /// Community of every original node after the last level.
    ///
    /// Every node is its own community when no level was recorded.
    pub fn flatten(&self) -> Vec<usize> {
        self.compose(&self.levels)
    }

    fn compose(&self, levels: &[Vec<usize>]) -> Vec<usize> {
        let Some((first, rest)) = levels.split_first() else {
            return (0..self.n_nodes).collect();
        };
        let mut labels = first.clone();
        for partition in rest {
            for label in labels.iter_mut() {
                *label = partition[*label];
            }
        }
        labels
    }

    /// Number of nodes the next level must cover.
    fn n_top_nodes(&self) -> usize {
        match self.levels.last() {
            None => self.n_nodes,
            Some(top) => top.iter().copied().max().map_or(0, |c| c + 1),
        }
    }
}
