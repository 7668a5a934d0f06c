//! Per-pass claim accumulator
//!
//! Determinism requires that each text unit is claimed by at most one
//! annotation per pass. The claim state is an explicit value constructed
//! fresh at pass start and threaded through every resolution call; nothing
//! here survives into the next pass.

use std::collections::{HashMap, HashSet};

use crate::models::CharRange;

/// Tracks which blocks and text ranges have been claimed during one pass
#[derive(Debug, Default)]
pub struct ClaimSet {
    /// Node indexes of blocks claimed whole
    claimed_block_nodes: HashSet<usize>,

    /// Claimed text ranges, per node index
    claimed_ranges: HashMap<usize, Vec<CharRange>>,
}

impl ClaimSet {
    /// Fresh accumulator for a new pass
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the block at `node_index` has already been claimed whole
    pub fn is_block_claimed(&self, node_index: usize) -> bool {
        self.claimed_block_nodes.contains(&node_index)
    }

    /// Claim a whole block
    pub fn claim_block(&mut self, node_index: usize) {
        self.claimed_block_nodes.insert(node_index);
    }

    /// Whether `range` within the node at `node_index` is still unclaimed
    pub fn is_range_free(&self, node_index: usize, range: &CharRange) -> bool {
        match self.claimed_ranges.get(&node_index) {
            Some(ranges) => !ranges.iter().any(|r| r.overlaps(range)),
            None => true,
        }
    }

    /// Claim a text range within a node
    pub fn claim_range(&mut self, node_index: usize, range: CharRange) {
        self.claimed_ranges.entry(node_index).or_default().push(range);
    }
}
