//! Seed clusters: anchor alignments of a read onto single edges, as produced
//! by the external short-seed mapper.

use crate::align::mapping::Range;
use crate::graph::{AssemblyGraph, EdgeId};
use std::cmp::Ordering;
use std::fmt;

/// One matching k-mer pair between the read and an edge. Both coordinates are
/// k-mer positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MappingInstance {
  pub read_position: usize,
  pub edge_position: usize,
}

/// One anchor alignment returned by the seed mapper: a run of matching k-mers
/// between the read and a single edge. Ranges are non-empty and k-mer based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedHit {
  pub edge: EdgeId,
  pub read_range: Range,
  pub edge_range: Range,
}

/// Contract of the external short-seed mapper. Every returned hit refers to a
/// valid edge of the graph the aligner was built over.
pub trait SeedMapper {
  fn map_sequence(&self, seq: &[u8]) -> Vec<SeedHit>;
}

/// Cluster of seed hits on one edge, with a trustable core used for chaining.
///
/// Clusters built from a single mapper hit carry two instances, the range
/// start pair and the range end pair, and trust both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KmerCluster {
  pub edge: EdgeId,
  pub sorted_positions: Vec<MappingInstance>,
  pub first_trustable_index: usize,
  pub last_trustable_index: usize,
  /// Chaining weight, the read span of the cluster in k-mers.
  pub size: usize,
  pub average_read_position: usize,
}

impl KmerCluster {
  pub fn from_seed_hit(hit: &SeedHit) -> Self {
    let positions = vec![
      MappingInstance {
        read_position: hit.read_range.start,
        edge_position: hit.edge_range.start,
      },
      MappingInstance {
        read_position: hit.read_range.end,
        edge_position: hit.edge_range.end,
      },
    ];
    Self {
      edge: hit.edge,
      first_trustable_index: 0,
      last_trustable_index: positions.len() - 1,
      size: hit.read_range.len(),
      average_read_position: (hit.read_range.start + hit.read_range.end) / 2,
      sorted_positions: positions,
    }
  }

  pub fn first_trustable(&self) -> &MappingInstance {
    &self.sorted_positions[self.first_trustable_index]
  }

  pub fn last_trustable(&self) -> &MappingInstance {
    &self.sorted_positions[self.last_trustable_index]
  }

  /// Whether this cluster can plausibly follow `other` on the same read: its
  /// trustable core must start at or after the point where `other`'s ends.
  pub fn can_follow(&self, other: &KmerCluster) -> bool {
    self.first_trustable().read_position >= other.last_trustable().read_position
  }

  pub fn describe<G: AssemblyGraph>(&self, g: &G) -> String {
    format!(
      "cluster on edge {} (len {}): read [{}, {}), edge [{}, {}), weight {}",
      g.int_id(self.edge),
      g.length(self.edge),
      self.first_trustable().read_position,
      self.last_trustable().read_position,
      self.first_trustable().edge_position,
      self.last_trustable().edge_position,
      self.size
    )
  }
}

impl fmt::Display for MappingInstance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "(read {}, edge {})", self.read_position, self.edge_position)
  }
}

/// Clusters are totally ordered by average read position; the remaining keys
/// only make the order deterministic.
impl Ord for KmerCluster {
  fn cmp(&self, other: &Self) -> Ordering {
    (self.average_read_position, self.edge, &self.sorted_positions, self.size).cmp(&(
      other.average_read_position,
      other.edge,
      &other.sorted_positions,
      other.size,
    ))
  }
}

impl PartialOrd for KmerCluster {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}
