//! Pairwise chaining test for seed clusters: can the read plausibly run from
//! one cluster into the other through the graph?

use crate::align::bounded_dijkstra::DistanceCache;
use crate::align::cluster::{KmerCluster, MappingInstance};
use crate::align::params::AlignerParams;
use crate::graph::AssemblyGraph;
use log::debug;

/// Clusters heavier than this may chain through the overlap rule even when
/// position projection disagrees.
pub const LONG_ALIGNMENT_OVERLAP: usize = 300;

/// Whether two matching k-mer pairs agree once `a` is projected forward by
/// `shift` bases of graph: the projected edge gap must not exceed the read gap
/// by more than the tolerated compression.
pub fn similar_in_graph(params: &AlignerParams, a: &MappingInstance, b: &MappingInstance, shift: i64) -> bool {
  let (a_read, a_edge) = (a.read_position as i64, a.edge_position as i64);
  let (b_read, b_edge) = (b.read_position as i64, b.edge_position as i64);
  if b_read + shift < a_read {
    return similar_in_graph(params, b, a, -shift);
  }
  if b_read == a_read {
    (b_edge + shift - a_edge).abs() < 2
  } else {
    ((b_edge + shift - a_edge) as f64) * params.compression_cutoff <= (b_read - a_read) as f64
  }
}

/// Directed consistency of two clusters in read order: `b` can continue the
/// chain after `a`. Evaluated on ordered pairs of the cluster order.
pub fn is_consistent<G: AssemblyGraph>(
  g: &G,
  params: &AlignerParams,
  cache: &DistanceCache,
  a: &KmerCluster,
  b: &KmerCluster,
) -> bool {
  debug!(
    "consistency of clusters on {} and {}",
    g.int_id(a.edge),
    g.int_id(b.edge)
  );
  if a.last_trustable().read_position + params.max_path_in_dijkstra < b.first_trustable().read_position {
    debug!("clusters are too far apart in the read");
    return false;
  }

  let shift = if a.edge == b.edge {
    let read_gap = b.first_trustable().read_position as i64 - a.last_trustable().read_position as i64;
    let edge_gap = b.first_trustable().edge_position as i64 - a.last_trustable().edge_position as i64;
    if edge_gap < 0 {
      return false;
    }
    if edge_gap as f64 > (read_gap + 2 * g.k() as i64).max(0) as f64 * params.path_limit_stretching {
      debug!("edge gap {edge_gap} too wide for read gap {read_gap}");
      return false;
    }
    0
  } else {
    let Some(distance) = cache.distance(
      g,
      g.edge_end(a.edge),
      g.edge_start(b.edge),
      params.max_path_in_dijkstra,
      params.max_vertex_in_dijkstra,
    ) else {
      return false;
    };
    (g.length(a.edge) + distance) as i64
  };

  if similar_in_graph(params, a.last_trustable(), b.first_trustable(), shift) {
    debug!("similar");
    return true;
  }
  let graph_span = shift + b.first_trustable().edge_position as i64 - a.last_trustable().edge_position as i64;
  let read_span = b.first_trustable().read_position as i64 - a.last_trustable().read_position as i64
    + 2 * g.k() as i64;
  if a.size > LONG_ALIGNMENT_OVERLAP && b.size > LONG_ALIGNMENT_OVERLAP && graph_span <= read_span {
    debug!("long overlapping clusters chained, graph span {graph_span} within read span {read_span}");
    true
  } else {
    false
  }
}

/// Upper-triangle table of `is_consistent` over the sorted cluster list.
pub fn connection_table<G: AssemblyGraph>(
  g: &G,
  params: &AlignerParams,
  cache: &DistanceCache,
  clusters: &[KmerCluster],
) -> Vec<Vec<bool>> {
  let len = clusters.len();
  let mut table = vec![vec![false; len]; len];
  for i in 0..len {
    for j in (i + 1)..len {
      table[i][j] = is_consistent(g, params, cache, &clusters[i], &clusters[j]);
    }
  }
  table
}

#[cfg(test)]
mod consistency_tests {
  use super::*;
  use crate::align::cluster::SeedHit;
  use crate::align::mapping::Range;
  use crate::align::test_fixtures::{chain_graph, two_component_graph};
  use crate::graph::EdgeId;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  fn cluster(edge: EdgeId, read: (usize, usize), edge_range: (usize, usize)) -> KmerCluster {
    KmerCluster::from_seed_hit(&SeedHit {
      edge,
      read_range: Range::new(read.0, read.1),
      edge_range: Range::new(edge_range.0, edge_range.1),
    })
  }

  #[rstest]
  fn adjacent_edges_with_matching_projection_chain() {
    let fixture = chain_graph(21, &[100, 50, 100]);
    let g = &fixture.graph;
    let params = AlignerParams::default();
    let cache = DistanceCache::new();

    let a = cluster(fixture.edges[0], (0, 100), (0, 100));
    let b = cluster(fixture.edges[1], (100, 150), (0, 50));
    assert!(is_consistent(g, &params, &cache, &a, &b));
  }

  #[rstest]
  fn skipping_an_edge_still_chains() {
    let fixture = chain_graph(21, &[100, 50, 100]);
    let g = &fixture.graph;
    let params = AlignerParams::default();
    let cache = DistanceCache::new();

    let a = cluster(fixture.edges[0], (0, 100), (0, 100));
    let b = cluster(fixture.edges[2], (150, 250), (0, 100));
    assert!(is_consistent(g, &params, &cache, &a, &b));
  }

  #[rstest]
  fn unreachable_edges_do_not_chain() {
    let (g, edges_a, edges_b, ..) = two_component_graph(21, &[100], &[100]);
    let params = AlignerParams::default();
    let cache = DistanceCache::new();

    let a = cluster(edges_a[0], (0, 100), (0, 100));
    let b = cluster(edges_b[0], (120, 220), (0, 100));
    assert!(!is_consistent(&g, &params, &cache, &a, &b));
  }

  #[rstest]
  fn distant_read_positions_do_not_chain() {
    let fixture = chain_graph(21, &[100, 50, 100]);
    let g = &fixture.graph;
    let params = AlignerParams::default();
    let cache = DistanceCache::new();

    let a = cluster(fixture.edges[0], (0, 100), (0, 100));
    let b = cluster(fixture.edges[1], (16_000, 16_050), (0, 50));
    assert!(!is_consistent(g, &params, &cache, &a, &b));
  }

  #[rstest]
  fn compressed_projection_is_rejected() {
    let fixture = chain_graph(21, &[100, 50, 100]);
    let g = &fixture.graph;
    let params = AlignerParams::default();
    let cache = DistanceCache::new();

    // Read claims e1 and e3 are only 5 bases apart; the graph needs 50.
    let a = cluster(fixture.edges[0], (0, 100), (0, 100));
    let b = cluster(fixture.edges[2], (105, 205), (0, 100));
    assert!(!is_consistent(g, &params, &cache, &a, &b));
  }

  #[rstest]
  #[case((0, 60), (60, 100), true)]
  #[case((0, 60), (58, 100), false)]
  fn same_edge_requires_ordered_positions(
    #[case] first_edge_range: (usize, usize),
    #[case] second_edge_range: (usize, usize),
    #[case] expected: bool,
  ) {
    let fixture = chain_graph(21, &[100, 50, 100]);
    let g = &fixture.graph;
    let params = AlignerParams::default();
    let cache = DistanceCache::new();

    let a = cluster(fixture.edges[0], (0, 60), first_edge_range);
    let b = cluster(fixture.edges[0], (60, 100), second_edge_range);
    assert_eq!(is_consistent(g, &params, &cache, &a, &b), expected);
  }

  #[rstest]
  fn consistency_is_directed() {
    let fixture = chain_graph(21, &[100, 50, 100]);
    let g = &fixture.graph;
    let params = AlignerParams::default();
    let cache = DistanceCache::new();

    let a = cluster(fixture.edges[0], (0, 100), (0, 100));
    let b = cluster(fixture.edges[1], (100, 150), (0, 50));
    assert!(is_consistent(g, &params, &cache, &a, &b));
    // The reverse direction asks the graph for a path from e2 back to e1.
    assert!(!is_consistent(g, &params, &cache, &b, &a));
  }

  #[rstest]
  fn table_is_upper_triangular() {
    let fixture = chain_graph(21, &[100, 50, 100]);
    let g = &fixture.graph;
    let params = AlignerParams::default();
    let cache = DistanceCache::new();

    let clusters = vec![
      cluster(fixture.edges[0], (0, 100), (0, 100)),
      cluster(fixture.edges[1], (100, 150), (0, 50)),
      cluster(fixture.edges[2], (150, 250), (0, 100)),
    ];
    let table = connection_table(g, &params, &cache, &clusters);
    assert_eq!(
      table,
      vec![
        vec![false, true, true],
        vec![false, false, true],
        vec![false, false, false],
      ]
    );
  }
}
