//! Shared fixtures: deterministic synthetic sequences and small graphs with
//! known spelled strings.

use crate::align::cluster::{SeedHit, SeedMapper};
use crate::graph::vector_graph::VectorGraph;
use crate::graph::EdgeId;

/// Deterministic pseudo-random nucleotide string (linear congruential walk).
pub fn synthetic_sequence(len: usize, seed: u64) -> Vec<u8> {
  let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(1);
  (0..len)
    .map(|_| {
      state = state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407);
      b"ACGT"[((state >> 33) & 3) as usize]
    })
    .collect()
}

pub struct GraphFixture {
  pub graph: VectorGraph,
  pub edges: Vec<EdgeId>,
  /// Concatenated spelled string of the whole chain, `sum(lengths) + k` bases.
  pub genome: Vec<u8>,
}

/// Linear chain `e1 -> e2 -> ...` whose spelled strings are consecutive
/// windows of one synthetic genome, overlapping by `k`.
pub fn chain_graph(k: usize, lengths: &[usize]) -> GraphFixture {
  chain_graph_from_genome(k, lengths, synthetic_sequence(lengths.iter().sum::<usize>() + k, 17))
}

pub fn chain_graph_from_genome(k: usize, lengths: &[usize], genome: Vec<u8>) -> GraphFixture {
  assert_eq!(genome.len(), lengths.iter().sum::<usize>() + k);
  let mut graph = VectorGraph::new(k);
  let vertices: Vec<_> = (0..=lengths.len()).map(|_| graph.add_vertex_pair()).collect();
  let mut edges = Vec::new();
  let mut offset = 0;
  for (i, &len) in lengths.iter().enumerate() {
    let nucls = &genome[offset..offset + len + k];
    let (e, _) = graph
      .add_edge_pair(vertices[i], vertices[i + 1], nucls)
      .expect("chain fixture edge");
    edges.push(e);
    offset += len;
  }
  GraphFixture { graph, edges, genome }
}

pub struct BranchFixture {
  pub graph: VectorGraph,
  pub e1: EdgeId,
  pub e2a: EdgeId,
  pub e2b: EdgeId,
  pub e3: EdgeId,
  /// Genome spelled by the `e1 -> e2a -> e3` walk.
  pub genome: Vec<u8>,
}

/// Bubble `e1 -> (e2a | e2b) -> e3` where `e2b` differs from `e2a` by
/// `substitutions` middle bases (the k-overlaps at both ends are untouched).
pub fn branch_graph(k: usize, lengths: (usize, usize, usize), substitutions: usize) -> BranchFixture {
  let (len1, len2, len3) = lengths;
  assert!(len2 > k + 2 * substitutions, "no room for substitutions in the bubble");
  let genome = synthetic_sequence(len1 + len2 + len3 + k, 23);

  let mut graph = VectorGraph::new(k);
  let v0 = graph.add_vertex_pair();
  let v1 = graph.add_vertex_pair();
  let v2 = graph.add_vertex_pair();
  let v3 = graph.add_vertex_pair();

  let nucls1 = &genome[..len1 + k];
  let nucls2 = &genome[len1..len1 + len2 + k];
  let nucls3 = &genome[len1 + len2..];
  let mut nucls2_alt = nucls2.to_vec();
  for s in 0..substitutions {
    let pos = k + 1 + s * ((len2 - k - 2) / substitutions.max(1));
    nucls2_alt[pos] = match nucls2_alt[pos] {
      b'A' => b'C',
      b'C' => b'A',
      b'G' => b'T',
      _ => b'G',
    };
  }

  let (e1, _) = graph.add_edge_pair(v0, v1, nucls1).expect("branch fixture e1");
  let (e2a, _) = graph.add_edge_pair(v1, v2, nucls2).expect("branch fixture e2a");
  let (e2b, _) = graph.add_edge_pair(v1, v2, &nucls2_alt).expect("branch fixture e2b");
  let (e3, _) = graph.add_edge_pair(v2, v3, nucls3).expect("branch fixture e3");

  BranchFixture {
    graph,
    e1,
    e2a,
    e2b,
    e3,
    genome,
  }
}

/// Two disconnected chains in one graph, spelling unrelated genomes.
pub fn two_component_graph(
  k: usize,
  lengths_a: &[usize],
  lengths_b: &[usize],
) -> (VectorGraph, Vec<EdgeId>, Vec<EdgeId>, Vec<u8>, Vec<u8>) {
  let genome_a = synthetic_sequence(lengths_a.iter().sum::<usize>() + k, 31);
  let genome_b = synthetic_sequence(lengths_b.iter().sum::<usize>() + k, 47);
  let mut graph = VectorGraph::new(k);

  let mut add_chain = |lengths: &[usize], genome: &[u8]| {
    let vertices: Vec<_> = (0..=lengths.len()).map(|_| graph.add_vertex_pair()).collect();
    let mut edges = Vec::new();
    let mut offset = 0;
    for (i, &len) in lengths.iter().enumerate() {
      let (e, _) = graph
        .add_edge_pair(vertices[i], vertices[i + 1], &genome[offset..offset + len + k])
        .expect("component fixture edge");
      edges.push(e);
      offset += len;
    }
    edges
  };
  let edges_a = add_chain(lengths_a, &genome_a);
  let edges_b = add_chain(lengths_b, &genome_b);
  (graph, edges_a, edges_b, genome_a, genome_b)
}

/// Seed mapper stub that replays a fixed hit list regardless of the sequence.
pub struct StubSeedMapper {
  pub hits: Vec<SeedHit>,
}

impl SeedMapper for StubSeedMapper {
  fn map_sequence(&self, _seq: &[u8]) -> Vec<SeedHit> {
    self.hits.clone()
  }
}
