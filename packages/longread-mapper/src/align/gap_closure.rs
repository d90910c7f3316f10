//! Closing the graph gap between two consecutive seed clusters of one
//! sub-read: find the walk whose spelled string best matches the read stretch.

use crate::align::bounded_dijkstra::{bounded_dijkstra, Direction};
use crate::align::cluster::KmerCluster;
use crate::align::gap_dijkstra::{edit_distance_search, Sink};
use crate::align::mapping::{MappingPath, MappingRange, Range};
use crate::align::params::AlignerParams;
use crate::align::path_enumerator::{enumerate_paths, PathEnumeration};
use crate::align::string_distance::{string_distance, STRING_DIST_INF};
use crate::graph::{AssemblyGraph, EdgeId, VertexId};
use log::{debug, trace, warn};
use std::collections::HashMap;

/// Bounds on the spelled length of a bridging walk between the trustable ends
/// of two clusters, already reduced by the flanks spelled on the clusters' own
/// edges. The pressing factor shrinks the lower bound (read deletions), the
/// stretching factor grows the upper one (read insertions).
pub fn path_limits<G: AssemblyGraph>(
  g: &G,
  params: &AlignerParams,
  a: &KmerCluster,
  b: &KmerCluster,
  s_add_len: usize,
  e_add_len: usize,
) -> Option<(usize, usize)> {
  let start_pos = a.last_trustable().read_position as i64;
  let end_pos = b.first_trustable().read_position as i64;
  let seq_len = end_pos - start_pos;
  let k = g.k() as i64;
  let path_min_len = (((seq_len - k) as f64) * params.path_limit_pressing).floor().max(0.0) as i64;
  let path_max_len = ((seq_len + 2 * k) as f64 * params.path_limit_stretching) as i64;
  if seq_len < 0 {
    debug!("suspicious negative read gap: {start_pos} {end_pos} {path_min_len} {path_max_len}");
    if path_max_len < 0 {
      return None;
    }
  }
  let subtract = (s_add_len + e_add_len) as i64;
  Some((
    (path_min_len - subtract).max(0) as usize,
    (path_max_len - subtract).max(0) as usize,
  ))
}

/// Concatenated spelled string of a walk, k-overlaps not repeated.
pub fn spell_path<G: AssemblyGraph>(g: &G, path: &[EdgeId]) -> Vec<u8> {
  path
    .iter()
    .flat_map(|&e| g.edge_nucls(e)[..g.length(e)].iter().copied())
    .collect()
}

/// Bridging walk (intermediate edges only) between two cluster ends and its
/// edit score, found by the configured filler. `None` means the gap stays
/// open: no walk within the limits, the read stretch is too long, or every
/// candidate scored outside the band.
pub fn best_scored_path<G: AssemblyGraph>(
  g: &G,
  params: &AlignerParams,
  s: &[u8],
  start_e: EdgeId,
  end_e: EdgeId,
  start_p: usize,
  end_p: usize,
  path_min_len: usize,
  path_max_len: usize,
  seq_start: usize,
  seq_end: usize,
  s_add: &[u8],
  e_add: &[u8],
) -> Option<(Vec<EdgeId>, usize)> {
  let start_v = g.edge_end(start_e);
  let end_v = g.edge_start(end_e);
  trace!(
    "closing gap {}..{} between edges {} and {}, walk length in [{path_min_len}, {path_max_len}]",
    seq_start,
    seq_end,
    g.int_id(start_e),
    g.int_id(end_e)
  );

  let forward = bounded_dijkstra(
    g,
    start_v,
    path_max_len,
    params.max_vertex_in_dijkstra,
    Direction::Forward,
  );
  if !forward.contains_key(&end_v) {
    debug!("no walk of at most {path_max_len} bases reaches the next cluster");
    return None;
  }

  let (seq_start, seq_end) = if seq_end < seq_start {
    warn!("inverted read gap {seq_start}..{seq_end}, treating as empty");
    (seq_start, seq_start)
  } else {
    (seq_start, seq_end)
  };
  if seq_start >= s.len() {
    return None;
  }
  let seq_string = &s[seq_start..(seq_end + 1).min(s.len())];
  if seq_string.len() > params.max_contigs_gap_length {
    debug!("gap of {} bases is too large to close", seq_string.len());
    return None;
  }

  if params.use_dijkstra_filler {
    best_scored_path_dijkstra(g, params, seq_string, start_e, end_e, start_p, end_p, path_max_len)
  } else {
    best_scored_path_brute_force(g, start_v, end_v, path_min_len, path_max_len, seq_string, s_add, e_add)
  }
}

/// Enumerate every candidate walk, spell it and keep the best global edit
/// score. Optimal over the enumerated walks but quadratic in their number.
fn best_scored_path_brute_force<G: AssemblyGraph>(
  g: &G,
  start_v: VertexId,
  end_v: VertexId,
  path_min_len: usize,
  path_max_len: usize,
  seq_string: &[u8],
  s_add: &[u8],
  e_add: &[u8],
) -> Option<(Vec<EdgeId>, usize)> {
  let paths = match enumerate_paths(g, start_v, end_v, path_min_len, path_max_len) {
    PathEnumeration::Complete(paths) => paths,
    PathEnumeration::OverLimit => {
      debug!("path budget exceeded between {start_v} and {end_v}");
      return None;
    }
  };
  if paths.is_empty() {
    debug!("no walks between {start_v} and {end_v} within [{path_min_len}, {path_max_len}]");
    return None;
  }

  let mut best: Option<(usize, usize)> = None;
  for (i, path) in paths.iter().enumerate() {
    let candidate = [s_add, &spell_path(g, path), e_add].concat();
    let score = string_distance(&candidate, seq_string);
    trace!("walk {i} of {} edges scored {score}", path.len());
    if best.is_none_or(|(_, best_score)| score < best_score) {
      best = Some((i, score));
    }
  }
  let (best_index, best_score) = best?;
  if best_score >= STRING_DIST_INF {
    debug!("all {} walks scored outside the band", paths.len());
    return None;
  }
  Some((paths[best_index].clone(), best_score))
}

/// Edit-distance Dijkstra over the alignment graph, pruned to vertices lying
/// on some short-enough walk between the cluster ends.
fn best_scored_path_dijkstra<G: AssemblyGraph>(
  g: &G,
  params: &AlignerParams,
  seq_string: &[u8],
  start_e: EdgeId,
  end_e: EdgeId,
  start_p: usize,
  end_p: usize,
  path_max_len: usize,
) -> Option<(Vec<EdgeId>, usize)> {
  let start_v = g.edge_end(start_e);
  let end_v = g.edge_start(end_e);
  let forward = bounded_dijkstra(
    g,
    start_v,
    path_max_len,
    params.max_vertex_in_dijkstra,
    Direction::Forward,
  );
  let backward = bounded_dijkstra(
    g,
    end_v,
    path_max_len,
    params.max_vertex_in_dijkstra,
    Direction::Backward,
  );
  let reach: HashMap<VertexId, usize> = backward
    .into_iter()
    .filter(|(vertex, _)| forward.contains_key(vertex))
    .collect();
  if seq_string.len() > 2000 && reach.len() > 100_000 {
    debug!("gap filler skipped: gap too long and region too tangled");
    return None;
  }

  let cost_cap = (seq_string.len() / 3).max(20);
  let outcome = edit_distance_search(
    g,
    seq_string,
    start_e,
    start_p,
    Sink::Exact { edge: end_e, offset: end_p },
    cost_cap,
    Some(&reach),
  )?;
  if outcome.path.len() < 2 {
    return None;
  }
  let intermediates = outcome.path[1..outcome.path.len() - 1].to_vec();
  Some((intermediates, outcome.cost))
}

/// Turns one consistent run of clusters into mapping paths, bridging the graph
/// between consecutive clusters. An unclosable bridge closes the current path
/// and restarts from the cluster after it.
pub fn fill_gaps_in_run<G: AssemblyGraph>(
  g: &G,
  params: &AlignerParams,
  s: &[u8],
  run: &[&KmerCluster],
) -> Vec<MappingPath> {
  let mut res = Vec::new();
  let mut cur_sorted = MappingPath::new();
  let mut prev: Option<&KmerCluster> = None;

  for &cluster in run {
    let mut merged = false;
    if let Some(prev_cluster) = prev {
      let prev_e = prev_cluster.edge;
      let cur_e = cluster.edge;
      let prev_last = prev_cluster.last_trustable();
      let cur_first = cluster.first_trustable();
      let start_v = g.edge_end(prev_e);
      let end_v = g.edge_start(cur_e);
      let read_gap = cur_first.read_position as f64 - prev_last.read_position as f64;
      let stretched_graph_len = (cur_first.edge_position + g.k()) as f64
        + (g.length(prev_e) as f64 - prev_last.edge_position as f64) * params.path_limit_stretching;

      if prev_e == cur_e && read_gap <= stretched_graph_len {
        // The read stays on the edge; continue the open alignment instead of
        // detouring through the graph.
        if let Some((_, mapping)) = cur_sorted.last_mut() {
          mapping.read.end = cluster.last_trustable().read_position;
          mapping.edge.end = cluster.last_trustable().edge_position;
        }
        merged = true;
      } else if start_v != end_v || read_gap > stretched_graph_len {
        if start_v == end_v {
          debug!(
            "read gap {read_gap} overruns the direct junction (stretched span {stretched_graph_len}), \
             looking for a detour"
          );
        }
        debug!(
          "traversing tangled region between {} and {}",
          g.int_id(prev_e),
          g.int_id(cur_e)
        );
        let s_add = &g.edge_nucls(prev_e)[prev_last.edge_position..g.length(prev_e)];
        let e_add = &g.edge_nucls(cur_e)[..cur_first.edge_position];
        let closed = path_limits(g, params, prev_cluster, cluster, s_add.len(), e_add.len()).and_then(
          |(path_min_len, path_max_len)| {
            best_scored_path(
              g,
              params,
              s,
              prev_e,
              cur_e,
              prev_last.edge_position,
              cur_first.edge_position,
              path_min_len,
              path_max_len,
              prev_last.read_position,
              cur_first.read_position,
              s_add,
              e_add,
            )
          },
        );
        match closed {
          None => {
            debug!(
              "tangled region between {} and {} stays open, splitting the sub-read",
              g.int_id(prev_e),
              g.int_id(cur_e)
            );
            if !cur_sorted.is_empty() {
              res.push(std::mem::take(&mut cur_sorted));
            }
            // The current cluster starts a fresh path below.
          }
          Some((intermediates, score)) => {
            debug!("closed with score {score} through {} edges", intermediates.len());
            for edge in intermediates {
              cur_sorted.push(edge, MappingRange::path_filling(Range::new(0, g.length(edge))));
            }
          }
        }
      }
    }
    if !merged {
      cur_sorted.push(
        cluster.edge,
        MappingRange::new(
          Range::new(
            cluster.first_trustable().read_position,
            cluster.last_trustable().read_position,
          ),
          Range::new(
            cluster.first_trustable().edge_position,
            cluster.last_trustable().edge_position,
          ),
        ),
      );
    }
    prev = Some(cluster);
  }
  if !cur_sorted.is_empty() {
    res.push(cur_sorted);
  }
  res
}
