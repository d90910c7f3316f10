//! Dijkstra over the alignment graph: states are positions inside edges paired
//! with read offsets, weights are unit edit costs. One search serves both the
//! gap filler (exact sink) and the end extender (read-end sink).

use crate::graph::{AssemblyGraph, EdgeId, VertexId};
use log::debug;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Cap on settled states; hitting it means the region is too tangled.
const MAX_SEARCH_STATES: usize = 1_000_000;

/// What terminates the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sink {
  /// Reach a specific offset on a specific edge with the read fully consumed.
  /// When that edge is also the start edge, the walk must leave it first.
  Exact { edge: EdgeId, offset: usize },
  /// Consume the read anywhere; the accepting edge may spend its k-overlap
  /// tail as well.
  ReadEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct SearchState {
  edge: EdgeId,
  offset: usize,
  read_pos: usize,
  departed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
  /// The discovered walk, starting with the start edge.
  pub path: Vec<EdgeId>,
  /// Nucleotide offset on the last edge of the walk where the read ended.
  pub end_offset: usize,
  pub cost: usize,
}

/// Minimum-edit-cost walk through the graph from `(start_edge, start_offset)`
/// against `read`. States costlier than `cost_cap` are discarded; so are hops
/// through vertices absent from `reach` when a reach table is given. Ties
/// prefer the shorter spelled walk.
pub fn edit_distance_search<G: AssemblyGraph>(
  g: &G,
  read: &[u8],
  start_edge: EdgeId,
  start_offset: usize,
  sink: Sink,
  cost_cap: usize,
  reach: Option<&HashMap<VertexId, usize>>,
) -> Option<SearchOutcome> {
  let initial = SearchState {
    edge: start_edge,
    offset: start_offset,
    read_pos: 0,
    departed: false,
  };
  let mut dist = HashMap::<SearchState, usize>::new();
  let mut parent = HashMap::<SearchState, SearchState>::new();
  let mut heap = BinaryHeap::new();
  dist.insert(initial, 0);
  heap.push(Reverse((0usize, 0usize, initial)));
  let mut settled = 0usize;

  while let Some(Reverse((cost, spelled, state))) = heap.pop() {
    if cost > *dist.get(&state).unwrap_or(&usize::MAX) {
      continue;
    }
    settled += 1;
    if settled > MAX_SEARCH_STATES {
      debug!("edit distance search gave up after {settled} states");
      return None;
    }
    if accepts(sink, &state, read.len(), start_edge) {
      return Some(SearchOutcome {
        path: reconstruct_walk(g, &parent, state),
        end_offset: state.offset,
        cost,
      });
    }

    let len = g.length(state.edge);
    let offset_cap = match sink {
      Sink::Exact { .. } => len,
      Sink::ReadEnd => len + g.k(),
    };
    let relax = |next: SearchState, next_cost: usize, next_spelled: usize,
                     dist: &mut HashMap<SearchState, usize>,
                     parent: &mut HashMap<SearchState, SearchState>,
                     heap: &mut BinaryHeap<Reverse<(usize, usize, SearchState)>>| {
      if next_cost > cost_cap {
        return;
      }
      if next_cost < *dist.get(&next).unwrap_or(&usize::MAX) {
        dist.insert(next, next_cost);
        parent.insert(next, state);
        heap.push(Reverse((next_cost, next_spelled, next)));
      }
    };

    if state.offset < offset_cap {
      let graph_nucl = g.edge_nucls(state.edge)[state.offset];
      // Substitution or match.
      if state.read_pos < read.len() {
        let step = usize::from(graph_nucl != read[state.read_pos]);
        relax(
          SearchState { offset: state.offset + 1, read_pos: state.read_pos + 1, ..state },
          cost + step,
          spelled + 1,
          &mut dist, &mut parent, &mut heap,
        );
      }
      // The walk spells a base absent from the read.
      relax(
        SearchState { offset: state.offset + 1, ..state },
        cost + 1,
        spelled + 1,
        &mut dist, &mut parent, &mut heap,
      );
    }
    if state.read_pos < read.len() {
      // The read carries a base absent from the walk.
      relax(
        SearchState { read_pos: state.read_pos + 1, ..state },
        cost + 1,
        spelled,
        &mut dist, &mut parent, &mut heap,
      );
    }
    if state.offset == len {
      let vertex = g.edge_end(state.edge);
      if reach.is_none_or(|table| table.contains_key(&vertex)) {
        for &next_edge in g.outgoing(vertex) {
          relax(
            SearchState { edge: next_edge, offset: 0, read_pos: state.read_pos, departed: true },
            cost,
            spelled,
            &mut dist, &mut parent, &mut heap,
          );
        }
      }
    }
  }
  None
}

fn accepts(sink: Sink, state: &SearchState, read_len: usize, start_edge: EdgeId) -> bool {
  if state.read_pos != read_len {
    return false;
  }
  match sink {
    Sink::ReadEnd => true,
    Sink::Exact { edge, offset } => {
      state.edge == edge && state.offset == offset && (state.departed || edge != start_edge)
    }
  }
}

/// Walks the parent chain back to the initial state, collecting the edge at
/// every hop boundary (an offset reset from the end of the previous edge).
fn reconstruct_walk<G: AssemblyGraph>(
  g: &G,
  parent: &HashMap<SearchState, SearchState>,
  accept: SearchState,
) -> Vec<EdgeId> {
  let mut walk = vec![accept.edge];
  let mut cur = accept;
  while let Some(&prev) = parent.get(&cur) {
    if cur.offset == 0 && prev.offset == g.length(prev.edge) {
      walk.push(prev.edge);
    }
    cur = prev;
  }
  walk.reverse();
  walk
}
