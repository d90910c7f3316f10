//! Bounded shortest-path searches over graph vertices, plus the shared
//! distance cache consulted when chaining seed clusters.

use crate::graph::{AssemblyGraph, EdgeId, VertexId};
use log::trace;
use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::sync::RwLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
  Forward,
  Backward,
}

/// Dijkstra from `start` over spelled edge lengths, stopping at `max_distance`
/// base pairs or after settling `max_vertices` vertices. The returned map is a
/// correct lower envelope of shortest distances for every settled vertex even
/// when a cap truncates the search.
pub fn bounded_dijkstra<G: AssemblyGraph>(
  g: &G,
  start: VertexId,
  max_distance: usize,
  max_vertices: usize,
  direction: Direction,
) -> HashMap<VertexId, usize> {
  let mut settled = HashMap::<VertexId, usize>::new();
  let mut heap = BinaryHeap::new();
  heap.push(Reverse((0usize, start)));

  while let Some(Reverse((dist, vertex))) = heap.pop() {
    match settled.entry(vertex) {
      Entry::Occupied(_) => continue,
      Entry::Vacant(entry) => entry.insert(dist),
    };
    if settled.len() >= max_vertices {
      break;
    }
    let edges: &[EdgeId] = match direction {
      Direction::Forward => g.outgoing(vertex),
      Direction::Backward => g.incoming(vertex),
    };
    for &edge in edges {
      let next = match direction {
        Direction::Forward => g.edge_end(edge),
        Direction::Backward => g.edge_start(edge),
      };
      let next_dist = dist + g.length(edge);
      if next_dist <= max_distance && !settled.contains_key(&next) {
        heap.push(Reverse((next_dist, next)));
      }
    }
  }
  settled
}

/// Cache of bounded shortest-path lengths between vertex pairs, shared by all
/// reads of an alignment pass. `None` records "unreachable under the caps".
/// Readers run concurrently; a miss runs a bounded Dijkstra outside of any
/// lock and serializes only the insert.
#[derive(Default)]
pub struct DistanceCache {
  cached: RwLock<HashMap<(VertexId, VertexId), Option<usize>>>,
}

impl DistanceCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn distance<G: AssemblyGraph>(
    &self,
    g: &G,
    start: VertexId,
    end: VertexId,
    max_distance: usize,
    max_vertices: usize,
  ) -> Option<usize> {
    {
      let cached = self.cached.read().expect("distance cache lock poisoned");
      if let Some(&hit) = cached.get(&(start, end)) {
        trace!("distance {start}->{end} taken from cache");
        return hit;
      }
    }
    let settled = bounded_dijkstra(g, start, max_distance, max_vertices, Direction::Forward);
    let result = settled.get(&end).copied();
    self
      .cached
      .write()
      .expect("distance cache lock poisoned")
      .insert((start, end), result);
    result
  }

  pub fn len(&self) -> usize {
    self.cached.read().expect("distance cache lock poisoned").len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
