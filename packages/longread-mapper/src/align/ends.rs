//! Extension of a sub-read's first and last alignments into the unaligned
//! read flanks, by the edit-distance Dijkstra with a read-end sink.

use crate::align::gap_dijkstra::{edit_distance_search, Sink};
use crate::align::mapping::{MappingPath, MappingRange, Range};
use crate::graph::{AssemblyGraph, EdgeId};
use crate::sequence::reverse_complement_in_place;
use log::info;

/// Longest read flank the extension will attempt.
const MAX_EXTENSION_LENGTH: usize = 2000;

struct InitialState {
  start_edge: EdgeId,
  start_offset: usize,
  suffix: Vec<u8>,
}

/// The forward extension starts where the last mapping ends; the backward one
/// mirrors through the conjugate edge and the reverse-complemented prefix.
fn prepare_initial_state<G: AssemblyGraph>(
  g: &G,
  path: &MappingPath,
  s: &[u8],
  forward: bool,
) -> Option<InitialState> {
  if forward {
    let &(edge, mapping) = path.last()?;
    Some(InitialState {
      start_edge: edge,
      start_offset: mapping.edge.end,
      suffix: s[mapping.read.end.min(s.len())..].to_vec(),
    })
  } else {
    let &(edge, mapping) = path.first()?;
    let start_edge = g.conjugate(edge);
    let len = g.length(start_edge);
    let mut suffix = s[..mapping.read.start.min(s.len())].to_vec();
    reverse_complement_in_place(&mut suffix);
    Some(InitialState {
      start_edge,
      start_offset: len.min(len + g.k() - mapping.edge.start),
      suffix,
    })
  }
}

/// Extends `path` into the unaligned flank of `s`. Failure of any guard or of
/// the search leaves the path unchanged.
pub fn grow_ends<G: AssemblyGraph>(g: &G, path: &mut MappingPath, s: &[u8], forward: bool) {
  let Some(init) = prepare_initial_state(g, path, s, forward) else {
    return;
  };
  let s_len = init.suffix.len();
  let cost_cap = 20.max(s_len / 4);
  if s_len > MAX_EXTENSION_LENGTH {
    info!("end extension: sequence is too long ({s_len})");
    return;
  }
  if s_len < g.length(init.start_edge) + g.k() - init.start_offset {
    info!("end extension: sequence is too small ({s_len})");
    return;
  }

  let Some(outcome) = edit_distance_search(
    g,
    &init.suffix,
    init.start_edge,
    init.start_offset,
    Sink::ReadEnd,
    cost_cap,
    None,
  ) else {
    info!(
      "end extension found nothing: edge={} offset={} suffix_len={s_len}",
      g.int_id(init.start_edge),
      init.start_offset
    );
    return;
  };
  if outcome.path.len() < 2 {
    // The whole flank fits on the already-mapped edge.
    return;
  }
  update_path_with_extension(g, path, &outcome.path, outcome.end_offset, forward);
}

/// Splices the discovered walk into the mapping path: appended edges carry
/// empty read ranges, the final edge a trimmed edge range.
fn update_path_with_extension<G: AssemblyGraph>(
  g: &G,
  path: &mut MappingPath,
  walk: &[EdgeId],
  end_offset: usize,
  forward: bool,
) {
  if forward {
    for &edge in &walk[1..walk.len() - 1] {
      path.push(edge, MappingRange::path_filling(Range::new(0, g.length(edge))));
    }
    let last = walk[walk.len() - 1];
    path.push(
      last,
      MappingRange::path_filling(Range::new(0, end_offset.saturating_sub(g.k()))),
    );
  } else {
    // The walk ran along the conjugate strand; prepend its mirror image.
    let mut grown = MappingPath::new();
    let last = walk[walk.len() - 1];
    let mut start = (g.length(last) + g.k()) as i64 - end_offset as i64;
    let mut cur_ind = walk.len() as i64 - 1;
    while cur_ind >= 0 && start - g.length(walk[cur_ind as usize]) as i64 > 0 {
      start -= g.length(walk[cur_ind as usize]) as i64;
      cur_ind -= 1;
    }
    if cur_ind > 0 {
      let edge = walk[cur_ind as usize];
      grown.push(
        g.conjugate(edge),
        MappingRange::path_filling(Range::new(start as usize, g.length(edge))),
      );
    }
    for i in (1..cur_ind).rev() {
      let edge = walk[i as usize];
      grown.push(
        g.conjugate(edge),
        MappingRange::path_filling(Range::new(0, g.length(edge))),
      );
    }
    for &(edge, mapping) in path.iter() {
      grown.push(edge, mapping);
    }
    *path = grown;
  }
}
