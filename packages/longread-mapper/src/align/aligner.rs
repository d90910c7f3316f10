//! Per-read alignment driver: seed clusters through coloring, run splitting,
//! gap closure and end extension to the final `OneReadMapping`.

use crate::align::bounded_dijkstra::DistanceCache;
use crate::align::cluster::{KmerCluster, SeedHit, SeedMapper};
use crate::align::coloring::{weighted_colors, ClusterColor};
use crate::align::consistency::{connection_table, is_consistent};
use crate::align::ends::grow_ends;
use crate::align::gap_closure::fill_gaps_in_run;
use crate::align::mapping::{create_gap_info_try_fix_overlap, MappingPath, OneReadMapping};
use crate::align::params::AlignerParams;
use crate::graph::{AssemblyGraph, EdgeId, VertexId};
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Anchors shorter than this (in k-mers) are suspect and may be dropped by the
/// spurious-alignment filter.
const SHORT_SPURIOUS_LENGTH: usize = 500;

/// Aligns long reads onto the assembly graph. The graph, the seed mapper and
/// the parameters are fixed for an alignment pass; the distance cache is
/// shared by every read of the pass.
pub struct LongReadAligner<'g, G, M> {
  g: &'g G,
  mapper: M,
  params: AlignerParams,
  distance_cache: DistanceCache,
}

impl<'g, G: AssemblyGraph, M: SeedMapper> LongReadAligner<'g, G, M> {
  pub fn new(g: &'g G, mapper: M, params: AlignerParams) -> Self {
    Self {
      g,
      mapper,
      params,
      distance_cache: DistanceCache::new(),
    }
  }

  pub fn params(&self) -> &AlignerParams {
    &self.params
  }

  pub fn distance_cache(&self) -> &DistanceCache {
    &self.distance_cache
  }

  /// Aligns one read. Never fails: any unclosable gap or unextendable end
  /// only degrades the output, down to an empty mapping for reads shorter
  /// than k or without seed hits.
  pub fn align_read(&self, s: &[u8]) -> OneReadMapping {
    let clusters = self.seed_clusters(s);
    if clusters.is_empty() {
      return OneReadMapping::default();
    }
    let connections = connection_table(self.g, &self.params, &self.distance_cache, &clusters);
    let colors = weighted_colors(&clusters, &connections);
    for (i, cluster) in clusters.iter().enumerate() {
      debug!("{:?} {}", colors[i], cluster.describe(self.g));
    }

    let mut sub_paths = Vec::new();
    let mut block_gap_closer = Vec::new();
    let mut start_clusters = Vec::new();
    let mut end_clusters = Vec::new();
    let mut used = vec![false; clusters.len()];
    for i in 0..clusters.len() {
      if used[i] || colors[i] == ClusterColor::Deleted {
        continue;
      }
      debug!("starting new subread");
      let mut group = Vec::new();
      for (j, used_flag) in used.iter_mut().enumerate() {
        if colors[j] == colors[i] {
          group.push(j);
          *used_flag = true;
        }
      }
      self.process_color_group(
        s,
        &group,
        &clusters,
        &mut start_clusters,
        &mut end_clusters,
        &mut sub_paths,
        &mut block_gap_closer,
      );
    }

    if let Some(first) = sub_paths.first_mut() {
      grow_ends(self.g, first, s, false);
    }
    if let Some(last) = sub_paths.last_mut() {
      grow_ends(self.g, last, s, true);
    }

    self.add_gap_descriptions(s, &clusters, &start_clusters, &end_clusters, sub_paths, &block_gap_closer)
  }

  /// Aligns a batch of reads in parallel; outputs keep the input order.
  pub fn align_reads(&self, reads: &[Vec<u8>]) -> Vec<OneReadMapping>
  where
    G: Sync,
    M: Sync,
  {
    reads.par_iter().map(|read| self.align_read(read)).collect()
  }

  /// As `align_reads`, but reads not yet started when `cancel` is raised are
  /// skipped. Started reads always finish; no partial mapping is emitted.
  pub fn align_reads_until(&self, reads: &[Vec<u8>], cancel: &AtomicBool) -> Vec<OneReadMapping>
  where
    G: Sync,
    M: Sync,
  {
    reads
      .par_iter()
      .filter(|_| !cancel.load(Ordering::Relaxed))
      .map(|read| self.align_read(read))
      .collect()
  }

  fn seed_clusters(&self, s: &[u8]) -> Vec<KmerCluster> {
    if s.len() < self.g.k() {
      return Vec::new();
    }
    let hits = self.filter_spurious_hits(self.mapper.map_sequence(s), s.len());
    debug!("{} anchors after filtering", hits.len());
    let mut clusters = Vec::new();
    for hit in &hits {
      if hit.read_range.is_empty() || hit.edge_range.is_empty() {
        debug!("skipping extra-short alignment");
        continue;
      }
      clusters.push(KmerCluster::from_seed_hit(hit));
    }
    clusters.sort();
    clusters.dedup();
    clusters
  }

  /// Drops anchors whose mapped span is short while the anchor had room for a
  /// much longer alignment on both sides.
  fn filter_spurious_hits(&self, hits: Vec<SeedHit>, seq_len: usize) -> Vec<SeedHit> {
    let k = self.g.k();
    let mut kept = Vec::with_capacity(hits.len());
    for (i, hit) in hits.iter().enumerate() {
      let expected_additional_left = hit.read_range.start.min(hit.edge_range.start);
      let expected_additional_right = seq_len
        .saturating_sub(hit.read_range.end + k)
        .min(self.g.length(hit.edge) - hit.edge_range.end);
      let rlen = hit.read_range.len();
      if rlen < SHORT_SPURIOUS_LENGTH
        && (rlen + k) * 2 < expected_additional_left + expected_additional_right
      {
        debug!("skipping spurious alignment {i} on edge {}", self.g.int_id(hit.edge));
      } else {
        kept.push(hit.clone());
      }
    }
    if kept.len() != hits.len() {
      debug!("read of {seq_len} bases kept {} of {} anchors", kept.len(), hits.len());
    }
    kept
  }

  /// Splits one color group into maximal consistent runs and turns each run
  /// into mapping paths. Gap descriptions are blocked between pieces of one
  /// run; the last piece of a run unblocks them.
  fn process_color_group(
    &self,
    s: &[u8],
    group: &[usize],
    clusters: &[KmerCluster],
    start_clusters: &mut Vec<usize>,
    end_clusters: &mut Vec<usize>,
    sub_paths: &mut Vec<MappingPath>,
    block_gap_closer: &mut Vec<bool>,
  ) {
    let mut run_start = 0;
    for idx in 0..group.len() {
      let next = idx + 1;
      let split_here = next == group.len()
        || !is_consistent(
          self.g,
          &self.params,
          &self.distance_cache,
          &clusters[group[idx]],
          &clusters[group[next]],
        );
      if !split_here {
        debug!(
          "connected consecutive clusters {} and {}",
          clusters[group[idx]].describe(self.g),
          clusters[group[next]].describe(self.g)
        );
        continue;
      }
      if next != group.len() {
        debug!(
          "clusters split between {} and {}",
          clusters[group[idx]].describe(self.g),
          clusters[group[next]].describe(self.g)
        );
      }
      let run = group[run_start..next].iter().map(|&i| &clusters[i]).collect_vec();
      for path in fill_gaps_in_run(self.g, &self.params, s, &run) {
        if path.is_empty() {
          continue;
        }
        debug!("adding subread of {} alignments", path.len());
        start_clusters.push(group[run_start]);
        end_clusters.push(group[idx]);
        sub_paths.push(path);
        // Gap descriptions stay blocked inside one split run.
        block_gap_closer.push(true);
      }
      if let Some(last) = block_gap_closer.last_mut() {
        *last = false;
      }
      run_start = next;
    }
  }

  fn topology_gap(&self, first: EdgeId, second: EdgeId, oriented: bool) -> bool {
    let mut res = self.is_dead_end(self.g.edge_end(first)) && self.is_dead_start(self.g.edge_start(second));
    if !oriented {
      res |= self.is_dead_start(self.g.edge_start(first)) && self.is_dead_end(self.g.edge_end(second));
    }
    res
  }

  fn is_dead_end(&self, vertex: VertexId) -> bool {
    self.g.outgoing(vertex).is_empty()
  }

  fn is_dead_start(&self, vertex: VertexId) -> bool {
    self.g.incoming(vertex).is_empty()
  }

  /// Emits gap descriptions between consecutive sub-paths whose facing graph
  /// ends are legitimate discontinuities rather than chaining failures.
  fn add_gap_descriptions(
    &self,
    s: &[u8],
    clusters: &[KmerCluster],
    start_clusters: &[usize],
    end_clusters: &[usize],
    sub_paths: Vec<MappingPath>,
    block_gap_closer: &[bool],
  ) -> OneReadMapping {
    debug!("adding gaps between subreads");
    let mut gaps = Vec::new();
    for i in 0..sub_paths.len().saturating_sub(1) {
      if block_gap_closer[i] {
        continue;
      }
      let j = i + 1;
      let (Some(&(before_gap, _)), Some(&(after_gap, _))) = (sub_paths[i].last(), sub_paths[j].first())
      else {
        continue;
      };
      // No gap for reverse-complement jumps.
      if before_gap == after_gap || before_gap == self.g.conjugate(after_gap) {
        continue;
      }
      if !self.topology_gap(before_gap, after_gap, true) {
        continue;
      }
      let a = &clusters[end_clusters[i]];
      let b = &clusters[start_clusters[j]];
      if !b.can_follow(a) {
        continue;
      }
      let seq_start = a.last_trustable().read_position + self.g.k();
      let seq_end = b.first_trustable().read_position;
      let gap = create_gap_info_try_fix_overlap(
        self.g,
        s,
        seq_start,
        seq_end,
        a.edge,
        a.last_trustable().edge_position,
        b.edge,
        b.first_trustable().edge_position,
      );
      if let Some(gap) = gap {
        debug!("adding gap between alignments {i} and {j}");
        gaps.push(gap);
      }
    }
    OneReadMapping { sub_paths, gaps }
  }
}
