//! Weighted selection of mutually consistent clusters into colors, each color
//! becoming one sub-read candidate.

use crate::align::cluster::KmerCluster;
use log::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterColor {
  Unassigned,
  /// Dropped: the cluster sat between members of a heavier chain without
  /// belonging to it.
  Deleted,
  /// Member of the chain whose head index is the group id.
  Group(usize),
}

/// Greedy maximum-weight chain extraction. Each iteration finds the heaviest
/// ascending chain in the consistency table over still-unassigned clusters,
/// colors it, and deletes the unassigned clusters strictly between the chain's
/// ends. Iterates until no weight is left.
pub fn weighted_colors(clusters: &[KmerCluster], connections: &[Vec<bool>]) -> Vec<ClusterColor> {
  let len = clusters.len();
  let mut colors = vec![ClusterColor::Unassigned; len];
  loop {
    let mut best_weight = vec![0usize; len];
    let mut prev = vec![usize::MAX; len];
    for i in 0..len {
      if colors[i] != ClusterColor::Unassigned {
        continue;
      }
      best_weight[i] = clusters[i].size;
      for j in 0..i {
        if colors[j] != ClusterColor::Unassigned {
          continue;
        }
        if connections[j][i] && best_weight[i] < clusters[i].size + best_weight[j] {
          best_weight[i] = clusters[i].size + best_weight[j];
          prev[i] = j;
        }
      }
    }

    let mut top = None;
    let mut top_weight = 0;
    for (i, &weight) in best_weight.iter().enumerate() {
      if weight > top_weight {
        top_weight = weight;
        top = Some(i);
      }
    }
    let Some(top) = top else {
      break;
    };
    trace!("coloring chain of weight {top_weight} ending at cluster {top}");

    let group = top;
    colors[top] = ClusterColor::Group(group);
    let mut head = top;
    while prev[head] != usize::MAX {
      head = prev[head];
      colors[head] = ClusterColor::Group(group);
    }
    // Unassigned clusters strictly inside the chain's span can never join a
    // later chain without crossing this one.
    if head < top {
      for color in &mut colors[head + 1..top] {
        if *color == ClusterColor::Unassigned {
          *color = ClusterColor::Deleted;
        }
      }
    }
  }
  colors
}
