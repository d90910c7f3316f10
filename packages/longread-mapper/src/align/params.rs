use eyre::{eyre, Report};
use serde::{Deserialize, Serialize};

/// Parameters of long-read alignment onto the assembly graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AlignerParams {
  /// Maximum graph-to-read compression ratio tolerated when projecting seed
  /// cluster positions through the graph. A pair of clusters is chained only
  /// if the projected graph span times this factor fits into the read span.
  pub compression_cutoff: f64,

  /// Lower multiplier on the expected graph path length for a given read gap.
  /// Accommodates deletions in the read.
  pub path_limit_pressing: f64,

  /// Upper multiplier on the expected graph path length for a given read gap.
  /// Accommodates insertions in the read.
  pub path_limit_stretching: f64,

  /// Length cap (in base pairs of spelled path) for the bounded Dijkstra used
  /// to decide cluster reachability and to restrict gap-closure searches.
  pub max_path_in_dijkstra: usize,

  /// Cap on the number of vertices a single bounded Dijkstra may visit.
  pub max_vertex_in_dijkstra: usize,

  /// Read gaps longer than this are never closed through the graph; the read
  /// is split into separate sub-reads instead.
  pub max_contigs_gap_length: usize,

  /// Minimum anchor length requested from the external seed mapper. Handed to
  /// the mapper verbatim; the aligner itself does not re-check it.
  pub bwa_length_cutoff: usize,

  /// Close gaps with the edit-distance Dijkstra over the alignment graph
  /// instead of enumerating candidate paths and scoring each one.
  pub use_dijkstra_filler: bool,
}

impl Default for AlignerParams {
  fn default() -> Self {
    Self {
      compression_cutoff: 0.3,
      path_limit_pressing: 0.7,
      path_limit_stretching: 1.3,
      max_path_in_dijkstra: 15_000,
      max_vertex_in_dijkstra: 2_000,
      max_contigs_gap_length: 10_000,
      bwa_length_cutoff: 500,
      use_dijkstra_filler: false,
    }
  }
}

impl AlignerParams {
  pub fn validate(&self) -> Result<(), Report> {
    if !(0.0..=1.0).contains(&self.compression_cutoff) {
      return Err(eyre!(
        "compression-cutoff must be in [0, 1], got {}",
        self.compression_cutoff
      ));
    }
    if self.path_limit_pressing > 1.0 {
      return Err(eyre!(
        "path-limit-pressing must not exceed 1, got {}",
        self.path_limit_pressing
      ));
    }
    if self.path_limit_stretching < 1.0 {
      return Err(eyre!(
        "path-limit-stretching must be at least 1, got {}",
        self.path_limit_stretching
      ));
    }
    if self.max_path_in_dijkstra == 0 || self.max_vertex_in_dijkstra == 0 {
      return Err(eyre!("dijkstra caps must be positive"));
    }
    Ok(())
  }
}
