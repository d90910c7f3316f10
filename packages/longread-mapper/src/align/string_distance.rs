//! Banded edit distance between short nucleotide strings.
//!
//! Both gap-closure scoring and end extension compare strings of at most a
//! few kilobases, so the DP keeps only two banded rows.

/// Sentinel for "no alignment within the band".
pub const STRING_DIST_INF: usize = 1 << 30;

fn default_band(a_len: usize, b_len: usize) -> usize {
  a_len.max(b_len) / 3 + 20
}

/// Global edit distance between `a` and `b` with the default band. Returns
/// `STRING_DIST_INF` when the distance does not fit into the band.
pub fn string_distance(a: &[u8], b: &[u8]) -> usize {
  string_distance_banded(a, b, default_band(a.len(), b.len()))
}

/// Global edit distance restricted to a diagonal band of half-width `band`.
pub fn string_distance_banded(a: &[u8], b: &[u8], band: usize) -> usize {
  let (n, m) = (a.len(), b.len());
  if n.abs_diff(m) > band {
    return STRING_DIST_INF;
  }
  let mut rows = BandedRows::new(m, band);
  for i in 1..=n {
    rows.advance(i, |j| if a[i - 1] == b[j - 1] { 0 } else { 1 });
  }
  let result = rows.get(n, m);
  if result > band {
    STRING_DIST_INF
  } else {
    result
  }
}

/// Semi-global edit distance: `b` must be consumed entirely, `a` may stop
/// early (its tail is free). Returns the cost and the consumed prefix length
/// of `a`; `(STRING_DIST_INF, 0)` when nothing fits into the band.
pub fn string_distance_free_tail(a: &[u8], b: &[u8], band: usize) -> (usize, usize) {
  let (n, m) = (a.len(), b.len());
  let mut best = (STRING_DIST_INF, 0);
  let mut rows = BandedRows::new(m, band);
  let consider = |best: &mut (usize, usize), cost: usize, i: usize| {
    if cost < best.0 {
      *best = (cost, i);
    }
  };
  consider(&mut best, rows.get(0, m), 0);
  for i in 1..=n {
    rows.advance(i, |j| if a[i - 1] == b[j - 1] { 0 } else { 1 });
    consider(&mut best, rows.get(i, m), i);
  }
  if best.0 > band {
    (STRING_DIST_INF, 0)
  } else {
    best
  }
}

/// Two rolling DP rows restricted to the diagonal band `|i - j| <= band`.
struct BandedRows {
  m: usize,
  band: usize,
  row: usize,
  prev: Vec<usize>,
  cur: Vec<usize>,
}

impl BandedRows {
  fn new(m: usize, band: usize) -> Self {
    let width = 2 * band + 2;
    let mut cur = vec![STRING_DIST_INF; width];
    for (j, slot) in cur.iter_mut().enumerate().take(m.min(band) + 1) {
      *slot = j;
    }
    Self {
      m,
      band,
      row: 0,
      prev: vec![STRING_DIST_INF; width],
      cur,
    }
  }

  fn window(&self, i: usize) -> (usize, usize) {
    (i.saturating_sub(self.band), self.m.min(i + self.band))
  }

  fn get(&self, i: usize, j: usize) -> usize {
    debug_assert_eq!(i, self.row);
    let (lo, hi) = self.window(i);
    if j < lo || j > hi {
      STRING_DIST_INF
    } else {
      self.cur[j - lo]
    }
  }

  fn advance(&mut self, i: usize, subst_cost: impl Fn(usize) -> usize) {
    std::mem::swap(&mut self.prev, &mut self.cur);
    let (prev_lo, prev_hi) = self.window(i - 1);
    let (lo, hi) = self.window(i);
    self.cur.fill(STRING_DIST_INF);
    for j in lo..=hi {
      let mut best = STRING_DIST_INF;
      if j > lo {
        best = best.min(self.cur[j - 1 - lo].saturating_add(1));
      }
      if j >= prev_lo && j <= prev_hi {
        best = best.min(self.prev[j - prev_lo].saturating_add(1));
      }
      if j >= 1 && j - 1 >= prev_lo && j - 1 <= prev_hi {
        best = best.min(self.prev[j - 1 - prev_lo].saturating_add(subst_cost(j)));
      }
      self.cur[j - lo] = best;
    }
    self.row = i;
  }
}
