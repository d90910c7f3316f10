//! Byte-level nucleotide helpers shared by the graph builder and the
//! backward end extension.

/// Complement of a single nucleotide. Anything outside ACGT (case-insensitive)
/// maps to `N`.
pub fn complement(nuc: u8) -> u8 {
  match nuc {
    b'A' => b'T',
    b'C' => b'G',
    b'G' => b'C',
    b'T' => b'A',
    b'a' => b't',
    b'c' => b'g',
    b'g' => b'c',
    b't' => b'a',
    _ => b'N',
  }
}

pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
  seq.iter().rev().map(|&nuc| complement(nuc)).collect()
}

pub fn reverse_complement_in_place(seq: &mut [u8]) {
  seq.reverse();
  for nuc in seq.iter_mut() {
    *nuc = complement(*nuc);
  }
}

#[cfg(test)]
mod sequence_tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[rstest]
  #[case(b"ACGT", b"ACGT")]
  #[case(b"AAAA", b"TTTT")]
  #[case(b"GATTACA", b"TGTAATC")]
  fn reverse_complements(#[case] seq: &[u8], #[case] expected: &[u8]) {
    assert_eq!(reverse_complement(seq), expected);
  }

  #[rstest]
  fn reverse_complement_is_involutive() {
    let seq = b"ACCGTTGAGTA".to_vec();
    assert_eq!(reverse_complement(&reverse_complement(&seq)), seq);
  }

  #[rstest]
  fn in_place_variant_matches_allocating_one() {
    let seq = b"GATTACA".to_vec();
    let mut in_place = seq.clone();
    reverse_complement_in_place(&mut in_place);
    assert_eq!(in_place, reverse_complement(&seq));
    assert_eq!(in_place, b"TGTAATC");
  }

  #[rstest]
  fn unknown_bases_become_n() {
    assert_eq!(reverse_complement(b"AXG"), b"CNT");
  }
}
