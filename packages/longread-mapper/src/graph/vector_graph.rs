use crate::graph::{AssemblyGraph, EdgeId, VertexId};
use crate::sequence::reverse_complement;
use eyre::{eyre, Report};

struct EdgeData {
  start: VertexId,
  end: VertexId,
  nucls: Vec<u8>,
  conjugate: EdgeId,
}

struct VertexData {
  outgoing: Vec<EdgeId>,
  incoming: Vec<EdgeId>,
  conjugate: VertexId,
}

/// Adjacency-vector implementation of `AssemblyGraph`.
///
/// Vertices and edges come in conjugate pairs: adding an edge also adds its
/// reverse-complement twin between the conjugate vertices, so the
/// double-strand invariant holds by construction.
pub struct VectorGraph {
  k: usize,
  edges: Vec<EdgeData>,
  vertices: Vec<VertexData>,
}

impl VectorGraph {
  pub fn new(k: usize) -> Self {
    Self {
      k,
      edges: Vec::new(),
      vertices: Vec::new(),
    }
  }

  /// Adds a vertex together with its conjugate twin. Returns `(v, conjugate(v))`.
  pub fn add_vertex_pair(&mut self) -> (VertexId, VertexId) {
    let v = VertexId(self.vertices.len());
    let w = VertexId(self.vertices.len() + 1);
    self.vertices.push(VertexData {
      outgoing: Vec::new(),
      incoming: Vec::new(),
      conjugate: w,
    });
    self.vertices.push(VertexData {
      outgoing: Vec::new(),
      incoming: Vec::new(),
      conjugate: v,
    });
    (v, w)
  }

  /// Adds an edge `from -> to` spelled by `nucls` (`> k` bases) and its
  /// reverse-complement twin `conjugate(to) -> conjugate(from)`.
  /// Returns `(e, conjugate(e))`.
  pub fn add_edge_pair(
    &mut self,
    from: (VertexId, VertexId),
    to: (VertexId, VertexId),
    nucls: &[u8],
  ) -> Result<(EdgeId, EdgeId), Report> {
    if nucls.len() <= self.k {
      return Err(eyre!(
        "edge nucleotide string of {} bases is not longer than k={}",
        nucls.len(),
        self.k
      ));
    }
    for &(v, w) in &[from, to] {
      for id in [v, w] {
        if id.0 >= self.vertices.len() {
          return Err(eyre!("unknown vertex {id}"));
        }
      }
    }

    let e = EdgeId(self.edges.len());
    let e_rc = EdgeId(self.edges.len() + 1);
    self.edges.push(EdgeData {
      start: from.0,
      end: to.0,
      nucls: nucls.to_vec(),
      conjugate: e_rc,
    });
    self.edges.push(EdgeData {
      start: to.1,
      end: from.1,
      nucls: reverse_complement(nucls),
      conjugate: e,
    });

    self.vertices[from.0.0].outgoing.push(e);
    self.vertices[to.0.0].incoming.push(e);
    self.vertices[to.1.0].outgoing.push(e_rc);
    self.vertices[from.1.0].incoming.push(e_rc);
    Ok((e, e_rc))
  }

  pub fn conjugate_vertex(&self, vertex: VertexId) -> VertexId {
    self.vertices[vertex.0].conjugate
  }

  pub fn edge_count(&self) -> usize {
    self.edges.len()
  }

  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }
}

impl AssemblyGraph for VectorGraph {
  fn k(&self) -> usize {
    self.k
  }

  fn length(&self, edge: EdgeId) -> usize {
    self.edges[edge.0].nucls.len() - self.k
  }

  fn edge_nucls(&self, edge: EdgeId) -> &[u8] {
    &self.edges[edge.0].nucls
  }

  fn edge_start(&self, edge: EdgeId) -> VertexId {
    self.edges[edge.0].start
  }

  fn edge_end(&self, edge: EdgeId) -> VertexId {
    self.edges[edge.0].end
  }

  fn conjugate(&self, edge: EdgeId) -> EdgeId {
    self.edges[edge.0].conjugate
  }

  fn outgoing(&self, vertex: VertexId) -> &[EdgeId] {
    &self.vertices[vertex.0].outgoing
  }

  fn incoming(&self, vertex: VertexId) -> &[EdgeId] {
    &self.vertices[vertex.0].incoming
  }
}
