pub mod align;
pub mod graph;
pub mod sequence;

pub use crate::align::aligner::LongReadAligner;
pub use crate::align::mapping::{GapDescription, MappingPath, MappingRange, OneReadMapping, Range};
pub use crate::align::params::AlignerParams;
pub use crate::graph::{AssemblyGraph, EdgeId, VertexId};
