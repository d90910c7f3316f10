pub mod aligner;
pub mod bounded_dijkstra;
pub mod cluster;
pub mod coloring;
pub mod consistency;
pub mod ends;
pub mod gap_closure;
pub mod gap_dijkstra;
pub mod mapping;
pub mod params;
pub mod path_enumerator;
pub mod string_distance;

#[cfg(test)]
pub mod test_fixtures;
