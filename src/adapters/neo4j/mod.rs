//! Neo4j graph store adapter.

pub mod graph_store;
pub mod queries;

pub use graph_store::Neo4jGraphStore;
pub use queries::CypherQueries;
