//! In-process graph store used by tests and dry runs.

pub mod graph_store;

pub use graph_store::InMemoryGraphStore;
