// Persistence layer
// The vector database exclusively owns persisted chunk text and metadata

pub mod lancedb;
