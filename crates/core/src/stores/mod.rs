pub mod filesystem;
pub mod memory;

pub use filesystem::{FsBlobStore, JsonDocumentStore};
pub use memory::{MemoryBlobStore, MemoryDocumentStore};
