pub mod pinecone;

pub use pinecone::{PineconeAdmin, PineconeStore};
