pub mod rag;
pub mod types;

pub use rag::RagClient;
pub use types::{HealthResponse, QueryRequest, QueryResponse, Source, QUERY_TOP_K};
