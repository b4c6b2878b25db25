pub mod pool;
pub mod sink;

pub use sink::{DocumentSink, HttpDocumentSink};
