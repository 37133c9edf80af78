// Supporting documents: MIME gate, streamed disk write, metadata rows.

pub mod handlers;
pub mod pipeline;

pub use pipeline::UploadPipeline;
