pub mod http;
pub mod segmenter;
pub mod types;

pub use http::HttpTranscriber;
pub use segmenter::{SegmenterConfig, SegmenterHandle, StreamingSegmenter};
pub use types::{NullTranscriber, Segment, Transcriber, TranscriptionError};
