//! Audio extraction from media files.

pub mod source;

pub use source::{
    AudioChunkSource, FfmpegOpener, FfmpegSource, MockChunkSource, MockSourceOpener, SourceOpener,
};
