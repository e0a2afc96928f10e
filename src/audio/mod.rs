//! Audio pipeline: decode, resample, shared types, device output

pub mod decode;
pub mod output;
pub mod resampler;
pub mod types;

pub use decode::decode_file;
pub use output::{AudioOutput, FrameSource};
pub use resampler::{to_target_rate, TARGET_SAMPLE_RATE};
pub use types::{AudioClip, AudioFrame};
