//! Codec-level parsers used while decoding FLV tags.

pub mod h264;
pub mod vp6;

// Re-export common types and functions
pub use h264::parser::{parse_sps, remove_emulation_prevention, AvcDecoderConfigRecord};
pub use h264::types::SpsInfo;
pub use vp6::keyframe_dimensions;
