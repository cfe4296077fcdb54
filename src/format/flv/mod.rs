//! # FLV Container Implementation
//!
//! This module provides a complete implementation of the FLV container
//! format, including support for:
//!
//! - Tag-level demuxing into typed frames (video, audio, script data)
//! - Remuxing frames back into a byte-exact tag stream
//! - Dimension carry state fed by H.264 SPS and VP6 keyframe parsing
//! - Byte-at-a-time resynchronization through damaged stretches
//! - Minimal AMF0 decoding for `onMetaData` listings
//!
//! ## Core Features
//!
//! - **Demuxing**: [`FlvReader`] walks tags sequentially over any
//!   `AsyncRead + AsyncSeek` source
//! - **Muxing**: [`FlvWriter`] appends frames in call order with
//!   recomputed prev-tag-size words
//! - **Recovery**: [`FlvReader::read_frame_with_recovery`] skips garbage
//!   bounded by the source size and reports the skip count
//! - **Pure codec layer**: [`decode_tag`]/[`encode_frame`] carry no I/O,
//!   so tag bytes from anywhere can be decoded directly
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use flvio::format::flv::FlvReader;
//! use tokio::fs::File;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let file = File::open("movie.flv").await?;
//!     let mut reader = FlvReader::new(file);
//!     reader.read_header().await?;
//!     while let Some(frame) = reader.read_frame().await? {
//!         println!("{}", frame);
//!     }
//!     Ok(())
//! }
//! ```

/// Minimal AMF0 decoding for script-data tag bodies
pub mod amf;
/// Sequential tag reader with corruption recovery
pub mod demuxer;
/// Typed frame variants decoded from tags
pub mod frame;
/// Sequential tag writer
pub mod muxer;
/// Tag-level decode and encode, free of I/O
pub mod tag;
/// Wire-level enums, constants, and the stream preamble
pub mod types;

pub use self::amf::Amf0Value;
pub use self::demuxer::{FlvCodecData, FlvReader, Recovery};
pub use self::frame::{AudioFrame, Frame, FrameCore, MetaFrame, VideoFrame};
pub use self::muxer::FlvWriter;
pub use self::tag::{decode_tag, encode_frame, RawTag, TagHeader};
pub use self::types::{
    AudioChannels, AudioCodec, AudioRate, AudioSize, AvcPacketType, Dimensions, Flavor,
    FlvHeader, TagType, VideoCodec, VideoFrameType,
};
