#![doc(html_root_url = "https://docs.rs/flvio/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # flvio - FLV Container Toolkit
//!
//! `flvio` is a toolkit for reading and writing the FLV container format
//! in Rust. It demultiplexes a tag stream into typed frames, extracts
//! video dimensions from the codec payloads that carry them, tolerates
//! damaged input, and remultiplexes frames back into a consistent byte
//! stream.
//!
//! ## Features
//!
//! ### Container Support
//! - Tag-level demuxing into video, audio, and script-data frames
//! - Remuxing with recomputed prev-tag-size chains
//! - Byte-at-a-time resynchronization through corrupted stretches,
//!   bounded by the source size
//!
//! ### Codec Payload Parsing
//! - H.264 SPS parsing (Exp-Golomb, RBSP unescaping) for picture
//!   dimensions
//! - AVCDecoderConfigurationRecord parsing with SPS/PPS extraction
//! - VP6 keyframe header dimension extraction
//! - Minimal AMF0 decoding for `onMetaData` listings
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! flvio = "0.1.0"
//! ```
//!
//! ### Reading an FLV file
//!
//! ```rust,no_run
//! use flvio::format::flv::FlvReader;
//! use tokio::fs::File;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let file = File::open("movie.flv").await?;
//!     let mut reader = FlvReader::new(file);
//!
//!     let header = reader.read_header().await?;
//!     println!("flv version {}", header.version >> 8);
//!
//!     while let Some(frame) = reader.read_frame().await? {
//!         println!("{}", frame);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Rewriting a damaged file
//!
//! ```rust,no_run
//! use flvio::format::flv::{FlvReader, FlvWriter};
//! use tokio::fs::File;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut reader = FlvReader::new(File::open("damaged.flv").await?);
//!     let mut writer = FlvWriter::new(File::create("clean.flv").await?);
//!
//!     writer.write_header(&reader.read_header().await?).await?;
//!     loop {
//!         match reader.read_frame_with_recovery(16 * 1024 * 1024).await {
//!             Ok(recovery) => match recovery.frame {
//!                 Some(frame) => writer.write_frame(&frame).await?,
//!                 None => break,
//!             },
//!             Err(_) => break,
//!         }
//!     }
//!     writer.flush().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `av`: Container-agnostic stream descriptions and packets
//!   - Codec identities and stream metadata
//!   - Packet abstraction with timing and keyframe flags
//!
//! - `codec`: Payload parsers used during tag decoding
//!   - H.264 SPS and decoder configuration record parsing
//!   - VP6 keyframe header parsing
//!
//! - `format`: Container implementations and shared traits
//!   - FLV demuxer with corruption recovery
//!   - FLV muxer with consistent trailing-size chains
//!   - AMF0 metadata decoding
//!
//! - `error`: Error handling types and utilities
//!   - One error enum distinguishing fatal from recoverable failures
//!
//! - `utils`: Common utilities and helper functions
//!   - Bit-level reading and writing, exponential Golomb codes
//!
/// Audio/Video base types and utilities
pub mod av;

/// Codec payload parsers for video formats
pub mod codec;

/// Error types and utilities
pub mod error;

/// Media container implementations (FLV)
pub mod format;

/// Common utilities and helper functions
pub mod utils;

pub use error::{FlvError, Result};
