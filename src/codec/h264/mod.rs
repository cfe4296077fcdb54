//! # H.264/AVC Bitstream Parsing
//!
//! This module provides the H.264 parsing needed to recover coded picture
//! dimensions from FLV video tags. It supports:
//!
//! - Emulation-prevention byte removal (EBSP to RBSP)
//! - Sequence Parameter Set parsing up through the crop offsets
//! - AVCDecoderConfigurationRecord parsing (SPS/PPS extraction)
//! - Width/height derivation with implausibility rejection
//!
//! Full bitstream decoding is out of scope; only the SPS fields needed for
//! dimensions are consumed.
//!
//! ## Example: Unescaping a NAL payload
//!
//! ```rust
//! use flvio::codec::h264::remove_emulation_prevention;
//!
//! let rbsp = remove_emulation_prevention(&[0x00, 0x00, 0x03, 0x01]);
//! assert_eq!(rbsp, vec![0x00, 0x00, 0x01]);
//! ```

/// Parser for SPS payloads and AVC decoder configuration records
pub mod parser;
/// Structured SPS fields and derived dimensions
pub mod types;

// Re-export commonly used types from submodules for easier access
#[doc(inline)]
pub use parser::*;
#[doc(inline)]
pub use types::*;
