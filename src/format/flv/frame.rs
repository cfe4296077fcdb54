use bytes::Bytes;
use std::fmt;

use super::amf::{self, Amf0Value};
use super::types::{
    AudioChannels, AudioCodec, AudioSize, AvcPacketType, Flavor, TagType, VideoCodec,
};
use crate::error::Result;

/// Fields every frame kind shares, regardless of payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCore {
    /// Stream id from the tag header, zero in well-formed files.
    pub stream_id: u32,
    /// Decode timestamp in milliseconds, extension byte folded in.
    pub dts: u32,
    /// Coarse classification for seeking.
    pub flavor: Flavor,
    /// Byte offset of the tag header in the source.
    pub position: u64,
    /// The raw tag body.
    pub body: Bytes,
    /// The prev-tag-size word that followed this tag on the wire.
    pub prev_tag_size: u32,
}

/// A decoded video tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Shared tag fields.
    pub core: FrameCore,
    /// Codec nibble of the body's first byte.
    pub codec: VideoCodec,
    /// Width in pixels, copied from the reader's carry state.
    pub width: u16,
    /// Height in pixels, copied from the reader's carry state.
    pub height: u16,
    /// AVC packet type; `Some` exactly when the codec is AVC.
    pub packet_type: Option<AvcPacketType>,
}

/// A decoded audio tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    /// Shared tag fields.
    pub core: FrameCore,
    /// Codec nibble of the body's first byte.
    pub codec: AudioCodec,
    /// Sampling rate in Hz, 0 for a zero-length body.
    pub rate: u32,
    /// Sample width.
    pub bit_size: AudioSize,
    /// Channel layout.
    pub channels: AudioChannels,
}

/// A script-data tag. The AMF0 body stays raw until asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaFrame {
    /// Shared tag fields.
    pub core: FrameCore,
}

impl MetaFrame {
    /// Decodes the body's `onMetaData` listing, preserving wire order.
    ///
    /// Other script events decode to an empty listing.
    pub fn metadata(&self) -> Result<Vec<(String, Amf0Value)>> {
        amf::metadata_pairs(&self.core.body)
    }
}

/// One decoded FLV tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Video tag.
    Video(VideoFrame),
    /// Audio tag.
    Audio(AudioFrame),
    /// Script-data tag.
    Meta(MetaFrame),
}

impl Frame {
    fn core(&self) -> &FrameCore {
        match self {
            Frame::Video(frame) => &frame.core,
            Frame::Audio(frame) => &frame.core,
            Frame::Meta(frame) => &frame.core,
        }
    }

    fn core_mut(&mut self) -> &mut FrameCore {
        match self {
            Frame::Video(frame) => &mut frame.core,
            Frame::Audio(frame) => &mut frame.core,
            Frame::Meta(frame) => &mut frame.core,
        }
    }

    /// The wire tag type this frame decodes from and encodes to.
    pub fn tag_type(&self) -> TagType {
        match self {
            Frame::Video(_) => TagType::Video,
            Frame::Audio(_) => TagType::Audio,
            Frame::Meta(_) => TagType::Meta,
        }
    }

    /// The raw tag body.
    pub fn body(&self) -> &Bytes {
        &self.core().body
    }

    /// Decode timestamp in milliseconds.
    pub fn dts(&self) -> u32 {
        self.core().dts
    }

    /// Rewrites the decode timestamp, for remuxing with shifted timelines.
    pub fn set_dts(&mut self, dts: u32) {
        self.core_mut().dts = dts;
    }

    /// Stream id from the tag header.
    pub fn stream_id(&self) -> u32 {
        self.core().stream_id
    }

    /// Coarse frame classification.
    pub fn flavor(&self) -> Flavor {
        self.core().flavor
    }

    /// Byte offset of the tag header in the source.
    pub fn position(&self) -> u64 {
        self.core().position
    }

    /// The prev-tag-size word that followed this tag.
    pub fn prev_tag_size(&self) -> u32 {
        self.core().prev_tag_size
    }

    /// True for seekable frames.
    pub fn is_keyframe(&self) -> bool {
        self.flavor() == Flavor::Key
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Video(frame) => frame.fmt(f),
            Frame::Audio(frame) => frame.fmt(f),
            Frame::Meta(frame) => frame.fmt(f),
        }
    }
}

impl fmt::Display for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.packet_type {
            Some(packet_type) => {
                write!(
                    f,
                    "{:10}\t{}\t{}\t{}\t{}\t{{{},{}x{},{} bytes}}",
                    self.core.stream_id,
                    self.core.dts,
                    self.core.position,
                    TagType::Video,
                    self.codec,
                    packet_type,
                    self.width,
                    self.height,
                    self.core.body.len()
                )?;
                if self.core.flavor == Flavor::Key {
                    f.write_str(" seekable")?;
                }
            }
            None => {
                write!(
                    f,
                    "{:10}\t{}\t{}\t{}\t{}\t{{{}x{},{} bytes}}",
                    self.core.stream_id,
                    self.core.dts,
                    self.core.position,
                    TagType::Video,
                    self.codec,
                    self.width,
                    self.height,
                    self.core.body.len()
                )?;
                if self.core.flavor == Flavor::Key {
                    f.write_str(" keyframe")?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for AudioFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:10}\t{}\t{}\t{}\t{}\t{{{},{},{}}}",
            self.core.stream_id,
            self.core.dts,
            self.core.position,
            TagType::Audio,
            self.codec,
            self.rate,
            self.bit_size,
            self.channels
        )
    }
}

impl fmt::Display for MetaFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listing: String = self
            .metadata()
            .unwrap_or_default()
            .iter()
            .map(|(key, value)| format!("{}={};", key, value))
            .collect();
        write!(
            f,
            "{:10}\t{}\t{}\t{}\t{}",
            self.core.stream_id, self.core.dts, self.core.position, TagType::Meta, listing
        )
    }
}
