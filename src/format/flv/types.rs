use bytes::Bytes;
use std::fmt;

use crate::av::CodecType;
use crate::error::{FlvError, Result};

/// The three magic bytes opening every FLV stream.
pub const SIGNATURE: [u8; 3] = *b"FLV";

/// Length of the fixed file header (signature through data offset).
pub const HEADER_LENGTH: usize = 9;

/// Length of one tag header on the wire.
pub const TAG_HEADER_LENGTH: usize = 11;

/// Length of the prev-tag-size trailer following every tag body.
pub const PREV_TAG_SIZE_LENGTH: usize = 4;

/// Length of the full preamble: file header plus the always-zero first
/// prev-tag-size word.
pub const PREAMBLE_LENGTH: usize = HEADER_LENGTH + PREV_TAG_SIZE_LENGTH;

/// Largest tag body the 24-bit length field can carry.
pub const MAX_TAG_BODY_LENGTH: usize = 0xFF_FFFF;

const FLAG_VIDEO: u8 = 0x01;
const FLAG_AUDIO: u8 = 0x04;

/// Tag type byte of an FLV tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TagType {
    /// Audio payload.
    Audio = 8,
    /// Video payload.
    Video = 9,
    /// Script data (AMF0 metadata).
    Meta = 18,
}

impl TagType {
    /// Maps a wire byte to a tag type, or `None` for anything unknown.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            8 => Some(TagType::Audio),
            9 => Some(TagType::Video),
            18 => Some(TagType::Meta),
            _ => None,
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagType::Audio => "audio",
            TagType::Video => "video",
            TagType::Meta => "meta",
        };
        f.write_str(name)
    }
}

/// Video codec nibble of a video tag body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VideoCodec {
    /// JPEG stills.
    Jpeg = 1,
    /// Sorenson H.263.
    SorensonH263 = 2,
    /// Screen video.
    ScreenVideo = 3,
    /// On2 VP6.
    Vp6 = 4,
    /// On2 VP6 with alpha channel.
    Vp6Alpha = 5,
    /// Screen video version 2.
    ScreenVideo2 = 6,
    /// H.264 / AVC.
    Avc = 7,
    /// Anything outside the table, and the zero-length-body case.
    Undefined = 0,
}

impl From<u8> for VideoCodec {
    fn from(value: u8) -> Self {
        match value {
            1 => VideoCodec::Jpeg,
            2 => VideoCodec::SorensonH263,
            3 => VideoCodec::ScreenVideo,
            4 => VideoCodec::Vp6,
            5 => VideoCodec::Vp6Alpha,
            6 => VideoCodec::ScreenVideo2,
            7 => VideoCodec::Avc,
            _ => VideoCodec::Undefined,
        }
    }
}

impl VideoCodec {
    /// Human-readable codec name.
    pub fn name(&self) -> &'static str {
        match self {
            VideoCodec::Jpeg => "JPEG",
            VideoCodec::SorensonH263 => "Sorenson H.263",
            VideoCodec::ScreenVideo => "screen video",
            VideoCodec::Vp6 => "On2 VP6",
            VideoCodec::Vp6Alpha => "On2 VP6 alpha",
            VideoCodec::ScreenVideo2 => "screen video 2",
            VideoCodec::Avc => "AVC",
            VideoCodec::Undefined => "undefined",
        }
    }

    /// The container-agnostic codec identity.
    pub fn codec_type(&self) -> CodecType {
        match self {
            VideoCodec::Jpeg => CodecType::Jpeg,
            VideoCodec::SorensonH263 => CodecType::SorensonH263,
            VideoCodec::ScreenVideo => CodecType::ScreenVideo,
            VideoCodec::Vp6 => CodecType::Vp6,
            VideoCodec::Vp6Alpha => CodecType::Vp6Alpha,
            VideoCodec::ScreenVideo2 => CodecType::ScreenVideo2,
            VideoCodec::Avc => CodecType::H264,
            VideoCodec::Undefined => CodecType::Unknown,
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Frame type nibble of a video tag body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VideoFrameType {
    /// Seekable frame.
    Key = 1,
    /// Non-seekable inter frame.
    Inter = 2,
    /// Disposable inter frame (H.263 only).
    DisposableInter = 3,
    /// Generated keyframe, server use.
    Generated = 4,
    /// Video info / command frame.
    Command = 5,
    /// Anything outside the table.
    Undefined = 0,
}

impl From<u8> for VideoFrameType {
    fn from(value: u8) -> Self {
        match value {
            1 => VideoFrameType::Key,
            2 => VideoFrameType::Inter,
            3 => VideoFrameType::DisposableInter,
            4 => VideoFrameType::Generated,
            5 => VideoFrameType::Command,
            _ => VideoFrameType::Undefined,
        }
    }
}

/// AVC packet type byte, second byte of an AVC video tag body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AvcPacketType {
    /// AVCDecoderConfigurationRecord follows.
    SequenceHeader = 0,
    /// One or more NALUs follow.
    Nalu = 1,
    /// End-of-sequence marker, empty payload.
    SequenceEnd = 2,
    /// Anything outside the table, or a body too short to carry the byte.
    Undefined = 0xFF,
}

impl From<u8> for AvcPacketType {
    fn from(value: u8) -> Self {
        match value {
            0 => AvcPacketType::SequenceHeader,
            1 => AvcPacketType::Nalu,
            2 => AvcPacketType::SequenceEnd,
            _ => AvcPacketType::Undefined,
        }
    }
}

impl fmt::Display for AvcPacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AvcPacketType::SequenceHeader => "sequence header",
            AvcPacketType::Nalu => "NALU",
            AvcPacketType::SequenceEnd => "sequence end",
            AvcPacketType::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

/// Audio codec nibble (SoundFormat) of an audio tag body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AudioCodec {
    /// Linear PCM, platform endian.
    Pcm = 0,
    /// ADPCM.
    Adpcm = 1,
    /// MP3.
    Mp3 = 2,
    /// Linear PCM, little endian.
    PcmLe = 3,
    /// Nellymoser at 16 kHz, mono.
    Nellymoser16Mono = 4,
    /// Nellymoser at 8 kHz, mono.
    Nellymoser8Mono = 5,
    /// Nellymoser.
    Nellymoser = 6,
    /// G.711 A-law.
    G711Alaw = 7,
    /// G.711 mu-law.
    G711Mulaw = 8,
    /// Reserved by the FLV spec.
    Reserved = 9,
    /// AAC.
    Aac = 10,
    /// Speex.
    Speex = 11,
    /// MP3 at 8 kHz.
    Mp38k = 14,
    /// Device-specific sound.
    DeviceSpecific = 15,
    /// Anything outside the table, and the zero-length-body case.
    Undefined = 0xFF,
}

impl From<u8> for AudioCodec {
    fn from(value: u8) -> Self {
        match value {
            0 => AudioCodec::Pcm,
            1 => AudioCodec::Adpcm,
            2 => AudioCodec::Mp3,
            3 => AudioCodec::PcmLe,
            4 => AudioCodec::Nellymoser16Mono,
            5 => AudioCodec::Nellymoser8Mono,
            6 => AudioCodec::Nellymoser,
            7 => AudioCodec::G711Alaw,
            8 => AudioCodec::G711Mulaw,
            9 => AudioCodec::Reserved,
            10 => AudioCodec::Aac,
            11 => AudioCodec::Speex,
            14 => AudioCodec::Mp38k,
            15 => AudioCodec::DeviceSpecific,
            _ => AudioCodec::Undefined,
        }
    }
}

impl AudioCodec {
    /// Human-readable codec name.
    pub fn name(&self) -> &'static str {
        match self {
            AudioCodec::Pcm => "PCM",
            AudioCodec::Adpcm => "ADPCM",
            AudioCodec::Mp3 => "MP3",
            AudioCodec::PcmLe => "PCM LE",
            AudioCodec::Nellymoser16Mono => "Nellymoser 16kHz mono",
            AudioCodec::Nellymoser8Mono => "Nellymoser 8kHz mono",
            AudioCodec::Nellymoser => "Nellymoser",
            AudioCodec::G711Alaw => "G.711 A-law",
            AudioCodec::G711Mulaw => "G.711 mu-law",
            AudioCodec::Reserved => "reserved",
            AudioCodec::Aac => "AAC",
            AudioCodec::Speex => "Speex",
            AudioCodec::Mp38k => "MP3 8kHz",
            AudioCodec::DeviceSpecific => "device specific",
            AudioCodec::Undefined => "undefined",
        }
    }

    /// The container-agnostic codec identity.
    pub fn codec_type(&self) -> CodecType {
        match self {
            AudioCodec::Pcm | AudioCodec::PcmLe => CodecType::Pcm,
            AudioCodec::Adpcm => CodecType::Adpcm,
            AudioCodec::Mp3 | AudioCodec::Mp38k => CodecType::Mp3,
            AudioCodec::Nellymoser16Mono | AudioCodec::Nellymoser8Mono | AudioCodec::Nellymoser => {
                CodecType::Nellymoser
            }
            AudioCodec::G711Alaw => CodecType::G711Alaw,
            AudioCodec::G711Mulaw => CodecType::G711Mulaw,
            AudioCodec::Aac => CodecType::Aac,
            AudioCodec::Speex => CodecType::Speex,
            AudioCodec::Reserved | AudioCodec::DeviceSpecific | AudioCodec::Undefined => {
                CodecType::Unknown
            }
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Audio sampling-rate code, bits 2-3 of the audio tag's first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AudioRate {
    /// 5.5 kHz.
    Hz5500 = 0,
    /// 11 kHz.
    Hz11000 = 1,
    /// 22 kHz.
    Hz22000 = 2,
    /// 44 kHz.
    Hz44000 = 3,
    /// No rate known (zero-length body).
    Undefined = 0xFF,
}

impl From<u8> for AudioRate {
    fn from(value: u8) -> Self {
        match value {
            0 => AudioRate::Hz5500,
            1 => AudioRate::Hz11000,
            2 => AudioRate::Hz22000,
            3 => AudioRate::Hz44000,
            _ => AudioRate::Undefined,
        }
    }
}

impl AudioRate {
    /// The rate in Hz. The table uses the round numbers 5500/11000/22000/
    /// 44000 rather than the 11025-family values; FLV rate codes are too
    /// coarse to distinguish the two anyway.
    pub fn hz(&self) -> u32 {
        match self {
            AudioRate::Hz5500 => 5500,
            AudioRate::Hz11000 => 11000,
            AudioRate::Hz22000 => 22000,
            AudioRate::Hz44000 => 44000,
            AudioRate::Undefined => 0,
        }
    }
}

/// Audio sample width, bit 1 of the audio tag's first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AudioSize {
    /// 8-bit samples.
    Bits8 = 0,
    /// 16-bit samples.
    Bits16 = 1,
    /// No width known (zero-length body).
    Undefined = 0xFF,
}

impl From<u8> for AudioSize {
    fn from(value: u8) -> Self {
        match value {
            0 => AudioSize::Bits8,
            1 => AudioSize::Bits16,
            _ => AudioSize::Undefined,
        }
    }
}

impl fmt::Display for AudioSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AudioSize::Bits8 => "8-bit",
            AudioSize::Bits16 => "16-bit",
            AudioSize::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

/// Channel layout, bit 0 of the audio tag's first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AudioChannels {
    /// One channel.
    Mono = 0,
    /// Two channels.
    Stereo = 1,
    /// No layout known (zero-length body).
    Undefined = 0xFF,
}

impl From<u8> for AudioChannels {
    fn from(value: u8) -> Self {
        match value {
            0 => AudioChannels::Mono,
            1 => AudioChannels::Stereo,
            _ => AudioChannels::Undefined,
        }
    }
}

impl fmt::Display for AudioChannels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AudioChannels::Mono => "mono",
            AudioChannels::Stereo => "stereo",
            AudioChannels::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

/// Coarse frame classification used for seeking decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Script data tag.
    Metadata,
    /// Non-seekable frame; every audio frame lands here.
    Inter,
    /// Seekable frame.
    Key,
    /// Zero-length video body, nothing to classify.
    Undefined,
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flavor::Metadata => "metadata",
            Flavor::Inter => "frame",
            Flavor::Key => "keyframe",
            Flavor::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

/// Last seen video dimensions, carried across tags by a reader.
///
/// Only dimension-bearing keyframes (VP6 keyframes, AVC sequence headers
/// with a parsable SPS) update this; every other video frame copies it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimensions {
    /// Last seen width in pixels, 0 before any keyframe.
    pub width: u16,
    /// Last seen height in pixels, 0 before any keyframe.
    pub height: u16,
}

/// The 13-byte stream preamble: file header plus the zero first
/// prev-tag-size word.
///
/// The raw bytes are preserved verbatim so a writer can re-emit exactly
/// what was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlvHeader {
    /// Version and flags bytes packed big-endian, the historical two-byte
    /// reading of the header's bytes 3 and 4.
    pub version: u16,
    /// The full preamble as read from (or destined for) the wire.
    pub body: Bytes,
}

impl FlvHeader {
    /// Parses and validates a preamble.
    pub fn parse(buf: &[u8; PREAMBLE_LENGTH]) -> Result<Self> {
        if buf[..3] != SIGNATURE {
            return Err(FlvError::Format(format!(
                "bad signature {:02x}{:02x}{:02x}",
                buf[0], buf[1], buf[2]
            )));
        }
        Ok(FlvHeader {
            version: u16::from_be_bytes([buf[3], buf[4]]),
            body: Bytes::copy_from_slice(buf),
        })
    }

    /// Builds a canonical version-1 preamble advertising the given stream
    /// kinds.
    pub fn new(has_video: bool, has_audio: bool) -> Self {
        let mut flags = 0;
        if has_video {
            flags |= FLAG_VIDEO;
        }
        if has_audio {
            flags |= FLAG_AUDIO;
        }
        let mut body = Vec::with_capacity(PREAMBLE_LENGTH);
        body.extend_from_slice(&SIGNATURE);
        body.push(1);
        body.push(flags);
        body.extend_from_slice(&(HEADER_LENGTH as u32).to_be_bytes());
        body.extend_from_slice(&0u32.to_be_bytes());
        FlvHeader {
            version: u16::from_be_bytes([1, flags]),
            body: Bytes::from(body),
        }
    }

    /// Whether the header advertises an audio stream.
    pub fn has_audio(&self) -> bool {
        self.body[4] & FLAG_AUDIO != 0
    }

    /// Whether the header advertises a video stream.
    pub fn has_video(&self) -> bool {
        self.body[4] & FLAG_VIDEO != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tag_type_mapping() {
        assert_eq!(TagType::from_u8(8), Some(TagType::Audio));
        assert_eq!(TagType::from_u8(9), Some(TagType::Video));
        assert_eq!(TagType::from_u8(18), Some(TagType::Meta));
        assert_eq!(TagType::from_u8(0), None);
        assert_eq!(TagType::from_u8(10), None);
        assert_eq!(TagType::Meta as u8, 18);
    }

    #[test]
    fn test_video_codec_mapping() {
        assert_eq!(VideoCodec::from(4), VideoCodec::Vp6);
        assert_eq!(VideoCodec::from(7), VideoCodec::Avc);
        assert_eq!(VideoCodec::from(12), VideoCodec::Undefined);
        assert_eq!(VideoCodec::Avc.codec_type(), crate::av::CodecType::H264);
        assert!(VideoCodec::Vp6.codec_type().is_video());
    }

    #[test]
    fn test_audio_rate_table() {
        assert_eq!(AudioRate::from(0).hz(), 5500);
        assert_eq!(AudioRate::from(1).hz(), 11000);
        assert_eq!(AudioRate::from(2).hz(), 22000);
        assert_eq!(AudioRate::from(3).hz(), 44000);
    }

    #[test]
    fn test_header_parse_and_flags() {
        let buf = [
            b'F', b'L', b'V', 0x01, 0x05, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x00,
        ];
        let header = FlvHeader::parse(&buf).unwrap();
        assert_eq!(header.version, 0x0105);
        assert!(header.has_video());
        assert!(header.has_audio());
        assert_eq!(header.body.as_ref(), &buf[..]);
    }

    #[test]
    fn test_header_rejects_bad_signature() {
        let buf = [
            b'F', b'L', b'X', 0x01, 0x05, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x00,
        ];
        assert!(matches!(FlvHeader::parse(&buf), Err(FlvError::Format(_))));
    }

    #[test]
    fn test_header_new() {
        let header = FlvHeader::new(true, false);
        assert_eq!(header.body.len(), PREAMBLE_LENGTH);
        assert!(header.has_video());
        assert!(!header.has_audio());
        assert_eq!(&header.body[..3], b"FLV");
        assert_eq!(header.body[8], 9);

        let reparsed = FlvHeader::parse(header.body.as_ref().try_into().unwrap()).unwrap();
        assert_eq!(reparsed, header);
    }
}
