use bytes::{BufMut, Bytes, BytesMut};

use super::frame::{AudioFrame, Frame, FrameCore, MetaFrame, VideoFrame};
use super::types::{
    AudioChannels, AudioCodec, AudioRate, AudioSize, AvcPacketType, Dimensions, Flavor, TagType,
    VideoCodec, VideoFrameType, MAX_TAG_BODY_LENGTH, PREV_TAG_SIZE_LENGTH, TAG_HEADER_LENGTH,
};
use crate::codec::h264::AvcDecoderConfigRecord;
use crate::codec::vp6;
use crate::error::{FlvError, Result};

/// Byte count of the video-tag prefix in front of an AVC configuration
/// record: frame/codec byte, packet type byte, 3-byte composition time.
const AVC_BODY_PREFIX: usize = 5;

/// The fixed fields of an 11-byte tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    /// Raw tag type byte, not yet validated.
    pub tag_type: u8,
    /// Declared body length.
    pub body_len: u32,
    /// Composed 32-bit decode timestamp (extension byte folded in).
    pub dts: u32,
    /// Stream id, zero in well-formed files.
    pub stream_id: u32,
}

impl TagHeader {
    /// Splits a wire header into its fields. Never fails; the tag type is
    /// validated later, during dispatch.
    pub fn parse(buf: &[u8; TAG_HEADER_LENGTH]) -> Self {
        let body_len = u32::from_be_bytes([0, buf[1], buf[2], buf[3]]);
        let timestamp = u32::from_be_bytes([0, buf[4], buf[5], buf[6]]);
        let extension = buf[7] as u32;
        let stream_id = u32::from_be_bytes([0, buf[8], buf[9], buf[10]]);
        TagHeader {
            tag_type: buf[0],
            body_len,
            dts: (extension << 24) | timestamp,
            stream_id,
        }
    }
}

/// One tag as pulled off the wire, before codec-level interpretation.
#[derive(Debug, Clone)]
pub struct RawTag {
    /// Raw tag type byte.
    pub tag_type: u8,
    /// Composed decode timestamp.
    pub dts: u32,
    /// Stream id.
    pub stream_id: u32,
    /// The tag body.
    pub body: Bytes,
    /// The trailing prev-tag-size word as read from the source.
    pub prev_tag_size: u32,
    /// Byte offset of the tag header in the source.
    pub position: u64,
}

/// Interprets one raw tag as a typed frame.
///
/// `dimensions` is the calling reader's carry state: VP6 keyframes and AVC
/// sequence headers with a parsable SPS update it; every decoded video
/// frame copies it. Bitstream damage inside a codec payload is logged and
/// leaves the carry state alone; only an unknown tag type fails the tag.
pub fn decode_tag(raw: RawTag, dimensions: &mut Dimensions) -> Result<Frame> {
    let RawTag {
        tag_type,
        dts,
        stream_id,
        body,
        prev_tag_size,
        position,
    } = raw;
    let tag_type = TagType::from_u8(tag_type).ok_or(FlvError::UnknownTagType(tag_type))?;

    let core = |flavor: Flavor, body: Bytes| FrameCore {
        stream_id,
        dts,
        flavor,
        position,
        body,
        prev_tag_size,
    };

    match tag_type {
        TagType::Meta => Ok(Frame::Meta(MetaFrame {
            core: core(Flavor::Metadata, body),
        })),
        TagType::Video => {
            let (flavor, codec, packet_type) = if body.is_empty() {
                (Flavor::Undefined, VideoCodec::Undefined, None)
            } else {
                let frame_type = VideoFrameType::from(body[0] >> 4);
                let flavor = if frame_type == VideoFrameType::Key {
                    Flavor::Key
                } else {
                    Flavor::Inter
                };
                let codec = VideoCodec::from(body[0] & 0x0F);

                match codec {
                    VideoCodec::Vp6 | VideoCodec::Vp6Alpha if flavor == Flavor::Key => {
                        match vp6::keyframe_dimensions(&body) {
                            Ok((width, height)) => *dimensions = Dimensions { width, height },
                            Err(err) => log::debug!(
                                "vp6 keyframe at offset {} kept prior dimensions: {}",
                                position,
                                err
                            ),
                        }
                    }
                    VideoCodec::Avc
                        if body.len() > AVC_BODY_PREFIX
                            && body[1] == AvcPacketType::SequenceHeader as u8 =>
                    {
                        match AvcDecoderConfigRecord::parse(&body[AVC_BODY_PREFIX..])
                            .and_then(|record| record.dimensions())
                        {
                            Ok((width, height)) => *dimensions = Dimensions { width, height },
                            Err(err) => log::debug!(
                                "avc sequence header at offset {} kept prior dimensions: {}",
                                position,
                                err
                            ),
                        }
                    }
                    _ => {}
                }

                let packet_type = if codec == VideoCodec::Avc {
                    let byte = body.get(1).copied();
                    Some(byte.map(AvcPacketType::from).unwrap_or(AvcPacketType::Undefined))
                } else {
                    None
                };
                (flavor, codec, packet_type)
            };

            Ok(Frame::Video(VideoFrame {
                core: core(flavor, body),
                codec,
                width: dimensions.width,
                height: dimensions.height,
                packet_type,
            }))
        }
        TagType::Audio => {
            let (codec, rate, bit_size, channels) = if body.is_empty() {
                (
                    AudioCodec::Undefined,
                    0,
                    AudioSize::Undefined,
                    AudioChannels::Undefined,
                )
            } else {
                let byte = body[0];
                (
                    AudioCodec::from(byte >> 4),
                    AudioRate::from((byte >> 2) & 0x03).hz(),
                    AudioSize::from((byte >> 1) & 0x01),
                    AudioChannels::from(byte & 0x01),
                )
            };

            Ok(Frame::Audio(AudioFrame {
                core: core(Flavor::Inter, body),
                codec,
                rate,
                bit_size,
                channels,
            }))
        }
    }
}

/// Serializes a frame as one complete tag: 11-byte header, body verbatim,
/// then a recomputed prev-tag-size word.
///
/// The trailing size is always `11 + body length` of this frame, never the
/// value read from the frame's source, so written streams are internally
/// consistent even when the source was not. Fails only when the body
/// cannot fit the 24-bit length field.
pub fn encode_frame(frame: &Frame) -> Result<Bytes> {
    let body = frame.body();
    if body.len() > MAX_TAG_BODY_LENGTH {
        return Err(FlvError::InvalidData(format!(
            "tag body of {} bytes exceeds the 24-bit length field",
            body.len()
        )));
    }

    let body_len = body.len() as u32;
    let dts = frame.dts();
    let mut buf = BytesMut::with_capacity(TAG_HEADER_LENGTH + body.len() + PREV_TAG_SIZE_LENGTH);
    buf.put_u8(frame.tag_type() as u8);
    buf.put_uint(body_len as u64, 3);
    buf.put_uint((dts & 0x00FF_FFFF) as u64, 3);
    buf.put_u8((dts >> 24) as u8);
    buf.put_uint((frame.stream_id() & 0x00FF_FFFF) as u64, 3);
    buf.extend_from_slice(body);
    buf.put_u32(TAG_HEADER_LENGTH as u32 + body_len);
    Ok(buf.freeze())
}
