use std::collections::VecDeque;
use std::io::SeekFrom;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use super::frame::Frame;
use super::tag::{decode_tag, RawTag, TagHeader};
use super::types::{
    AvcPacketType, Dimensions, FlvHeader, PREAMBLE_LENGTH, PREV_TAG_SIZE_LENGTH,
    TAG_HEADER_LENGTH,
};
use crate::av::{CodecData, CodecType, Packet};
use crate::error::{FlvError, Result};
use crate::format::Demuxer;

/// Byte count of the video-tag prefix in front of an AVC configuration
/// record, used when lifting extradata out of a sequence header.
const AVC_BODY_PREFIX: usize = 5;

/// How many leading tags [`FlvReader::streams`] inspects before giving up
/// on finding more stream kinds.
const PROBE_TAG_LIMIT: usize = 32;

/// The outcome of one recovering read: the frame found, if any, and how
/// many garbage bytes were stepped over to reach it.
#[derive(Debug)]
pub struct Recovery {
    /// The next decodable frame, or `None` at a clean end of stream.
    pub frame: Option<Frame>,
    /// Bytes skipped while resynchronizing before this frame.
    pub skipped: u64,
}

/// Sequential FLV demuxer over a seekable byte source.
///
/// Owns the stream's dimension carry state: the width/height reported on
/// every video frame is whatever the last dimension-bearing keyframe
/// established, so two readers over the same file never share state and a
/// frame's dimensions depend only on this reader's decode history.
pub struct FlvReader<R: AsyncRead + AsyncSeek + Unpin + Send> {
    reader: R,
    position: u64,
    source_len: Option<u64>,
    dimensions: Dimensions,
    probed: VecDeque<Frame>,
    extra_data: Option<Bytes>,
}

impl<R: AsyncRead + AsyncSeek + Unpin + Send> FlvReader<R> {
    /// Wraps a byte source positioned at the start of an FLV stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            position: 0,
            source_len: None,
            dimensions: Dimensions::default(),
            probed: VecDeque::new(),
            extra_data: None,
        }
    }

    /// Current byte offset in the source.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The carry state as of the last decoded frame.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Consumes the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads and validates the 13-byte stream preamble.
    ///
    /// Fails with [`FlvError::Format`] when the signature is not `FLV`;
    /// a short read here is [`FlvError::Truncated`].
    pub async fn read_header(&mut self) -> Result<FlvHeader> {
        let mut buf = [0u8; PREAMBLE_LENGTH];
        self.reader
            .read_exact(&mut buf)
            .await
            .map_err(|err| truncated("preamble", err))?;
        self.position += PREAMBLE_LENGTH as u64;
        FlvHeader::parse(&buf)
    }

    /// Reads the next tag and decodes it into a frame.
    ///
    /// A short read of the 11-byte tag header is a clean end of stream and
    /// yields `Ok(None)`; a short read of the body or the trailing size
    /// word is [`FlvError::Truncated`].
    pub async fn read_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(frame) = self.probed.pop_front() {
            return Ok(Some(frame));
        }
        self.read_frame_inner().await
    }

    async fn read_frame_inner(&mut self) -> Result<Option<Frame>> {
        let start = self.position;

        let mut header = [0u8; TAG_HEADER_LENGTH];
        let mut filled = 0;
        while filled < TAG_HEADER_LENGTH {
            let n = self.reader.read(&mut header[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled < TAG_HEADER_LENGTH {
            self.position += filled as u64;
            return Ok(None);
        }

        let parsed = TagHeader::parse(&header);
        let mut body = vec![0u8; parsed.body_len as usize];
        self.reader
            .read_exact(&mut body)
            .await
            .map_err(|err| truncated("tag body", err))?;

        let mut trailer = [0u8; PREV_TAG_SIZE_LENGTH];
        self.reader
            .read_exact(&mut trailer)
            .await
            .map_err(|err| truncated("prev tag size", err))?;

        self.position = start
            + (TAG_HEADER_LENGTH + parsed.body_len as usize + PREV_TAG_SIZE_LENGTH) as u64;

        let frame = decode_tag(
            RawTag {
                tag_type: parsed.tag_type,
                dts: parsed.dts,
                stream_id: parsed.stream_id,
                body: Bytes::from(body),
                prev_tag_size: u32::from_be_bytes(trailer),
                position: start,
            },
            &mut self.dimensions,
        )?;
        Ok(Some(frame))
    }

    /// Reads the next frame, resynchronizing through damaged stretches.
    ///
    /// When a tag fails to decode, or decodes with a body longer than
    /// `max_frame_size` (0 disables the bound), the cursor moves to the
    /// failed tag's offset plus one and the read is retried, byte by byte,
    /// until a frame decodes within bounds or the source runs out. The
    /// scan never moves past the source's total size, so it always
    /// terminates; exhaustion surfaces as
    /// [`FlvError::RecoveryExhausted`] carrying the skip count.
    pub async fn read_frame_with_recovery(&mut self, max_frame_size: u32) -> Result<Recovery> {
        if let Some(frame) = self.probed.pop_front() {
            return Ok(Recovery {
                frame: Some(frame),
                skipped: 0,
            });
        }

        let mut skipped = 0u64;
        loop {
            let start = self.position;
            match self.read_frame_inner().await {
                Ok(None) => {
                    if skipped == 0 {
                        return Ok(Recovery {
                            frame: None,
                            skipped,
                        });
                    }
                    return Err(FlvError::RecoveryExhausted { skipped });
                }
                Ok(Some(frame)) => {
                    let oversized =
                        max_frame_size != 0 && frame.body().len() > max_frame_size as usize;
                    if !oversized {
                        if skipped > 0 {
                            log::warn!(
                                "resynchronized at offset {} after skipping {} bytes",
                                frame.position(),
                                skipped
                            );
                        }
                        return Ok(Recovery {
                            frame: Some(frame),
                            skipped,
                        });
                    }
                    log::debug!(
                        "tag at offset {} declares {} byte body, over the {} bound",
                        start,
                        frame.body().len(),
                        max_frame_size
                    );
                }
                Err(err @ FlvError::Io(_)) => return Err(err),
                Err(err) => {
                    log::debug!("tag at offset {} failed to decode: {}", start, err);
                }
            }

            let len = self.source_len().await?;
            let resume = start + 1;
            if resume >= len {
                return Err(FlvError::RecoveryExhausted { skipped });
            }
            self.reader.seek(SeekFrom::Start(resume)).await?;
            self.position = resume;
            skipped += 1;
        }
    }

    async fn source_len(&mut self) -> Result<u64> {
        if let Some(len) = self.source_len {
            return Ok(len);
        }
        let current = self.reader.stream_position().await?;
        let len = self.reader.seek(SeekFrom::End(0)).await?;
        self.reader.seek(SeekFrom::Start(current)).await?;
        self.source_len = Some(len);
        Ok(len)
    }
}

fn truncated(what: &str, err: std::io::Error) -> FlvError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        FlvError::Truncated(format!("short read of {}", what))
    } else {
        FlvError::Io(err)
    }
}

/// Stream description reported by [`FlvReader::streams`].
#[derive(Debug, Clone)]
pub struct FlvCodecData {
    codec: CodecType,
    width: Option<u32>,
    height: Option<u32>,
    extra_data: Option<Bytes>,
}

impl CodecData for FlvCodecData {
    fn codec_type(&self) -> CodecType {
        self.codec
    }

    fn width(&self) -> Option<u32> {
        self.width
    }

    fn height(&self) -> Option<u32> {
        self.height
    }

    fn extra_data(&self) -> Option<&[u8]> {
        self.extra_data.as_deref()
    }
}

/// Stream index packets for video frames are tagged with.
pub const VIDEO_STREAM_INDEX: usize = 0;
/// Stream index packets for audio frames are tagged with.
pub const AUDIO_STREAM_INDEX: usize = 1;

fn frame_to_packet(frame: &Frame) -> Option<Packet> {
    let stream_index = match frame {
        Frame::Video(_) => VIDEO_STREAM_INDEX,
        Frame::Audio(_) => AUDIO_STREAM_INDEX,
        Frame::Meta(_) => return None,
    };
    Some(
        Packet::new(frame.body().clone())
            .with_stream_index(stream_index)
            .with_pts(frame.dts() as i64)
            .with_dts(frame.dts() as i64)
            .with_key_flag(frame.is_keyframe()),
    )
}

#[async_trait]
impl<R: AsyncRead + AsyncSeek + Unpin + Send> Demuxer for FlvReader<R> {
    /// Pops the next media packet, skipping script-data tags.
    async fn read_packet(&mut self) -> Result<Option<Packet>> {
        while let Some(frame) = self.read_frame().await? {
            if let Some(packet) = frame_to_packet(&frame) {
                return Ok(Some(packet));
            }
        }
        Ok(None)
    }

    /// Probes leading tags to discover which streams the file carries.
    ///
    /// Probed frames are buffered and replayed by later reads, so probing
    /// loses nothing. Video is reported with the dimensions known at probe
    /// time, plus the raw AVCDecoderConfigurationRecord as extradata when
    /// a sequence header was seen.
    async fn streams(&mut self) -> Result<Vec<Box<dyn CodecData>>> {
        let mut video: Option<CodecType> = None;
        let mut audio: Option<CodecType> = None;

        while self.probed.len() < PROBE_TAG_LIMIT && (video.is_none() || audio.is_none()) {
            let frame = match self.read_frame_inner().await? {
                Some(frame) => frame,
                None => break,
            };
            match &frame {
                Frame::Video(f) => {
                    if video.is_none() {
                        video = Some(f.codec.codec_type());
                    }
                    if self.extra_data.is_none()
                        && f.packet_type == Some(AvcPacketType::SequenceHeader)
                        && f.core.body.len() > AVC_BODY_PREFIX
                    {
                        self.extra_data = Some(f.core.body.slice(AVC_BODY_PREFIX..));
                    }
                }
                Frame::Audio(f) => {
                    if audio.is_none() {
                        audio = Some(f.codec.codec_type());
                    }
                }
                Frame::Meta(_) => {}
            }
            self.probed.push_back(frame);
        }

        let mut streams: Vec<Box<dyn CodecData>> = Vec::new();
        if let Some(codec) = video {
            let dims = self.dimensions;
            streams.push(Box::new(FlvCodecData {
                codec,
                width: (dims.width > 0).then_some(dims.width as u32),
                height: (dims.height > 0).then_some(dims.height as u32),
                extra_data: self.extra_data.clone(),
            }));
        }
        if let Some(codec) = audio {
            streams.push(Box::new(FlvCodecData {
                codec,
                width: None,
                height: None,
                extra_data: None,
            }));
        }
        Ok(streams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::flv::types::TagType;
    use std::io::Cursor;

    fn tag(tag_type: u8, dts: u32, body: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(tag_type);
        buf.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        buf.extend_from_slice(&(dts & 0x00FF_FFFF).to_be_bytes()[1..]);
        buf.push((dts >> 24) as u8);
        buf.extend_from_slice(&[0, 0, 0]);
        buf.extend_from_slice(body);
        buf.extend_from_slice(&(11 + body.len() as u32).to_be_bytes());
        buf
    }

    fn stream_with(tags: &[Vec<u8>]) -> Vec<u8> {
        let mut data = FlvHeader::new(true, true).body.to_vec();
        for t in tags {
            data.extend_from_slice(t);
        }
        data
    }

    #[tokio::test]
    async fn test_read_header_and_frames() {
        let data = stream_with(&[
            tag(9, 0, &[0x14, 0x80, 0, 0, 0, 23, 40]),
            tag(8, 23, &[0xAF, 0x01, 0x21]),
        ]);
        let mut reader = FlvReader::new(Cursor::new(data));

        let header = reader.read_header().await.unwrap();
        assert!(header.has_video());

        let first = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(first.tag_type(), TagType::Video);
        assert_eq!(first.position(), PREAMBLE_LENGTH as u64);
        assert_eq!(
            reader.dimensions(),
            Dimensions {
                width: 640,
                height: 360
            }
        );

        let second = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(second.tag_type(), TagType::Audio);
        assert_eq!(second.dts(), 23);

        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bad_signature() {
        let mut data = stream_with(&[]);
        data[0] = b'X';
        let mut reader = FlvReader::new(Cursor::new(data));
        assert!(matches!(
            reader.read_header().await,
            Err(FlvError::Format(_))
        ));
    }

    #[tokio::test]
    async fn test_short_tag_header_is_eof() {
        let mut data = stream_with(&[]);
        data.extend_from_slice(&[9, 0, 0]); // 3 of 11 header bytes
        let mut reader = FlvReader::new(Cursor::new(data));
        reader.read_header().await.unwrap();
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_short_body_is_truncated() {
        let mut data = stream_with(&[]);
        let mut cut = tag(9, 0, &[0x24, 0x00, 0x10, 0x20]);
        cut.truncate(11 + 2); // drop half the body and the trailer
        data.extend_from_slice(&cut);
        let mut reader = FlvReader::new(Cursor::new(data));
        reader.read_header().await.unwrap();
        assert!(matches!(
            reader.read_frame().await,
            Err(FlvError::Truncated(_))
        ));
    }

    #[tokio::test]
    async fn test_recovery_skips_garbage() {
        let good = tag(8, 10, &[0x2F, 0x01]);
        let mut data = stream_with(&[tag(8, 0, &[0x2F, 0x00])]);
        data.extend_from_slice(&[0xAA; 17]); // no valid tag type byte
        data.extend_from_slice(&good);

        let mut reader = FlvReader::new(Cursor::new(data));
        reader.read_header().await.unwrap();

        let first = reader.read_frame_with_recovery(0).await.unwrap();
        assert_eq!(first.skipped, 0);
        assert_eq!(first.frame.unwrap().dts(), 0);

        let second = reader.read_frame_with_recovery(0).await.unwrap();
        assert_eq!(second.skipped, 17);
        assert_eq!(second.frame.unwrap().dts(), 10);

        let end = reader.read_frame_with_recovery(0).await.unwrap();
        assert!(end.frame.is_none());
        assert_eq!(end.skipped, 0);
    }

    #[tokio::test]
    async fn test_recovery_exhausts_on_trailing_garbage() {
        let mut data = stream_with(&[tag(8, 0, &[0x2F, 0x00])]);
        data.extend_from_slice(&[0xAA; 17]);

        let mut reader = FlvReader::new(Cursor::new(data));
        reader.read_header().await.unwrap();
        reader.read_frame_with_recovery(0).await.unwrap();

        match reader.read_frame_with_recovery(0).await {
            Err(FlvError::RecoveryExhausted { skipped }) => {
                assert!(skipped > 0 && skipped <= 17)
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recovery_rejects_oversized_body() {
        let big = tag(8, 0, &[0x2Fu8; 64]);
        let small = tag(8, 5, &[0x2F, 0x01]);
        let mut data = stream_with(&[]);
        data.extend_from_slice(&big);
        data.extend_from_slice(&small);

        let mut reader = FlvReader::new(Cursor::new(data));
        reader.read_header().await.unwrap();

        // the 64-byte body is over the bound, so the scan walks to `small`
        let result = reader.read_frame_with_recovery(16).await.unwrap();
        let frame = result.frame.unwrap();
        assert_eq!(frame.dts(), 5);
        assert_eq!(result.skipped, big.len() as u64);
    }

    #[tokio::test]
    async fn test_streams_probe_and_replay() {
        let data = stream_with(&[
            tag(9, 0, &[0x14, 0x80, 0, 0, 0, 23, 40]),
            tag(8, 23, &[0xAF, 0x01, 0x21]),
            tag(9, 40, &[0x24, 0x00]),
        ]);
        let mut reader = FlvReader::new(Cursor::new(data));
        reader.read_header().await.unwrap();

        let streams = reader.streams().await.unwrap();
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].codec_type(), CodecType::Vp6);
        assert_eq!(streams[0].width(), Some(640));
        assert_eq!(streams[1].codec_type(), CodecType::Aac);

        // probed frames replay in order through the packet interface
        let first = reader.read_packet().await.unwrap().unwrap();
        assert_eq!(first.stream_index, VIDEO_STREAM_INDEX);
        assert!(first.is_key);
        let second = reader.read_packet().await.unwrap().unwrap();
        assert_eq!(second.stream_index, AUDIO_STREAM_INDEX);
        assert_eq!(second.pts, Some(23));
        let third = reader.read_packet().await.unwrap().unwrap();
        assert_eq!(third.stream_index, VIDEO_STREAM_INDEX);
        assert!(!third.is_key);
        assert!(reader.read_packet().await.unwrap().is_none());
    }
}
