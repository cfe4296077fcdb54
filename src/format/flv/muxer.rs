use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use super::frame::Frame;
use super::tag::{decode_tag, encode_frame, RawTag};
use super::types::{Dimensions, FlvHeader, TagType};
use crate::av::{CodecData, Packet};
use crate::error::{FlvError, Result};
use crate::format::flv::demuxer::{AUDIO_STREAM_INDEX, VIDEO_STREAM_INDEX};
use crate::format::Muxer;

/// Sequential FLV muxer over a byte sink.
///
/// Tags land in the output in call order, each with its prev-tag-size word
/// recomputed from the frame being written, so the output chain is
/// consistent regardless of what the frames' sources looked like.
pub struct FlvWriter<W: AsyncWrite + Unpin + Send> {
    writer: BufWriter<W>,
    position: u64,
}

impl<W: AsyncWrite + Unpin + Send> FlvWriter<W> {
    /// Wraps a byte sink.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            position: 0,
        }
    }

    /// Bytes handed to the sink so far, buffered or not.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Writes a stream preamble verbatim.
    pub async fn write_header(&mut self, header: &FlvHeader) -> Result<()> {
        self.writer.write_all(&header.body).await?;
        self.position += header.body.len() as u64;
        Ok(())
    }

    /// Encodes one frame and appends it to the sink.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let encoded = encode_frame(frame)?;
        self.writer.write_all(&encoded).await?;
        self.position += encoded.len() as u64;
        Ok(())
    }

    /// Flushes buffered bytes through to the sink.
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Flushes buffered bytes and consumes the writer, returning the sink.
    pub async fn into_inner(mut self) -> Result<W> {
        self.writer.flush().await?;
        Ok(self.writer.into_inner())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Muxer for FlvWriter<W> {
    /// Writes a canonical preamble advertising the given streams.
    async fn write_header(&mut self, streams: &[Box<dyn CodecData>]) -> Result<()> {
        let has_video = streams.iter().any(|s| s.codec_type().is_video());
        let has_audio = streams.iter().any(|s| s.codec_type().is_audio());
        FlvWriter::write_header(self, &FlvHeader::new(has_video, has_audio)).await
    }

    /// Wraps a packet's bytes in a tag chosen by stream index: video for
    /// stream 0, audio for stream 1.
    async fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        let tag_type = match packet.stream_index {
            VIDEO_STREAM_INDEX => TagType::Video,
            AUDIO_STREAM_INDEX => TagType::Audio,
            other => {
                return Err(FlvError::InvalidData(format!(
                    "no flv tag for stream index {}",
                    other
                )))
            }
        };

        // Classify the body the same way a reader would; the throwaway
        // carry state never leaves this call.
        let mut scratch = Dimensions::default();
        let frame = decode_tag(
            RawTag {
                tag_type: tag_type as u8,
                dts: packet.dts.or(packet.pts).unwrap_or(0) as u32,
                stream_id: 0,
                body: packet.data.clone(),
                prev_tag_size: 0,
                position: self.position,
            },
            &mut scratch,
        )?;
        self.write_frame(&frame).await
    }

    async fn write_trailer(&mut self) -> Result<()> {
        FlvWriter::flush(self).await
    }

    async fn flush(&mut self) -> Result<()> {
        FlvWriter::flush(self).await
    }
}
