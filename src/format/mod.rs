//! Container format implementations and the traits they share.

use crate::av::{CodecData, Packet};
use crate::Result;

pub mod flv;

/// Common trait for format demuxers.
#[async_trait::async_trait]
pub trait Demuxer: Send {
    /// Reads the next media packet, or `None` at end of stream.
    async fn read_packet(&mut self) -> Result<Option<Packet>>;

    /// Describes the streams the container carries.
    async fn streams(&mut self) -> Result<Vec<Box<dyn CodecData>>>;
}

/// Common trait for format muxers.
#[async_trait::async_trait]
pub trait Muxer: Send {
    /// Writes container header information.
    async fn write_header(&mut self, streams: &[Box<dyn CodecData>]) -> Result<()>;

    /// Writes one packet to the container.
    async fn write_packet(&mut self, packet: &Packet) -> Result<()>;

    /// Writes container trailer information.
    async fn write_trailer(&mut self) -> Result<()>;

    /// Flushes any buffered output.
    async fn flush(&mut self) -> Result<()>;
}

pub use self::flv::{FlvReader, FlvWriter};
