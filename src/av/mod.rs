//! Container-agnostic stream descriptions and packets.

/// Identifies the codec carried by an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecType {
    /// H.264 / AVC video.
    H264,
    /// On2 VP6 video.
    Vp6,
    /// On2 VP6 video with an alpha channel.
    Vp6Alpha,
    /// Sorenson H.263 video.
    SorensonH263,
    /// Screen video.
    ScreenVideo,
    /// Screen video version 2.
    ScreenVideo2,
    /// JPEG video.
    Jpeg,
    /// AAC audio.
    Aac,
    /// MP3 audio.
    Mp3,
    /// Linear PCM audio.
    Pcm,
    /// ADPCM audio.
    Adpcm,
    /// Nellymoser audio, any sample rate.
    Nellymoser,
    /// Speex audio.
    Speex,
    /// G.711 A-law audio.
    G711Alaw,
    /// G.711 mu-law audio.
    G711Mulaw,
    /// Anything this crate cannot name.
    Unknown,
}

impl CodecType {
    /// True for video codecs.
    pub fn is_video(&self) -> bool {
        matches!(
            self,
            CodecType::H264
                | CodecType::Vp6
                | CodecType::Vp6Alpha
                | CodecType::SorensonH263
                | CodecType::ScreenVideo
                | CodecType::ScreenVideo2
                | CodecType::Jpeg
        )
    }

    /// True for audio codecs.
    pub fn is_audio(&self) -> bool {
        !self.is_video() && *self != CodecType::Unknown
    }
}

/// Describes one elementary stream of a container.
pub trait CodecData: Send + Sync {
    /// The stream's codec.
    fn codec_type(&self) -> CodecType;
    /// Picture width, if known and applicable.
    fn width(&self) -> Option<u32>;
    /// Picture height, if known and applicable.
    fn height(&self) -> Option<u32>;
    /// Codec private data, if any.
    fn extra_data(&self) -> Option<&[u8]>;
}

mod packet;
pub use packet::*;
