use thiserror::Error;

/// Errors produced while reading, decoding, or writing FLV streams.
#[derive(Error, Debug)]
pub enum FlvError {
    /// Underlying I/O failure from the source or sink.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream preamble violations, e.g. a missing `FLV` signature.
    #[error("format error: {0}")]
    Format(String),

    /// The source ended in the middle of a tag.
    #[error("truncated stream: {0}")]
    Truncated(String),

    /// A tag header carried a type byte other than audio, video, or meta.
    #[error("unknown tag type: {0}")]
    UnknownTagType(u8),

    /// Bit-level parse failure inside a codec payload (SPS, AVC config,
    /// VP6 header). Never fatal to tag decoding.
    #[error("bitstream error: {0}")]
    Bitstream(String),

    /// AMF0 metadata that could not be decoded.
    #[error("amf error: {0}")]
    Amf(String),

    /// Caller-supplied data the container cannot represent.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A recovery scan consumed the rest of the source without finding a
    /// decodable tag.
    #[error("recovery exhausted after skipping {skipped} bytes")]
    RecoveryExhausted {
        /// Bytes stepped over before the scan gave up.
        skipped: u64,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FlvError>;
