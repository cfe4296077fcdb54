use bytes::Bytes;
use std::time::Duration;

/// One demuxed media packet: a tag body plus timing and stream identity.
#[derive(Debug, Clone)]
pub struct Packet {
    /// Raw payload bytes.
    pub data: Bytes,
    /// Presentation timestamp in milliseconds.
    pub pts: Option<i64>,
    /// Decode timestamp in milliseconds.
    pub dts: Option<i64>,
    /// Index of the stream this packet belongs to.
    pub stream_index: usize,
    /// Whether the packet starts a keyframe.
    pub is_key: bool,
    /// Packet duration, when the container carries one.
    pub duration: Option<Duration>,
}

impl Packet {
    /// Creates a packet carrying `data` with no timing information.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pts: None,
            dts: None,
            stream_index: 0,
            is_key: false,
            duration: None,
        }
    }

    /// Sets the presentation timestamp.
    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Sets the decode timestamp.
    pub fn with_dts(mut self, dts: i64) -> Self {
        self.dts = Some(dts);
        self
    }

    /// Sets the stream index.
    pub fn with_stream_index(mut self, index: usize) -> Self {
        self.stream_index = index;
        self
    }

    /// Marks the packet as a keyframe (or not).
    pub fn with_key_flag(mut self, is_key: bool) -> Self {
        self.is_key = is_key;
        self
    }

    /// Sets the packet duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}
