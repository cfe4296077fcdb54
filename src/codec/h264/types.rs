/// Fields of an H.264 Sequence Parameter Set, parsed up through the
/// frame-cropping offsets.
///
/// Only the fields needed to derive coded picture dimensions are kept;
/// everything after the crop offsets (VUI and friends) is never read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpsInfo {
    /// profile_idc byte.
    pub profile_idc: u8,
    /// level_idc byte.
    pub level_idc: u8,
    /// chroma_format_idc; 1 (4:2:0) when the profile does not encode it.
    pub chroma_format_idc: u32,
    /// Luma bit depth (bit_depth_luma_minus8 + 8).
    pub bit_depth_luma: u32,
    /// Chroma bit depth (bit_depth_chroma_minus8 + 8).
    pub bit_depth_chroma: u32,
    /// frame_mbs_only_flag; false means fields, doubling vertical units.
    pub frame_mbs_only: bool,
    /// Picture width in macroblocks (pic_width_in_mbs_minus1 + 1).
    pub mb_width: u32,
    /// Picture height in map units (pic_height_in_map_units_minus1 + 1).
    pub mb_height_in_map_units: u32,
    /// Left crop offset in crop units.
    pub crop_left: u32,
    /// Right crop offset in crop units.
    pub crop_right: u32,
    /// Top crop offset in crop units.
    pub crop_top: u32,
    /// Bottom crop offset in crop units.
    pub crop_bottom: u32,
}

impl SpsInfo {
    /// Derived picture width in pixels.
    pub fn width(&self) -> u32 {
        let coded = self.mb_width as u64 * 16;
        let cropped = (self.crop_left as u64 + self.crop_right as u64) * 2;
        coded.saturating_sub(cropped).min(u32::MAX as u64) as u32
    }

    /// Derived picture height in pixels.
    ///
    /// Interlaced streams (frame_mbs_only_flag == 0) store half-height map
    /// units, so both the coded size and the crop are scaled by two.
    pub fn height(&self) -> u32 {
        let field_factor = if self.frame_mbs_only { 1u64 } else { 2u64 };
        let coded = self.mb_height_in_map_units as u64 * 16 * field_factor;
        let cropped = (self.crop_top as u64 + self.crop_bottom as u64) * 2 * field_factor;
        coded.saturating_sub(cropped).min(u32::MAX as u64) as u32
    }
}
