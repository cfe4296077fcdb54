use bytes::Bytes;

use super::types::SpsInfo;
use crate::error::{FlvError, Result};
use crate::utils::BitReader;

/// Dimensions above this are rejected as bitstream damage rather than
/// returned to the caller.
const MAX_PLAUSIBLE_DIMENSION: u32 = 8192;

/// Strips H.264 emulation-prevention bytes, turning an EBSP into an RBSP.
///
/// Every `0x03` that follows `0x00 0x00` is removed. This must run before
/// any bit-level parsing of a NAL payload; skipping it silently shifts all
/// downstream field offsets.
pub fn remove_emulation_prevention(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        if i + 2 < data.len() && data[i] == 0x00 && data[i + 1] == 0x00 && data[i + 2] == 0x03 {
            out.push(0x00);
            out.push(0x00);
            i += 3;
            continue;
        }
        out.push(data[i]);
        i += 1;
    }

    out
}

/// Parses an RBSP-unescaped SPS payload (NAL header byte already removed)
/// up through the frame-cropping offsets.
///
/// Fields past the crop offsets are never consumed. Fails with a
/// [`FlvError::Bitstream`] on buffer exhaustion or when the derived
/// dimensions are implausible (zero or above 8192).
pub fn parse_sps(data: &[u8]) -> Result<SpsInfo> {
    let mut reader = BitReader::new(data);

    let profile_idc = reader.read_bits(8)? as u8;
    reader.skip_bits(8)?; // constraint flags and reserved bits
    let level_idc = reader.read_bits(8)? as u8;

    reader.read_golomb()?; // seq_parameter_set_id

    let mut chroma_format_idc = 1; // 4:2:0 unless the profile says otherwise
    let mut bit_depth_luma = 8;
    let mut bit_depth_chroma = 8;

    // Chroma format and bit depth are only coded for the high profiles
    if matches!(
        profile_idc,
        100 | 110 | 122 | 244 | 44 | 83 | 86 | 118 | 128 | 138
    ) {
        chroma_format_idc = reader.read_golomb()?;
        if chroma_format_idc == 3 {
            reader.read_bits(1)?; // separate_colour_plane_flag
        }
        bit_depth_luma = reader.read_golomb()? + 8;
        bit_depth_chroma = reader.read_golomb()? + 8;
        reader.read_bits(1)?; // qpprime_y_zero_transform_bypass_flag

        let scaling_matrix_present = reader.read_bits(1)?;
        if scaling_matrix_present == 1 {
            let count = if chroma_format_idc != 3 { 8 } else { 12 };
            for list in 0..count {
                let scaling_list_present = reader.read_bits(1)?;
                if scaling_list_present == 1 {
                    let size = if list < 6 { 16 } else { 64 };
                    skip_scaling_list(&mut reader, size)?;
                }
            }
        }
    }

    reader.read_golomb()?; // log2_max_frame_num_minus4
    let pic_order_cnt_type = reader.read_golomb()?;

    if pic_order_cnt_type == 0 {
        reader.read_golomb()?; // log2_max_pic_order_cnt_lsb_minus4
    } else if pic_order_cnt_type == 1 {
        reader.read_bits(1)?; // delta_pic_order_always_zero_flag
        reader.read_signed_golomb()?; // offset_for_non_ref_pic
        reader.read_signed_golomb()?; // offset_for_top_to_bottom_field
        let num_ref_frames_in_pic_order_cnt_cycle = reader.read_golomb()?;
        for _ in 0..num_ref_frames_in_pic_order_cnt_cycle {
            reader.read_signed_golomb()?;
        }
    }

    reader.read_golomb()?; // max_num_ref_frames
    reader.read_bits(1)?; // gaps_in_frame_num_value_allowed_flag

    let mb_width = reader.read_golomb()? + 1;
    let mb_height_in_map_units = reader.read_golomb()? + 1;
    let frame_mbs_only = reader.read_bits(1)? == 1;
    if !frame_mbs_only {
        reader.read_bits(1)?; // mb_adaptive_frame_field_flag
    }
    reader.read_bits(1)?; // direct_8x8_inference_flag

    let mut crop_left = 0;
    let mut crop_right = 0;
    let mut crop_top = 0;
    let mut crop_bottom = 0;
    let frame_cropping = reader.read_bits(1)?;
    if frame_cropping == 1 {
        crop_left = reader.read_golomb()?;
        crop_right = reader.read_golomb()?;
        crop_top = reader.read_golomb()?;
        crop_bottom = reader.read_golomb()?;
    }

    let info = SpsInfo {
        profile_idc,
        level_idc,
        chroma_format_idc,
        bit_depth_luma,
        bit_depth_chroma,
        frame_mbs_only,
        mb_width,
        mb_height_in_map_units,
        crop_left,
        crop_right,
        crop_top,
        crop_bottom,
    };

    let (width, height) = (info.width(), info.height());
    if width == 0
        || height == 0
        || width > MAX_PLAUSIBLE_DIMENSION
        || height > MAX_PLAUSIBLE_DIMENSION
    {
        return Err(FlvError::Bitstream(format!(
            "implausible sps dimensions {}x{}",
            width, height
        )));
    }

    Ok(info)
}

fn skip_scaling_list(reader: &mut BitReader, size: usize) -> Result<()> {
    let mut last_scale = 8;
    let mut next_scale = 8;

    for _ in 0..size {
        if next_scale != 0 {
            let delta_scale = reader.read_signed_golomb()?;
            next_scale = (last_scale + delta_scale + 256) % 256;
        }
        last_scale = if next_scale == 0 { last_scale } else { next_scale };
    }

    Ok(())
}

/// An AVCDecoderConfigurationRecord, the body of an AVC sequence-header tag.
#[derive(Debug, Clone)]
pub struct AvcDecoderConfigRecord {
    /// configurationVersion byte.
    pub version: u8,
    /// AVCProfileIndication byte.
    pub profile: u8,
    /// profile_compatibility byte.
    pub compatibility: u8,
    /// AVCLevelIndication byte.
    pub level: u8,
    /// Size in bytes of the NALU length prefixes used by the stream
    /// (the record's 2-bit field value plus one).
    pub nalu_length_size: u8,
    /// SPS NAL units in record order, headers included.
    pub sps: Vec<Bytes>,
    /// PPS NAL units in record order, headers included.
    pub pps: Vec<Bytes>,
}

impl AvcDecoderConfigRecord {
    /// Parses a configuration record from raw bytes.
    ///
    /// `data` starts at the record itself, not at the video tag body; the
    /// caller strips the 5-byte video-tag prefix first.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 6 {
            return Err(FlvError::Bitstream(
                "avc decoder config record truncated".into(),
            ));
        }

        let version = data[0];
        let profile = data[1];
        let compatibility = data[2];
        let level = data[3];
        let nalu_length_size = (data[4] & 0x03) + 1;
        let sps_count = (data[5] & 0x1F) as usize;

        let mut offset = 6;
        let mut sps = Vec::with_capacity(sps_count);
        for _ in 0..sps_count {
            sps.push(read_length_prefixed(data, &mut offset)?);
        }

        let pps_count = *data
            .get(offset)
            .ok_or_else(|| FlvError::Bitstream("avc decoder config record truncated".into()))?
            as usize;
        offset += 1;
        let mut pps = Vec::with_capacity(pps_count);
        for _ in 0..pps_count {
            pps.push(read_length_prefixed(data, &mut offset)?);
        }

        Ok(Self {
            version,
            profile,
            compatibility,
            level,
            nalu_length_size,
            sps,
            pps,
        })
    }

    /// Derives picture dimensions from the record's first SPS unit.
    pub fn dimensions(&self) -> Result<(u16, u16)> {
        let unit = self
            .sps
            .first()
            .ok_or_else(|| FlvError::Bitstream("avc decoder config record has no sps".into()))?;
        if unit.is_empty() {
            return Err(FlvError::Bitstream("empty sps unit".into()));
        }

        let rbsp = remove_emulation_prevention(unit);
        let info = parse_sps(&rbsp[1..])?;
        Ok((info.width() as u16, info.height() as u16))
    }
}

fn read_length_prefixed(data: &[u8], offset: &mut usize) -> Result<Bytes> {
    if *offset + 2 > data.len() {
        return Err(FlvError::Bitstream(
            "avc decoder config record truncated".into(),
        ));
    }
    let len = u16::from_be_bytes([data[*offset], data[*offset + 1]]) as usize;
    *offset += 2;

    if *offset + len > data.len() {
        return Err(FlvError::Bitstream(
            "avc decoder config record truncated".into(),
        ));
    }
    let unit = Bytes::copy_from_slice(&data[*offset..*offset + len]);
    *offset += len;
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::BitWriter;
    use pretty_assertions::assert_eq;

    struct SpsParams {
        profile: u8,
        mb_width_minus1: u32,
        mb_height_minus1: u32,
        crops: Option<[u32; 4]>,
        scaling_lists: bool,
    }

    fn build_sps_payload(params: &SpsParams) -> Vec<u8> {
        let mut w = BitWriter::new();
        w.write_bits(params.profile as u32, 8).unwrap();
        w.write_bits(0, 8).unwrap(); // constraint flags
        w.write_bits(31, 8).unwrap(); // level 3.1
        w.write_golomb(0); // seq_parameter_set_id

        if params.profile == 100 {
            w.write_golomb(1); // chroma_format_idc = 4:2:0
            w.write_golomb(0); // bit_depth_luma_minus8
            w.write_golomb(0); // bit_depth_chroma_minus8
            w.write_bit(false); // qpprime_y_zero_transform_bypass_flag
            if params.scaling_lists {
                w.write_bit(true);
                // first 4x4 list collapses after one delta of -8
                w.write_bit(true);
                w.write_signed_golomb(-8);
                for _ in 0..7 {
                    w.write_bit(false);
                }
            } else {
                w.write_bit(false);
            }
        }

        w.write_golomb(4); // log2_max_frame_num_minus4
        w.write_golomb(0); // pic_order_cnt_type
        w.write_golomb(4); // log2_max_pic_order_cnt_lsb_minus4
        w.write_golomb(1); // max_num_ref_frames
        w.write_bit(false); // gaps_in_frame_num_value_allowed_flag
        w.write_golomb(params.mb_width_minus1);
        w.write_golomb(params.mb_height_minus1);
        w.write_bit(true); // frame_mbs_only_flag
        w.write_bit(true); // direct_8x8_inference_flag
        match params.crops {
            Some([left, right, top, bottom]) => {
                w.write_bit(true);
                w.write_golomb(left);
                w.write_golomb(right);
                w.write_golomb(top);
                w.write_golomb(bottom);
            }
            None => w.write_bit(false),
        }
        w.write_bit(true); // rbsp stop bit
        w.finish()
    }

    #[test]
    fn test_sps_1080p_with_bottom_crop() {
        // 1920x1080: 120x68 macroblocks with 8 rows cropped off the bottom
        let payload = build_sps_payload(&SpsParams {
            profile: 66,
            mb_width_minus1: 119,
            mb_height_minus1: 67,
            crops: Some([0, 0, 0, 4]),
            scaling_lists: false,
        });
        let info = parse_sps(&payload).unwrap();
        assert_eq!(info.profile_idc, 66);
        assert_eq!(info.level_idc, 31);
        assert_eq!((info.width(), info.height()), (1920, 1080));
    }

    #[test]
    fn test_sps_no_crop() {
        let payload = build_sps_payload(&SpsParams {
            profile: 66,
            mb_width_minus1: 39,
            mb_height_minus1: 29,
            crops: None,
            scaling_lists: false,
        });
        let info = parse_sps(&payload).unwrap();
        assert_eq!((info.width(), info.height()), (640, 480));
        assert!(info.frame_mbs_only);
    }

    #[test]
    fn test_sps_high_profile() {
        let payload = build_sps_payload(&SpsParams {
            profile: 100,
            mb_width_minus1: 79,
            mb_height_minus1: 44,
            crops: None,
            scaling_lists: false,
        });
        let info = parse_sps(&payload).unwrap();
        assert_eq!(info.chroma_format_idc, 1);
        assert_eq!(info.bit_depth_luma, 8);
        assert_eq!((info.width(), info.height()), (1280, 720));
    }

    #[test]
    fn test_sps_high_profile_with_scaling_lists() {
        let payload = build_sps_payload(&SpsParams {
            profile: 100,
            mb_width_minus1: 79,
            mb_height_minus1: 44,
            crops: None,
            scaling_lists: true,
        });
        let info = parse_sps(&payload).unwrap();
        assert_eq!((info.width(), info.height()), (1280, 720));
    }

    #[test]
    fn test_sps_truncated() {
        let payload = build_sps_payload(&SpsParams {
            profile: 66,
            mb_width_minus1: 119,
            mb_height_minus1: 67,
            crops: Some([0, 0, 0, 4]),
            scaling_lists: false,
        });
        assert!(parse_sps(&payload[..4]).is_err());
    }

    #[test]
    fn test_sps_implausible_dimensions() {
        let payload = build_sps_payload(&SpsParams {
            profile: 66,
            mb_width_minus1: 5000, // 80016 pixels wide
            mb_height_minus1: 29,
            crops: None,
            scaling_lists: false,
        });
        assert!(matches!(
            parse_sps(&payload),
            Err(FlvError::Bitstream(_))
        ));
    }

    #[test]
    fn test_remove_emulation_prevention() {
        assert_eq!(
            remove_emulation_prevention(&[0x00, 0x00, 0x03, 0x01]),
            vec![0x00, 0x00, 0x01]
        );
        assert_eq!(
            remove_emulation_prevention(&[0x00, 0x00, 0x03, 0x00, 0x00, 0x03]),
            vec![0x00, 0x00, 0x00, 0x00]
        );
        // untouched data passes through
        assert_eq!(
            remove_emulation_prevention(&[0x67, 0x42, 0x00, 0x1F]),
            vec![0x67, 0x42, 0x00, 0x1F]
        );
        // 0x03 not preceded by two zeros stays
        assert_eq!(
            remove_emulation_prevention(&[0x00, 0x03, 0x00]),
            vec![0x00, 0x03, 0x00]
        );
    }

    fn build_config_record(sps_units: &[&[u8]], pps_units: &[&[u8]]) -> Vec<u8> {
        let mut data = vec![0x01, 0x64, 0x00, 0x1F, 0xFF];
        data.push(0xE0 | sps_units.len() as u8);
        for unit in sps_units {
            data.extend_from_slice(&(unit.len() as u16).to_be_bytes());
            data.extend_from_slice(unit);
        }
        data.push(pps_units.len() as u8);
        for unit in pps_units {
            data.extend_from_slice(&(unit.len() as u16).to_be_bytes());
            data.extend_from_slice(unit);
        }
        data
    }

    #[test]
    fn test_avc_config_dimensions() {
        let payload = build_sps_payload(&SpsParams {
            profile: 66,
            mb_width_minus1: 119,
            mb_height_minus1: 67,
            crops: Some([0, 0, 0, 4]),
            scaling_lists: false,
        });
        let mut sps_unit = vec![0x67];
        sps_unit.extend_from_slice(&payload);
        // trailing filler that needs unescaping but is never parsed
        sps_unit.extend_from_slice(&[0x00, 0x00, 0x03]);

        let record = build_config_record(&[&sps_unit], &[&[0x68, 0xCE, 0x3C, 0x80]]);
        let config = AvcDecoderConfigRecord::parse(&record).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.profile, 0x64);
        assert_eq!(config.level, 0x1F);
        assert_eq!(config.nalu_length_size, 4);
        assert_eq!(config.sps.len(), 1);
        assert_eq!(config.pps.len(), 1);
        assert_eq!(config.dimensions().unwrap(), (1920, 1080));
    }

    #[test]
    fn test_avc_config_truncated() {
        let payload = build_sps_payload(&SpsParams {
            profile: 66,
            mb_width_minus1: 39,
            mb_height_minus1: 29,
            crops: None,
            scaling_lists: false,
        });
        let mut sps_unit = vec![0x67];
        sps_unit.extend_from_slice(&payload);

        let record = build_config_record(&[&sps_unit], &[]);
        for cut in [3, 6, 7, record.len() - 1] {
            assert!(
                AvcDecoderConfigRecord::parse(&record[..cut]).is_err(),
                "cut at {} should fail",
                cut
            );
        }
    }

    #[test]
    fn test_avc_config_without_sps() {
        let record = build_config_record(&[], &[]);
        let config = AvcDecoderConfigRecord::parse(&record).unwrap();
        assert!(config.sps.is_empty());
        assert!(config.dimensions().is_err());
    }
}
