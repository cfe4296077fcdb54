//! # VP6 Keyframe Header Parsing
//!
//! On2 VP6 streams carried in FLV do not use NAL units or parameter sets;
//! a keyframe's first bytes carry the coded dimensions directly. This
//! module extracts them with fixed byte and nibble offsets, no bit-level
//! parsing involved.

use crate::error::{FlvError, Result};

/// Smallest video tag body that can hold the VP6 keyframe fields.
const KEYFRAME_HEADER_LENGTH: usize = 7;

/// Derives pixel dimensions from a VP6 keyframe video tag body.
///
/// `body` is the whole tag body including the leading frame-type/codec
/// byte. Byte 1 packs the height adjustment in its high nibble and the
/// width adjustment in its low nibble; bytes 5 and 6 give the macroblock
/// height and width counts. Each dimension is `count * 16 - adjust`.
///
/// Fails with [`FlvError::Bitstream`] on a short body or a zero dimension.
pub fn keyframe_dimensions(body: &[u8]) -> Result<(u16, u16)> {
    if body.len() < KEYFRAME_HEADER_LENGTH {
        return Err(FlvError::Bitstream(format!(
            "vp6 keyframe header truncated: {} bytes",
            body.len()
        )));
    }

    let height_adjust = (body[1] >> 4) as u16;
    let width_adjust = (body[1] & 0x0F) as u16;
    let height_mbs = body[5] as u16;
    let width_mbs = body[6] as u16;

    let width = (width_mbs * 16).checked_sub(width_adjust);
    let height = (height_mbs * 16).checked_sub(height_adjust);

    match (width, height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Ok((width, height)),
        _ => Err(FlvError::Bitstream("vp6 keyframe has zero dimensions".into())),
    }
}
