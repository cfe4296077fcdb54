use std::env;
use std::error::Error;
use tokio::fs::File;

use flvio::format::flv::{FlvReader, FlvWriter};
use flvio::FlvError;

const MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

/// Reads an FLV file with recovery enabled and writes a clean copy:
/// damaged stretches are dropped, every surviving tag gets a recomputed
/// prev-tag-size word, and timestamps are shifted so the first frame
/// lands at zero.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let (input, output) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (input, output),
        _ => return Err("usage: flv_remux <input.flv> <output.flv>".into()),
    };

    let mut reader = FlvReader::new(File::open(&input).await?);
    let mut writer = FlvWriter::new(File::create(&output).await?);

    writer.write_header(&reader.read_header().await?).await?;

    let mut base_dts: Option<u32> = None;
    let mut frames = 0u64;
    let mut skipped = 0u64;
    loop {
        match reader.read_frame_with_recovery(MAX_FRAME_SIZE).await {
            Ok(recovery) => {
                skipped += recovery.skipped;
                let mut frame = match recovery.frame {
                    Some(frame) => frame,
                    None => break,
                };
                let base = *base_dts.get_or_insert(frame.dts());
                frame.set_dts(frame.dts().saturating_sub(base));
                writer.write_frame(&frame).await?;
                frames += 1;
            }
            Err(FlvError::RecoveryExhausted { skipped: tail }) => {
                skipped += tail;
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    writer.flush().await?;

    println!(
        "{} -> {}: {} frames kept, {} bytes dropped",
        input, output, frames, skipped
    );

    Ok(())
}
