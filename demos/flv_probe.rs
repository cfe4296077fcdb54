use std::env;
use std::error::Error;
use tokio::fs::File;

use flvio::format::flv::FlvReader;
use flvio::FlvError;

const MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let path = env::args()
        .nth(1)
        .ok_or("usage: flv_probe <input.flv>")?;

    let file = File::open(&path).await?;
    let mut reader = FlvReader::new(file);

    let header = reader.read_header().await?;
    println!(
        "{}: flv version {}, video={}, audio={}",
        path,
        header.version >> 8,
        header.has_video(),
        header.has_audio()
    );

    let mut frames = 0u64;
    let mut skipped = 0u64;
    loop {
        match reader.read_frame_with_recovery(MAX_FRAME_SIZE).await {
            Ok(recovery) => {
                skipped += recovery.skipped;
                match recovery.frame {
                    Some(frame) => {
                        println!("{}", frame);
                        frames += 1;
                    }
                    None => break,
                }
            }
            Err(FlvError::RecoveryExhausted { skipped: tail }) => {
                skipped += tail;
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let dims = reader.dimensions();
    println!(
        "{} frames, {} bytes skipped, last dimensions {}x{}",
        frames, skipped, dims.width, dims.height
    );

    Ok(())
}
