use anyhow::{Context, Result};
use voxell_timer::time_fn;

use crate::cli::DecodeArgs;
use crate::codec::{Codec, HuffmanCodec};

pub fn decode(args: DecodeArgs) -> Result<()> {
    let input_path = &args.input;
    let output_path = &args.output;

    let (res, decomp_dur) = time_fn(|| HuffmanCodec.decode(input_path, output_path));
    let stats = res.with_context(|| format!("failed to decode {}", input_path.display()))?;

    if_tracing! {
        tracing::info!(event = "decode_complete", input = %input_path.display(), output = %output_path.display(), elapsed_us = %decomp_dur.as_micros(), decompressed_len = stats.bytes_out, "decode finished");
    }
    eprintln!(
        "decoded {} -> {}: {} -> {} bytes in {:.0?}",
        input_path.display(),
        output_path.display(),
        stats.bytes_in,
        stats.bytes_out,
        decomp_dur,
    );
    Ok(())
}
