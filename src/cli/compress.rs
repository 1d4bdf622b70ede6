use anyhow::{Context, Result};
use voxell_timer::time_fn;

use crate::cli::CompressArgs;
use crate::codec::{Codec, HuffmanCodec};

pub fn compress(args: CompressArgs) -> Result<()> {
    let input_path = &args.input;
    let output_path = &args.output;

    let (res, comp_dur) = time_fn(|| HuffmanCodec.compress(input_path, output_path));
    let stats = res.with_context(|| format!("failed to compress {}", input_path.display()))?;

    if_tracing! {
        tracing::info!(event = "compress_complete", input = %input_path.display(), output = %output_path.display(), elapsed_us = %comp_dur.as_micros(), bytes_in = stats.bytes_in, bytes_out = stats.bytes_out, ratio = stats.ratio(), "compress finished");
    }
    eprintln!(
        "compressed {} -> {}: {} -> {} bytes ({:.1}%) in {:.0?}",
        input_path.display(),
        output_path.display(),
        stats.bytes_in,
        stats.bytes_out,
        stats.ratio() * 100.0,
        comp_dur,
    );
    Ok(())
}
