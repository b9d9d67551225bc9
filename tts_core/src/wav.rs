use std::{
    fs::File,
    io::{BufWriter, Seek, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

/// File name prefix of every WAV written by [`write_temp_wav`].
pub const TEMP_WAV_PREFIX: &str = "kokoro-";
/// File name suffix of every WAV written by [`write_temp_wav`].
pub const TEMP_WAV_SUFFIX: &str = ".wav";

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Encode f32 samples as mono 16-bit PCM into any seekable writer.
fn write_samples<W: Write + Seek>(out: W, samples: &[f32], sample_rate: u32) -> anyhow::Result<()> {
    let mut writer = hound::WavWriter::new(out, wav_spec(sample_rate))
        .map_err(|e| anyhow::anyhow!("wav write err: {e}"))?;

    const I16_MAX_F32: f32 = i16::MAX as f32;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * I16_MAX_F32) as i16;
        writer
            .write_sample(v)
            .map_err(|e| anyhow::anyhow!("wav sample err: {e}"))?;
    }

    writer
        .finalize()
        .map_err(|e| anyhow::anyhow!("wav finalize err: {e}"))
}

/// Write `samples` to `path` as a mono 16-bit PCM WAV file.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> anyhow::Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("Failed to create {}", path.as_ref().display()))?;
    write_samples(BufWriter::new(file), samples, sample_rate)
}

/// Write `samples` to a new uniquely named WAV file inside `dir` and return
/// its absolute path.
///
/// The file is persisted: nothing in this crate deletes it afterwards.
pub fn write_temp_wav(dir: &Path, samples: &[f32], sample_rate: u32) -> anyhow::Result<PathBuf> {
    persist_temp_file(dir, |file| write_samples(BufWriter::new(file), samples, sample_rate))
}

/// Fill a fresh temp file in `dir` and keep it only once `write` succeeds.
/// On error the file is removed when the handle drops.
fn persist_temp_file<F>(dir: &Path, write: F) -> anyhow::Result<PathBuf>
where
    F: FnOnce(&mut File) -> anyhow::Result<()>,
{
    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_WAV_PREFIX)
        .suffix(TEMP_WAV_SUFFIX)
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary wav file in {}", dir.display()))?;

    write(temp.as_file_mut()).with_context(|| format!("Failed to write {}", temp.path().display()))?;

    let (_, path) = temp.keep().context("Failed to persist temporary wav file")?;
    Ok(std::fs::canonicalize(&path).unwrap_or(path))
}
