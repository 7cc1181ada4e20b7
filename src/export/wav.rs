//! WAV file export functionality

use crate::streaming::AudioSink;
use crate::synth::WaveformSynth;
use crate::uef_parser::Chunk;
use crate::{Result, UefError};
use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// [`AudioSink`] writing 16-bit mono PCM to a WAV file
pub struct WavSink {
    writer: Option<WavWriter<BufWriter<File>>>,
    samples_written: usize,
}

impl WavSink {
    /// Create (or truncate) a WAV file at `path`
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path.as_ref(), spec).map_err(|e| {
            UefError::AudioFile(format!(
                "Failed to create WAV file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(WavSink {
            writer: Some(writer),
            samples_written: 0,
        })
    }

    /// Samples written so far
    pub fn samples_written(&self) -> usize {
        self.samples_written
    }
}

impl AudioSink for WavSink {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| UefError::AudioFile("WAV file already closed".into()))?;

        for &sample in samples {
            writer
                .write_sample(to_i16(sample))
                .map_err(|e| UefError::AudioFile(format!("Failed to write sample: {}", e)))?;
        }
        self.samples_written += samples.len();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.writer.take() {
            Some(writer) => writer
                .finalize()
                .map_err(|e| UefError::AudioFile(format!("Failed to finalize WAV file: {}", e))),
            None => Ok(()),
        }
    }
}

/// Convert a sample in [-1.0, 1.0] to 16-bit PCM
#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Render every chunk of a tape into a WAV file
///
/// Returns the number of samples written.
pub fn export_to_wav<P: AsRef<Path>>(
    chunks: &[Chunk],
    synth: &WaveformSynth,
    output_path: P,
) -> Result<usize> {
    let sample_rate = synth.params().sample_rate;
    let mut sink = WavSink::create(output_path.as_ref(), sample_rate)?;

    for chunk in chunks {
        let samples = synth.synthesize(chunk);
        if let Err(e) = sink.write(&samples) {
            let _ = sink.close();
            return Err(e);
        }
    }
    sink.close()?;

    let total = sink.samples_written();
    info!(
        "Wrote {} samples ({:.1}s) to {}",
        total,
        total as f64 / f64::from(sample_rate),
        output_path.as_ref().display()
    );
    Ok(total)
}
