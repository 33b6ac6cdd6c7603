use crate::config::{DuckingConfig, PlaybackConfig};
use crate::sync::{CueSchedule, NoopObserver, PlaybackSession, VolumeLevel};
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::warn;

/// Interleaved f32 audio held in memory
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u32,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Decodes the soundtrack that will be ducked
pub struct AudioDecoder;

impl AudioDecoder {
    pub fn decode(path: &Path) -> Result<DecodedAudio> {
        let src = File::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
        let mss = MediaSourceStream::new(Box::new(src), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .context("Unsupported audio format")?;

        let mut format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .context("No supported audio track found")?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .context("Unsupported codec")?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .filter(|rate| *rate > 0)
            .context("Audio track has no sample rate")?;
        let channels = track.codec_params.channels.unwrap_or_default().count().max(1) as u32;

        let mut samples = Vec::new();
        let mut skipped = 0usize;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to read audio packet from {}", path.display())
                    })
                }
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let mut buf =
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!(error = %e, ts = packet.ts(), "skipping undecodable packet");
                    skipped += 1;
                }
                Err(e) => return Err(e).context("Failed to decode audio packet"),
            }
        }
        if skipped > 0 {
            warn!(skipped, path = %path.display(), "decoded with corrupt packets dropped");
        }

        Ok(DecodedAudio {
            samples,
            sample_rate,
            channels,
        })
    }
}

/// Applies cue ducking to a decoded soundtrack offline.
///
/// Gain only changes on tick boundaries, so the output matches what a
/// listener hears from the live synchronizer at the same tick rate.
pub struct DuckingRenderer {
    ducking: DuckingConfig,
    playback: PlaybackConfig,
}

impl DuckingRenderer {
    pub fn new(ducking: DuckingConfig, playback: PlaybackConfig) -> Self {
        Self { ducking, playback }
    }

    fn tick_start_frame(&self, tick: u64, sample_rate: u32) -> usize {
        (tick as f64 * sample_rate as f64 / self.playback.tick_rate_hz).round() as usize
    }

    pub fn apply(&self, audio: &DecodedAudio, schedule: CueSchedule) -> Result<DecodedAudio> {
        self.playback.validate()?;
        if audio.sample_rate == 0 {
            anyhow::bail!("Audio sample rate must be positive");
        }

        let channels = audio.channels.max(1) as usize;
        let total_frames = audio.frames();
        let mut samples = audio.samples.clone();

        let mut session = PlaybackSession::start(
            schedule,
            self.ducking,
            VolumeLevel::default(),
            NoopObserver,
        )?;

        let mut tick = 0u64;
        loop {
            let start = self.tick_start_frame(tick, audio.sample_rate);
            if start >= total_frames {
                break;
            }
            let end = self.tick_start_frame(tick + 1, audio.sample_rate).min(total_frames);

            session.tick(tick as f64 / self.playback.tick_rate_hz);
            let gain = session.output().volume;
            if gain != 1.0 {
                for sample in &mut samples[start * channels..end * channels] {
                    *sample *= gain;
                }
            }
            tick += 1;
        }
        session.stop();

        Ok(DecodedAudio {
            samples,
            sample_rate: audio.sample_rate,
            channels: audio.channels,
        })
    }

    /// Write ducked audio as 32-bit float WAV
    pub fn export(path: &Path, audio: &DecodedAudio) -> Result<()> {
        let spec = hound::WavSpec {
            channels: audio.channels as u16,
            sample_rate: audio.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let mut writer =
            hound::WavWriter::create(path, spec).context("Failed to create WAV writer")?;
        for &sample in &audio.samples {
            writer
                .write_sample(sample)
                .context("Failed to write sample")?;
        }
        writer.finalize().context("Failed to finalize WAV file")?;
        Ok(())
    }
}
