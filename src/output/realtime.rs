//! Realtime output using cpal and a lock-free patch queue
//!
//! The cpal callback owns a [`Mixer`]; the scheduler thread only pushes
//! finished patches into a ring buffer. Patches that have played out travel
//! back through a second ring buffer and are freed on the scheduler thread.
//! The number of frames the callback has rendered is the audio clock,
//! published through an atomic counter.

use super::mixer::Mixer;
use super::{AudioOutput, OutputState};
use crate::error::{Result, RhythmError};
use crate::synth::Patch;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Patches that can wait in the queue between two audio callbacks
const PATCH_QUEUE_CAPACITY: usize = 256;

/// Live patches the callback mixes without reallocating
const MIXER_CAPACITY: usize = 1024;

/// Initial size of the mono scratch block
const SCRATCH_FRAMES: usize = 4096;

/// Output on the default system device
pub struct RealtimeOutput {
    /// The cpal stream (kept alive for the duration)
    stream: cpal::Stream,
    /// Scheduler side of the patch queue
    producer: HeapProd<Patch>,
    /// Played-out patches waiting to be freed
    retired: HeapCons<Patch>,
    /// Frames rendered by the callback
    frames: Arc<AtomicU64>,
    sample_rate: u32,
    state: OutputState,
}

impl RealtimeOutput {
    /// Open the default output device
    ///
    /// The stream is created paused; call [`AudioOutput::resume`] to start the
    /// clock.
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| RhythmError::OutputUnavailable {
                reason: "no default output device".to_string(),
            })?;

        let supported = device
            .default_output_config()
            .map_err(|e| RhythmError::OutputUnavailable {
                reason: format!("failed to get default output config: {}", e),
            })?;

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.config();

        let (producer, consumer) = HeapRb::<Patch>::new(PATCH_QUEUE_CAPACITY).split();
        let (retire, retired) = HeapRb::<Patch>::new(MIXER_CAPACITY).split();
        let frames = Arc::new(AtomicU64::new(0));

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(
                &device,
                &config,
                channels,
                sample_rate,
                consumer,
                retire,
                Arc::clone(&frames),
            )?,
            cpal::SampleFormat::I16 => build_stream::<i16>(
                &device,
                &config,
                channels,
                sample_rate,
                consumer,
                retire,
                Arc::clone(&frames),
            )?,
            cpal::SampleFormat::U16 => build_stream::<u16>(
                &device,
                &config,
                channels,
                sample_rate,
                consumer,
                retire,
                Arc::clone(&frames),
            )?,
            other => {
                return Err(RhythmError::UnsupportedSampleFormat {
                    format: format!("{:?}", other),
                });
            }
        };

        // Some backends start streams immediately
        if let Err(e) = stream.pause() {
            log::debug!("Output stream cannot be paused: {}", e);
        }

        log::info!(
            "Opened audio output: {} Hz, {} channel(s)",
            sample_rate,
            channels
        );

        Ok(Self {
            stream,
            producer,
            retired,
            frames,
            sample_rate,
            state: OutputState::Suspended,
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    sample_rate: u32,
    mut consumer: HeapCons<Patch>,
    mut retire: HeapProd<Patch>,
    frames: Arc<AtomicU64>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let mut mixer = Mixer::with_capacity(sample_rate, MIXER_CAPACITY);
    let mut mono = vec![0.0f32; SCRATCH_FRAMES];

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                while let Some(patch) = consumer.try_pop() {
                    mixer.add(patch);
                }

                let frame_count = data.len() / channels;
                if mono.len() < frame_count {
                    mono.resize(frame_count, 0.0);
                }
                mixer.render_and_reclaim(&mut mono[..frame_count], |patch| {
                    // Return queue full: free here rather than stall
                    let _ = retire.try_push(patch);
                });

                // Same mono signal on every channel
                for (frame, &sample) in data.chunks_mut(channels).zip(&mono[..frame_count]) {
                    frame.fill(T::from_sample(sample.clamp(-1.0, 1.0)));
                }
                frames.store(mixer.frame(), Ordering::Release);
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| RhythmError::StreamError {
            reason: format!("failed to build output stream: {}", e),
        })
}

impl AudioOutput for RealtimeOutput {
    fn current_time(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn state(&self) -> OutputState {
        self.state
    }

    fn resume(&mut self) -> Result<()> {
        self.stream.play().map_err(|e| RhythmError::StreamError {
            reason: format!("failed to play output stream: {}", e),
        })?;
        self.state = OutputState::Running;
        log::debug!("Audio output resumed at {:.3}s", self.current_time());
        Ok(())
    }

    fn submit(&mut self, patch: Patch) {
        while self.retired.try_pop().is_some() {}

        if let Err(patch) = self.producer.try_push(patch) {
            // Queue full: the callback has stalled
            log::warn!(
                "Patch queue full, dropping {} trigger at {:.3}s",
                patch.layer(),
                patch.time()
            );
        }
    }
}
