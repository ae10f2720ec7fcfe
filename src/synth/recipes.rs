//! Percussion recipes
//!
//! One function per timbre. Each builds its chains starting at `time` with a
//! peak level derived from `volume`, and gives every chain a stop time at the
//! end of its envelope.

use crate::dsp::{
    white_noise, Automation, Biquad, Chain, Source, Waveform, DECAY_FLOOR, DEEP_DECAY_FLOOR,
};
use rand::Rng;

// ============================================================================
// Constants
// ============================================================================

const CYMBAL_DURATION: f64 = 1.5;
const CYMBAL_LEVEL: f32 = 0.7;
const CYMBAL_BAND_HZ: f64 = 1000.0;
const CYMBAL_BAND_Q: f64 = 0.5;
const CYMBAL_HIGHPASS_HZ: f64 = 2000.0;

const SNARE_DURATION: f64 = 0.2;
const SNARE_TONE_HZ: f32 = 250.0;
const SNARE_SNAP_HZ: f64 = 1000.0;

const KICK_DURATION: f64 = 0.5;
const KICK_START_HZ: f32 = 150.0;
const KICK_END_HZ: f32 = 0.01;

const WOODBLOCK_DURATION: f64 = 0.1;
const WOODBLOCK_HZ: f32 = 800.0;
const WOODBLOCK_LEVEL: f32 = 0.5;

const HIHAT_DURATION: f64 = 0.05;
const HIHAT_HZ: f64 = 5000.0;
const HIHAT_LEVEL: f32 = 0.4;

const CLICK_DURATION: f64 = 0.02;
const CLICK_HZ: f64 = 8000.0;
const CLICK_LEVEL: f32 = 0.25;

// ============================================================================
// Building blocks
// ============================================================================

/// Decaying oscillator
fn tone(waveform: Waveform, frequency: Automation, peak: f32, time: f64, duration: f64, floor: f32) -> Chain {
    Chain::new(
        Source::oscillator(waveform, frequency),
        Vec::new(),
        Automation::decay(peak, time, duration, floor),
        time,
        time + duration,
    )
}

/// Decaying white-noise burst through `filters`
fn noise_burst<R: Rng + ?Sized>(
    rng: &mut R,
    filters: Vec<Biquad>,
    peak: f32,
    time: f64,
    duration: f64,
    sample_rate: u32,
) -> Chain {
    Chain::new(
        Source::buffer(white_noise(rng, duration, sample_rate)),
        filters,
        Automation::decay(peak, time, duration, DECAY_FLOOR),
        time,
        time + duration,
    )
}

// ============================================================================
// Recipes
// ============================================================================

/// Long metallic wash: bandpassed then highpassed noise
pub fn cymbal<R: Rng + ?Sized>(rng: &mut R, time: f64, volume: f32, sample_rate: u32) -> Vec<Chain> {
    let filters = vec![
        Biquad::band_pass(CYMBAL_BAND_HZ, CYMBAL_BAND_Q, sample_rate),
        Biquad::high_pass(CYMBAL_HIGHPASS_HZ, sample_rate),
    ];
    vec![noise_burst(
        rng,
        filters,
        volume * CYMBAL_LEVEL,
        time,
        CYMBAL_DURATION,
        sample_rate,
    )]
}

/// Triangle body plus a highpassed noise snap
pub fn snare<R: Rng + ?Sized>(rng: &mut R, time: f64, volume: f32, sample_rate: u32) -> Vec<Chain> {
    vec![
        tone(
            Waveform::Triangle,
            Automation::constant(SNARE_TONE_HZ, time),
            volume,
            time,
            SNARE_DURATION,
            DECAY_FLOOR,
        ),
        noise_burst(
            rng,
            vec![Biquad::high_pass(SNARE_SNAP_HZ, sample_rate)],
            volume,
            time,
            SNARE_DURATION,
            sample_rate,
        ),
    ]
}

/// Sine with an exponential pitch drop
pub fn kick(time: f64, volume: f32) -> Vec<Chain> {
    let sweep = Automation::exponential(KICK_START_HZ, time, KICK_END_HZ, time + KICK_DURATION);
    vec![tone(
        Waveform::Sine,
        sweep,
        volume,
        time,
        KICK_DURATION,
        DEEP_DECAY_FLOOR,
    )]
}

/// Short high sine blip
pub fn woodblock(time: f64, volume: f32) -> Vec<Chain> {
    vec![tone(
        Waveform::Sine,
        Automation::constant(WOODBLOCK_HZ, time),
        volume * WOODBLOCK_LEVEL,
        time,
        WOODBLOCK_DURATION,
        DEEP_DECAY_FLOOR,
    )]
}

/// Very short highpassed noise
pub fn hi_hat<R: Rng + ?Sized>(rng: &mut R, time: f64, volume: f32, sample_rate: u32) -> Vec<Chain> {
    vec![noise_burst(
        rng,
        vec![Biquad::high_pass(HIHAT_HZ, sample_rate)],
        volume * HIHAT_LEVEL,
        time,
        HIHAT_DURATION,
        sample_rate,
    )]
}

/// Tick of very bright noise
pub fn click<R: Rng + ?Sized>(rng: &mut R, time: f64, volume: f32, sample_rate: u32) -> Vec<Chain> {
    vec![noise_burst(
        rng,
        vec![Biquad::high_pass(CLICK_HZ, sample_rate)],
        volume * CLICK_LEVEL,
        time,
        CLICK_DURATION,
        sample_rate,
    )]
}
