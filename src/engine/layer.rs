//! Rhythm layers
//!
//! The six fixed subdivisions of one measure, from a single whole note down
//! to 32 thirty-second notes. Each row of the "tree of rhythm" is a strict
//! binary subdivision of the row above, so every layer's onsets are a subset
//! of the onsets of every finer layer.

use crate::error::{Result, RhythmError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of 32nd-note steps in one measure
pub const STEPS_PER_MEASURE: usize = 32;

// ============================================================================
// Layer
// ============================================================================

/// One rhythmic layer of the measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    #[serde(rename = "whole")]
    Whole,
    #[serde(rename = "half")]
    Half,
    #[serde(rename = "quarter")]
    Quarter,
    #[serde(rename = "8th")]
    Eighth,
    #[serde(rename = "16th")]
    Sixteenth,
    #[serde(rename = "32nd")]
    ThirtySecond,
}

/// Percussive sound assigned to a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timbre {
    Cymbal,
    Snare,
    Kick,
    Woodblock,
    HiHat,
    Click,
}

impl Layer {
    /// All layers, coarsest first
    pub const ALL: [Layer; 6] = [
        Layer::Whole,
        Layer::Half,
        Layer::Quarter,
        Layer::Eighth,
        Layer::Sixteenth,
        Layer::ThirtySecond,
    ];

    /// Number of 32nd-note steps between successive onsets
    pub const fn stride(self) -> usize {
        match self {
            Layer::Whole => 32,
            Layer::Half => 16,
            Layer::Quarter => 8,
            Layer::Eighth => 4,
            Layer::Sixteenth => 2,
            Layer::ThirtySecond => 1,
        }
    }

    /// Number of onsets per measure
    pub const fn subdivisions(self) -> usize {
        STEPS_PER_MEASURE / self.stride()
    }

    /// Sound this layer triggers
    pub const fn timbre(self) -> Timbre {
        match self {
            Layer::Whole => Timbre::Cymbal,
            Layer::Half => Timbre::Snare,
            Layer::Quarter => Timbre::Kick,
            Layer::Eighth => Timbre::Woodblock,
            Layer::Sixteenth => Timbre::HiHat,
            Layer::ThirtySecond => Timbre::Click,
        }
    }

    /// Whether this layer has an onset at `step` (a 32nd-note index)
    ///
    /// # Example
    /// ```
    /// use rhythmtree::engine::Layer;
    ///
    /// assert!(Layer::Quarter.fires_at(8));
    /// assert!(!Layer::Quarter.fires_at(4));
    /// assert!(Layer::Whole.fires_at(0));
    /// ```
    pub const fn fires_at(self, step: usize) -> bool {
        step % self.stride() == 0
    }

    /// Short display label
    pub const fn label(self) -> &'static str {
        match self {
            Layer::Whole => "Whole",
            Layer::Half => "Half",
            Layer::Quarter => "Quarter",
            Layer::Eighth => "8th",
            Layer::Sixteenth => "16th",
            Layer::ThirtySecond => "32nd",
        }
    }

    /// Canonical machine name, as accepted by [`FromStr`]
    pub const fn name(self) -> &'static str {
        match self {
            Layer::Whole => "whole",
            Layer::Half => "half",
            Layer::Quarter => "quarter",
            Layer::Eighth => "8th",
            Layer::Sixteenth => "16th",
            Layer::ThirtySecond => "32nd",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Layer {
    type Err = RhythmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whole" | "1" => Ok(Layer::Whole),
            "half" | "2" => Ok(Layer::Half),
            "quarter" | "4" => Ok(Layer::Quarter),
            "8th" | "eighth" | "8" => Ok(Layer::Eighth),
            "16th" | "sixteenth" | "16" => Ok(Layer::Sixteenth),
            "32nd" | "thirty-second" | "thirtysecond" | "32" => Ok(Layer::ThirtySecond),
            _ => Err(RhythmError::UnknownLayer {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Timbre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Timbre::Cymbal => "cymbal",
            Timbre::Snare => "snare",
            Timbre::Kick => "kick",
            Timbre::Woodblock => "woodblock",
            Timbre::HiHat => "hi-hat",
            Timbre::Click => "click",
        };
        f.write_str(name)
    }
}

// ============================================================================
// LayerSet
// ============================================================================

/// A set of active layers
///
/// Iteration always yields layers coarsest first, so triggers for one step
/// are submitted in a stable order regardless of how the set was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Layer>", into = "Vec<Layer>")]
pub struct LayerSet(u8);

impl LayerSet {
    /// The empty set
    pub const fn empty() -> Self {
        LayerSet(0)
    }

    /// Every layer
    pub const fn all() -> Self {
        LayerSet(0b0011_1111)
    }

    pub fn contains(&self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }

    pub fn insert(&mut self, layer: Layer) {
        self.0 |= layer.bit();
    }

    /// Flip membership of `layer`, returning whether it is now active
    pub fn toggle(&mut self, layer: Layer) -> bool {
        self.0 ^= layer.bit();
        self.contains(layer)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Layer> + '_ {
        Layer::ALL.into_iter().filter(move |layer| self.contains(*layer))
    }

    /// Layers of this set with an onset at `step`
    pub fn firing_at(&self, step: usize) -> impl Iterator<Item = Layer> + '_ {
        self.iter().filter(move |layer| layer.fires_at(step))
    }
}

impl FromIterator<Layer> for LayerSet {
    fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
        let mut set = LayerSet::empty();
        for layer in iter {
            set.insert(layer);
        }
        set
    }
}

impl From<Vec<Layer>> for LayerSet {
    fn from(layers: Vec<Layer>) -> Self {
        layers.into_iter().collect()
    }
}

impl From<LayerSet> for Vec<Layer> {
    fn from(set: LayerSet) -> Self {
        set.iter().collect()
    }
}

impl<const N: usize> From<[Layer; N]> for LayerSet {
    fn from(layers: [Layer; N]) -> Self {
        layers.into_iter().collect()
    }
}

impl FromStr for LayerSet {
    type Err = RhythmError;

    /// Parse a comma-separated list such as `quarter,16th`
    fn from_str(s: &str) -> Result<Self> {
        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Layer::from_str)
            .collect()
    }
}

impl fmt::Display for LayerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Layer::name).collect();
        f.write_str(&names.join(","))
    }
}
