//! Fixed 50 GHz ITU-T G.694.1 channel grid for the C-band WSS.
//!
//! Channel `n` (1-95) is centered at `191350.0 + (n - 1) * 50.0` GHz and
//! occupies a 50 GHz passband, so `start = center - 25` and
//! `end = center + 25`. The grid is pure: nothing here performs I/O or keeps
//! state.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of channels on the grid.
pub const CHANNEL_QUANTITY: u32 = 95;

/// Center frequency of channel 1 in GHz.
pub const GRID_ANCHOR_GHZ: f64 = 191_350.0;

/// Spacing between adjacent channel centers in GHz.
pub const CHANNEL_SPACING_GHZ: f64 = 50.0;

/// Passband width of a single channel in GHz.
pub const CHANNEL_WIDTH_GHZ: f64 = 50.0;

/// Start, center and end frequency of a passband, in GHz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyWindow {
    pub start: f64,
    pub center: f64,
    pub end: f64,
}

impl FrequencyWindow {
    /// Returns the window as a `(start, center, end)` tuple.
    pub const fn as_tuple(&self) -> (f64, f64, f64) {
        (self.start, self.center, self.end)
    }

    /// Width of the passband in GHz.
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Returns true if `freq_ghz` falls inside `[start, end)`.
    pub fn contains(&self, freq_ghz: f64) -> bool {
        freq_ghz >= self.start && freq_ghz < self.end
    }
}

/// A channel index on the 95-channel grid.
///
/// # Examples
///
/// ```
/// use wdm_types::Channel;
///
/// let ch = Channel::new(4).unwrap();
/// assert_eq!(ch.center(), 191500.0);
///
/// assert!(Channel::new(0).is_err());
/// assert!(Channel::new(96).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Channel(u32);

impl Channel {
    /// First channel on the grid.
    pub const MIN: u32 = 1;

    /// Last channel on the grid.
    pub const MAX: u32 = CHANNEL_QUANTITY;

    /// Creates a channel, rejecting indexes outside 1-95.
    pub const fn new(index: u32) -> Result<Self, ParseError> {
        if index >= Self::MIN && index <= Self::MAX {
            Ok(Channel(index))
        } else {
            Err(ParseError::ChannelOutOfRange(index))
        }
    }

    /// Returns the channel index.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Center frequency in GHz.
    pub fn center(&self) -> f64 {
        GRID_ANCHOR_GHZ + f64::from(self.0 - 1) * CHANNEL_SPACING_GHZ
    }

    /// Full passband of this channel.
    pub fn window(&self) -> FrequencyWindow {
        let center = self.center();
        FrequencyWindow {
            start: center - CHANNEL_WIDTH_GHZ / 2.0,
            center,
            end: center + CHANNEL_WIDTH_GHZ / 2.0,
        }
    }

    /// Iterates over every channel in ascending order.
    pub fn all() -> impl Iterator<Item = Channel> {
        (Self::MIN..=Self::MAX).map(Channel)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CH{}", self.0)
    }
}

impl TryFrom<u32> for Channel {
    type Error = ParseError;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        Channel::new(index)
    }
}

impl From<Channel> for u32 {
    fn from(ch: Channel) -> u32 {
        ch.0
    }
}

/// Maps a channel index to its `(start, center, end)` window.
///
/// # Errors
///
/// Returns [`ParseError::ChannelOutOfRange`] for indexes outside 1-95.
pub fn channel_range(index: u32) -> Result<FrequencyWindow, ParseError> {
    Channel::new(index).map(|ch| ch.window())
}

/// Center frequencies of all 95 channels, ascending.
pub fn center_frequencies() -> Vec<f64> {
    Channel::all().map(|ch| ch.center()).collect()
}

/// Finds the channel whose passband contains `freq_ghz`.
///
/// Used to attribute OCM readings (which report a measured frequency) back to
/// a grid channel.
pub fn channel_for_frequency(freq_ghz: f64) -> Option<Channel> {
    let grid_start = GRID_ANCHOR_GHZ - CHANNEL_WIDTH_GHZ / 2.0;
    if !freq_ghz.is_finite() || freq_ghz < grid_start {
        return None;
    }
    let slot = ((freq_ghz - grid_start) / CHANNEL_SPACING_GHZ).floor() as u32;
    Channel::new(slot + 1).ok()
}
