//! RC channel state and unit conversions

use crate::RcChannelsPacked;

/// Number of channels carried by an RcChannelsPacked frame.
pub const RC_CHANNEL_COUNT: usize = 16;

/// AETR channel order
pub const RC_CHANNEL_ROLL: u8 = 0;
pub const RC_CHANNEL_PITCH: u8 = 1;
pub const RC_CHANNEL_THROTTLE: u8 = 2;
pub const RC_CHANNEL_YAW: u8 = 3;
/// First auxiliary channel, conventionally the arm switch.
pub const RC_CHANNEL_AUX1: u8 = 4;

// Two point linear fit of the stick range: 172 -> 988us, 1811 -> 2012us.
// Scale = (2012 - 988) / (1811 - 172), offset = 988 - 172 * scale.
const TICKS_TO_US_SCALE: f32 = 0.62477120195241;
const TICKS_TO_US_OFFSET: f32 = 881.0;

/// Converts a raw channel value to microseconds.
pub fn rc_to_us(rc: u16) -> u16 {
    (rc as f32 * TICKS_TO_US_SCALE + TICKS_TO_US_OFFSET + 0.5) as u16
}

/// Converts a microsecond value to a raw channel value.
pub fn us_to_rc(us: u16) -> u16 {
    let above_offset = (us as f32 - TICKS_TO_US_OFFSET).max(0.0);
    (above_offset / TICKS_TO_US_SCALE + 0.5) as u16
}

/// Startup value policy for the channel table, applied before the first
/// frame arrives. Forcing throttle and/or the arm switch to minimum keeps
/// a flight controller from arming or spinning motors on a stale center
/// value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelInit {
    CenterAll,
    ThrottleLow,
    ArmLow,
    ArmAndThrottleLow,
}

/// Decoded RC channel state, owned by the receiver and overwritten on every
/// successful channels frame.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RcChannelData {
    values: [u16; RC_CHANNEL_COUNT],
    /// True once at least one channels frame decoded since `begin`.
    pub valid: bool,
    /// True while no channels frame arrived within the failsafe window.
    pub failsafe: bool,
}

impl RcChannelData {
    pub const fn new() -> Self {
        Self {
            values: [0; RC_CHANNEL_COUNT],
            valid: false,
            failsafe: false,
        }
    }

    /// Applies the startup policy and clears the valid/failsafe flags.
    pub fn reset(&mut self, init: ChannelInit) {
        for (i, value) in self.values.iter_mut().enumerate() {
            let force_low = match init {
                ChannelInit::CenterAll => false,
                ChannelInit::ThrottleLow => i as u8 == RC_CHANNEL_THROTTLE,
                ChannelInit::ArmLow => i as u8 == RC_CHANNEL_AUX1,
                ChannelInit::ArmAndThrottleLow => {
                    i as u8 == RC_CHANNEL_THROTTLE || i as u8 == RC_CHANNEL_AUX1
                }
            };

            *value = if force_low {
                RcChannelsPacked::CHANNEL_VALUE_MIN
            } else {
                RcChannelsPacked::CHANNEL_VALUE_MID
            };
        }

        self.valid = false;
        self.failsafe = false;
    }

    /// Overwrites the table from a decoded channels frame.
    pub fn update(&mut self, channels: &RcChannelsPacked) {
        self.values = channels.0;
        self.valid = true;
        self.failsafe = false;
    }

    /// Raw value of a channel; out-of-range indices read as 0.
    pub fn value(&self, channel: u8) -> u16 {
        if (channel as usize) < RC_CHANNEL_COUNT {
            self.values[channel as usize]
        } else {
            0
        }
    }

    /// Channel value converted to microseconds; out-of-range indices read as 0.
    pub fn microseconds(&self, channel: u8) -> u16 {
        if (channel as usize) < RC_CHANNEL_COUNT {
            rc_to_us(self.values[channel as usize])
        } else {
            0
        }
    }

    /// The whole channel table.
    pub fn values(&self) -> &[u16; RC_CHANNEL_COUNT] {
        &self.values
    }
}

impl Default for RcChannelData {
    fn default() -> Self {
        Self::new()
    }
}
