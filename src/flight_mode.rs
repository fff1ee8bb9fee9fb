//! Flight mode identifiers and the channel-range classifier

use crate::{RcChannelData, RC_CHANNEL_COUNT};
use num_enum::TryFromPrimitive;

/// Number of flight mode slots in the classifier table.
pub const FLIGHT_MODE_COUNT: usize = 8;

/// Represents the flight modes known to the telemetry text mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FlightModeId {
    Disarmed = 0,
    Acro,
    Angle,
    Horizon,
    Airmode,
    Failsafe,
    GpsRescue,
    Passthrough,
}

impl FlightModeId {
    /// Mode text shown on the handset telemetry screen.
    pub fn name(self) -> &'static str {
        match self {
            FlightModeId::Failsafe => "!FS!",
            FlightModeId::GpsRescue => "RTH",
            FlightModeId::Passthrough => "MANU",
            FlightModeId::Angle => "STAB",
            FlightModeId::Horizon => "HOR",
            FlightModeId::Airmode => "AIR",
            _ => "ACRO",
        }
    }

    /// Every mode except `Disarmed` flies armed.
    pub fn armed(self) -> bool {
        self != FlightModeId::Disarmed
    }
}

/// One classifier entry: a channel and the value range that selects the mode.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlightModeSlot {
    pub channel: u8,
    pub min: u16,
    pub max: u16,
}

/// Fixed-size table mapping channel value ranges to flight modes.
///
/// Slots are scanned in ascending id order and the first match wins, which
/// is the tie-break for overlapping ranges.
pub struct FlightModeTable {
    slots: [Option<FlightModeSlot>; FLIGHT_MODE_COUNT],
}

impl FlightModeTable {
    pub const fn new() -> Self {
        Self {
            slots: [None; FLIGHT_MODE_COUNT],
        }
    }

    /// Records the slot for `id`. Returns false and leaves the table
    /// untouched when the channel index is out of range.
    pub fn set(&mut self, id: FlightModeId, channel: u8, min: u16, max: u16) -> bool {
        if channel as usize >= RC_CHANNEL_COUNT {
            return false;
        }

        self.slots[id as usize] = Some(FlightModeSlot { channel, min, max });
        true
    }

    /// Returns the first configured mode whose channel value falls inside
    /// its `[min, max]` range, or `None` when nothing matches.
    pub fn classify(&self, channels: &RcChannelData) -> Option<FlightModeId> {
        for (id, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = slot {
                let value = channels.value(slot.channel);
                if (slot.min..=slot.max).contains(&value) {
                    return FlightModeId::try_from(id as u8).ok();
                }
            }
        }

        None
    }
}

impl Default for FlightModeTable {
    fn default() -> Self {
        Self::new()
    }
}
