//! BatterySensor telemetry packet

use crate::{
    util::{mut_array_start, ref_array_start},
    Error, PacketType, Payload,
};

/// Represents a BatterySensor packet
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatterySensor {
    /// Voltage (LSB = 100 mV)
    pub voltage: u16,
    /// Current (LSB = 100 mA)
    pub current: u16,
    /// Capacity used (mAh), 24 bits on the wire
    pub capacity_used: u32,
    /// Battery remaining (percent)
    pub remaining: u8,
}

const LEN: usize = 8;

/// The raw decoder (parser) for the BatterySensor packet.
fn raw_decode(data: &[u8; LEN]) -> BatterySensor {
    BatterySensor {
        voltage: u16::from_be_bytes([data[0], data[1]]),
        current: u16::from_be_bytes([data[2], data[3]]),
        capacity_used: u32::from_be_bytes([0, data[4], data[5], data[6]]),
        remaining: data[7],
    }
}

/// The raw encoder (serializer) for the BatterySensor packet.
fn raw_encode(battery_sensor: &BatterySensor, data: &mut [u8; LEN]) {
    let capacity = battery_sensor.capacity_used.to_be_bytes();

    data[0..2].copy_from_slice(&battery_sensor.voltage.to_be_bytes());
    data[2..4].copy_from_slice(&battery_sensor.current.to_be_bytes());
    data[4] = capacity[1];
    data[5] = capacity[2];
    data[6] = capacity[3];
    data[7] = battery_sensor.remaining;
}

impl Payload for BatterySensor {
    fn len(&self) -> usize {
        LEN
    }

    fn packet_type(&self) -> PacketType {
        PacketType::BatterySensor
    }

    fn decode(buf: &[u8]) -> Result<Self, Error> {
        let data: &[u8; LEN] = ref_array_start(buf).ok_or(Error::BufferError)?;

        Ok(raw_decode(data))
    }

    fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], Error> {
        let data: &mut [u8; LEN] = mut_array_start(buf).ok_or(Error::BufferError)?;

        raw_encode(self, data);

        Ok(data)
    }
}
