//! Attitude telemetry packet

use crate::{
    util::{mut_array_start, ref_array_start},
    Error, PacketType, Payload,
};

/// Represents an Attitude packet. Angles are in 0.0001 rad units.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub struct Attitude {
    pub pitch: i16,
    pub roll: i16,
    pub yaw: i16,
}

const LEN: usize = 6;

/// The raw decoder (parser) for the Attitude packet.
fn raw_decode(data: &[u8; LEN]) -> Attitude {
    Attitude {
        pitch: i16::from_be_bytes([data[0], data[1]]),
        roll: i16::from_be_bytes([data[2], data[3]]),
        yaw: i16::from_be_bytes([data[4], data[5]]),
    }
}

/// The raw encoder (serializer) for the Attitude packet.
fn raw_encode(attitude: &Attitude, data: &mut [u8; LEN]) {
    data[0..2].copy_from_slice(&attitude.pitch.to_be_bytes());
    data[2..4].copy_from_slice(&attitude.roll.to_be_bytes());
    data[4..6].copy_from_slice(&attitude.yaw.to_be_bytes());
}

impl Payload for Attitude {
    fn len(&self) -> usize {
        LEN
    }

    fn packet_type(&self) -> PacketType {
        PacketType::Attitude
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
