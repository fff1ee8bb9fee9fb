//! BaroAltitude telemetry packet

use crate::{
    util::{mut_array_start, ref_array_start},
    Error, PacketType, Payload,
};

/// Represents a BaroAltitude packet: barometric altitude plus vertical speed.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaroAltitude {
    /// Altitude in decimeters above the zero reference.
    pub altitude_dm: i32,
    /// Vertical speed in cm/s.
    pub vario_cms: i16,
}

const LEN: usize = 4;

// The altitude field has two encodings selected by the high bit: clear means
// decimeters with a +10000 offset (covers -1000m..~2276m), set means whole
// meters. Handsets decode both.
fn pack_altitude(altitude_dm: i32) -> u16 {
    match altitude_dm + 10000 {
        v @ 0..=0x7FFF => v as u16,
        v if v < 0 => 0,
        _ => 0x8000 | (altitude_dm / 10).min(0x7FFF) as u16,
    }
}

fn unpack_altitude(packed: u16) -> i32 {
    if packed & 0x8000 != 0 {
        ((packed & 0x7FFF) as i32) * 10
    } else {
        packed as i32 - 10000
    }
}

/// The raw decoder (parser) for the BaroAltitude packet.
fn raw_decode(data: &[u8; LEN]) -> BaroAltitude {
    BaroAltitude {
        altitude_dm: unpack_altitude(u16::from_be_bytes([data[0], data[1]])),
        vario_cms: i16::from_be_bytes([data[2], data[3]]),
    }
}

/// The raw encoder (serializer) for the BaroAltitude packet.
fn raw_encode(baro_altitude: &BaroAltitude, data: &mut [u8; LEN]) {
    data[0..2].copy_from_slice(&pack_altitude(baro_altitude.altitude_dm).to_be_bytes());
    data[2..4].copy_from_slice(&baro_altitude.vario_cms.to_be_bytes());
}

impl Payload for BaroAltitude {
    fn len(&self) -> usize {
        LEN
    }

    fn packet_type(&self) -> PacketType {
        PacketType::BaroAltitude
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

#[cfg(test)]
mod tests {
    use super::{pack_altitude, unpack_altitude, BaroAltitude};
    use crate::Payload;

    #[test]
    fn test_altitude_packing() {
        // Decimeter format around the offset
        assert_eq!(pack_altitude(0), 10000);
        assert_eq!(pack_altitude(-100), 9900);
        assert_eq!(pack_altitude(1000), 11000);
        // Below the representable floor
        assert_eq!(pack_altitude(-20000), 0);
        // Past the decimeter window the meter format takes over
        let high = pack_altitude(30000);
        assert_eq!(high & 0x8000, 0x8000);
        assert_eq!(unpack_altitude(high), 30000);
    }

    #[test]
    fn test_baro_altitude_frame() {
        let baro = BaroAltitude {
            altitude_dm: 1234,
            vario_cms: -250,
        };

        let raw = baro.to_raw_packet().unwrap();

        let data = raw.as_slice();
        assert_eq!(data[1], 6);
        assert_eq!(data[2], 0x09);
        assert_eq!(&data[3..5], &11234_u16.to_be_bytes());
        assert_eq!(&data[5..7], &(-250_i16).to_be_bytes());

        let parsed = BaroAltitude::decode(raw.payload().unwrap()).unwrap();
        assert_eq!(parsed, baro);
    }
}
