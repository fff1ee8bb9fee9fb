//! Gps telemetry packet

use crate::{
    util::{mut_array_start, ref_array_start},
    Error, PacketType, Payload,
};

/// Represents a Gps packet
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gps {
    /// Latitude (LSB = 1e-7 degree)
    pub latitude: i32,
    /// Longitude (LSB = 1e-7 degree)
    pub longitude: i32,
    /// Ground speed (LSB = 0.1 km/h)
    pub groundspeed: u16,
    /// Ground course (LSB = 0.01 degree)
    pub heading: u16,
    /// Altitude in meters; carried with a +1000 offset on the wire
    pub altitude: i16,
    /// Number of satellites in use
    pub satellites: u8,
}

const LEN: usize = 15;

/// The raw decoder (parser) for the Gps packet.
fn raw_decode(data: &[u8; LEN]) -> Gps {
    Gps {
        latitude: i32::from_be_bytes([data[0], data[1], data[2], data[3]]),
        longitude: i32::from_be_bytes([data[4], data[5], data[6], data[7]]),
        groundspeed: u16::from_be_bytes([data[8], data[9]]),
        heading: u16::from_be_bytes([data[10], data[11]]),
        altitude: (u16::from_be_bytes([data[12], data[13]]) as i32 - 1000) as i16,
        satellites: data[14],
    }
}

/// The raw encoder (serializer) for the Gps packet.
fn raw_encode(gps: &Gps, data: &mut [u8; LEN]) {
    let altitude = (gps.altitude as i32 + 1000).clamp(0, u16::MAX as i32) as u16;

    data[0..4].copy_from_slice(&gps.latitude.to_be_bytes());
    data[4..8].copy_from_slice(&gps.longitude.to_be_bytes());
    data[8..10].copy_from_slice(&gps.groundspeed.to_be_bytes());
    data[10..12].copy_from_slice(&gps.heading.to_be_bytes());
    data[12..14].copy_from_slice(&altitude.to_be_bytes());
    data[14] = gps.satellites;
}

impl Payload for Gps {
    fn len(&self) -> usize {
        LEN
    }

    fn packet_type(&self) -> PacketType {
        PacketType::Gps
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
    use super::Gps;
    use crate::Payload;

    #[test]
    fn test_gps_frame() {
        let gps = Gps {
            latitude: 44_435_1234,    // 44.4351234 deg
            longitude: -26_102_4321,  // -26.1024321 deg
            groundspeed: 123,         // 12.3 km/h
            heading: 27000,           // 270.00 deg
            altitude: 520,
            satellites: 14,
        };

        let raw = gps.to_raw_packet().unwrap();

        let data = raw.as_slice();
        assert_eq!(data[1], 17);
        assert_eq!(data[2], 0x02);
        assert_eq!(&data[3..7], &444351234_i32.to_be_bytes());
        assert_eq!(&data[7..11], &(-261024321_i32).to_be_bytes());
        assert_eq!(&data[11..13], &123_u16.to_be_bytes());
        assert_eq!(&data[13..15], &27000_u16.to_be_bytes());
        assert_eq!(&data[15..17], &1520_u16.to_be_bytes());
        assert_eq!(data[17], 14);

        let parsed = Gps::decode(raw.payload().unwrap()).unwrap();
        assert_eq!(parsed, gps);
    }
}
