use crate::{Error, PacketType, RawPacket, CRC8, MAX_PACKET_LEN, SYNC_BYTE};

mod rc_channels;
pub use rc_channels::*;

mod link_statistics;
pub use link_statistics::*;

mod attitude;
pub use attitude::*;

mod baro_altitude;
pub use baro_altitude::*;

mod battery_sensor;
pub use battery_sensor::*;

mod gps;
pub use gps::*;

mod flight_mode;
pub use flight_mode::*;

/// Trait implemented by all payload types.
pub trait Payload: Sized {
    /// Payload length on the wire, in bytes.
    fn len(&self) -> usize;

    /// Frame type associated with this payload.
    fn packet_type(&self) -> PacketType;

    /// Decodes a payload from the start of `buf`.
    fn decode(buf: &[u8]) -> Result<Self, Error>;

    /// Encodes the payload into the start of `buf` and returns the written part.
    fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], Error>;

    /// Builds a whole frame around this payload, using the default sync byte.
    fn to_raw_packet(&self) -> Result<RawPacket, Error> {
        self.to_raw_packet_with_sync(SYNC_BYTE)
    }

    /// Builds a whole frame around this payload, using the given sync byte.
    fn to_raw_packet_with_sync(&self, sync_byte: u8) -> Result<RawPacket, Error> {
        let len = self.len();
        if len + 4 > MAX_PACKET_LEN {
            return Err(Error::BufferError);
        }

        let mut raw = RawPacket::empty();
        raw.buf[0] = sync_byte;
        raw.buf[1] = len as u8 + 2;
        raw.buf[2] = self.packet_type() as u8;
        self.encode(&mut raw.buf[3..3 + len])?;
        raw.buf[3 + len] = CRC8.checksum(&raw.buf[2..3 + len]);
        raw.len = len + 4;

        Ok(raw)
    }
}
