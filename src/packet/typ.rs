use num_enum::TryFromPrimitive;

/// Represents all frame types this crate knows about.
///
/// The protocol is extensible: a frame whose type byte is not listed here
/// still passes framing and checksum validation, it just has no inbound
/// decoder and is ignored by the receiver.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PacketType {
    Gps = 0x02,
    BatterySensor = 0x08,
    BaroAltitude = 0x09,
    LinkStatistics = 0x14,
    RcChannelsPacked = 0x16,
    Attitude = 0x1E,
    FlightMode = 0x21,
}
