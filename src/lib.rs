//! This crate provides a `no-std` serial receiver for the CRSF protocol.
//!
//! The protocol engine is split in two layers. The lower layer parses and
//! serializes CRSF frames ([`Parser`], the types in the packet module) and
//! can be used on its own. The upper layer ([`SerialReceiver`]) drives a
//! byte transport, decodes RC channels and link statistics, classifies
//! flight modes and schedules outbound telemetry.
//!
//! # Usage
//! ### Frame parsing
//! ```rust
//! use crsf_receiver::{Parser, ParserConfig, Packet, RcChannelsPacked};
//!
//! let mut parser = Parser::new(ParserConfig::default());
//! let data: &[&[u8]] = &[&[0xC8, 24, 0x16], &[0; 22], &[239]];
//! for input_buf in data {
//!     for result in parser.iter_packets(input_buf) {
//!         match result {
//!             Ok(Packet::RcChannelsPacked(ch)) => assert_eq!(ch, RcChannelsPacked([0u16; 16])),
//!             e => panic!("this data should parse succesfully: {e:?}"),
//!         }
//!     }
//! }
//! ```
//! ### Frame serialization
//! ```rust
//! use crsf_receiver::{Payload, RcChannelsPacked, SYNC_BYTE};
//!
//! let packet = RcChannelsPacked([1500; 16]);
//! let raw = packet.to_raw_packet().unwrap();
//! // raw.as_slice() is ready to be written to the wire
//! assert_eq!(raw.as_slice()[0], SYNC_BYTE);
//! ```

#![no_std]

use snafu::Snafu;

mod packet;
pub use packet::*;

mod parser;
pub use parser::*;

mod channels;
pub use channels::*;

mod flight_mode;
pub use flight_mode::*;

mod telemetry;
pub use telemetry::*;

mod receiver;
pub use receiver::*;

mod util;

/// Default sync byte; outbound telemetry frames carry it as well.
pub const SYNC_BYTE: u8 = 0xC8;
/// Maximum size of a whole frame, sync and length bytes included.
pub const MAX_PACKET_LEN: usize = 64;

pub(crate) const CRC8: crc::Crc<u8> = crc::Crc::<u8>::new(&crc::CRC_8_DVB_S2);

/// Enum of errors produced by this crate.
#[non_exhaustive]
#[derive(Debug, PartialEq, Snafu)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[snafu(display("Invalid frame length {len}"))]
    InvalidLength { len: u8 },
    #[snafu(display("Crc checksum mismatch: expected {expected:#04x}, got {actual:#04x}"))]
    ChecksumMismatch { expected: u8, actual: u8 },
    #[snafu(display("Unknown frame type {typ:#04x}"))]
    UnknownType { typ: u8 },
    #[snafu(display("No inbound decoder for frame type {typ:?}"))]
    UnimplementedType { typ: PacketType },
    #[snafu(display("Buffer too small for the payload"))]
    BufferError,
    #[snafu(display("Devboard is not supported by the CRSF protocol"))]
    UnsupportedBoard,
}
