//! FlightMode telemetry packet

use crate::{util::Buf, Error, PacketType, Payload};

const MAX_TEXT_LEN: usize = 15;

/// Represents a FlightMode packet: the mode text shown on the handset,
/// NUL terminated on the wire. Disarmed state is flagged by a trailing
/// `*`, the convention EdgeTX and Betaflight follow.
#[derive(Clone)]
pub struct FlightMode {
    text: Buf<MAX_TEXT_LEN>,
}

impl FlightMode {
    /// Builds a flight mode payload from the mode text and the armed state.
    pub fn new(text: &str, armed: bool) -> Self {
        let mut mode = Self { text: Buf::new() };
        mode.set(text, armed);
        mode
    }

    /// Replaces the mode text. Text that does not fit the 15 byte payload
    /// budget is truncated; the disarmed marker is always preserved.
    pub fn set(&mut self, text: &str, armed: bool) {
        let budget = if armed { MAX_TEXT_LEN } else { MAX_TEXT_LEN - 1 };

        self.text.clear();
        self.text.push_bytes(&text.as_bytes()[..text.len().min(budget)]);
        if !armed {
            self.text.push(b'*');
        }
    }

    /// The mode text as sent, disarmed marker included.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.text.as_slice()).unwrap_or("")
    }
}

impl Default for FlightMode {
    fn default() -> Self {
        Self::new("ACRO", false)
    }
}

impl core::fmt::Debug for FlightMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("FlightMode").field(&self.as_str()).finish()
    }
}

impl Payload for FlightMode {
    fn len(&self) -> usize {
        self.text.len() + 1
    }

    fn packet_type(&self) -> PacketType {
        PacketType::FlightMode
    }

    fn decode(buf: &[u8]) -> Result<Self, Error> {
        let end = buf.iter().position(|&b| b == 0).ok_or(Error::BufferError)?;

        let mut mode = Self { text: Buf::new() };
        mode.text.push_bytes(&buf[..end.min(MAX_TEXT_LEN)]);
        Ok(mode)
    }

    fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], Error> {
        let len = self.len();
        let data = buf.get_mut(..len).ok_or(Error::BufferError)?;

        data[..len - 1].copy_from_slice(self.text.as_slice());
        data[len - 1] = 0;

        Ok(data)
    }
}
