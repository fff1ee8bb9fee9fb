use crate::{util::BytesReader, Error, Packet, RawPacket, CRC8, MAX_PACKET_LEN, SYNC_BYTE};

/// Struct for configuring a `Parser`.
#[non_exhaustive]
pub struct ParserConfig {
    /// Sync bytes accepted as the start of a frame. Default is `0xC8`.
    pub sync: &'static [u8],
}

impl ParserConfig {
    pub const fn default() -> Self {
        Self { sync: &[SYNC_BYTE] }
    }
}

/// State machine for reading a CRSF packet
///
/// +--------------+   +-------------+   +---------+
/// | AwaitingSync |-->| AwaitingLen |-->| Reading |
/// +--------------+   +-------------+   +---------+
///         ^                   |                |
///         |                   |                |
///         +-------------------+                |
///         +------------------------------------+
///
enum State {
    AwaitingSync,
    AwaitingLen,
    Reading { index: usize, len: usize },
}

// Minimum value of the length byte: type and crc bytes only
const MIN_LEN_BYTE: u8 = 2;
// Maximum value of the length byte: type, payload and crc bytes
const MAX_LEN_BYTE: u8 = MAX_PACKET_LEN as u8 - 2;

/// Struct for parsing CRSF packets out of a byte stream.
///
/// Bytes that precede a sync byte are discarded one at a time; a frame with
/// an out-of-range length byte or a bad checksum is dropped as a whole and
/// parsing resumes at the next sync byte after it. The parser holds a single
/// fixed-capacity frame buffer and never allocates.
pub struct Parser {
    config: ParserConfig,
    state: State,
    raw: RawPacket,
}

impl Parser {
    /// Creates a new `Parser` struct.
    pub const fn new(config: ParserConfig) -> Self {
        Self {
            config,
            state: State::AwaitingSync,
            raw: RawPacket::empty(),
        }
    }

    /// Resets the parser's state.
    ///
    /// Useful in situations when a timeout is triggered but a packet is not
    /// fully parsed.
    pub fn reset(&mut self) {
        self.state = State::AwaitingSync;
    }

    /// Consumes a byte and returns a parsed packet if one is available.
    pub fn push_byte(&mut self, byte: u8) -> Option<Result<Packet, Error>> {
        match self.push_byte_raw(byte) {
            Some(Ok(raw)) => Some(raw.to_packet()),
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }

    /// Consumes a byte and returns a raw (not parsed) packet if one is available.
    pub fn push_byte_raw(&mut self, byte: u8) -> Option<Result<&RawPacket, Error>> {
        match self.state {
            State::AwaitingSync => {
                if self.config.sync.contains(&byte) {
                    self.raw.buf[0] = byte;
                    self.state = State::AwaitingLen;
                }
            }
            State::AwaitingLen => {
                if (MIN_LEN_BYTE..=MAX_LEN_BYTE).contains(&byte) {
                    self.raw.buf[1] = byte;
                    self.state = State::Reading {
                        index: 2,
                        len: 2 + byte as usize,
                    };
                } else {
                    self.state = State::AwaitingSync;
                    return Some(Err(Error::InvalidLength { len: byte }));
                }
            }
            State::Reading { index, len } => {
                self.raw.buf[index] = byte;

                if index == len - 1 {
                    self.state = State::AwaitingSync;
                    self.raw.len = len;

                    return Some(self.check_frame());
                } else {
                    self.state = State::Reading {
                        index: index + 1,
                        len,
                    };
                }
            }
        }

        None
    }

    /// Consumes a slice of bytes and returns a parsed packet if one is
    /// available, along with the unprocessed part of the input. It's
    /// optimized for reading multiple bytes at a time.
    pub fn push_bytes<'b>(&mut self, data: &'b [u8]) -> Option<(Result<Packet, Error>, &'b [u8])> {
        match self.push_bytes_raw(data) {
            Some((Ok(raw), remaining)) => Some((raw.to_packet(), remaining)),
            Some((Err(e), remaining)) => Some((Err(e), remaining)),
            None => None,
        }
    }

    /// Consumes a slice of bytes and returns a raw (not parsed) packet if one
    /// is available, along with the unprocessed part of the input.
    pub fn push_bytes_raw<'a, 'b>(
        &'a mut self,
        data: &'b [u8],
    ) -> Option<(Result<&'a RawPacket, Error>, &'b [u8])> {
        let mut reader = BytesReader::new(data);

        loop {
            match self.state {
                State::AwaitingSync => {
                    while let Some(byte) = reader.next() {
                        if self.config.sync.contains(&byte) {
                            self.raw.buf[0] = byte;
                            self.state = State::AwaitingLen;
                            break;
                        }
                    }

                    if reader.is_empty() {
                        return None;
                    }
                }
                State::AwaitingLen => {
                    let byte = reader.next()?;

                    if (MIN_LEN_BYTE..=MAX_LEN_BYTE).contains(&byte) {
                        self.raw.buf[1] = byte;
                        self.state = State::Reading {
                            index: 2,
                            len: 2 + byte as usize,
                        };
                    } else {
                        self.state = State::AwaitingSync;
                        return Some((
                            Err(Error::InvalidLength { len: byte }),
                            reader.remaining(),
                        ));
                    }
                }
                State::Reading { index, len } => {
                    if reader.is_empty() {
                        return None;
                    }

                    let available = reader.next_n(len - index);
                    self.raw.buf[index..index + available.len()].copy_from_slice(available);

                    if index + available.len() == len {
                        self.state = State::AwaitingSync;
                        self.raw.len = len;

                        let remaining = reader.remaining();
                        break Some((self.check_frame(), remaining));
                    } else {
                        self.state = State::Reading {
                            index: index + available.len(),
                            len,
                        };
                    }
                }
            }
        }
    }

    /// Returns an iterator over all the packets in the provided buffer.
    pub fn iter_packets<'a, 'b>(&'a mut self, data: &'b [u8]) -> PacketIterator<'a, 'b> {
        PacketIterator {
            parser: self,
            remaining_data: data,
        }
    }

    // Validates the checksum of the completed frame in `raw`.
    fn check_frame(&self) -> Result<&RawPacket, Error> {
        let len = self.raw.len;
        let expected = self.raw.buf[len - 1];
        let actual = CRC8.checksum(&self.raw.buf[2..len - 1]);

        if actual == expected {
            Ok(&self.raw)
        } else {
            Err(Error::ChecksumMismatch { expected, actual })
        }
    }
}

/// Iterator for packets in a given buffer. This struct is created by the
/// `iter_packets` method of a `Parser`.
pub struct PacketIterator<'a, 'b> {
    parser: &'a mut Parser,
    remaining_data: &'b [u8],
}

impl Iterator for PacketIterator<'_, '_> {
    type Item = Result<Packet, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((result, remaining_data)) = self.parser.push_bytes(self.remaining_data) {
            self.remaining_data = remaining_data;
            Some(result)
        } else {
            None
        }
    }
}
