//! The serial receiver: drives a byte transport through the parser and
//! routes decoded frames to the registered handler.

use crate::{
    ChannelInit, Error, FlightModeId, FlightModeTable, LinkStatistics, Packet, Parser,
    ParserConfig, RcChannelData, Telemetry, TelemetryConfig, SYNC_BYTE,
};

/// Byte transport the receiver runs on, typically a UART.
///
/// All operations are non-blocking; `try_read_byte` answers "byte available
/// or not" and never waits.
pub trait Transport {
    fn begin(&mut self, baud: u32);
    fn end(&mut self);
    fn try_read_byte(&mut self) -> Option<u8>;
    fn write_bytes(&mut self, data: &[u8]);
    fn flush_input(&mut self);
}

/// Devboard compatibility lookup, consulted once during `begin`.
pub trait BoardSupport {
    /// Identifier of the board the code runs on.
    fn device_id(&self) -> &str;

    /// Whether the given board can drive a CRSF capable UART.
    fn is_supported(&self, device: &str) -> bool;
}

/// Handler for decoded events, registered at construction and invoked
/// synchronously. Each method fires at most once per `process_frames` call.
pub trait EventHandler {
    fn on_rc_channels(&mut self, _channels: &RcChannelData) {}
    fn on_link_statistics(&mut self, _stats: &LinkStatistics) {}
    fn on_flight_mode(&mut self, _mode: FlightModeId) {}
}

/// Receiver configuration, resolved once at construction.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Sync bytes accepted as the start of a frame.
    pub sync: &'static [u8],
    /// UART baud rate; 420k is the ELRS/Crossfire standard rate.
    pub baud: u32,
    /// Decode RC channel frames and report them to the handler.
    pub rc_channels: bool,
    /// Decode link statistics frames and report them to the handler.
    pub link_statistics: bool,
    /// Startup value policy for the channel table.
    pub channel_init: ChannelInit,
    /// Without a valid channels frame for this long, failsafe goes up.
    pub failsafe_timeout_ms: u32,
    /// Outbound telemetry setup; an empty sensor set disables telemetry.
    pub telemetry: TelemetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync: &[SYNC_BYTE],
            baud: 420_000,
            rc_channels: true,
            link_statistics: true,
            channel_init: ChannelInit::ArmAndThrottleLow,
            failsafe_timeout_ms: 1000,
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// The CRSF serial receiver.
///
/// Poll driven: the integrator's control loop calls
/// [`process_frames`](Self::process_frames) with a monotonic millisecond
/// timestamp; everything runs synchronously on the caller, nothing blocks.
pub struct SerialReceiver<T: Transport, E: EventHandler> {
    transport: T,
    handler: E,
    config: Config,
    parser: Parser,
    channels: RcChannelData,
    flight_modes: FlightModeTable,
    telemetry: Option<Telemetry>,
    link_statistics: Option<LinkStatistics>,
    last_rc_frame_ms: u32,
    running: bool,
}

impl<T: Transport, E: EventHandler> SerialReceiver<T, E> {
    pub fn new(transport: T, handler: E, config: Config) -> Self {
        let telemetry =
            (!config.telemetry.sensors.is_empty()).then(|| Telemetry::new(config.telemetry));

        Self {
            transport,
            handler,
            parser: Parser::new(ParserConfig { sync: config.sync }),
            channels: RcChannelData::new(),
            flight_modes: FlightModeTable::new(),
            telemetry,
            link_statistics: None,
            last_rc_frame_ms: 0,
            running: false,
            config,
        }
    }

    /// Validates the board, applies the channel startup policy and opens
    /// the transport. After a failure the receiver stays down; only
    /// [`end`](Self::end) remains meaningful.
    pub fn begin(&mut self, board: &dyn BoardSupport) -> Result<(), Error> {
        if !board.is_supported(board.device_id()) {
            return Err(Error::UnsupportedBoard);
        }

        self.channels.reset(self.config.channel_init);
        self.parser.reset();
        self.link_statistics = None;
        self.last_rc_frame_ms = 0;

        self.transport.begin(self.config.baud);
        self.transport.flush_input();
        self.running = true;

        Ok(())
    }

    /// Flushes and closes the transport. Safe to call repeatedly.
    pub fn end(&mut self) {
        if !self.running {
            return;
        }

        self.transport.flush_input();
        self.transport.end();
        self.running = false;
    }

    /// Drains the currently buffered input through the parser and
    /// dispatches at most one completed frame.
    ///
    /// `now_ms` is the integrator's monotonic millisecond clock; it paces
    /// the telemetry scheduler and the failsafe window. Malformed frames
    /// are dropped silently and parsing resyncs on the next sync byte.
    pub fn process_frames(&mut self, now_ms: u32) {
        if !self.running {
            return;
        }

        while let Some(byte) = self.transport.try_read_byte() {
            match self.parser.push_byte(byte) {
                Some(Ok(packet)) => {
                    // Unread bytes of this burst would straddle the next
                    // poll; drop them and resync on the following frame.
                    self.transport.flush_input();
                    self.dispatch(packet, now_ms);

                    if let Some(telemetry) = self.telemetry.as_mut() {
                        if telemetry.update(now_ms) {
                            telemetry.send_telemetry_data(&mut self.transport);
                        }
                    }
                }
                Some(Err(_)) | None => {}
            }
        }

        if self.config.rc_channels && self.channels.valid {
            self.channels.failsafe =
                now_ms.wrapping_sub(self.last_rc_frame_ms) > self.config.failsafe_timeout_ms;
        }
    }

    fn dispatch(&mut self, packet: Packet, now_ms: u32) {
        match packet {
            Packet::RcChannelsPacked(channels) if self.config.rc_channels => {
                self.channels.update(&channels);
                self.last_rc_frame_ms = now_ms;
                self.handler.on_rc_channels(&self.channels);
            }
            Packet::LinkStatistics(stats) if self.config.link_statistics => {
                self.handler.on_link_statistics(&stats);
                self.link_statistics = Some(stats);
            }
            _ => {}
        }
    }

    /// Reads a channel, raw or converted to microseconds. Out-of-range
    /// indices read as 0.
    pub fn read_rc_channel(&self, channel: u8, raw: bool) -> u16 {
        if raw {
            self.channels.value(channel)
        } else {
            self.channels.microseconds(channel)
        }
    }

    /// Raw value of a channel; shorthand for `read_rc_channel(channel, true)`.
    pub fn get_channel(&self, channel: u8) -> u16 {
        self.read_rc_channel(channel, true)
    }

    /// The decoded channel state.
    pub fn rc_channels(&self) -> &RcChannelData {
        &self.channels
    }

    /// The most recent link statistics, if any arrived since `begin`.
    pub fn link_statistics(&self) -> Option<&LinkStatistics> {
        self.link_statistics.as_ref()
    }

    /// The registered event handler.
    pub fn handler(&self) -> &E {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut E {
        &mut self.handler
    }

    /// Records a classifier slot for `id`. Returns false and leaves the
    /// table untouched when the channel index is out of range.
    pub fn set_flight_mode(&mut self, id: FlightModeId, channel: u8, min: u16, max: u16) -> bool {
        self.flight_modes.set(id, channel, min, max)
    }

    /// Classifies the current channel values and reports the first
    /// matching mode to the handler; nothing fires when no range matches.
    pub fn handle_flight_mode(&mut self) {
        if let Some(id) = self.flight_modes.classify(&self.channels) {
            self.handler.on_flight_mode(id);
        }
    }

    /// Stages attitude telemetry, in 0.0001 rad units.
    pub fn telemetry_write_attitude(&mut self, roll: i16, pitch: i16, yaw: i16) {
        if let Some(telemetry) = self.telemetry.as_mut() {
            telemetry.set_attitude_data(roll, pitch, yaw);
        }
    }

    /// Stages barometric altitude (decimeters) and vertical speed (cm/s).
    pub fn telemetry_write_baro_altitude(&mut self, altitude_dm: i32, vario_cms: i16) {
        if let Some(telemetry) = self.telemetry.as_mut() {
            telemetry.set_baro_altitude_data(altitude_dm, vario_cms);
        }
    }

    /// Stages battery telemetry, in millivolts and milliamps.
    pub fn telemetry_write_battery(
        &mut self,
        voltage_mv: u32,
        current_ma: u32,
        capacity_mah: u32,
        remaining: u8,
    ) {
        if let Some(telemetry) = self.telemetry.as_mut() {
            telemetry.set_battery_data(voltage_mv, current_ma, capacity_mah, remaining);
        }
    }

    /// Stages a GPS fix; see [`Telemetry::set_gps_data`] for units.
    pub fn telemetry_write_gps(
        &mut self,
        latitude: i32,
        longitude: i32,
        altitude: i16,
        groundspeed: u16,
        heading: u16,
        satellites: u8,
    ) {
        if let Some(telemetry) = self.telemetry.as_mut() {
            telemetry.set_gps_data(latitude, longitude, altitude, groundspeed, heading, satellites);
        }
    }

    /// Stages flight mode telemetry from a mode id, deriving the handset
    /// text and the armed state.
    pub fn telemetry_write_flight_mode(&mut self, id: FlightModeId) {
        if let Some(telemetry) = self.telemetry.as_mut() {
            telemetry.set_flight_mode_data(id.name(), id.armed());
        }
    }

    /// Stages flight mode telemetry with free-form text.
    pub fn telemetry_write_custom_flight_mode(&mut self, text: &str, armed: bool) {
        if let Some(telemetry) = self.telemetry.as_mut() {
            telemetry.set_flight_mode_data(text, armed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Payload, RcChannelsPacked, TelemetrySensors};

    struct MockTransport {
        rx: [u8; 256],
        rx_len: usize,
        rx_pos: usize,
        tx: [u8; 256],
        tx_len: usize,
        began_with: Option<u32>,
        ended: usize,
        input_flushes: usize,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                rx: [0; 256],
                rx_len: 0,
                rx_pos: 0,
                tx: [0; 256],
                tx_len: 0,
                began_with: None,
                ended: 0,
                input_flushes: 0,
            }
        }

        fn feed(&mut self, data: &[u8]) {
            self.rx[self.rx_len..self.rx_len + data.len()].copy_from_slice(data);
            self.rx_len += data.len();
        }
    }

    impl Transport for MockTransport {
        fn begin(&mut self, baud: u32) {
            self.began_with = Some(baud);
        }

        fn end(&mut self) {
            self.ended += 1;
        }

        fn try_read_byte(&mut self) -> Option<u8> {
            if self.rx_pos < self.rx_len {
                let byte = self.rx[self.rx_pos];
                self.rx_pos += 1;
                Some(byte)
            } else {
                None
            }
        }

        fn write_bytes(&mut self, data: &[u8]) {
            self.tx[self.tx_len..self.tx_len + data.len()].copy_from_slice(data);
            self.tx_len += data.len();
        }

        fn flush_input(&mut self) {
            self.rx_pos = self.rx_len;
            self.input_flushes += 1;
        }
    }

    #[derive(Default)]
    struct CountingHandler {
        rc_frames: usize,
        first_channel: u16,
        link_frames: usize,
        last_mode: Option<FlightModeId>,
        mode_events: usize,
    }

    impl EventHandler for CountingHandler {
        fn on_rc_channels(&mut self, channels: &RcChannelData) {
            self.rc_frames += 1;
            self.first_channel = channels.value(0);
        }

        fn on_link_statistics(&mut self, _stats: &LinkStatistics) {
            self.link_frames += 1;
        }

        fn on_flight_mode(&mut self, mode: FlightModeId) {
            self.mode_events += 1;
            self.last_mode = Some(mode);
        }
    }

    struct TestBoard {
        supported: bool,
    }

    impl BoardSupport for TestBoard {
        fn device_id(&self) -> &str {
            "test-devboard"
        }

        fn is_supported(&self, device: &str) -> bool {
            self.supported && device == "test-devboard"
        }
    }

    fn started_receiver(config: Config) -> SerialReceiver<MockTransport, CountingHandler> {
        let mut receiver =
            SerialReceiver::new(MockTransport::new(), CountingHandler::default(), config);
        receiver
            .begin(&TestBoard { supported: true })
            .expect("begin should succeed");
        receiver
    }

    fn rc_frame(channels: [u16; 16]) -> [u8; 26] {
        let mut frame = [0u8; 26];
        frame.copy_from_slice(
            RcChannelsPacked(channels)
                .to_raw_packet()
                .unwrap()
                .as_slice(),
        );
        frame
    }

    #[test]
    fn test_begin_rejects_unsupported_board() {
        let mut receiver = SerialReceiver::new(
            MockTransport::new(),
            CountingHandler::default(),
            Config::default(),
        );

        let result = receiver.begin(&TestBoard { supported: false });
        assert_eq!(result, Err(Error::UnsupportedBoard));

        // Not running: frames fed later are not consumed
        receiver.transport.feed(&rc_frame([1000; 16]));
        receiver.process_frames(0);
        assert_eq!(receiver.handler().rc_frames, 0);

        // end() is still callable after a failed begin
        receiver.end();
    }

    #[test]
    fn test_begin_opens_transport_at_configured_baud() {
        let receiver = started_receiver(Config::default());
        assert_eq!(receiver.transport.began_with, Some(420_000));
    }

    #[test]
    fn test_rc_frame_scenario() {
        let mut receiver = started_receiver(Config::default());

        // [sync][len][type][22 byte payload][crc] with an all-zero payload
        let mut frame = [0u8; 26];
        frame[0] = 0xC8;
        frame[1] = 0x18;
        frame[2] = 0x16;
        frame[25] = 239;

        receiver.transport.feed(&frame);
        receiver.process_frames(0);

        assert_eq!(receiver.handler().rc_frames, 1);
        assert_eq!(receiver.handler().first_channel, 0);
        assert!(receiver.rc_channels().valid);
        assert_eq!(receiver.get_channel(0), 0);
    }

    #[test]
    fn test_corrupt_frame_drops_then_recovers() {
        let mut receiver = started_receiver(Config::default());

        let mut corrupt = rc_frame([1500; 16]);
        corrupt[25] ^= 0x01;
        receiver.transport.feed(&corrupt);
        receiver.process_frames(0);
        assert_eq!(receiver.handler().rc_frames, 0);

        receiver.transport.feed(&rc_frame([1500; 16]));
        receiver.process_frames(10);
        assert_eq!(receiver.handler().rc_frames, 1);
        assert_eq!(receiver.get_channel(3), 1500);
    }

    #[test]
    fn test_one_frame_per_burst() {
        let mut receiver = started_receiver(Config::default());

        // Two complete frames in the same burst: the second is flushed away
        receiver.transport.feed(&rc_frame([1000; 16]));
        receiver.transport.feed(&rc_frame([2000; 16]));
        receiver.process_frames(0);

        assert_eq!(receiver.handler().rc_frames, 1);
        assert_eq!(receiver.get_channel(0), 1000);
        // begin flushed once, the completed frame once more
        assert_eq!(receiver.transport.input_flushes, 2);

        // The next burst is picked up normally
        receiver.transport.feed(&rc_frame([2000; 16]));
        receiver.process_frames(10);
        assert_eq!(receiver.handler().rc_frames, 2);
        assert_eq!(receiver.get_channel(0), 2000);
    }

    #[test]
    fn test_link_statistics_dispatch() {
        let mut receiver = started_receiver(Config::default());

        let frame = [0xC8, 12, 0x14, 16, 19, 99, 151, 1, 2, 3, 8, 88, 148, 252];
        receiver.transport.feed(&frame);
        receiver.process_frames(0);

        assert_eq!(receiver.handler().link_frames, 1);
        let stats = receiver.link_statistics().expect("stats expected");
        assert_eq!(stats.uplink_rssi_1, 16);
        assert_eq!(stats.uplink_snr, -105);
        assert_eq!(stats.downlink_link_quality, 88);
    }

    #[test]
    fn test_disabled_categories_are_ignored() {
        let mut receiver = started_receiver(Config {
            rc_channels: false,
            link_statistics: false,
            ..Config::default()
        });

        receiver.transport.feed(&rc_frame([1000; 16]));
        receiver.process_frames(0);
        receiver
            .transport
            .feed(&[0xC8, 12, 0x14, 16, 19, 99, 151, 1, 2, 3, 8, 88, 148, 252]);
        receiver.process_frames(10);

        assert_eq!(receiver.handler().rc_frames, 0);
        assert_eq!(receiver.handler().link_frames, 0);
    }

    #[test]
    fn test_unknown_frame_type_is_a_no_op() {
        let mut receiver = started_receiver(Config::default());

        let crc = crate::CRC8.checksum(&[0x7F, 0xAA]);
        receiver.transport.feed(&[0xC8, 3, 0x7F, 0xAA, crc]);
        receiver.process_frames(0);

        assert_eq!(receiver.handler().rc_frames, 0);
        assert_eq!(receiver.handler().link_frames, 0);

        // The stream keeps working afterwards
        receiver.transport.feed(&rc_frame([992; 16]));
        receiver.process_frames(10);
        assert_eq!(receiver.handler().rc_frames, 1);
    }

    #[test]
    fn test_failsafe_after_timeout() {
        let mut receiver = started_receiver(Config::default());

        receiver.transport.feed(&rc_frame([1200; 16]));
        receiver.process_frames(0);
        assert!(!receiver.rc_channels().failsafe);

        receiver.process_frames(500);
        assert!(!receiver.rc_channels().failsafe);

        receiver.process_frames(1500);
        assert!(receiver.rc_channels().failsafe);

        // A fresh frame clears the condition
        receiver.transport.feed(&rc_frame([1200; 16]));
        receiver.process_frames(1600);
        assert!(!receiver.rc_channels().failsafe);
    }

    #[test]
    fn test_telemetry_sent_after_frame() {
        let mut receiver = started_receiver(Config {
            telemetry: TelemetryConfig {
                sensors: TelemetrySensors::ATTITUDE,
                interval_ms: 100,
            },
            ..Config::default()
        });

        receiver.telemetry_write_attitude(100, -100, 3000);

        // No telemetry without an inbound frame to pace against
        receiver.process_frames(200);
        assert_eq!(receiver.transport.tx_len, 0);

        receiver.transport.feed(&rc_frame([992; 16]));
        receiver.process_frames(300);

        let tx = &receiver.transport.tx[..receiver.transport.tx_len];
        assert_eq!(tx[0], 0xC8);
        assert_eq!(tx[2], 0x1E);
        // pitch, roll, yaw order on the wire
        assert_eq!(&tx[3..5], &(-100_i16).to_be_bytes());
        assert_eq!(&tx[5..7], &100_i16.to_be_bytes());
        assert_eq!(&tx[7..9], &3000_i16.to_be_bytes());
    }

    #[test]
    fn test_telemetry_disabled_with_empty_sensor_set() {
        let mut receiver = started_receiver(Config {
            telemetry: TelemetryConfig {
                sensors: TelemetrySensors::empty(),
                interval_ms: 100,
            },
            ..Config::default()
        });

        receiver.telemetry_write_attitude(1, 2, 3);
        receiver.transport.feed(&rc_frame([992; 16]));
        receiver.process_frames(1000);

        assert_eq!(receiver.transport.tx_len, 0);
    }

    #[test]
    fn test_flight_mode_handling() {
        let mut receiver = started_receiver(Config::default());

        assert!(!receiver.set_flight_mode(FlightModeId::Angle, 16, 0, 2047));
        assert!(receiver.set_flight_mode(FlightModeId::Disarmed, 4, 172, 991));
        assert!(receiver.set_flight_mode(FlightModeId::Angle, 4, 992, 1500));
        assert!(receiver.set_flight_mode(FlightModeId::Acro, 4, 1501, 1811));

        let mut channels = [992u16; 16];
        channels[4] = 1300;
        receiver.transport.feed(&rc_frame(channels));
        receiver.process_frames(0);

        receiver.handle_flight_mode();
        assert_eq!(receiver.handler().last_mode, Some(FlightModeId::Angle));
        assert_eq!(receiver.handler().mode_events, 1);

        // No slot covers 2000: the handler stays quiet
        let mut channels = [992u16; 16];
        channels[4] = 2000;
        receiver.transport.feed(&rc_frame(channels));
        receiver.process_frames(10);
        receiver.handle_flight_mode();
        assert_eq!(receiver.handler().mode_events, 1);
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut receiver = started_receiver(Config::default());

        receiver.end();
        receiver.end();
        receiver.end();
        assert_eq!(receiver.transport.ended, 1);

        // A stopped receiver consumes nothing
        receiver.transport.feed(&rc_frame([1000; 16]));
        receiver.process_frames(0);
        assert_eq!(receiver.handler().rc_frames, 0);
    }
}
