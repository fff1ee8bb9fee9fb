use std::{
    env,
    io::{Read, Write},
    time::{Duration, Instant},
};

use crsf_receiver::{
    BoardSupport, Config, EventHandler, FlightModeId, LinkStatistics, RcChannelData,
    SerialReceiver, Transport,
};

struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl Transport for SerialTransport {
    fn begin(&mut self, baud: u32) {
        let _ = self.port.set_baud_rate(baud);
    }

    fn end(&mut self) {}

    fn try_read_byte(&mut self) -> Option<u8> {
        if self.port.bytes_to_read().unwrap_or(0) == 0 {
            return None;
        }

        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn write_bytes(&mut self, data: &[u8]) {
        let _ = self.port.write_all(data);
    }

    fn flush_input(&mut self) {
        let _ = self.port.clear(serialport::ClearBuffer::Input);
    }
}

struct HostBoard;

impl BoardSupport for HostBoard {
    fn device_id(&self) -> &str {
        "host"
    }

    fn is_supported(&self, _device: &str) -> bool {
        // Anything that can open a serial port will do on the host side
        true
    }
}

struct Printer;

impl EventHandler for Printer {
    fn on_rc_channels(&mut self, channels: &RcChannelData) {
        println!(
            "channels: {:?} failsafe: {}",
            channels.values(),
            channels.failsafe
        );
    }

    fn on_link_statistics(&mut self, stats: &LinkStatistics) {
        println!("{stats:?}");
    }

    fn on_flight_mode(&mut self, mode: FlightModeId) {
        println!("flight mode: {mode:?}");
    }
}

fn main() {
    let path = env::args().nth(1).expect("no serial port supplied");
    let port = serialport::new(path, 420_000)
        .timeout(Duration::from_millis(5))
        .open()
        .expect("failed to open serial port");

    let mut receiver = SerialReceiver::new(
        SerialTransport { port },
        Printer,
        Config::default(),
    );
    receiver
        .begin(&HostBoard)
        .expect("failed to start the receiver");

    receiver.set_flight_mode(FlightModeId::Disarmed, 4, 172, 991);
    receiver.set_flight_mode(FlightModeId::Angle, 4, 992, 1500);
    receiver.set_flight_mode(FlightModeId::Acro, 4, 1501, 1811);

    let started = Instant::now();
    loop {
        receiver.process_frames(started.elapsed().as_millis() as u32);
        receiver.handle_flight_mode();
        std::thread::sleep(Duration::from_millis(1));
    }
}
