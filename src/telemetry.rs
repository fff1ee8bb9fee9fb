//! Outbound telemetry staging and scheduling

use crate::{
    Attitude, BaroAltitude, BatterySensor, FlightMode, Gps, Payload, Transport,
};
use bitflags::bitflags;

bitflags! {
    /// Set of telemetry sensor kinds a receiver reports.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TelemetrySensors: u8 {
        const ATTITUDE = 1;
        const BARO_ALTITUDE = 1 << 1;
        const BATTERY = 1 << 2;
        const GPS = 1 << 3;
        const FLIGHT_MODE = 1 << 4;
    }
}

/// Telemetry configuration: which sensors to report and how often a frame
/// goes out. An empty sensor set disables telemetry entirely.
#[derive(Clone, Copy, Debug)]
pub struct TelemetryConfig {
    pub sensors: TelemetrySensors,
    pub interval_ms: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            sensors: TelemetrySensors::all(),
            interval_ms: 100,
        }
    }
}

#[derive(Clone, Copy)]
enum SensorKind {
    Attitude,
    BaroAltitude,
    Battery,
    Gps,
    FlightMode,
}

const SEND_ORDER: [(TelemetrySensors, SensorKind); 5] = [
    (TelemetrySensors::ATTITUDE, SensorKind::Attitude),
    (TelemetrySensors::BARO_ALTITUDE, SensorKind::BaroAltitude),
    (TelemetrySensors::BATTERY, SensorKind::Battery),
    (TelemetrySensors::GPS, SensorKind::Gps),
    (TelemetrySensors::FLIGHT_MODE, SensorKind::FlightMode),
];

/// Staging state and send scheduler for outbound telemetry.
///
/// Setters only overwrite the staged snapshot; a frame leaves the device
/// when the scheduler says the send interval elapsed. Enabled sensors are
/// serviced round-robin, one frame per elapsed interval.
pub struct Telemetry {
    sensors: TelemetrySensors,
    interval_ms: u32,
    last_send_ms: u32,
    cursor: usize,
    attitude: Attitude,
    baro_altitude: BaroAltitude,
    battery: BatterySensor,
    gps: Gps,
    flight_mode: FlightMode,
}

impl Telemetry {
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            sensors: config.sensors,
            interval_ms: config.interval_ms,
            last_send_ms: 0,
            cursor: 0,
            attitude: Attitude::default(),
            baro_altitude: BaroAltitude::default(),
            battery: BatterySensor::default(),
            gps: Gps::default(),
            flight_mode: FlightMode::default(),
        }
    }

    /// Stages attitude angles, in 0.0001 rad units.
    pub fn set_attitude_data(&mut self, roll: i16, pitch: i16, yaw: i16) {
        self.attitude = Attitude { pitch, roll, yaw };
    }

    /// Stages barometric altitude (decimeters) and vertical speed (cm/s).
    pub fn set_baro_altitude_data(&mut self, altitude_dm: i32, vario_cms: i16) {
        self.baro_altitude = BaroAltitude {
            altitude_dm,
            vario_cms,
        };
    }

    /// Stages battery state. Voltage and current are given in millivolts
    /// and milliamps and reduced to the 0.1 V / 0.1 A wire resolution.
    pub fn set_battery_data(
        &mut self,
        voltage_mv: u32,
        current_ma: u32,
        capacity_mah: u32,
        remaining: u8,
    ) {
        self.battery = BatterySensor {
            voltage: (voltage_mv / 100).min(u16::MAX as u32) as u16,
            current: (current_ma / 100).min(u16::MAX as u32) as u16,
            capacity_used: capacity_mah & 0x00FF_FFFF,
            remaining,
        };
    }

    /// Stages a GPS fix. Latitude and longitude are in 1e-7 degree units,
    /// ground speed in 0.1 km/h, heading in 0.01 degree, altitude in meters.
    pub fn set_gps_data(
        &mut self,
        latitude: i32,
        longitude: i32,
        altitude: i16,
        groundspeed: u16,
        heading: u16,
        satellites: u8,
    ) {
        self.gps = Gps {
            latitude,
            longitude,
            groundspeed,
            heading,
            altitude,
            satellites,
        };
    }

    /// Stages the flight mode text; disarmed state appends the `*` marker.
    pub fn set_flight_mode_data(&mut self, text: &str, armed: bool) {
        self.flight_mode.set(text, armed);
    }

    /// Returns true when the send interval elapsed since the last
    /// transmission and a frame should go out; at most once per interval.
    pub fn update(&mut self, now_ms: u32) -> bool {
        if self.sensors.is_empty() {
            return false;
        }

        if now_ms.wrapping_sub(self.last_send_ms) >= self.interval_ms {
            self.last_send_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Serializes the next enabled sensor's staged data into a frame and
    /// writes it to the transport.
    pub fn send_telemetry_data<T: Transport>(&mut self, transport: &mut T) {
        let Some(kind) = self.next_sensor() else {
            return;
        };

        let raw = match kind {
            SensorKind::Attitude => self.attitude.to_raw_packet(),
            SensorKind::BaroAltitude => self.baro_altitude.to_raw_packet(),
            SensorKind::Battery => self.battery.to_raw_packet(),
            SensorKind::Gps => self.gps.to_raw_packet(),
            SensorKind::FlightMode => self.flight_mode.to_raw_packet(),
        };

        if let Ok(raw) = raw {
            transport.write_bytes(raw.as_slice());
        }
    }

    // Advances the round-robin cursor to the next enabled sensor.
    fn next_sensor(&mut self) -> Option<SensorKind> {
        for _ in 0..SEND_ORDER.len() {
            let (flag, kind) = SEND_ORDER[self.cursor];
            self.cursor = (self.cursor + 1) % SEND_ORDER.len();

            if self.sensors.contains(flag) {
                return Some(kind);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CaptureTransport {
        buf: [u8; 256],
        len: usize,
        writes: usize,
    }

    impl CaptureTransport {
        fn new() -> Self {
            Self {
                buf: [0; 256],
                len: 0,
                writes: 0,
            }
        }
    }

    impl Transport for CaptureTransport {
        fn begin(&mut self, _baud: u32) {}
        fn end(&mut self) {}
        fn try_read_byte(&mut self) -> Option<u8> {
            None
        }
        fn write_bytes(&mut self, data: &[u8]) {
            self.buf[self.len..self.len + data.len()].copy_from_slice(data);
            self.len += data.len();
            self.writes += 1;
        }
        fn flush_input(&mut self) {}
    }

    #[test]
    fn test_scheduler_fires_once_per_interval() {
        let mut telemetry = Telemetry::new(TelemetryConfig {
            sensors: TelemetrySensors::all(),
            interval_ms: 100,
        });

        // Walk time in small steps across two intervals
        let mut fired = 0;
        for now in (0..=250).step_by(10) {
            if telemetry.update(now) {
                fired += 1;
            }
        }
        // One send per elapsed 100ms window, nothing in between
        assert_eq!(fired, 2);
    }

    #[test]
    fn test_scheduler_disabled_without_sensors() {
        let mut telemetry = Telemetry::new(TelemetryConfig {
            sensors: TelemetrySensors::empty(),
            interval_ms: 100,
        });

        assert!(!telemetry.update(1000));
        assert!(!telemetry.update(100_000));
    }

    #[test]
    fn test_scheduler_survives_clock_wraparound() {
        let mut telemetry = Telemetry::new(TelemetryConfig {
            sensors: TelemetrySensors::all(),
            interval_ms: 100,
        });

        assert!(telemetry.update(u32::MAX - 50));
        assert!(!telemetry.update(u32::MAX - 10));
        // 60ms before wrap + 60ms after
        assert!(telemetry.update(59));
    }

    #[test]
    fn test_round_robin_cycles_enabled_sensors() {
        let mut telemetry = Telemetry::new(TelemetryConfig {
            sensors: TelemetrySensors::ATTITUDE | TelemetrySensors::BATTERY,
            interval_ms: 100,
        });
        let mut transport = CaptureTransport::new();

        for _ in 0..4 {
            telemetry.send_telemetry_data(&mut transport);
        }

        assert_eq!(transport.writes, 4);
        // Frame types alternate: attitude, battery, attitude, battery
        let mut offset = 0;
        let mut types = [0u8; 4];
        for typ in types.iter_mut() {
            *typ = transport.buf[offset + 2];
            offset += transport.buf[offset + 1] as usize + 2;
        }
        assert_eq!(types, [0x1E, 0x08, 0x1E, 0x08]);
    }

    #[test]
    fn test_staged_data_reaches_the_wire() {
        let mut telemetry = Telemetry::new(TelemetryConfig {
            sensors: TelemetrySensors::BATTERY,
            interval_ms: 100,
        });
        let mut transport = CaptureTransport::new();

        telemetry.set_battery_data(16_800, 25_400, 1250, 71);
        telemetry.send_telemetry_data(&mut transport);

        let frame = &transport.buf[..transport.len];
        assert_eq!(frame[2], 0x08);
        assert_eq!(&frame[3..5], &168_u16.to_be_bytes());
        assert_eq!(&frame[5..7], &254_u16.to_be_bytes());
        assert_eq!(frame[10], 71);
    }

    #[test]
    fn test_flight_mode_text_staging() {
        let mut telemetry = Telemetry::new(TelemetryConfig {
            sensors: TelemetrySensors::FLIGHT_MODE,
            interval_ms: 100,
        });
        let mut transport = CaptureTransport::new();

        telemetry.set_flight_mode_data("STAB", true);
        telemetry.send_telemetry_data(&mut transport);

        let frame = &transport.buf[..transport.len];
        assert_eq!(frame[2], 0x21);
        assert_eq!(&frame[3..8], b"STAB\0");
    }
}
