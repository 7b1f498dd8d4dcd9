//! Device position from a gpsd daemon.
//!
//! gpsd speaks newline-delimited JSON over TCP. After a `?WATCH` command it
//! streams reports; the one we want is class `TPV` (time-position-velocity)
//! with `mode` 2 (2D fix) or 3 (3D fix).

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;

use hectare::{GeolocationError, Geolocator, Point};

const WATCH: &str = "?WATCH={\"enable\":true,\"json\":true};\n";

/// The subset of a gpsd report we read.
#[derive(Debug, Deserialize)]
struct Report {
    class: String,
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
}

pub struct GpsdLocator {
    addr: String,
    timeout: Duration,
}

impl GpsdLocator {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

/// Parse one gpsd line. `Ok(None)` for reports that carry no fix.
pub fn parse_report(line: &str) -> Result<Option<Point>, GeolocationError> {
    let report: Report = serde_json::from_str(line)
        .map_err(|e| GeolocationError::Protocol(format!("bad gpsd report: {}", e)))?;

    if report.class != "TPV" || report.mode < 2 {
        return Ok(None);
    }
    match (report.lat, report.lon) {
        (Some(lat), Some(lon)) => Ok(Some(Point::from_lat_lng(lat, lon))),
        _ => Ok(None),
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

impl Geolocator for GpsdLocator {
    fn locate(&mut self) -> Result<Point, GeolocationError> {
        let addr = self
            .addr
            .to_socket_addrs()?
            .next()
            .ok_or(GeolocationError::Unavailable)?;

        let stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        let mut writer = stream.try_clone()?;
        writer.write_all(WATCH.as_bytes())?;
        debug!(addr = %addr, "watching gpsd");

        let deadline = Instant::now() + self.timeout;
        for line in BufReader::new(stream).lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) if is_timeout(&e) => return Err(GeolocationError::Timeout),
                Err(e) => return Err(e.into()),
            };
            if let Some(point) = parse_report(&line)? {
                return Ok(point);
            }
            if Instant::now() >= deadline {
                return Err(GeolocationError::Timeout);
            }
        }

        Err(GeolocationError::Protocol(
            "gpsd closed the connection before a fix".to_string(),
        ))
    }
}
