//! # Beacon Logger Library
//!
//! Log a GPS position fix together with the latest SDR power/SNR sample.
//!
//! This library provides the pieces of a single beacon acquisition: serial
//! port discovery for an NMEA GPS receiver, GPGGA parsing, conversion to
//! decimal degrees, telemetry CSV correlation and the append-only beacon
//! log. [`app::run`] chains them for one invocation.

pub mod app;
pub mod beacon;
pub mod config;
pub mod error;
pub mod logging;
pub mod nmea;
pub mod serial;
pub mod telemetry;
