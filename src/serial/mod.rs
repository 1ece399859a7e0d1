//! Serial port communication module
//!
//! This module provides functionality for:
//! - Listing available serial ports
//! - Opening a port with a bounded read timeout
//! - Framing the incoming byte stream into lines

pub mod lines;
pub mod port;

pub use lines::{LineReader, ReadOutcome};
pub use port::{PortConfig, SerialConnection};
