//! Stream wire format
//!
//! # Record Format
//!
//! One UTF-8 text line per sample, no framing or length prefix:
//!
//! ```text
//! <x>,<y>,<z>\n
//! ```
//!
//! - Fields are in `x,y,z` order, comma-separated, no trailing fields
//! - Values use the shortest decimal form that round-trips the `f64`
//!   (`1`, `2.5`, `-0.30000000000000004`); no precision is dropped
//! - The consumer splits on `\n`
//!
//! ## Error Handling
//!
//! - **Write failure**: reported to the sender, session state unchanged
//! - **Malformed record** (receiver side): logged and discarded, the
//!   connection stays open

use crate::types::Vector3;
use std::io::Write;

/// Record terminator
pub const RECORD_TERMINATOR: u8 = b'\n';

/// Encode one sample into `buffer`, replacing its contents
pub fn encode_record(sample: &Vector3, buffer: &mut Vec<u8>) {
    buffer.clear();
    // Writing into a Vec cannot fail
    let _ = write!(buffer, "{}", sample);
    buffer.push(RECORD_TERMINATOR);
}

/// Decode one received line into a sample
pub fn decode_record(line: &str) -> Result<Vector3, String> {
    line.parse()
}
