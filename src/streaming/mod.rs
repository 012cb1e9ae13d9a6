//! TCP streaming delivery for gyro-inject

pub mod listener;
pub mod session;
pub mod wire;

pub use listener::{ListenerStats, RecordListener};
pub use session::StreamSession;
pub use wire::{decode_record, encode_record};
