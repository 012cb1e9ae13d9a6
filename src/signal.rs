//! Ctrl-C handling for graceful shutdown.

use crate::error::{Error, Result};
use log::info;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Install a Ctrl-C handler that clears the returned flag.
///
/// Loops poll the flag at their iteration boundary and tear down from
/// there, so the handler itself never touches sockets or files.
pub fn setup_ctrl_c_handler() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;
    Ok(running)
}
