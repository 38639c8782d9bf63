//! Optional periodic JSON state dump (`--dump-state`).
//!
//! Reuses the `Box::leak`-for-`'static` cell pattern `ether.rs` uses for
//! inboxes, and turns connection state into a loggable JSON payload the
//! way `control/command.rs`'s `ControlCommand::to_payload` turns a command
//! into one.

use bcp::{Address, ConnectionStats};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};
use std::cell::RefCell;
use std::collections::HashMap;

pub type StatsCell = Mutex<CriticalSectionRawMutex, RefCell<Option<ConnectionStats>>>;

pub fn new_cell() -> StatsCell {
    Mutex::new(RefCell::new(None))
}

pub fn publish(cell: &StatsCell, stats: ConnectionStats) {
    cell.lock(|c| *c.borrow_mut() = Some(stats));
}

/// Every `interval`, logs the latest stats seen from every node as one
/// JSON array line.
#[embassy_executor::task]
pub async fn dump_task(cells: &'static HashMap<Address, &'static StatsCell>, interval: Duration) {
    loop {
        Timer::after(interval).await;
        let snapshot: Vec<ConnectionStats> = cells
            .values()
            .filter_map(|cell| cell.lock(|c| *c.borrow()))
            .collect();
        match serde_json::to_string(&snapshot) {
            Ok(json) => log::info!("state dump: {json}"),
            Err(err) => log::warn!("failed to serialize state dump: {err}"),
        }
    }
}
