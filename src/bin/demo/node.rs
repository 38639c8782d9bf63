//! Per-node asynchronous task: owns one open [`bcp::Connection`] and
//! drives it from whichever wakes first — a new ether event, or the
//! connection's own next timer deadline.

use crate::ether::{EtherEvent, EtherInboxReceiver, EtherRadio};
use crate::stats::{self, StatsCell};
use bcp::{Address, Connection, ConnectionCallbacks, DefaultWeightEstimator, NoopExtension};
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Timer};

/// Logs every protocol-level notification with the owning node's address,
/// standing in for whatever an application embedding this engine would
/// actually do with delivered payloads.
pub struct DemoCallbacks {
    local: Address,
}

impl DemoCallbacks {
    pub fn new(local: Address) -> Self {
        DemoCallbacks { local }
    }
}

impl ConnectionCallbacks for DemoCallbacks {
    fn recv(&mut self, origin: Address, payload: &[u8]) {
        log::info!("{}: delivered {:?} from {}", self.local, payload, origin);
    }

    fn sent(&mut self, payload: &[u8]) {
        log::debug!("{}: acked {:?}", self.local, payload);
    }

    fn dropped(&mut self) {
        log::warn!("{}: dropped a packet", self.local);
    }
}

pub type DemoConnection = Connection<EtherRadio, DefaultWeightEstimator, NoopExtension, DemoCallbacks>;

/// The number of node tasks the demonstration harness can spawn. Bounded
/// the way `moonblokz-radio-simulator`'s `node_task` pool is, just sized
/// for a handful of illustrative nodes rather than hundreds.
pub const MAX_DEMO_NODES: usize = 8;

#[embassy_executor::task(pool_size = MAX_DEMO_NODES)]
pub async fn node_task(
    mut conn: DemoConnection,
    inbox: EtherInboxReceiver,
    originate: Option<Vec<u8>>,
    stats_cell: Option<&'static StatsCell>,
) {
    conn.open(Instant::now());
    if let Some(payload) = originate {
        conn.send(&payload, Instant::now());
    }
    if let Some(cell) = stats_cell {
        stats::publish(cell, conn.stats());
    }
    loop {
        let wake_at = conn
            .next_deadline()
            .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        match select(inbox.receive(), Timer::at(wake_at)).await {
            Either::First(event) => {
                let now = Instant::now();
                match event {
                    EtherEvent::Broadcast { from, frame } => {
                        conn.on_broadcast_receive(from, &frame, now);
                    }
                    EtherEvent::Unicast { from } => {
                        conn.on_unicast_receive(from, now);
                    }
                    EtherEvent::SendCompleted { kind, status } => {
                        conn.on_broadcast_sent(kind, status, now);
                    }
                }
            }
            Either::Second(()) => {
                conn.drive_timers(Instant::now());
            }
        }
        if let Some(cell) = stats_cell {
            stats::publish(cell, conn.stats());
        }
    }
}
