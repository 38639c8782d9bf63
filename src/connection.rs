//! The per-node BCP engine (spec §4.4): queue, routing table, timers, and
//! the protocol state machine wired together behind one handle.
//!
//! `Connection` owns no event loop and performs no I/O of its own beyond
//! calls out to its [`RadioStack`]. A host runtime is expected to call
//! `on_send_timer` / `on_beacon_timer` / `on_retransmission_timer` when the
//! matching timer (queried via the `*_timer` accessors, or tracked
//! independently) expires, and `on_broadcast_receive` / `on_broadcast_sent`
//! / `on_unicast_receive` when the radio delivers an event. No handler
//! here ever blocks or suspends; every wait is expressed as an armed timer
//! plus an early return (spec §5).

use crate::address::Address;
use crate::config::TimingConfig;
use crate::error::BcpError;
use crate::extension::Extension;
use crate::packet::{DataHeader, Frame, FrameKind};
use crate::queue::{PacketQueue, QueueEntry};
use crate::radio::{RadioStack, SendStatus};
use crate::routing::RoutingTable;
use crate::timer::{DelayTimer, OneshotTimer};
use crate::weight::WeightEstimator;
use embassy_time::{Duration, Instant};
use rand::Rng;
use serde::Serialize;

/// Notifications delivered to the application embedding a [`Connection`]
/// (spec §4.4's `bcp_callbacks`: `recv`, `sent`, `dropped`).
pub trait ConnectionCallbacks {
    /// A data packet addressed to us has arrived and we are the sink.
    fn recv(&mut self, origin: Address, payload: &[u8]) {
        let _ = (origin, payload);
    }

    /// A packet we originated or forwarded has been acknowledged by the
    /// next hop.
    fn sent(&mut self, payload: &[u8]) {
        let _ = payload;
    }

    /// A packet was dropped instead of being queued (oversize payload,
    /// full queue).
    fn dropped(&mut self) {}
}

/// An embedding that wants none of the notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallbacks;

impl ConnectionCallbacks for NoopCallbacks {}

/// A point-in-time snapshot of a connection's observable state (spec §4.4
/// "State summary"), for diagnostics/dashboards external to the protocol
/// itself — nothing in the engine reads its own `ConnectionStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionStats {
    pub address: Address,
    pub is_sink: bool,
    pub busy: bool,
    pub tx_attempts: u16,
    pub queue_length: usize,
    pub routing_table_size: usize,
}

/// An open BCP connection bound to one local address.
pub struct Connection<R, W, E = crate::extension::NoopExtension, Cb = NoopCallbacks>
where
    R: RadioStack,
    W: WeightEstimator,
    E: Extension,
    Cb: ConnectionCallbacks,
{
    local_address: Address,
    is_sink: bool,
    busy: bool,
    tx_attempts: u16,
    queue: PacketQueue,
    routing_table: RoutingTable<W::EntryState>,
    send_timer: OneshotTimer,
    beacon_timer: OneshotTimer,
    retransmission_timer: OneshotTimer,
    delay_timer: DelayTimer,
    timing: TimingConfig,
    radio: R,
    estimator: W,
    extension: E,
    callbacks: Cb,
}

impl<R, W, E, Cb> Connection<R, W, E, Cb>
where
    R: RadioStack,
    W: WeightEstimator,
    E: Extension,
    Cb: ConnectionCallbacks,
{
    /// Builds a connection in the closed state. Call [`Self::open`] before
    /// feeding it any events.
    pub fn new(
        local_address: Address,
        timing: TimingConfig,
        radio: R,
        estimator: W,
        extension: E,
        callbacks: Cb,
        now: Instant,
    ) -> Self {
        Connection {
            local_address,
            is_sink: false,
            busy: false,
            tx_attempts: 0,
            queue: PacketQueue::new(),
            routing_table: RoutingTable::new(),
            send_timer: OneshotTimer::new(),
            beacon_timer: OneshotTimer::new(),
            retransmission_timer: OneshotTimer::new(),
            delay_timer: DelayTimer::new(timing.delay_time, now),
            timing,
            radio,
            estimator,
            extension,
            callbacks,
        }
    }

    /// Opens the radio channel pair, runs the weight estimator's one-time
    /// setup, and broadcasts the first beacon immediately, advertising
    /// this node to its neighbors without waiting a full beacon interval.
    pub fn open(&mut self, now: Instant) {
        self.radio.open();
        self.estimator.init();
        self.send_beacon(now);
    }

    /// Closes the radio, clears all protocol state, and disarms every
    /// timer.
    pub fn close(&mut self) {
        self.radio.close();
        self.routing_table.clear();
        self.queue.clear();
        self.send_timer.stop();
        self.beacon_timer.stop();
        self.retransmission_timer.stop();
    }

    /// Marks (or unmarks) this node as the collection sink: the one node
    /// that consumes data packets instead of forwarding them.
    pub fn set_sink(&mut self, is_sink: bool) {
        self.is_sink = is_sink;
    }

    pub fn is_sink(&self) -> bool {
        self.is_sink
    }

    pub fn queue_length(&self) -> usize {
        self.queue.length()
    }

    pub fn routing_table_size(&self) -> usize {
        self.routing_table.length()
    }

    /// A snapshot of this connection's observable state, suitable for
    /// logging or a JSON dump (see `bcp-demo --dump-state`).
    pub fn stats(&self) -> ConnectionStats {
        ConnectionStats {
            address: self.local_address,
            is_sink: self.is_sink,
            busy: self.busy,
            tx_attempts: self.tx_attempts,
            queue_length: self.queue.length(),
            routing_table_size: self.routing_table.length(),
        }
    }

    /// Earliest instant at which any currently-armed timer needs its
    /// handler called, or `None` if nothing is armed.
    ///
    /// A host runtime without its own periodic tick can use this to decide
    /// how long to sleep before the next call to [`Self::drive_timers`],
    /// the way the Contiki `ctimer` process loop this engine is built on
    /// scans its list of armed timers for the nearest deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.send_timer.deadline(),
            self.beacon_timer.deadline(),
            self.retransmission_timer.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Calls whichever of `on_beacon_timer` / `on_retransmission_timer` /
    /// `on_send_timer` are currently due. A convenience for host runtimes
    /// that drive this connection from a single wakeup point rather than
    /// tracking each timer separately.
    pub fn drive_timers(&mut self, now: Instant) {
        if self.beacon_timer.deadline().is_some_and(|d| d <= now) {
            self.on_beacon_timer(now);
        }
        if self.retransmission_timer.deadline().is_some_and(|d| d <= now) {
            self.on_retransmission_timer(now);
        }
        if self.send_timer.deadline().is_some_and(|d| d <= now) {
            self.on_send_timer(now);
        }
    }

    // ---- application API -------------------------------------------------

    /// Queues `payload` for origination at this node. Returns `false`
    /// (after notifying [`ConnectionCallbacks::dropped`]) if the payload
    /// is oversize or the queue is full.
    pub fn send(&mut self, payload: &[u8], now: Instant) -> bool {
        if payload.len() > crate::config::MAX_USER_PACKET_SIZE {
            self.callbacks.dropped();
            return false;
        }
        let header = DataHeader {
            backpressure: 0,
            origin: self.local_address,
            delay: Duration::from_ticks(0),
        };
        let sent = match self.queue.push(header, payload, now) {
            Ok(_) => {
                self.beacon_timer.stop();
                true
            }
            Err(_) => {
                self.callbacks.dropped();
                false
            }
        };
        if self.send_timer.expired(now) {
            self.send_timer.set(self.timing.send_time_delay, now);
        }
        sent
    }

    // ---- timer handlers ----------------------------------------------------

    /// Fires when the send timer expires: transmits the head-of-queue
    /// packet to the best-weighted neighbor, or starts beaconing if the
    /// queue is empty.
    pub fn on_send_timer(&mut self, now: Instant) {
        if self.busy {
            return;
        }
        if self.queue.is_empty() {
            if self.beacon_timer.expired(now) {
                self.beacon_timer.reset(now);
            }
            return;
        }
        let local_len = self.queue.length() as u16;
        let neighbor = match self.routing_table.select_best(&self.estimator, local_len) {
            Some(addr) => addr,
            None => {
                self.retransmit(now);
                return;
            }
        };

        self.busy = true;
        self.beacon_timer.stop();

        let last_process_time = self.queue.top().map(|e| e.last_process_time).unwrap_or(now);
        if let Some(entry) = self.queue.top_mut() {
            entry.header.backpressure = local_len;
            entry.header.delay = entry.header.delay + (now - last_process_time);
        }
        if let Some(entry) = self.queue.top_mut() {
            self.extension.before_send(entry);
        }

        let frame = {
            let entry = self.queue.top().expect("queue non-empty, checked above");
            Frame::data(neighbor, &entry.header, entry.payload())
        };
        self.radio.broadcast_send(&frame);
        self.tx_attempts += 1;

        if let Some(entry) = self.queue.top() {
            self.extension.after_send(entry);
        }
    }

    /// Fires when the beacon timer expires: sends a periodic beacon.
    pub fn on_beacon_timer(&mut self, now: Instant) {
        self.send_beacon(now);
    }

    /// Fires when no ack arrived before the retransmission timer expired.
    pub fn on_retransmission_timer(&mut self, now: Instant) {
        self.retransmit(now);
    }

    /// Gives up on the current best neighbor and asks for fresh beacons:
    /// shared by the retransmission timeout and by `on_send_timer`
    /// discovering no known neighbor.
    fn retransmit(&mut self, now: Instant) {
        self.busy = false;
        self.send_beacon_request(now);
        if self.send_timer.expired(now) {
            self.send_timer.set(self.timing.retx_time, now);
        }
    }

    fn send_beacon_request(&mut self, now: Instant) {
        let _ = now;
        if self.busy {
            return;
        }
        self.busy = true;
        self.routing_table.clear();
        let queuelog = self.queue.length() as u16;
        self.radio.broadcast_send(&Frame::beacon_request(queuelog));
    }

    fn send_beacon(&mut self, now: Instant) {
        let _ = now;
        if self.busy {
            return;
        }
        self.busy = true;
        let queuelog = self.queue.length() as u16;
        self.radio.broadcast_send(&Frame::beacon(queuelog));
    }

    // ---- radio event handlers --------------------------------------------

    /// The radio has finished handing `kind` to the medium.
    pub fn on_broadcast_sent(&mut self, kind: FrameKind, status: SendStatus, now: Instant) {
        let _ = status;
        match kind {
            FrameKind::Beacon => {
                self.busy = false;
                if self.beacon_timer.expired(now) {
                    self.beacon_timer.set(self.timing.beacon_time, now);
                }
            }
            FrameKind::BeaconRequest => {
                self.busy = false;
            }
            // Ack is never sent on the broadcast channel in practice; an
            // unknown/unexpected kind is treated like data (spec §7).
            FrameKind::Data | FrameKind::Ack => {
                self.retransmission_timer.stop();
                self.retransmission_timer
                    .set(self.timing.retx_time * self.tx_attempts as u32, now);
            }
        }
    }

    /// A frame arrived on the broadcast channel, sent by `sender`.
    pub fn on_broadcast_receive(&mut self, sender: Address, frame: &Frame, now: Instant) {
        if frame.receiver.is_broadcast() {
            match frame.kind {
                FrameKind::Beacon => {
                    if let Ok(beacon) = frame.decode_beacon() {
                        let _ = self.routing_table.update_queuelog(
                            &mut self.estimator,
                            sender,
                            beacon.queuelog,
                        );
                    } else {
                        log::warn!("malformed beacon from {sender}");
                    }
                }
                FrameKind::BeaconRequest => {
                    if let Ok(beacon) = frame.decode_beacon() {
                        let _ = self.routing_table.update_queuelog(
                            &mut self.estimator,
                            sender,
                            beacon.queuelog,
                        );
                    } else {
                        log::warn!("malformed beacon request from {sender}");
                    }
                    // Jittered reply (0.5s-10s) to avoid every neighbor
                    // answering a beacon request in lockstep.
                    let jitter = rand::thread_rng().gen_range(0..20u32);
                    let delay = Duration::from_millis(500) * (1 + jitter);
                    self.beacon_timer.set(delay, now);
                }
                FrameKind::Data | FrameKind::Ack => {
                    log::warn!("unexpected {:?} frame addressed to broadcast", frame.kind);
                }
            }
            return;
        }

        if frame.receiver == self.local_address {
            let (header, payload) = match frame.decode_data() {
                Ok(v) => v,
                Err(_) => {
                    log::warn!("malformed data frame from {sender}");
                    return;
                }
            };

            if self.is_sink {
                self.radio.unicast_send(sender, &Frame::ack());
                self.callbacks.recv(header.origin, payload);
                let _ =
                    self.routing_table
                        .update_queuelog(&mut self.estimator, sender, header.backpressure);
            } else {
                // Each hop acks the sender that handed it this packet
                // immediately on receipt, independent of the eventual
                // onward hop's own ack — a relay's "sent" notification to
                // its own sender must not wait on forwarding succeeding
                // (spec §8 scenario 2: "each hop is independently acked").
                self.radio.unicast_send(sender, &Frame::ack());

                let forward_header = DataHeader {
                    backpressure: 0,
                    origin: header.origin,
                    delay: header.delay,
                };
                match self.queue.push(forward_header, payload, now) {
                    Ok(id) => {
                        if let Some(entry) = self.queue.top() {
                            if entry.id == id {
                                self.extension.on_receive(entry);
                            }
                        }
                        if self.send_timer.expired(now) {
                            self.send_timer.set(self.timing.send_time_delay, now);
                        }
                    }
                    Err(_) => self.callbacks.dropped(),
                }
                let _ =
                    self.routing_table
                        .update_queuelog(&mut self.estimator, sender, header.backpressure);
            }
            return;
        }

        // Addressed to a third node: snoop the header for the queue depth,
        // then ignore the payload entirely.
        match frame.decode_data() {
            Ok((header, _payload)) => {
                let _ = self.routing_table.update_queuelog(
                    &mut self.estimator,
                    sender,
                    header.backpressure,
                );
            }
            Err(_) => log::warn!("malformed snooped data frame from {sender}"),
        }
    }

    /// An ack arrived on the unicast channel from `from`.
    pub fn on_unicast_receive(&mut self, from: Address, now: Instant) {
        if self.queue.top().is_none() {
            log::warn!("ack received with no active packet; ignoring");
            return;
        }

        // tx_attempts is reset before the weight estimator is notified, so
        // `sent` always observes 0 here rather than the true attempt count.
        // This mirrors the ordering in the routing/estimator source this
        // engine is grounded on; see DESIGN.md.
        self.tx_attempts = 0;

        if let Some(entry) = self.queue.top() {
            self.callbacks.sent(entry.payload());
        }
        self.retransmission_timer.stop();

        if let Some(entry) = self.queue.top().cloned() {
            if let Some(ri) = self.routing_table.find_mut(from) {
                self.estimator.sent(ri, &entry, self.tx_attempts);
            }
        }

        self.queue.pop();
        self.busy = false;
        self.send_timer.set(self.timing.send_time_delay, now);
    }
}
