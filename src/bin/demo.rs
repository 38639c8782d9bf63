//! Minimal multi-node demonstration: builds a fixed one-hop topology from
//! a scene file (or a built-in two-hop line), opens a connection per
//! node, has one node originate a payload, and logs it arriving at the
//! sink after being forwarded across the intermediate hop.
//!
//! This binary is a demonstration harness, not part of the protocol
//! engine: the engine itself (`bcp::connection::Connection` and friends)
//! performs no I/O and owns no event loop.

mod ether;
mod node;
mod scenario;
mod stats;

use bcp::{Address, Connection, DefaultWeightEstimator, NoopExtension, TimingConfig};
use embassy_executor::{Executor, Spawner};
use ether::{EtherInbox, EtherRadio};
use log::{LevelFilter, info};
use node::DemoCallbacks;
use stats::StatsCell;
use std::collections::HashMap;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new().filter_level(LevelFilter::Info).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let dump_state = args.iter().any(|a| a == "--dump-state");
    let scene_path = args.iter().find(|a| a.as_str() != "--dump-state");

    let scene = match scene_path {
        Some(path) => scenario::Scene::load(std::path::Path::new(path))?,
        None => scenario::Scene::default_line(),
    };

    info!(
        "starting demonstration with {} node(s), sink={}",
        scene.nodes.len(),
        scene.sink_address()
    );

    // INTENTIONAL LEAK: each node's inbox (and, if enabled, its stats cell)
    // must outlive the Embassy executor thread; the harness runs for the
    // process lifetime so this is safe.
    let inboxes: HashMap<Address, &'static EtherInbox> = scene
        .addresses()
        .into_iter()
        .map(|addr| (addr, &*Box::leak(Box::new(EtherInbox::new()))))
        .collect();

    let stats_cells: Option<&'static HashMap<Address, &'static StatsCell>> = dump_state.then(|| {
        let map: HashMap<Address, &'static StatsCell> = scene
            .addresses()
            .into_iter()
            .map(|addr| (addr, &*Box::leak(Box::new(stats::new_cell()))))
            .collect();
        &*Box::leak(Box::new(map))
    });

    let executor: &'static mut Executor = Box::leak(Box::new(Executor::new()));
    executor.run(|spawner| {
        for addr in scene.addresses() {
            let neighbors: Vec<(Address, _)> = scene
                .neighbors_of(addr)
                .into_iter()
                .map(|n| (n, inboxes[&n].sender()))
                .collect();
            let radio = EtherRadio::new(addr, inboxes[&addr].sender(), neighbors);

            let mut conn: Connection<EtherRadio, DefaultWeightEstimator, NoopExtension, DemoCallbacks> =
                Connection::new(
                    addr,
                    TimingConfig::default(),
                    radio,
                    DefaultWeightEstimator,
                    NoopExtension,
                    DemoCallbacks::new(addr),
                    embassy_time::Instant::now(),
                );
            conn.set_sink(addr == scene.sink_address());

            let originate = (addr == scene.addresses()[0] && addr != scene.sink_address())
                .then(|| b"HI".to_vec());

            let cell = stats_cells.map(|cells| cells[&addr]);
            spawn_node(&spawner, conn, inboxes[&addr].receiver(), originate, cell);
        }

        if let Some(cells) = stats_cells {
            if spawner
                .spawn(stats::dump_task(cells, embassy_time::Duration::from_secs(3)))
                .is_err()
            {
                log::error!("could not spawn state-dump task");
            }
        }
    })
}

fn spawn_node(
    spawner: &Spawner,
    conn: node::DemoConnection,
    inbox: ether::EtherInboxReceiver,
    originate: Option<Vec<u8>>,
    stats_cell: Option<&'static StatsCell>,
) {
    if spawner
        .spawn(node::node_task(conn, inbox, originate, stats_cell))
        .is_err()
    {
        log::error!("node task pool exhausted; topology has too many nodes for this harness");
    }
}
