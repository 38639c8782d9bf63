//! Scene description for the demonstration harness: a fixed one-hop
//! adjacency list plus which node is the sink, loadable from TOML the
//! same way [`bcp::TimingConfig`] is.

use bcp::Address;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub sink: (u8, u8),
    pub nodes: Vec<(u8, u8)>,
    /// Undirected one-hop links: `(a, b)` means `a` and `b` hear each other.
    pub links: Vec<((u8, u8), (u8, u8))>,
}

impl Scene {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// A two-hop line: node 1 -- node 2 -- node 3 (sink), matching the
    /// default demonstration topology when no scene file is given.
    pub fn default_line() -> Self {
        Scene {
            sink: (3, 0),
            nodes: vec![(1, 0), (2, 0), (3, 0)],
            links: vec![((1, 0), (2, 0)), ((2, 0), (3, 0))],
        }
    }

    pub fn neighbors_of(&self, node: Address) -> Vec<Address> {
        self.links
            .iter()
            .filter_map(|(a, b)| {
                let (a, b) = (Address::new(a.0, a.1), Address::new(b.0, b.1));
                if a == node {
                    Some(b)
                } else if b == node {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.nodes.iter().map(|(a, b)| Address::new(*a, *b)).collect()
    }

    pub fn sink_address(&self) -> Address {
        Address::new(self.sink.0, self.sink.1)
    }
}
