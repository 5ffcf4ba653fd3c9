//! Neighbor bootstrap for simulated nodes.
//!
//! Plays the external discovery collaborator: decides which neighbors
//! each node's table starts with.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use pcer_protocol::NodeAddr;

/// One directed link: `node` learns `neighbor` with the given metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSpec {
    pub node: usize,
    pub neighbor: NodeAddr,
    pub delay_ms: f64,
    pub energy: f64,
}

/// Address of simulated node `index`: 10.1.1.(index + 1).
pub fn node_addr(index: usize) -> anyhow::Result<NodeAddr> {
    let last = u8::try_from(index + 1)
        .ok()
        .filter(|b| *b < 255)
        .with_context(|| format!("node index {index} does not fit in 10.1.1.0/24"))?;
    Ok(NodeAddr::new(10, 1, 1, last))
}

/// Reference topology: every node learns 10.1.1.2 (5 ms, 0.9) and
/// 10.1.1.3 (50 ms, 0.2), except a node never learns itself.
pub fn reference(nodes: usize) -> anyhow::Result<Vec<LinkSpec>> {
    let fast = NodeAddr::new(10, 1, 1, 2);
    let slow = NodeAddr::new(10, 1, 1, 3);

    let mut links = Vec::new();
    for node in 0..nodes {
        let me = node_addr(node)?;
        for (neighbor, delay_ms, energy) in [(fast, 5.0, 0.9), (slow, 50.0, 0.2)] {
            if neighbor != me {
                links.push(LinkSpec {
                    node,
                    neighbor,
                    delay_ms,
                    energy,
                });
            }
        }
    }
    Ok(links)
}

/// Parse a topology file: `<node_index> <neighbor_addr> <delay_ms> <energy>`.
pub fn parse_topology<R: BufRead>(reader: R) -> anyhow::Result<Vec<LinkSpec>> {
    let mut links = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            anyhow::bail!("topology line {}: expected 4 fields, found {}", n + 1, fields.len());
        }
        let ctx = || format!("topology line {}: '{line}'", n + 1);
        links.push(LinkSpec {
            node: fields[0].parse().with_context(ctx)?,
            neighbor: fields[1].parse().with_context(ctx)?,
            delay_ms: fields[2].parse().with_context(ctx)?,
            energy: fields[3].parse().with_context(ctx)?,
        });
    }
    Ok(links)
}

pub fn read_topology(path: &Path) -> anyhow::Result<Vec<LinkSpec>> {
    let file =
        File::open(path).with_context(|| format!("opening topology {}", path.display()))?;
    parse_topology(BufReader::new(file))
}

/// Parse `addr:delay:energy`, as given on the command line.
pub fn parse_neighbor_spec(spec: &str) -> anyhow::Result<(NodeAddr, f64, f64)> {
    let parts: Vec<&str> = spec.split(':').collect();
    let [addr, delay, energy] = parts.as_slice() else {
        anyhow::bail!("neighbor '{spec}' is not addr:delay:energy");
    };
    Ok((
        addr.parse().with_context(|| format!("neighbor '{spec}'"))?,
        delay.parse().with_context(|| format!("neighbor '{spec}': delay"))?,
        energy.parse().with_context(|| format!("neighbor '{spec}': energy"))?,
    ))
}
