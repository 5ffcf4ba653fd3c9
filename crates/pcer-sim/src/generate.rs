//! Synthetic factory-floor traffic.
//!
//! Mix: 10% Critical (512 B every 0.1 s), 50% Bulk (4096 B every 1.0 s),
//! 40% Standard (1024 B every 0.5 s). Source and destination are drawn
//! uniformly and always differ.

use pcer_protocol::UrgencyClass;
use rand::Rng;

use crate::trace::TraceRecord;

struct Profile {
    class: UrgencyClass,
    size: u32,
    interval_s: f64,
}

fn profile(roll: f64) -> Profile {
    if roll < 0.1 {
        Profile {
            class: UrgencyClass::Critical,
            size: 512,
            interval_s: 0.1,
        }
    } else if roll < 0.6 {
        Profile {
            class: UrgencyClass::Bulk,
            size: 4096,
            interval_s: 1.0,
        }
    } else {
        Profile {
            class: UrgencyClass::Standard,
            size: 1024,
            interval_s: 0.5,
        }
    }
}

/// Generate `count` records over `nodes` nodes (needs at least two).
pub fn generate<R: Rng>(rng: &mut R, count: usize, nodes: usize) -> anyhow::Result<Vec<TraceRecord>> {
    if nodes < 2 {
        anyhow::bail!("need at least 2 nodes to generate traffic, got {nodes}");
    }

    let mut records = Vec::with_capacity(count);
    let mut now = 0.0;

    for _ in 0..count {
        let p = profile(rng.random::<f64>());
        now += p.interval_s;

        let src = rng.random_range(0..nodes);
        // Draw from the remaining nodes so dst != src without rejection.
        let mut dst = rng.random_range(0..nodes - 1);
        if dst >= src {
            dst += 1;
        }

        records.push(TraceRecord {
            // Traces carry two decimals; round so replays match the file.
            time_s: (now * 100.0_f64).round() / 100.0,
            src: src as i64,
            dst: dst as i64,
            size: p.size,
            tag: p.class.tag(),
        });
    }

    Ok(records)
}
