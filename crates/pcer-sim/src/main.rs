mod config;
mod events;
mod generate;
mod output;
mod sim;
mod topology;
mod trace;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pcer_protocol::{Forwarder, NodeAddr, RoutingConfig, UrgencyClass, DEFAULT_TTL};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use config::{Method, SimConfig};
use events::EventNodeStats;
use output::{create_file, resolve_output_paths, ResultSink};
use sim::Simulation;

#[derive(Parser)]
#[command(name = "pcer-sim", about = "Simulation harness for PCER next-hop selection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a synthetic traffic trace.
    Generate {
        /// Trace file to write.
        #[arg(short, long, default_value = "traffic_trace.txt")]
        output: PathBuf,
        /// Number of packets.
        #[arg(long, default_value = "100")]
        count: usize,
        /// Number of nodes packets are spread over.
        #[arg(long, default_value = "5")]
        nodes: usize,
        /// RNG seed for a reproducible trace.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Replay a trace through the simulated network.
    Run {
        /// Trace file to replay.
        #[arg(long, default_value = "traffic_trace.txt")]
        trace: PathBuf,
        /// Number of simulated nodes.
        #[arg(long, default_value = "5")]
        nodes: usize,
        /// Simulated seconds to run.
        #[arg(long, default_value = "10.0")]
        duration: f64,
        /// Hop limit per packet.
        #[arg(long, default_value_t = DEFAULT_TTL)]
        ttl: u8,
        /// Link energy drained per KiB sent. Zero disables drain.
        #[arg(long, default_value = "0.001")]
        drain_per_kb: f64,
        /// Topology file (`node neighbor_addr delay_ms energy`). Default:
        /// every node learns 10.1.1.2 and 10.1.1.3.
        #[arg(long)]
        topology: Option<PathBuf>,
        /// CSV results file, used when no output directory is set.
        #[arg(long, default_value = "pcer_results_real.csv")]
        csv: PathBuf,
        /// Directory for timestamped CSV + JSONL output (env: PCER_OUTPUT_DIR).
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Accept negative or non-finite link metrics from the topology.
        #[arg(long)]
        lenient_metrics: bool,
        /// Routing methods to run, comma separated. Each replays the
        /// trace on a fresh network; rows share one CSV.
        #[arg(long, value_enum, value_delimiter = ',', default_value = "pcer")]
        method: Vec<Method>,
    },

    /// Decide a single packet against a given neighbor set.
    Decide {
        /// Address of the deciding node (repeatable).
        #[arg(long, required = true)]
        local: Vec<NodeAddr>,
        /// Packet destination.
        #[arg(long)]
        destination: NodeAddr,
        /// Urgency class name or tag byte. Absent means Standard.
        #[arg(long)]
        urgency: Option<UrgencyClass>,
        /// Neighbor as addr:delay_ms:energy (repeatable).
        #[arg(long)]
        neighbor: Vec<String>,
    },
}

#[derive(Serialize)]
struct DecisionReport {
    event: &'static str,
    destination: NodeAddr,
    class: &'static str,
    action: pcer_protocol::ForwardAction,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            output,
            count,
            nodes,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let records = generate::generate(&mut rng, count, nodes)?;
            let out = create_file(&output)
                .with_context(|| format!("creating trace {}", output.display()))?;
            trace::write_trace(out, &records)?;
            eprintln!("wrote {} records to {}", records.len(), output.display());
        }

        Command::Run {
            trace,
            nodes,
            duration,
            ttl,
            drain_per_kb,
            topology,
            csv,
            output_dir,
            lenient_metrics,
            method,
        } => {
            eprintln!("pcer-sim v{}", env!("CARGO_PKG_VERSION"));

            let mut config = SimConfig::new()
                .nodes(nodes)
                .stop_time(duration)
                .ttl(ttl)
                .drain_per_kb(drain_per_kb)
                .routing(RoutingConfig::new().validate_metrics(!lenient_metrics));
            if let Some(dir) = output_dir {
                config = config.output_dir(dir);
            }

            let records = trace::read_trace(&trace)?;
            let links = match topology {
                Some(path) => topology::read_topology(&path)?,
                None => topology::reference(nodes)?,
            };

            let (csv_path, jsonl_path) = match &config.output_dir {
                Some(dir) => {
                    let paths = resolve_output_paths(dir, "run")
                        .with_context(|| format!("preparing {}", dir.display()))?;
                    (paths.csv, Some(paths.jsonl))
                }
                None => (csv, None),
            };
            let csv_out = create_file(&csv_path)
                .with_context(|| format!("creating {}", csv_path.display()))?;
            let jsonl_out = match &jsonl_path {
                Some(path) => Some(
                    create_file(path).with_context(|| format!("creating {}", path.display()))?,
                ),
                None => None,
            };
            let mut sink = ResultSink::new(csv_out, jsonl_out)?;

            for method in method {
                let mut sim = Simulation::new(config.clone().method(method), &links)?;
                let skipped = sim.schedule_trace(&records);
                if skipped > 0 {
                    tracing::warn!(skipped, "trace records outside the topology were skipped");
                }

                let summary = sim.run(&mut sink)?;
                sink.emit(&summary)?;
                for (addr, stats) in sim.node_stats() {
                    sink.emit(&EventNodeStats {
                        event: "node_stats",
                        method: method.label(),
                        node: addr.to_string(),
                        stats,
                    })?;
                }
                sink.flush()?;

                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            eprintln!("results: {}", csv_path.display());
            if let Some(path) = jsonl_path {
                eprintln!("events:  {}", path.display());
            }
        }

        Command::Decide {
            local,
            destination,
            urgency,
            neighbor,
        } => {
            let mut fwd = Forwarder::with_config(local, RoutingConfig::default());
            for spec in &neighbor {
                let (addr, delay_ms, energy) = topology::parse_neighbor_spec(spec)?;
                fwd.add_neighbor(addr, delay_ms, energy)
                    .with_context(|| format!("neighbor '{spec}'"))?;
            }

            let tag = urgency.map(UrgencyClass::tag);
            let action = fwd.decide(destination, tag);
            let report = DecisionReport {
                event: "decision",
                destination,
                class: UrgencyClass::from_tag_opt(tag).name(),
                action,
            };
            println!("{}", serde_json::to_string(&report)?);
        }
    }

    Ok(())
}
