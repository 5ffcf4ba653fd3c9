use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Method;

pub struct OutputPaths {
    pub csv: PathBuf,
    pub jsonl: PathBuf,
}

/// Build output file paths, ensuring the directory exists.
/// Pattern: `<dir>/pcer_<mode>_<YYYYMMDD-HHMMSS>.{csv,jsonl}`
pub fn resolve_output_paths(dir: &Path, mode: &str) -> io::Result<OutputPaths> {
    fs::create_dir_all(dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    let base = format!("pcer_{mode}_{timestamp}");

    Ok(OutputPaths {
        csv: find_unique_path(dir, &base, "csv"),
        jsonl: find_unique_path(dir, &base, "jsonl"),
    })
}

/// Find a path that does not yet exist, appending _2, _3... if needed.
fn find_unique_path(dir: &Path, base: &str, ext: &str) -> PathBuf {
    let candidate = dir.join(format!("{base}.{ext}"));
    if !candidate.exists() {
        return candidate;
    }
    let mut i = 2u32;
    loop {
        let candidate = dir.join(format!("{base}_{i}.{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

pub fn create_file(path: &Path) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(BufWriter::new(file))
}

/// Where simulation results go. Owned by the harness and passed to the
/// simulator explicitly.
///
/// CSV: one `Method,Tag,Latency,NetworkLife` row per delivered packet.
/// JSONL: every event, when a JSONL writer is attached.
pub struct ResultSink<W: Write> {
    csv: W,
    jsonl: Option<W>,
    method: Method,
}

impl<W: Write> ResultSink<W> {
    /// New sink; writes the CSV header immediately. Rows are labelled
    /// PCER until [`set_method`](Self::set_method) says otherwise.
    pub fn new(mut csv: W, jsonl: Option<W>) -> io::Result<Self> {
        writeln!(csv, "Method,Tag,Latency,NetworkLife")?;
        Ok(Self {
            csv,
            jsonl,
            method: Method::default(),
        })
    }

    /// Label for the `Method` column of subsequent rows.
    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn write_delivery(&mut self, tag: &str, latency_ms: f64, network_life_pct: f64) -> io::Result<()> {
        let method = self.method.label();
        writeln!(self.csv, "{method},{tag},{latency_ms:.3},{network_life_pct:.2}")
    }

    pub fn emit<T: Serialize>(&mut self, event: &T) -> io::Result<()> {
        if let Some(out) = self.jsonl.as_mut() {
            let json = serde_json::to_string(event).map_err(io::Error::other)?;
            writeln!(out, "{json}")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.csv.flush()?;
        if let Some(out) = self.jsonl.as_mut() {
            out.flush()?;
        }
        Ok(())
    }

    /// Flush and hand back the writers.
    pub fn into_inner(mut self) -> io::Result<(W, Option<W>)> {
        self.flush()?;
        Ok((self.csv, self.jsonl))
    }
}
