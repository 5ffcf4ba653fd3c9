//! Traffic trace files.
//!
//! One packet per line, whitespace separated:
//! `<time_s> <src_index> <dst_index> <size_bytes> <tag>`.
//!
//! Indices are kept signed so records naming nodes outside the topology
//! parse and are skipped at scheduling time instead of failing the run.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;

#[derive(Debug, Clone, PartialEq)]
pub struct TraceRecord {
    pub time_s: f64,
    pub src: i64,
    pub dst: i64,
    pub size: u32,
    pub tag: u8,
}

impl TraceRecord {
    fn parse(line: &str) -> anyhow::Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            anyhow::bail!("expected 5 fields, found {}", fields.len());
        }
        Ok(Self {
            time_s: fields[0].parse().context("time")?,
            src: fields[1].parse().context("source index")?,
            dst: fields[2].parse().context("destination index")?,
            size: fields[3].parse().context("size")?,
            // Only the low byte of the tag is carried.
            tag: fields[4].parse::<i64>().context("tag")? as u8,
        })
    }
}

/// Parse every record; blank lines and `#` comments are skipped.
pub fn parse_trace<R: BufRead>(reader: R) -> anyhow::Result<Vec<TraceRecord>> {
    let mut records = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record =
            TraceRecord::parse(line).with_context(|| format!("trace line {}: '{line}'", n + 1))?;
        records.push(record);
    }
    Ok(records)
}

pub fn read_trace(path: &Path) -> anyhow::Result<Vec<TraceRecord>> {
    let file = File::open(path).with_context(|| format!("opening trace {}", path.display()))?;
    parse_trace(BufReader::new(file))
}

pub fn write_trace<W: Write>(mut out: W, records: &[TraceRecord]) -> anyhow::Result<()> {
    for r in records {
        writeln!(out, "{:.2} {} {} {} {}", r.time_s, r.src, r.dst, r.size, r.tag)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_and_skips_noise() {
        let input = "# time src dst size tag\n0.10 0 4 512 0\n\n1.10 3 1 4096 2\n";
        let records = parse_trace(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            TraceRecord {
                time_s: 0.1,
                src: 0,
                dst: 4,
                size: 512,
                tag: 0
            }
        );
        assert_eq!(records[1].tag, 2);
    }

    #[test]
    fn reports_bad_line_number() {
        let err = parse_trace("0.1 0 4 512 0\n0.2 0 x 512 1\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("trace line 2"));
    }

    #[test]
    fn negative_index_and_wide_tag_parse() {
        let records = parse_trace("0.1 -1 2 512 0\n0.2 0 1 512 300\n".as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].src, -1);
        assert_eq!(records[1].tag, 44);
    }

    #[test]
    fn rejects_short_lines() {
        assert!(parse_trace("0.1 0 4\n".as_bytes()).is_err());
    }

    #[test]
    fn write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.txt");
        let records = vec![TraceRecord {
            time_s: 1.5,
            src: 2,
            dst: 0,
            size: 1024,
            tag: 1,
        }];
        write_trace(File::create(&path).unwrap(), &records).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1.50 2 0 1024 1\n"
        );
        assert_eq!(read_trace(&path).unwrap(), records);
    }
}
