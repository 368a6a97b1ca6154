/// Implementation of `ess inspect`.
///
/// Walks the save file and prints every decoded record, then the reason
/// the walk stopped. When a record fails to decode, the records before it
/// are still printed and the command exits 1.
///
/// # Output format
///
/// ```text
/// [0] @0 TES3 size=346 header1=00000000 flags=00000000 subrecords=3
///   HEDR (300) version=1.3 unknown=0 company="Bethesda" description="Save" records=2
///   MAST (14) "Morrowind.esm"
///   DATA (8) 1234
/// [1] @362 GLOB size=29 header1=00000000 flags=00000000 subrecords=2
///   NAME (9) "GameHour"
///   FLTV (4) 13.5
/// ---
/// stopped: unrecognized record SCPT at offset 407
/// ```
///
/// With `--json` the same records are emitted as one object whose
/// `stopped.reason` is `end_of_source`, `unrecognized` or `error`; the
/// last carries the decode error's message.
use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result};
use ess_decoder::{DecodeError, PartialDecode, Termination, walk};
use ess_types::{Record, SubrecordPayload};
use serde::Serialize;

use crate::InspectArgs;

/// Run the `ess inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the flags are invalid, or
/// a record fails to decode.
pub fn run(args: &InspectArgs) -> Result<()> {
    let config = args.decode.config()?;
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    let (records, outcome) = match walk(&bytes, &config) {
        Ok(stream) => (stream.records, Ok(stream.termination)),
        Err(PartialDecode { records, error }) => (records, Err(error)),
    };

    let selected: Vec<(usize, u64, &Record)> = with_offsets(&records)
        .filter(|(idx, _, _)| args.record.is_none_or(|target| *idx == target))
        .collect();

    if args.json {
        let out = InspectJson {
            records: selected.iter().map(|(_, _, r)| *r).collect(),
            stopped: StopJson::from(&outcome),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (idx, offset, record) in &selected {
            println!("[{idx}] @{offset} {record}");
            if args.show_hex {
                print_hex_dumps(record);
            }
        }
        if let Ok(termination) = &outcome {
            println!("---");
            println!("stopped: {termination}");
        }
    }

    outcome
        .map(|_| ())
        .with_context(|| format!("failed to decode {}", args.file.display()))
}

/// Records paired with their index and source offset.
fn with_offsets(records: &[Record]) -> impl Iterator<Item = (usize, u64, &Record)> {
    records.iter().enumerate().scan(0u64, |offset, (idx, record)| {
        let start = *offset;
        *offset += record.wire_len();
        Some((idx, start, record))
    })
}

// ── Hex dump ──────────────────────────────────────────────────────────────────

fn print_hex_dumps(record: &Record) {
    for sub in &record.subrecords {
        let raw = match &sub.payload {
            SubrecordPayload::Opaque(raw) | SubrecordPayload::Mismatched { raw, .. } => raw,
            _ => continue,
        };
        println!("    {} hex dump:", sub.tag);
        for line in hex_dump(raw) {
            println!("      {line}");
        }
    }
}

/// 16 bytes per line: offset, hex bytes, printable ASCII.
fn hex_dump(raw: &[u8]) -> Vec<String> {
    raw.chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let hex = chunk
                .iter()
                .fold(String::with_capacity(chunk.len() * 3), |mut s, b| {
                    if !s.is_empty() {
                        s.push(' ');
                    }
                    let _ = write!(s, "{b:02x}");
                    s
                });
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
                .collect();
            format!("{:04x}  {hex:<47}  {ascii}", i * 16)
        })
        .collect()
}

// ── JSON output ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct InspectJson<'a> {
    records: Vec<&'a Record>,
    stopped: StopJson,
}

#[derive(Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
enum StopJson {
    EndOfSource { offset: usize },
    Unrecognized { tag: String, offset: usize },
    Error { message: String },
}

impl From<Termination> for StopJson {
    fn from(termination: Termination) -> Self {
        match termination {
            Termination::EndOfSource { offset } => Self::EndOfSource { offset },
            Termination::Unrecognized { tag, offset } => Self::Unrecognized {
                tag: tag.to_text(),
                offset,
            },
        }
    }
}

impl From<&Result<Termination, DecodeError>> for StopJson {
    fn from(outcome: &Result<Termination, DecodeError>) -> Self {
        match outcome {
            Ok(termination) => Self::from(*termination),
            Err(error) => Self::Error {
                message: error.to_string(),
            },
        }
    }
}
