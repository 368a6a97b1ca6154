/// Implementation of `ess validate`.
///
/// Decodes the whole save file with subrecord layout checks made fatal,
/// then reports either a series of `✓` lines or a `✗` diagnostic. The
/// main dispatcher turns the returned `Err` into exit code 1.
///
/// # Success output
///
/// ```text
/// ✓ Header: TES3 v1.3 "Quicksave" (Bethesda)
/// ✓ Records: 3 records decoded
/// ✓ Sizes: every record body matches its subrecords
/// ✓ Layouts: every fixed-layout subrecord has its expected length
/// ✓ End: unrecognized record SCPT at offset 407
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: record GLOB at offset 362: subrecords need 33 bytes, header declares 29
///   (1 record decoded before the error)
/// ```
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, anyhow};
use ess_decoder::{DecodeError, SizeScope, StreamingWalker};
use ess_types::tags;

use crate::ValidateArgs;

/// Run the `ess validate` command.
///
/// The file is streamed record by record, so only one record body is held
/// in memory at a time.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the flags are invalid, or
/// the save fails any structural check.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let config = args.decode.config()?.strict();
    let file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;

    let mut walker = StreamingWalker::new(BufReader::new(file), &config);
    let mut header = None;
    let mut count = 0usize;

    for item in walker.by_ref() {
        match item {
            Ok(record) => {
                if count == 0 && record.tag == tags::TES3 {
                    header = record.file_header().cloned();
                }
                count += 1;
            }
            Err(error) => {
                println!("✗ Error: {}", decode_error_diagnostic(&error));
                println!("  ({count} record{} decoded before the error)", plural(count));
                return Err(anyhow!("validation failed"));
            }
        }
    }

    let termination = walker
        .termination()
        .context("walk ended without a stop reason")?;

    match header {
        Some(h) => println!(
            "✓ Header: TES3 v{} {:?} ({})",
            h.version, h.description, h.company_name
        ),
        None => println!("· Header: no leading TES3 record"),
    }
    println!("✓ Records: {count} record{} decoded", plural(count));
    println!("✓ Sizes: every record body matches its subrecords");
    println!("✓ Layouts: every fixed-layout subrecord has its expected length");
    println!("✓ End: {termination}");
    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

// ── Error formatting ──────────────────────────────────────────────────────────

/// Converts a `DecodeError` into a one-line diagnostic.
///
/// ```text
/// ┌──────────────────────────┬────────────────────────────────────────────┐
/// │ DecodeError variant      │ Diagnostic                                 │
/// ├──────────────────────────┼────────────────────────────────────────────┤
/// │ ShortRead                │ "truncated at offset N: ..."               │
/// │ SizeMismatch (record)    │ "record T at offset N: subrecords need..." │
/// │ SizeMismatch (subrecord) │ "subrecord T at offset N: L bytes, ..."    │
/// │ anything else            │ "<error Display>"                          │
/// └──────────────────────────┴────────────────────────────────────────────┘
/// ```
fn decode_error_diagnostic(e: &DecodeError) -> String {
    match e {
        DecodeError::ShortRead {
            offset,
            needed,
            available,
        } => format!("truncated at offset {offset}: needed {needed} bytes, {available} available"),
        DecodeError::SizeMismatch {
            scope: SizeScope::Record,
            tag,
            offset,
            expected,
            actual,
        } => format!(
            "record {tag} at offset {offset}: subrecords need {actual} bytes, header declares {expected}"
        ),
        DecodeError::SizeMismatch {
            scope: SizeScope::Subrecord,
            tag,
            offset,
            expected,
            actual,
        } => format!("subrecord {tag} at offset {offset}: {actual} bytes, layout expects {expected}"),
        other => other.to_string(),
    }
}
