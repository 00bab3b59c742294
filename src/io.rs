use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, VmError};
use crate::translation::Translation;
use crate::vm_manager::Statistics;

/// Parse one address per line. Blank lines are skipped.
pub fn parse_addresses(content: &str) -> Result<Vec<u32>> {
    let mut addresses = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let va: u32 = token.parse().map_err(|_| VmError::MalformedAddress {
            line: index + 1,
            text: token.to_string(),
        })?;
        addresses.push(va);
    }
    Ok(addresses)
}

pub fn read_addresses<P: AsRef<Path>>(path: P) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| VmError::io(path, e))?;
    parse_addresses(&content)
}

/// Write one line per translation (unless `quiet`) followed by the summary block
pub fn write_report<W: Write>(
    out: &mut W,
    records: &[Translation],
    stats: &Statistics,
    quiet: bool,
) -> std::io::Result<()> {
    if !quiet {
        for record in records {
            writeln!(out, "{}", record)?;
        }
    }
    writeln!(out, "{}", stats)?;
    out.flush()
}
