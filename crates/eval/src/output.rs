//! Result file writer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write neighbor ids to `path`, one per line.
pub fn write_ids(path: &Path, ids: &[u32]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for id in ids {
        writeln!(out, "{id}")?;
    }
    out.flush()
}
