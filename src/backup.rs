//! Snapshot the primary history before it is rewritten.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Copy all of `source`, from its start, into a fresh file at `dest`.
///
/// The destination is truncated if it exists and is synced to disk before
/// returning. Returns the number of bytes copied.
pub fn backup<R: Read + Seek>(source: &mut R, dest: &Path) -> io::Result<u64> {
    let mut out = File::create(dest)?;
    source.seek(SeekFrom::Start(0))?;
    let copied = io::copy(source, &mut out)?;
    out.sync_all()?;

    tracing::info!(dest = %dest.display(), bytes = copied, "backed up history");
    Ok(copied)
}
