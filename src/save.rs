//! Write the merged history back to disk.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::store::DedupStore;

/// Write every entry of `store`, oldest first, one per line.
///
/// Recorded entries get their `: <epoch>:<elapsed>;` prefix back. Entries that
/// only ever had a synthetic stamp are written as bare commands.
pub fn write_history<W: Write>(out: &mut W, store: &DedupStore) -> io::Result<()> {
    for (command, timestamp) in store.sorted() {
        if let Some(prefix) = timestamp.prefix() {
            out.write_all(prefix.as_bytes())?;
        }
        out.write_all(command)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Replace the file at `target` with the contents of `store`.
///
/// Nothing is written when the store is empty, in which case this returns
/// `Ok(false)`. Otherwise the history goes to a temporary file next to
/// `target`, which is synced and then renamed over it, so `target` is never
/// observed half-written. A symlinked `target` is resolved first so the file
/// it points at is the one replaced.
pub fn save(target: &Path, store: &DedupStore) -> io::Result<bool> {
    if store.is_empty() {
        tracing::debug!(target = %target.display(), "nothing to save");
        return Ok(false);
    }

    let resolved = match fs::canonicalize(target) {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => target.to_path_buf(),
        Err(e) => return Err(e),
    };
    let dir = resolved
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let tmp = NamedTempFile::new_in(dir)?;

    if let Ok(meta) = fs::metadata(&resolved) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }

    {
        let mut out = BufWriter::new(tmp.as_file());
        write_history(&mut out, store)?;
        out.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(&resolved).map_err(|e| e.error)?;

    tracing::info!(target = %target.display(), commands = store.len(), "saved history");
    Ok(true)
}
