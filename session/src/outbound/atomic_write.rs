//! Replace a file's contents without exposing a half-written document.
//!
//! Contents land in a hidden sibling file first, which is synced and then
//! renamed over the target.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use cap_std::fs::{Dir, OpenOptions};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Atomically write `contents` to `file_name` inside `dir`.
///
/// `file_name` must be a single path component.
pub(crate) fn write_atomic(dir: &Dir, file_name: &str, contents: &[u8]) -> io::Result<()> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(".{file_name}.{}.{counter}.tmp", std::process::id());

    if let Err(err) = write_temp(dir, &tmp_name, contents) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    if let Err(err) = replace(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    // Directory sync is best effort; some platforms refuse it.
    drop(dir.open(".").and_then(|parent| parent.sync_all()));
    Ok(())
}

fn write_temp(dir: &Dir, tmp_name: &str, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(windows)]
fn replace(dir: &Dir, tmp_name: &str, file_name: &str) -> io::Result<()> {
    match dir.remove_file(file_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, file_name)
}

#[cfg(not(windows))]
fn replace(dir: &Dir, tmp_name: &str, file_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_std::ambient_authority;
    use rstest::rstest;

    #[rstest]
    fn replaces_existing_contents_and_leaves_no_temp_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = Dir::open_ambient_dir(temp.path(), ambient_authority()).expect("open dir");

        write_atomic(&dir, "store.json", b"first").expect("first write");
        write_atomic(&dir, "store.json", b"second").expect("second write");

        assert_eq!(dir.read_to_string("store.json").expect("read"), "second");
        let entries = dir.entries().expect("list").count();
        assert_eq!(entries, 1);
    }
}
