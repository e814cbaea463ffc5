//! Single-file durable store backend.
//!
//! This module provides:
//! - [`FileStore`] — one record per line in an append-mostly file, with a
//!   head-offset sidecar for logical removal and periodic compaction.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::traits::DurableStore;

/// Dead-prefix size at which compaction becomes worthwhile.
const COMPACT_MIN_DEAD: usize = 1024;

/// A file-backed [`DurableStore`].
///
/// Records live one per line in a single file, so a record containing a raw
/// newline cannot be represented; appending one fails the whole batch with
/// [`StoreError::Persist`]. Appends go to the end of the file through a
/// buffered writer and are flushed per batch. Removals from the oldest end
/// are logical: a sidecar file (`<path>.head`) records how many leading
/// lines are dead, and the file is compacted (rewritten to a temp file,
/// synced, then renamed into place) once the dead prefix grows past
/// [`COMPACT_MIN_DEAD`] and outweighs the live tail.
///
/// The full live record set is mirrored in memory, which keeps reads and
/// iteration cheap and makes this backend suited to the moderate volumes the
/// journal's retention keeps it at, not to unbounded archives.
///
/// Crash safety favors data: an interrupted removal or compaction can
/// resurrect already-removed records on reopen, but never loses live ones.
///
/// # Example
///
/// ```rust
/// use ebb_store::{DurableStore, FileStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = FileStore::open(dir.path().join("events.log")).unwrap();
/// store.append(&["first".to_string()]).unwrap();
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug)]
pub struct FileStore {
    records_path: PathBuf,
    head_path: PathBuf,
    tmp_path: PathBuf,
    inner: Mutex<FileInner>,
}

#[derive(Debug)]
struct FileInner {
    /// Live records, oldest first. Mirrors `records_path` minus the dead
    /// prefix.
    live: VecDeque<String>,
    /// Leading lines of `records_path` that are logically removed.
    dead: usize,
    writer: BufWriter<File>,
}

impl FileStore {
    /// Opens the store at `path`, creating the file if missing and loading
    /// any records a previous process left behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be
    /// created or read.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let records_path = path.into();
        let head_path = sibling(&records_path, ".head");
        let tmp_path = sibling(&records_path, ".tmp");

        if let Some(parent) = records_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if !records_path.exists() && head_path.exists() {
            // Sidecar without a record file is leftover state from a deleted
            // store; keeping it would mis-skip lines of the new file.
            fs::remove_file(&head_path)?;
        }

        let (live, dead) = load(&records_path, &head_path)?;
        let writer = open_append(&records_path)?;

        debug!(
            path = %records_path.display(),
            live = live.len(),
            dead,
            "opened file store"
        );

        Ok(Self {
            records_path,
            head_path,
            tmp_path,
            inner: Mutex::new(FileInner { live, dead, writer }),
        })
    }

    /// Returns the path of the record file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.records_path
    }

    /// Rewrites the record file without its dead prefix.
    ///
    /// The head sidecar is reset before the rename so that a crash at any
    /// point resurrects dead records instead of dropping live ones.
    fn compact(&self, inner: &mut FileInner) -> Result<()> {
        let dropped = inner.dead;
        {
            let tmp = File::create(&self.tmp_path)?;
            let mut writer = BufWriter::new(tmp);
            for record in &inner.live {
                writeln!(writer, "{record}")?;
            }
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::write(&self.head_path, "0")?;
        fs::rename(&self.tmp_path, &self.records_path)?;
        inner.writer = open_append(&self.records_path)?;
        inner.dead = 0;

        debug!(
            path = %self.records_path.display(),
            live = inner.live.len(),
            dropped,
            "compacted record file"
        );
        Ok(())
    }
}

impl DurableStore for FileStore {
    fn append(&self, records: &[String]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        // A raw newline would split into two records on reload.
        if records.iter().any(|record| record.contains('\n')) {
            return Err(StoreError::Persist(
                "record contains a raw line break".to_string(),
            ));
        }
        let mut inner = self.inner.lock();
        for record in records {
            writeln!(inner.writer, "{record}")?;
        }
        inner.writer.flush()?;
        inner.live.extend(records.iter().cloned());
        Ok(())
    }

    fn remove_oldest(&self, count: usize) -> Result<usize> {
        if count == 0 {
            return Ok(0);
        }
        let mut inner = self.inner.lock();
        let removed = count.min(inner.live.len());
        if removed == 0 {
            return Ok(0);
        }
        for _ in 0..removed {
            inner.live.pop_front();
        }
        inner.dead += removed;
        fs::write(&self.head_path, inner.dead.to_string())?;
        if inner.dead >= COMPACT_MIN_DEAD && inner.dead >= inner.live.len() {
            self.compact(&mut inner)?;
        }
        Ok(removed)
    }

    fn len(&self) -> usize {
        self.inner.lock().live.len()
    }

    fn oldest(&self) -> Option<String> {
        self.inner.lock().live.front().cloned()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = String> + '_> {
        Box::new(FileIter {
            inner: &self.inner,
            pos: 0,
        })
    }
}

/// Index-walking iterator over the live records; locks per step and fails
/// closed, same as the in-memory backend.
struct FileIter<'a> {
    inner: &'a Mutex<FileInner>,
    pos: usize,
}

impl Iterator for FileIter<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let inner = self.inner.lock();
        let record = inner.live.get(self.pos).cloned()?;
        self.pos += 1;
        Some(record)
    }
}

/// Derives a sidecar path by appending `suffix` to the full file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn open_append(path: &Path) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

/// Loads live records and the dead-prefix count from disk.
fn load(records_path: &Path, head_path: &Path) -> Result<(VecDeque<String>, usize)> {
    if !records_path.exists() {
        return Ok((VecDeque::new(), 0));
    }

    let head = match fs::read_to_string(head_path) {
        Ok(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
            warn!(
                path = %head_path.display(),
                "unreadable head offset, treating whole record file as live"
            );
            0
        }),
        Err(_) => 0,
    };

    let reader = BufReader::new(File::open(records_path)?);
    let mut live = VecDeque::new();
    let mut skipped = 0usize;
    for line in reader.lines() {
        let line = line?;
        if skipped < head {
            skipped += 1;
            continue;
        }
        live.push_back(line);
    }

    // `skipped` can stop short of `head` after an interrupted compaction;
    // the shorter file is the truth then.
    Ok((live, skipped))
}
