//! Balloon request intake
//!
//! An elastic-memory controller outside the process writes the desired
//! balloon size as a decimal byte count, one request per line, into a named
//! pipe. A reader thread parses the lines and posts them to a
//! [`BalloonInbox`]; the heap orchestrator drains the inbox at the next
//! safepoint, so only the latest request matters.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::{GcError, GcResult};

/// Pipe the elastic-memory controller writes to, for [`spawn_balloon_reader`]
pub const DEFAULT_BALLOON_PIPE: &str = "/tmp/JavaBalloonSizeBytesInput";

/// Latest pending balloon size, shared between the reader and the safepoint
#[derive(Debug, Default)]
pub struct BalloonInbox {
    pending: Mutex<Option<usize>>,
}

impl BalloonInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request, replacing any request not yet applied
    pub fn post(&self, bytes: usize) {
        if let Some(prev) = self.pending.lock().replace(bytes) {
            log::trace!("balloon request {prev} superseded by {bytes}");
        }
    }

    /// Take the pending request, if any
    pub fn take(&self) -> Option<usize> {
        self.pending.lock().take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }
}

/// Parse one request line; `Ok(None)` for a blank line
fn parse_request(line: &str) -> GcResult<Option<usize>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    line.parse::<usize>()
        .map(Some)
        .map_err(|e| GcError::InvalidBalloonRequest(format!("{line:?}: {e}")))
}

/// Read requests from `reader` until end of input, posting each to `inbox`
///
/// Returns the number of requests posted.
///
/// # Errors
///
/// Stops at the first malformed line with [`GcError::InvalidBalloonRequest`];
/// requests before it have already been posted. A read failure is reported
/// the same way.
pub fn read_balloon_requests<R: BufRead>(reader: R, inbox: &BalloonInbox) -> GcResult<usize> {
    let mut posted = 0;
    for line in reader.lines() {
        let line = line.map_err(|e| GcError::InvalidBalloonRequest(format!("read failed: {e}")))?;
        if let Some(bytes) = parse_request(&line)? {
            log::debug!("balloon request: {bytes} bytes");
            inbox.post(bytes);
            posted += 1;
        }
    }
    Ok(posted)
}

#[cfg(unix)]
fn is_fifo(path: &Path) -> bool {
    use std::os::unix::fs::FileTypeExt;
    std::fs::metadata(path).is_ok_and(|m| m.file_type().is_fifo())
}

#[cfg(not(unix))]
fn is_fifo(_path: &Path) -> bool {
    false
}

fn reader_error(path: &Path, source: std::io::Error) -> GcError {
    GcError::BalloonReader {
        path: path.display().to_string(),
        source,
    }
}

/// Start a `balloon-reader` thread feeding `inbox` from `path`
///
/// A named pipe is reopened each time its writer closes, so the thread runs
/// for the life of the process and a malformed write is logged and skipped.
/// A regular file is read once; the thread then returns the number of
/// requests posted.
///
/// # Errors
///
/// [`GcError::BalloonReader`] if the thread cannot be started. The thread
/// itself returns that error when `path` cannot be opened.
pub fn spawn_balloon_reader(
    path: impl Into<PathBuf>,
    inbox: Arc<BalloonInbox>,
) -> GcResult<JoinHandle<GcResult<usize>>> {
    let path = path.into();
    let worker_path = path.clone();
    thread::Builder::new()
        .name("balloon-reader".into())
        .spawn(move || {
            let path = worker_path;
            let mut posted = 0;
            loop {
                let file = File::open(&path).map_err(|e| reader_error(&path, e))?;
                let fifo = is_fifo(&path);
                match read_balloon_requests(BufReader::new(file), &inbox) {
                    Ok(n) => posted += n,
                    Err(e) if fifo => log::warn!("balloon pipe {}: {e}", path.display()),
                    Err(e) => return Err(e),
                }
                if !fifo {
                    log::debug!("balloon input {} drained: {posted} requests", path.display());
                    return Ok(posted);
                }
            }
        })
        .map_err(|e| reader_error(&path, e))
}
