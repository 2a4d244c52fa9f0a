// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader: collects raw key bytes from the terminal.
//
// `read()` on stdin blocks, but the host loop must keep rendering frames
// and must be able to ask "is a key available?" without waiting. A
// dedicated thread does the blocking and sends byte chunks through a
// channel; the backend drains the channel with `try_recv()`.
//
// Shutdown: the thread polls stdin's fd with a short timeout and checks
// an `AtomicBool` stop flag between polls, so it never stays stuck in a
// blocking `read()` after the backend is dropped.

#[cfg(unix)]
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::trace;

/// A keypress is 1–6 bytes, a paste can be kilobytes.
const READ_BUF_SIZE: usize = 4096;

/// Upper bound on shutdown latency, in milliseconds.
const POLL_TIMEOUT_MS: i32 = 50;

/// Background stdin reader thread. Stops when dropped.
///
/// ```no_run
/// use weft_term::reader::StdinReader;
///
/// let (reader, rx) = StdinReader::spawn()?;
/// if let Ok(bytes) = rx.try_recv() {
///     println!("got {} bytes", bytes.len());
/// }
/// drop(reader);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the reader thread.
    ///
    /// Each received `Vec<u8>` is a non-empty chunk of raw stdin data. The
    /// channel closes when the reader stops or stdin reaches EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn() -> std::io::Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("weft-stdin".into())
            .spawn(move || reader_loop(&tx, &stop_flag))?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Signal the thread to stop and wait for it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Poll, read, send; exit on stop flag, EOF, or a dropped receiver.
#[cfg(unix)]
fn reader_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::os::unix::io::AsRawFd;

    let fd = io::stdin().as_raw_fd();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
        };
        if ready <= 0 {
            continue;
        }

        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        let Ok(n) = usize::try_from(n) else { break };
        if n == 0 {
            break;
        }

        trace!(bytes = n, "stdin chunk");
        if tx.send(buf[..n].to_vec()).is_err() {
            break;
        }
    }
}

/// Blocking fallback without poll; shutdown waits for the next read.
#[cfg(not(unix))]
fn reader_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let stdin = std::io::stdin();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        match stdin.lock().read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
