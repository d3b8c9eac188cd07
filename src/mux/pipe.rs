//! The blocking byte pipe under every virtual connection.
//!
//! Readers block until data exists or the pipe closes; writers block under
//! backpressure once the buffer passes a soft ceiling. One mutex and one
//! condition variable coordinate everything: every state change broadcasts,
//! every waiter re-checks its condition on wake. There is no fairness
//! guarantee between waiters, only that each is re-evaluated after every
//! state-changing operation.

use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{Error, Result};

/// Soft buffer ceiling: writers block above it, readers drain freely.
pub const DEFAULT_SOFT_LIMIT: usize = (1 << 20) * 500;

struct PipeState {
    buf: VecDeque<u8>,
    closed: bool,
    /// Absolute read deadline; `None` means no deadline.
    read_deadline: Option<Instant>,
    /// Rolling idle timeout for [`BufferedPipe::write_to`], re-armed every
    /// drain cycle; `None` means disabled.
    write_timeout: Option<Duration>,
    soft_limit: usize,
}

/// A bounded blocking byte pipe.
///
/// All operations are safe to call concurrently from any number of
/// threads. `close` and the deadline setters never block on the condition
/// variable; reads, writes and `write_to` block only while waiting for
/// data, space or close. Deadline waits are bounded by the condition
/// variable itself: a wakeup is advisory, and the deadline comparison after
/// reacquiring the lock is what decides.
pub struct BufferedPipe {
    state: Mutex<PipeState>,
    cond: Condvar,
}

impl BufferedPipe {
    /// Create an empty, open pipe with the default soft ceiling.
    pub fn new() -> Self {
        Self::with_soft_limit(DEFAULT_SOFT_LIMIT)
    }

    /// Create a pipe with a custom soft ceiling.
    pub fn with_soft_limit(soft_limit: usize) -> Self {
        Self {
            state: Mutex::new(PipeState {
                buf: VecDeque::new(),
                closed: false,
                read_deadline: None,
                write_timeout: None,
                soft_limit,
            }),
            cond: Condvar::new(),
        }
    }

    /// Read up to `target.len()` bytes, blocking until data is available,
    /// the pipe closes, or the read deadline passes.
    ///
    /// Returns `Ok(0)` once the pipe is closed and drained. A deadline that
    /// has already passed wins over buffered data.
    pub fn read(&self, target: &mut [u8]) -> Result<usize> {
        let mut state = self.state.lock();
        loop {
            if state.closed && state.buf.is_empty() {
                return Ok(0);
            }
            if let Some(deadline) = state.read_deadline {
                if Instant::now() >= deadline {
                    return Err(Error::Timeout);
                }
            }
            if !state.buf.is_empty() {
                let mut n = 0;
                while n < target.len() {
                    match state.buf.pop_front() {
                        Some(byte) => {
                            target[n] = byte;
                            n += 1;
                        }
                        None => break,
                    }
                }
                // Wake writers that may now be under the ceiling.
                self.cond.notify_all();
                return Ok(n);
            }
            match state.read_deadline {
                Some(deadline) => {
                    self.cond.wait_until(&mut state, deadline);
                }
                None => self.cond.wait(&mut state),
            }
        }
    }

    /// Drain the entire buffer into `sink`, repeatedly, until the pipe
    /// closes. Returns the total number of bytes moved.
    ///
    /// When a write timeout is configured it acts as a rolling idle limit:
    /// each cycle re-arms the read deadline to now plus the timeout, so the
    /// call fails with [`Error::Timeout`] only after the pipe has been idle
    /// that long. A sink error is returned after waking other waiters.
    pub fn write_to<W: io::Write>(&self, sink: &mut W) -> Result<u64> {
        let mut total = 0u64;
        let mut state = self.state.lock();
        loop {
            if state.closed && state.buf.is_empty() {
                return Ok(total);
            }
            if let Some(deadline) = state.read_deadline {
                if Instant::now() >= deadline {
                    return Err(Error::Timeout);
                }
            }
            if let Some(idle) = state.write_timeout {
                state.read_deadline = Some(Instant::now() + idle);
            }
            if !state.buf.is_empty() {
                let chunk: Vec<u8> = state.buf.drain(..).collect();
                total += chunk.len() as u64;
                if let Err(e) = sink.write_all(&chunk) {
                    self.cond.notify_all();
                    return Err(Error::Transport(e));
                }
                self.cond.notify_all();
            }
            match state.read_deadline {
                Some(deadline) => {
                    self.cond.wait_until(&mut state, deadline);
                }
                None => self.cond.wait(&mut state),
            }
        }
    }

    /// Append `input`, blocking while the buffer sits above the soft
    /// ceiling. Never fails because of the ceiling alone; fails with
    /// [`Error::PipeClosed`] once the pipe is closed, including for writes
    /// already blocked when close happens.
    pub fn write(&self, input: &[u8]) -> Result<usize> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(Error::PipeClosed);
            }
            if state.buf.len() <= state.soft_limit {
                break;
            }
            self.cond.wait(&mut state);
        }
        state.buf.extend(input.iter().copied());
        self.cond.notify_all();
        Ok(input.len())
    }

    /// Close the pipe. Idempotent; never fails. Buffered bytes remain
    /// readable; blocked writers wake and fail; drained readers see
    /// end-of-stream.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.cond.notify_all();
    }

    /// Set or clear the absolute read deadline. Waiters re-evaluate
    /// immediately rather than sleeping out the old deadline.
    pub fn set_read_deadline(&self, deadline: Option<Instant>) {
        let mut state = self.state.lock();
        state.read_deadline = deadline;
        self.cond.notify_all();
    }

    /// Set or clear the rolling idle timeout applied by [`write_to`].
    ///
    /// [`write_to`]: BufferedPipe::write_to
    pub fn set_write_timeout(&self, timeout: Option<Duration>) {
        let mut state = self.state.lock();
        state.write_timeout = timeout;
        self.cond.notify_all();
    }

    /// Bytes currently buffered.
    pub fn len(&self) -> usize {
        self.state.lock().buf.len()
    }

    /// Whether the buffer is currently empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().buf.is_empty()
    }

    /// Whether the pipe has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Default for BufferedPipe {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Read for &BufferedPipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        BufferedPipe::read(*self, buf).map_err(Into::into)
    }
}

impl io::Write for &BufferedPipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BufferedPipe::write(*self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
