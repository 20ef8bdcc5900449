use std::io;
use std::sync::{Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    // A panic while holding the lock leaves plain data behind; keep using it
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Activate buffering. While active, `warn()` calls and log events store
/// messages instead of printing to stderr.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Write a warning message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// `tracing` writer that sends each formatted event through [`warn`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferedStderr;

/// One event's bytes; handed to the buffer when dropped.
pub struct BufferedLine(Vec<u8>);

impl io::Write for BufferedLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for BufferedLine {
    fn drop(&mut self) {
        if self.0.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.0);
        warn(text.trim_end_matches('\n').to_string());
    }
}

impl<'a> MakeWriter<'a> for BufferedStderr {
    type Writer = BufferedLine;

    fn make_writer(&'a self) -> Self::Writer {
        BufferedLine(Vec::new())
    }
}
