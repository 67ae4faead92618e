use std::io::{self, Write};

use tracing::debug;

/// What happened to a block written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Written,
    /// The reader went away (`spendfold report ... | head`).
    ReaderClosed,
}

/// Prints one rendered block followed by exactly one newline.
pub fn emit(text: &str) -> io::Result<Delivery> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    emit_to(&mut handle, text)
}

pub(crate) fn emit_to<W: Write>(writer: &mut W, text: &str) -> io::Result<Delivery> {
    let body = text.trim_end_matches('\n');
    let result = writer
        .write_all(body.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .and_then(|()| writer.flush());
    match result {
        Ok(()) => Ok(Delivery::Written),
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => {
            debug!(bytes = body.len(), "stdout reader closed before output finished");
            Ok(Delivery::ReaderClosed)
        }
        Err(error) => Err(error),
    }
}
