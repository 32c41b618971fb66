//! Byte-based line readers for child-process output.
//!
//! Emulator and driver tooling can emit non-UTF8 bytes. `BufReader::lines()`
//! stops at the first invalid sequence, so lines are read as bytes and
//! decoded lossily instead.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

/// Call `on_line` for every line of `stream` until EOF or a read error.
pub async fn for_each_line<R, F>(stream: R, stream_type: &'static str, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut reader = BufReader::new(stream);
    let mut buf: Vec<u8> = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                on_line(String::from_utf8_lossy(&buf).into_owned());
            }
            Err(e) => {
                debug!(%stream_type, error = %e, "Output reader exiting due to read error");
                break;
            }
        }
    }
}

/// Forward lines into `tx` from a background task.
pub fn spawn_line_collector<R>(
    stream: R,
    stream_type: &'static str,
    tx: UnboundedSender<String>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        for_each_line(stream, stream_type, |line| {
            // Receiver gone means the caller stopped caring about output
            let _ = tx.send(line);
        })
        .await;
    })
}

/// Stream lines into `tracing` at debug level from a background task.
pub fn spawn_log_reader<R>(stream: R, source: String, stream_type: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        for_each_line(stream, stream_type, |line| {
            debug!(source = %source, %stream_type, "{}", line);
        })
        .await;
        debug!(source = %source, %stream_type, "Log reader task exiting");
    });
}
