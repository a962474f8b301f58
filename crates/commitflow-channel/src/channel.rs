use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::debug;

use commitflow_core::error::{FlowError, Result};
use commitflow_core::traits::InputSource;

use crate::protocol::{InputResponse, OutputFrame};

/// Serializes frames onto a shared writer, one complete line per frame,
/// flushed immediately. Shared by the interaction channel and the status
/// reporter so output lines never interleave.
pub struct Transport<W> {
    writer: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send + 'static> Transport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub async fn write_frame(&self, frame: &OutputFrame) -> Result<()> {
        let mut line = serde_json::to_vec(frame)?;
        line.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// The process-wide duplex resource interactive adapters suspend on. One
/// request may be outstanding at a time: the reader lock is held for the
/// whole write-then-read round trip, so a second request blocks before its
/// frame is written.
///
/// Cancellation policy: the response read blocks indefinitely; a closed
/// stream (or a blank line) is the only cancellation signal and surfaces as
/// [`FlowError::InteractionCancelled`].
pub struct InteractionChannel<R, W> {
    reader: Mutex<R>,
    transport: Arc<Transport<W>>,
}

pub type StdioTransport = Transport<Stdout>;
pub type StdioChannel = InteractionChannel<BufReader<Stdin>, Stdout>;

impl StdioChannel {
    /// Build the stdio singleton pair: the shared frame writer and the
    /// channel reading responses from stdin.
    pub fn stdio() -> (Arc<StdioTransport>, StdioChannel) {
        let transport = Arc::new(Transport::new(tokio::io::stdout()));
        let channel = InteractionChannel::new(BufReader::new(tokio::io::stdin()), transport.clone());
        (transport, channel)
    }
}

impl<R, W> InteractionChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(reader: R, transport: Arc<Transport<W>>) -> Self {
        Self {
            reader: Mutex::new(reader),
            transport,
        }
    }

    pub async fn round_trip(
        &self,
        key: &str,
        prompt: &str,
        options: Vec<String>,
    ) -> Result<Vec<String>> {
        // Lock before writing: no pipelining.
        let mut reader = self.reader.lock().await;

        self.transport
            .write_frame(&OutputFrame::input_request(key, prompt, options))
            .await?;

        let mut line = String::new();
        let read = reader.read_line(&mut line).await?;
        if read == 0 || line.trim().is_empty() {
            debug!(key, "input stream closed, treating as cancellation");
            return Err(FlowError::InteractionCancelled);
        }

        let response: InputResponse = serde_json::from_str(line.trim())?;
        Ok(response.value)
    }
}

impl<R, W> InputSource for InteractionChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn request(
        &self,
        key: String,
        prompt: String,
        options: Vec<String>,
    ) -> BoxFuture<'_, Result<Vec<String>>> {
        Box::pin(async move { self.round_trip(&key, &prompt, options).await })
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    fn channel_over(
        input: &'static [u8],
    ) -> (InteractionChannel<BufReader<tokio::io::DuplexStream>, tokio::io::DuplexStream>, tokio::io::DuplexStream)
    {
        let (request_rx, request_tx) = tokio::io::duplex(4096);
        let (mut response_tx, response_rx) = tokio::io::duplex(4096);
        let transport = Arc::new(Transport::new(request_tx));
        let channel = InteractionChannel::new(BufReader::new(response_rx), transport);

        let input = input.to_vec();
        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            response_tx.write_all(&input).await.ok();
            // Dropping response_tx closes the stream.
        });

        (channel, request_rx)
    }

    #[tokio::test]
    async fn round_trip_returns_the_selection() {
        let (channel, mut request_rx) = channel_over(b"{\"value\":[\"a.txt\"]}\n");

        let selection = channel
            .round_trip("stage_files", "Select files to stage", vec!["a.txt".into()])
            .await
            .unwrap();
        assert_eq!(selection, vec!["a.txt"]);

        // Exactly one request frame went out.
        drop(channel);
        let mut written = String::new();
        request_rx.read_to_string(&mut written).await.unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 1);
        let frame: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(frame["type"], "input_request");
        assert_eq!(frame["key"], "stage_files");
        assert_eq!(frame["prompt"], "Select files to stage");
    }

    #[tokio::test]
    async fn missing_value_field_reads_as_empty_selection() {
        let (channel, _request_rx) = channel_over(b"{}\n");

        let selection = channel.round_trip("k", "p", vec![]).await.unwrap();
        assert!(selection.is_empty());
    }

    #[tokio::test]
    async fn closed_stream_is_cancellation_not_a_hang() {
        let (channel, _request_rx) = channel_over(b"");

        let err = channel.round_trip("k", "p", vec![]).await.unwrap_err();
        assert!(matches!(err, FlowError::InteractionCancelled));
    }

    #[tokio::test]
    async fn garbage_response_is_a_json_error() {
        let (channel, _request_rx) = channel_over(b"not json\n");

        let err = channel.round_trip("k", "p", vec![]).await.unwrap_err();
        assert!(matches!(err, FlowError::Json(_)));
    }
}
