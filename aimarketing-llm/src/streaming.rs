//! Server-sent-event parsing for streamed chat completions.
//!
//! The body is read line by line:
//! ```text
//! data: {"choices":[{"delta":{"role":"assistant"}}]}
//! data: {"choices":[{"delta":{"content":"Hi"}}]}
//!
//! : keep-alive
//! data: {"choices":[{"delta":{"content":" there"}}]}
//! data: [DONE]
//! ```
//! Blank lines and lines without the `data: ` prefix are skipped. The
//! `[DONE]` sentinel ends the stream; nothing after it is read. A `data:`
//! payload that is not JSON, or lacks `choices[0].delta`, aborts the stream.

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::error::ClientError;
use crate::normalize::normalize_reply;
use crate::sink::ReplySink;
use crate::types::{ChatChunk, DeltaChunk};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "data: [DONE]";

/// What a single line of the event stream means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Blank, comment or keep-alive line; nothing to do.
    Skip,
    /// A decoded delta to append.
    Chunk(DeltaChunk),
    /// The terminal sentinel.
    Done,
}

/// Classify and decode one line (without its trailing newline).
pub fn parse_line(line: &str) -> Result<LineEvent, ClientError> {
    if line.is_empty() {
        return Ok(LineEvent::Skip);
    }
    if line.trim() == DONE_SENTINEL {
        return Ok(LineEvent::Done);
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(LineEvent::Skip);
    };

    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|source| ClientError::MalformedChunk {
            line: payload.to_string(),
            source,
        })?;
    let chunk: ChatChunk = serde_json::from_value(value)
        .map_err(|e| ClientError::UnexpectedResponse(format!("stream chunk: {e}")))?;
    let choice = chunk.choices.into_iter().next().ok_or_else(|| {
        ClientError::UnexpectedResponse("stream chunk has no choices".into())
    })?;
    Ok(LineEvent::Chunk(choice.delta))
}

/// Accumulates delta content in arrival order.
#[derive(Debug, Default)]
pub struct ReplyAssembler {
    buffer: String,
    chunks: usize,
}

impl ReplyAssembler {
    /// An empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta's content (nothing when it has none).
    pub fn push(&mut self, delta: &DeltaChunk) {
        if let Some(content) = &delta.content {
            self.buffer.push_str(content);
        }
        self.chunks += 1;
    }

    /// The raw concatenation of all content so far.
    pub fn raw(&self) -> &str {
        &self.buffer
    }

    /// Number of deltas pushed.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// The normalized reply, recomputed from the whole buffer.
    pub fn rendered(&self) -> String {
        normalize_reply(&self.buffer)
    }
}

/// Splits a byte stream into lines, holding partial lines across chunks.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
    /// Bytes of `pending` already known to hold no `\n`.
    scanned: usize,
}

impl LineSplitter {
    fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// The next complete line, without `\n` or a trailing `\r`.
    fn next_line(&mut self) -> Option<Result<String, ClientError>> {
        let Some(offset) = self.pending[self.scanned..].iter().position(|&b| b == b'\n') else {
            self.scanned = self.pending.len();
            return None;
        };
        let pos = self.scanned + offset;
        let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
        self.scanned = 0;
        line.pop();
        Some(decode_line(line))
    }

    /// Whatever is left once the body has ended.
    fn finish(&mut self) -> Option<Result<String, ClientError>> {
        self.scanned = 0;
        if self.pending.is_empty() {
            return None;
        }
        Some(decode_line(std::mem::take(&mut self.pending)))
    }
}

fn decode_line(mut line: Vec<u8>) -> Result<String, ClientError> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line).map_err(|e| ClientError::Stream(format!("invalid UTF-8 in stream: {e}")))
}

/// Consume an event-stream body and return the normalized reply.
///
/// When `sink` is given, the normalized text of the whole buffer is
/// republished after every chunk. The stream stops at `data: [DONE]`;
/// a body that simply ends yields what was assembled so far.
pub async fn assemble_stream<S, E>(
    body: S,
    mut sink: Option<&mut dyn ReplySink>,
) -> Result<String, ClientError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut body = std::pin::pin!(body);
    let mut lines = LineSplitter::default();
    let mut assembler = ReplyAssembler::new();

    'read: loop {
        while let Some(line) = lines.next_line() {
            if apply_line(&line?, &mut assembler, &mut sink)? {
                break 'read;
            }
        }
        match body.next().await {
            Some(Ok(bytes)) => lines.push(&bytes),
            Some(Err(e)) => return Err(ClientError::Stream(format!("stream read error: {e}"))),
            None => {
                if let Some(line) = lines.finish() {
                    apply_line(&line?, &mut assembler, &mut sink)?;
                }
                tracing::debug!(chunks = assembler.chunk_count(), "stream ended without [DONE]");
                break 'read;
            }
        }
    }

    tracing::debug!(
        chunks = assembler.chunk_count(),
        bytes = assembler.raw().len(),
        "assembled streamed reply"
    );
    Ok(assembler.rendered())
}

/// Apply one line; returns `true` once the sentinel is seen.
fn apply_line(
    line: &str,
    assembler: &mut ReplyAssembler,
    sink: &mut Option<&mut dyn ReplySink>,
) -> Result<bool, ClientError> {
    match parse_line(line)? {
        LineEvent::Skip => Ok(false),
        LineEvent::Done => Ok(true),
        LineEvent::Chunk(delta) => {
            assembler.push(&delta);
            if let Some(sink) = sink.as_deref_mut() {
                sink.publish(&assembler.rendered());
            }
            Ok(false)
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    /// Helper: a body delivered in the given pieces.
    fn body(pieces: &[&str]) -> impl Stream<Item = Result<Bytes, Infallible>> {
        let owned: Vec<Result<Bytes, Infallible>> = pieces
            .iter()
            .map(|p| Ok(Bytes::copy_from_slice(p.as_bytes())))
            .collect();
        futures::stream::iter(owned)
    }

    fn content_line(text: &str) -> String {
        let chunk = serde_json::json!({"choices": [{"delta": {"content": text}}]});
        format!("data: {chunk}\n")
    }

    #[test]
    fn splitter_resumes_scan_where_it_stopped() {
        let mut splitter = LineSplitter::default();
        let line = format!("data: {}", "x".repeat(4096));
        for byte in line.as_bytes() {
            splitter.push(std::slice::from_ref(byte));
            assert!(splitter.next_line().is_none());
            assert_eq!(splitter.scanned, splitter.pending.len());
        }

        splitter.push(b"\nnext");
        assert_eq!(splitter.next_line().unwrap().unwrap(), line);
        assert_eq!(splitter.scanned, 0);
        assert!(splitter.next_line().is_none());
        assert_eq!(splitter.scanned, 4);
        assert_eq!(splitter.finish().unwrap().unwrap(), "next");
        assert_eq!(splitter.scanned, 0);
    }

    #[test]
    fn parse_line_classifies() {
        assert_eq!(parse_line("").unwrap(), LineEvent::Skip);
        assert_eq!(parse_line(": keep-alive").unwrap(), LineEvent::Skip);
        assert_eq!(parse_line("event: ping").unwrap(), LineEvent::Skip);
        assert_eq!(parse_line("data: [DONE]").unwrap(), LineEvent::Done);
        assert_eq!(parse_line("  data: [DONE]  ").unwrap(), LineEvent::Done);
        assert_eq!(
            parse_line(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#).unwrap(),
            LineEvent::Chunk(DeltaChunk {
                role: None,
                content: Some("Hi".into()),
            })
        );
    }

    #[test]
    fn malformed_json_is_fatal() {
        let err = parse_line("data: {not json").unwrap_err();
        assert!(
            matches!(err, ClientError::MalformedChunk { ref line, .. } if line == "{not json"),
            "got: {err:?}"
        );
    }

    #[test]
    fn missing_fields_are_unexpected() {
        for line in [
            r#"data: {"id":"x"}"#,
            r#"data: {"choices":[]}"#,
            r#"data: {"choices":[{"index":0}]}"#,
        ] {
            let err = parse_line(line).unwrap_err();
            assert!(matches!(err, ClientError::UnexpectedResponse(_)), "{line}: {err:?}");
        }
    }

    #[test]
    fn assembler_concatenates_in_order() {
        let mut assembler = ReplyAssembler::new();
        assembler.push(&DeltaChunk {
            role: Some("assistant".into()),
            content: None,
        });
        assembler.push(&DeltaChunk {
            role: None,
            content: Some("Dear Ana,\n\n\n".into()),
        });
        assembler.push(&DeltaChunk {
            role: None,
            content: Some("thanks".into()),
        });
        assert_eq!(assembler.chunk_count(), 3);
        assert_eq!(assembler.raw(), "Dear Ana,\n\n\nthanks");
        assert_eq!(assembler.rendered(), "Dear Ana,\n\nthanks");
    }

    #[tokio::test]
    async fn assembles_hi_there() {
        let reply = assemble_stream(
            body(&[
                "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n",
                "data: [DONE]\n",
            ]),
            None,
        )
        .await
        .unwrap();
        assert_eq!(reply, "Hi there");
    }

    #[tokio::test]
    async fn done_stops_reading() {
        // A malformed line after the sentinel must never be parsed.
        let reply = assemble_stream(
            body(&[&content_line("kept"), "data: [DONE]\n", "data: {not json\n"]),
            None,
        )
        .await
        .unwrap();
        assert_eq!(reply, "kept");
    }

    #[tokio::test]
    async fn done_stops_within_one_network_chunk() {
        let all = format!("{}data: [DONE]\n{}", content_line("a"), content_line("b"));
        let reply = assemble_stream(body(&[&all]), None).await.unwrap();
        assert_eq!(reply, "a");
    }

    #[tokio::test]
    async fn keep_alive_lines_are_ignored() {
        let reply = assemble_stream(
            body(&[
                &content_line("Hello"),
                "\n",
                ": ping\n",
                "event: heartbeat\n",
                &content_line(" world"),
                "data: [DONE]\n",
            ]),
            None,
        )
        .await
        .unwrap();
        assert_eq!(reply, "Hello world");
    }

    #[tokio::test]
    async fn malformed_line_aborts_without_partial_reply() {
        let result = assemble_stream(
            body(&[&content_line("partial"), "data: {not json\n", "data: [DONE]\n"]),
            None,
        )
        .await;
        assert!(matches!(result, Err(ClientError::MalformedChunk { .. })));
    }

    #[tokio::test]
    async fn lines_split_across_chunks() {
        let line = content_line("split ✓ line");
        let bytes = line.as_bytes();
        // Cut inside the multi-byte check mark as well as mid-JSON.
        let check = line.find('✓').unwrap();
        let pieces: Vec<Result<Bytes, Infallible>> = vec![
            Ok(Bytes::copy_from_slice(&bytes[..10])),
            Ok(Bytes::copy_from_slice(&bytes[10..check + 1])),
            Ok(Bytes::copy_from_slice(&bytes[check + 1..])),
            Ok(Bytes::from_static(b"data: [DO")),
            Ok(Bytes::from_static(b"NE]\n")),
        ];
        let reply = assemble_stream(futures::stream::iter(pieces), None)
            .await
            .unwrap();
        assert_eq!(reply, "split ✓ line");
    }

    #[tokio::test]
    async fn crlf_line_endings() {
        let reply = assemble_stream(
            body(&[
                "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\r\n\r\n",
                "data: [DONE]\r\n",
            ]),
            None,
        )
        .await
        .unwrap();
        assert_eq!(reply, "a");
    }

    #[tokio::test]
    async fn stream_end_without_sentinel_keeps_reply() {
        // Last line has no trailing newline.
        let reply = assemble_stream(
            body(&[
                &content_line("one"),
                "data: {\"choices\":[{\"delta\":{\"content\":\" two\"}}]}",
            ]),
            None,
        )
        .await
        .unwrap();
        assert_eq!(reply, "one two");
    }

    #[tokio::test]
    async fn null_and_missing_content_contribute_nothing() {
        let reply = assemble_stream(
            body(&[
                "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n",
                "data: {\"choices\":[{\"delta\":{\"content\":null}}]}\n",
                &content_line("x"),
                "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n",
                "data: [DONE]\n",
            ]),
            None,
        )
        .await
        .unwrap();
        assert_eq!(reply, "x");
    }

    #[tokio::test]
    async fn sink_sees_full_normalized_text_per_chunk() {
        let mut published: Vec<String> = Vec::new();
        let mut sink = |reply: &str| published.push(reply.to_string());
        let reply = assemble_stream(
            body(&[
                &content_line("Hi"),
                &content_line("\n\n\n"),
                &content_line("\nBye"),
                "data: [DONE]\n",
            ]),
            Some(&mut sink),
        )
        .await
        .unwrap();
        assert_eq!(reply, "Hi\n\nBye");
        assert_eq!(published, vec!["Hi", "Hi\n\n", "Hi\n\nBye"]);
    }

    #[tokio::test]
    async fn read_errors_are_reported() {
        let pieces: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from(content_line("a"))),
            Err(std::io::Error::other("connection reset")),
        ];
        let err = assemble_stream(futures::stream::iter(pieces), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Stream(msg) if msg.contains("connection reset")));
    }

    #[tokio::test]
    async fn invalid_utf8_is_reported() {
        let pieces: Vec<Result<Bytes, Infallible>> = vec![Ok(Bytes::from_static(b"data: \xff\xfe\n"))];
        let err = assemble_stream(futures::stream::iter(pieces), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Stream(_)));
    }
}
