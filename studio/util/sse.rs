use std::io::Write;

/// Raw response head for an SSE stream written through `into_writer()`.
pub const SSE_HEADER: &str = "HTTP/1.1 200 OK\r\n\
                              Content-Type: text/event-stream\r\n\
                              Cache-Control: no-cache\r\n\
                              Connection: keep-alive\r\n\
                              X-Accel-Buffering: no\r\n\
                              \r\n";

/// Formats a named SSE event with a JSON data payload.
///
/// ```text
/// event: <name>
/// data: <json>
///
/// ```
pub fn format_sse_event(event_name: &str, json_data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_name, json_data)
}

/// Keep-alive comment; ignored by EventSource clients.
pub const SSE_KEEPALIVE: &str = ": ping\n\n";

/// Writes a single SSE message to a writer, flushing immediately.
/// Returns `false` if the write failed (client disconnected).
pub fn write_sse<W: Write + ?Sized>(writer: &mut W, msg: &str) -> bool {
    writer.write_all(msg.as_bytes()).is_ok() && writer.flush().is_ok()
}
