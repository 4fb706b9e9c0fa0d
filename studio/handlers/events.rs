use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};
use tiny_http::Request;

use log::debug;

use crate::render::graph_event;
use crate::state::{lock, SharedState};
use crate::util::sse::{format_sse_event, write_sse, SSE_HEADER, SSE_KEEPALIVE};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// `GET /events`: Server-Sent Events handler.
///
/// Consumes `request` so it can write straight to the socket, then polls the
/// session revision. Every change is pushed as one `graph` event carrying the
/// freshly rendered SVG and status panel; quiet periods get a keep-alive
/// comment. The loop ends when the client goes away.
///
/// Client reconnection is handled natively by `EventSource`.
pub fn handle(request: Request, state: SharedState) {
    let mut writer: Box<dyn Write + Send> = request.into_writer();
    if !write_sse(&mut *writer, SSE_HEADER) {
        return;
    }
    debug!("event stream opened");

    let mut seen = None;
    let mut last_write = Instant::now();
    loop {
        let frame = {
            let st = lock(&state);
            let revision = st.session.revision();
            if seen == Some(revision) {
                None
            } else {
                seen = Some(revision);
                Some(format_sse_event("graph", &graph_event(&st.session).to_string()))
            }
        };

        let sent = match frame {
            Some(msg) => Some(write_sse(&mut *writer, &msg)),
            None if last_write.elapsed() >= KEEPALIVE_INTERVAL => {
                Some(write_sse(&mut *writer, SSE_KEEPALIVE))
            }
            None => None,
        };
        match sent {
            Some(true) => last_write = Instant::now(),
            Some(false) => {
                debug!("event stream closed");
                return;
            }
            None => {}
        }
        thread::sleep(POLL_INTERVAL);
    }
}
