use std::io::Cursor;
use tiny_http::Response;

use crate::render::{graph_json, render_page};
use crate::state::{lock, SharedState};

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

pub fn handle_page(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);
    let flash = st.take_flash();
    let page  = render_page(&st.session, flash.as_ref());
    drop(st);
    crate::routes::html_response(page)
}

// ---------------------------------------------------------------------------
// GET /graph
// ---------------------------------------------------------------------------

pub fn handle_json(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let snapshot = graph_json(&lock(&state).session);
    crate::routes::json_response(snapshot.to_string())
}
