use std::io::Cursor;
use tiny_http::Response;

use netviz::SessionError;

use crate::state::{lock, FlashMessage, SharedState};

/// Runs one session command; only failures leave a flash, since success
/// shows up on the page through the worker's reply.
fn command<F>(state: &SharedState, run: F) -> Response<Cursor<Vec<u8>>>
where
    F: FnOnce(&mut netviz::Session) -> Result<(), SessionError>,
{
    let mut st = lock(state);
    if let Err(e) = run(&mut st.session) {
        st.flash = Some(FlashMessage::error(format!("{e}.")));
    }
    drop(st);
    crate::routes::redirect("/")
}

// ---------------------------------------------------------------------------
// POST /train/start
// ---------------------------------------------------------------------------

pub fn handle_start(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    command(&state, |session| session.start_training())
}

// ---------------------------------------------------------------------------
// POST /train/stop
// ---------------------------------------------------------------------------

pub fn handle_stop(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    command(&state, |session| session.stop_training())
}

// ---------------------------------------------------------------------------
// POST /predict
// ---------------------------------------------------------------------------

pub fn handle_predict(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    command(&state, |session| session.run_prediction())
}
