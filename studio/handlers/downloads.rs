use std::io::Cursor;
use tiny_http::Response;

use log::warn;
use netviz::files::{OUTPUTS_FILE_NAME, WEIGHTS_FILE_NAME};

use crate::state::{lock, SharedState};

// ---------------------------------------------------------------------------
// GET /download/weights
// ---------------------------------------------------------------------------

pub fn handle_weights(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = lock(&state);
    if !st.session.weights_downloadable() {
        return crate::routes::not_found();
    }
    let body = st.session.weights_export().map(|export| export.to_json());
    drop(st);

    match body {
        Some(Ok(json)) => crate::routes::json_download_response(json, WEIGHTS_FILE_NAME),
        Some(Err(e)) => {
            warn!("could not serialize weights: {e}");
            crate::routes::not_found()
        }
        None => crate::routes::not_found(),
    }
}

// ---------------------------------------------------------------------------
// GET /download/outputs
// ---------------------------------------------------------------------------

pub fn handle_outputs(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = lock(&state);
    if !st.session.has_predicted() {
        return crate::routes::not_found();
    }
    let body = st.session.outputs_export().map(|export| export.to_json());
    drop(st);

    match body {
        Some(Ok(json)) => crate::routes::json_download_response(json, OUTPUTS_FILE_NAME),
        Some(Err(e)) => {
            warn!("could not serialize outputs: {e}");
            crate::routes::not_found()
        }
        None => crate::routes::not_found(),
    }
}
