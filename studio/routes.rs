use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::state::SharedState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn response(status: u16, headers: Vec<Option<Header>>, body: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = body.len();
    Response::new(
        StatusCode(status),
        headers.into_iter().flatten().collect(),
        Cursor::new(body),
        Some(len),
        None,
    )
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    response(200, vec![header("Content-Type", "text/html; charset=utf-8")], body.into_bytes())
}

pub fn json_response(body: String) -> Response<Cursor<Vec<u8>>> {
    response(200, vec![header("Content-Type", "application/json")], body.into_bytes())
}

pub fn redirect(location: &str) -> Response<Cursor<Vec<u8>>> {
    response(
        303,
        vec![header("Location", location), header("Content-Length", "0")],
        Vec::new(),
    )
}

pub fn json_download_response(body: String, filename: &str) -> Response<Cursor<Vec<u8>>> {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    response(
        200,
        vec![
            header("Content-Type", "application/json"),
            header("Content-Disposition", &disposition),
        ],
        body.into_bytes(),
    )
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    response(404, vec![header("Content-Type", "text/plain")], b"404 Not Found".to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// All handlers (except SSE) receive a `&mut Request` so that the dispatcher
/// retains ownership and can call `request.respond(response)` at the end.
/// The SSE handler takes ownership to perform long-lived streaming.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();
    log::debug!("{} {}", method, path);

    // SSE is long-lived; the handler takes ownership and drives the stream loop.
    if method == Method::Get && path == "/events" {
        handlers::events::handle(request, state);
        return;
    }

    let response = match (method, path.as_str()) {
        // ── Page and snapshot ─────────────────────────────────────────────
        (Method::Get,  "/")               => handlers::graph::handle_page(state),
        (Method::Get,  "/graph")          => handlers::graph::handle_json(state),

        // ── Controls ──────────────────────────────────────────────────────
        (Method::Post, "/layers")         => handlers::controls::handle_layers(&mut request, state),
        (Method::Post, "/values")         => handlers::controls::handle_values(&mut request, state),
        (Method::Post, "/notice/dismiss") => handlers::controls::handle_dismiss(state),

        // ── Uploads ───────────────────────────────────────────────────────
        (Method::Post, "/upload/training") => handlers::uploads::handle_training(&mut request, state),
        (Method::Post, "/upload/inputs")   => handlers::uploads::handle_inputs(&mut request, state),

        // ── Training and prediction ───────────────────────────────────────
        (Method::Post, "/train/start")    => handlers::training::handle_start(state),
        (Method::Post, "/train/stop")     => handlers::training::handle_stop(state),
        (Method::Post, "/predict")        => handlers::training::handle_predict(state),

        // ── Downloads ─────────────────────────────────────────────────────
        (Method::Get,  "/download/weights") => handlers::downloads::handle_weights(state),
        (Method::Get,  "/download/outputs") => handlers::downloads::handle_outputs(state),

        // ── 404 ───────────────────────────────────────────────────────────
        _ => not_found(),
    };

    let _ = request.respond(response);
}
