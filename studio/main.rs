/// netviz Studio
///
/// Live node-and-edge view of a feed-forward network while it trains.
/// Served by a synchronous tiny_http server; the training worker runs on its
/// own thread and talks to the page's session through message channels.
///
/// Run with:
///   RUST_LOG=debug cargo run --bin studio --release
/// Then open http://127.0.0.1:7878 (override with NETVIZ_ADDR).

mod config;
mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::process;
use std::sync::mpsc::{Receiver, RecvError};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{error, info};
use netviz::worker;
use netviz::{InboundMessage, Session};
use tiny_http::Server;

use config::StudioConfig;
use state::{SharedState, StudioState};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StudioConfig::from_env();

    let session = match Session::new(config.layers.clone(), config.hyperparams) {
        Ok(session) => session,
        Err(e) => {
            error!("default topology rejected: {e}");
            process::exit(1);
        }
    };
    let shared_state: SharedState = Arc::new(Mutex::new(StudioState::new(session)));

    let worker = match worker::spawn() {
        Ok(handle) => handle,
        Err(e) => {
            error!("could not start the training worker: {e}");
            process::exit(1);
        }
    };
    state::lock(&shared_state).session.attach(worker.commands);

    let pump_state = shared_state.clone();
    let events = worker.events;
    if let Err(e) = thread::Builder::new()
        .name("worker-pump".into())
        .spawn(move || pump(events, pump_state))
    {
        error!("could not start the worker pump: {e}");
        process::exit(1);
    }

    let server = match Server::http(&config.addr) {
        Ok(server) => server,
        Err(e) => {
            error!("failed to bind {}: {e}", config.addr);
            process::exit(1);
        }
    };
    info!("netviz studio listening on http://{}", config.addr);

    // Each request is dispatched on its own thread so the SSE handler
    // (which blocks for as long as the page is open) does not stall
    // regular page loads and form submissions.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
}

/// Forwards every worker message into the session, in arrival order. The
/// session is detached once the worker side hangs up.
fn pump(events: Receiver<InboundMessage>, state: SharedState) {
    loop {
        match events.recv() {
            Ok(msg) => state::lock(&state).session.handle_message(msg),
            Err(RecvError) => {
                info!("training worker channel closed");
                state::lock(&state).session.detach();
                return;
            }
        }
    }
}
