use std::io::Cursor;
use tiny_http::{Request, Response};

use log::info;
use netviz::LayerSpec;

use crate::state::{lock, FlashMessage, SharedState};
use crate::util::form::{form_get, read_form};

// ---------------------------------------------------------------------------
// POST /layers
// ---------------------------------------------------------------------------

pub fn handle_layers(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let pairs  = read_form(request);
    let layers = form_get(&pairs, "layers").unwrap_or("").to_owned();

    let mut st = lock(&state);
    let flash = match layers.parse::<LayerSpec>() {
        Ok(spec) => match st.session.relayout(spec) {
            Ok(()) => {
                info!("topology set to [{}]", st.session.layers());
                FlashMessage::success(format!("Topology set to {}.", st.session.layers()))
            }
            Err(e) => FlashMessage::error(format!("Topology unchanged: {e}.")),
        },
        Err(e) => FlashMessage::error(format!("Topology unchanged: {e}.")),
    };
    st.flash = Some(flash);
    drop(st);
    crate::routes::redirect("/")
}

// ---------------------------------------------------------------------------
// POST /values
// ---------------------------------------------------------------------------

/// Each field is validated on its own; a rejected field keeps (and shows)
/// its previous value.
pub fn handle_values(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let pairs = read_form(request);
    let mut errors = Vec::new();

    let mut st = lock(&state);
    if let Some(text) = form_get(&pairs, "learning_rate") {
        if let Err(e) = st.session.set_learning_rate(text) {
            errors.push(e.to_string());
        }
    }
    if let Some(text) = form_get(&pairs, "training_speed") {
        if let Err(e) = st.session.set_training_speed(text) {
            errors.push(e.to_string());
        }
    }
    st.flash = Some(if errors.is_empty() {
        FlashMessage::success("Hyperparameters updated.")
    } else {
        FlashMessage::error(errors.join(" "))
    });
    drop(st);
    crate::routes::redirect("/")
}

// ---------------------------------------------------------------------------
// POST /notice/dismiss
// ---------------------------------------------------------------------------

pub fn handle_dismiss(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    lock(&state).session.take_notice();
    crate::routes::redirect("/")
}
