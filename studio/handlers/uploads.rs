use std::io::Cursor;
use tiny_http::{Request, Response};

use netviz::SessionError;

use crate::state::{lock, FlashMessage, SharedState};
use crate::util::multipart::{read_file_part, FilePart};

const FILE_FIELD: &str = "file";

fn flash_for(result: Result<(), SessionError>, sent: &str) -> FlashMessage {
    match result {
        Ok(()) => FlashMessage::success(sent),
        // File errors already raised a notice.
        Err(SessionError::File(_)) => FlashMessage::error("Upload rejected."),
        Err(e) => FlashMessage::error(format!("Upload not sent: {e}.")),
    }
}

// ---------------------------------------------------------------------------
// POST /upload/training
// ---------------------------------------------------------------------------

pub fn handle_training(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let part = read_file_part(request, FILE_FIELD);

    let mut st = lock(&state);
    let flash = match part {
        Some(FilePart { content_type, data }) => {
            let result = st.session.upload_training(content_type.as_deref(), &data);
            flash_for(result, "Training file sent to the worker.")
        }
        None => FlashMessage::error("No file was uploaded."),
    };
    st.flash = Some(flash);
    drop(st);
    crate::routes::redirect("/")
}

// ---------------------------------------------------------------------------
// POST /upload/inputs
// ---------------------------------------------------------------------------

pub fn handle_inputs(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let part = read_file_part(request, FILE_FIELD);

    let mut st = lock(&state);
    let flash = match part {
        Some(FilePart { content_type, data }) => {
            let result = st.session.upload_inputs(content_type.as_deref(), &data);
            flash_for(result, "Input file sent to the worker.")
        }
        None => FlashMessage::error("No file was uploaded."),
    };
    st.flash = Some(flash);
    drop(st);
    crate::routes::redirect("/")
}
