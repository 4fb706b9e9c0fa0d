use std::sync::mpsc::Sender;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::{parse_learning_rate, parse_training_speed, Hyperparams};
use crate::error::{ConfigError, LayoutError, MapError, SessionError};
use crate::files::{check_input_upload, check_training_upload, PredictionExport, WeightsExport};
use crate::graph::{compute_layout, Edge, GraphLayout, LayerSpec, SharedLayout};
use crate::protocol::{ErrorCode, InboundMessage, OutboundMessage};
use crate::session::notice::Notice;
use crate::session::state::SessionState;
use crate::weights::{map_weights_to_edges, WeightTensor};

/// Epoch and error counters from the latest accepted training update.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct Progress {
    pub epochs: u64,
    pub error: f64,
}

/// UI-side adapter between the training worker and the graph.
///
/// Owns the current layout snapshot and the edges on display. Every worker
/// message goes through [`Session::handle_message`]; every user action goes
/// through one of the request methods, which validate first and only then
/// touch state or talk to the worker.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    hyperparams: Hyperparams,
    layout: SharedLayout,
    edges: Vec<Edge>,
    progress: Progress,
    worker: Option<Sender<OutboundMessage>>,
    notice: Option<Notice>,
    predictable: bool,
    predicted: bool,
    weights_downloadable: bool,
    weights_export: Option<WeightsExport>,
    outputs_export: Option<PredictionExport>,
    dropped_updates: u64,
    last_drop: Option<MapError>,
    revision: u64,
}

impl Session {
    pub fn new(layers: LayerSpec, hyperparams: Hyperparams) -> Result<Self, LayoutError> {
        let layout = Arc::new(compute_layout(&layers)?);
        Ok(Session {
            state: SessionState::Idle,
            hyperparams,
            edges: layout.edges.clone(),
            layout,
            progress: Progress::default(),
            worker: None,
            notice: None,
            predictable: false,
            predicted: false,
            weights_downloadable: false,
            weights_export: None,
            outputs_export: None,
            dropped_updates: 0,
            last_drop: None,
            revision: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Worker link
    // -----------------------------------------------------------------------

    /// Connects a freshly spawned worker. Configuration is pushed once it
    /// reports `ModuleReady`.
    pub fn attach(&mut self, worker: Sender<OutboundMessage>) {
        self.worker = Some(worker);
        self.set_state(SessionState::Configuring);
    }

    /// Drops the worker link, e.g. after its channel closed.
    pub fn detach(&mut self) {
        if self.worker.take().is_some() {
            info!("training worker detached");
        }
        self.set_state(SessionState::Idle);
    }

    fn send(&mut self, msg: OutboundMessage) {
        let Some(worker) = &self.worker else {
            debug!("no worker attached, dropping {}", msg.name());
            return;
        };
        let name = msg.name();
        if worker.send(msg).is_err() {
            warn!("training worker is gone, could not send {name}");
            self.detach();
        } else {
            debug!("sent {name}");
        }
    }

    fn push_configuration(&mut self) {
        self.send(OutboundMessage::LayersSet {
            layers: self.layout.layers.clone(),
        });
        self.push_values();
    }

    fn push_values(&mut self) {
        self.send(OutboundMessage::ValuesUpdate {
            learning_rate: self.hyperparams.learning_rate,
            training_speed: self.hyperparams.training_speed,
        });
    }

    fn require_worker(&self) -> Result<(), SessionError> {
        if self.worker.is_some() && self.state.worker_ready() {
            Ok(())
        } else {
            Err(SessionError::WorkerUnavailable)
        }
    }

    // -----------------------------------------------------------------------
    // User requests
    // -----------------------------------------------------------------------

    /// Replaces the topology. A spec the layout engine refuses leaves the
    /// current layout, and the worker, untouched.
    pub fn relayout(&mut self, layers: LayerSpec) -> Result<(), SessionError> {
        if !self.state.can_relayout() {
            return Err(SessionError::TrainingActive);
        }
        let layout = compute_layout(&layers).inspect_err(|e| {
            warn!("keeping layout [{}]: {e}", self.layout.layers);
        })?;

        info!("relayout to [{}]", layers);
        self.install_layout(layout);
        if self.state.worker_ready() {
            self.send(OutboundMessage::LayersSet { layers });
            if self.state == SessionState::Stopped {
                self.set_state(SessionState::Ready);
            }
        }
        Ok(())
    }

    fn install_layout(&mut self, layout: GraphLayout) {
        self.edges = layout.edges.clone();
        self.layout = Arc::new(layout);
        self.touch();
    }

    /// Validates and stores a typed learning rate, returning the stored
    /// value. On rejection the previous rate stays in [`Session::hyperparams`].
    pub fn set_learning_rate(&mut self, text: &str) -> Result<f64, ConfigError> {
        let rate = parse_learning_rate(text).inspect_err(|e| warn!("{e}"))?;
        self.hyperparams.learning_rate = rate;
        self.after_values_change();
        Ok(rate)
    }

    /// Same contract as [`Session::set_learning_rate`].
    pub fn set_training_speed(&mut self, text: &str) -> Result<u32, ConfigError> {
        let speed = parse_training_speed(text).inspect_err(|e| warn!("{e}"))?;
        self.hyperparams.training_speed = speed;
        self.after_values_change();
        Ok(speed)
    }

    fn after_values_change(&mut self) {
        if self.state.worker_ready() {
            self.push_values();
        }
        self.touch();
    }

    /// Forwards a training file after the structural check.
    pub fn upload_training(&mut self, mime: Option<&str>, body: &[u8]) -> Result<(), SessionError> {
        if self.state.is_training() {
            return Err(SessionError::TrainingActive);
        }
        let doc = check_training_upload(mime, body).inspect_err(|e| {
            warn!("training upload rejected: {e}");
            self.raise(Notice::new(e.code()));
        })?;
        self.require_worker()?;
        self.send(OutboundMessage::TrainingUpload { file: doc });
        Ok(())
    }

    /// Forwards a prediction input file after the structural check. Any
    /// previous prediction result is withdrawn.
    pub fn upload_inputs(&mut self, mime: Option<&str>, body: &[u8]) -> Result<(), SessionError> {
        self.predicted = false;
        self.touch();
        let doc = check_input_upload(mime, body).inspect_err(|e| {
            warn!("input upload rejected: {e}");
            self.predictable = false;
            self.raise(Notice::new(e.code()));
        })?;
        self.require_worker()?;
        self.send(OutboundMessage::InputUpload { file: doc });
        Ok(())
    }

    pub fn start_training(&mut self) -> Result<(), SessionError> {
        if self.state.is_training() {
            return Err(SessionError::TrainingActive);
        }
        self.require_worker()?;
        self.send(OutboundMessage::StartTraining);
        Ok(())
    }

    /// Fire-and-forget: the state only changes when `StoppedTraining` arrives.
    pub fn stop_training(&mut self) -> Result<(), SessionError> {
        if !self.state.is_training() {
            return Err(SessionError::NotTraining);
        }
        self.require_worker()?;
        self.send(OutboundMessage::StopTraining);
        Ok(())
    }

    pub fn run_prediction(&mut self) -> Result<(), SessionError> {
        if self.state.is_training() {
            return Err(SessionError::TrainingActive);
        }
        self.require_worker()?;
        if !self.predictable {
            return Err(SessionError::NotPredictable);
        }
        self.send(OutboundMessage::RunPrediction);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Worker messages
    // -----------------------------------------------------------------------

    /// Decodes a raw wire message. Undecodable payloads become a protocol
    /// notice and change nothing else.
    pub fn handle_json(&mut self, raw: &str) {
        match serde_json::from_str::<InboundMessage>(raw) {
            Ok(msg) => self.handle_message(msg),
            Err(e) => {
                warn!("undecodable worker message: {e}");
                self.raise(Notice::with_text(
                    ErrorCode::Protocol,
                    format!("{} ({e})", ErrorCode::Protocol.description()),
                ));
            }
        }
    }

    pub fn handle_message(&mut self, msg: InboundMessage) {
        debug!("worker -> {} in state {}", msg.name(), self.state);
        match msg {
            InboundMessage::ModuleReady => {
                info!("training worker ready");
                self.set_state(SessionState::Ready);
                self.push_configuration();
            }
            InboundMessage::StartSuccess => {
                self.weights_downloadable = true;
                self.set_state(SessionState::Training);
            }
            InboundMessage::StoppedTraining { weights } => {
                if let Some(weights) = weights {
                    if self.apply_weights(&weights, false) {
                        self.weights_export = Some(WeightsExport { weights });
                    }
                }
                self.set_state(SessionState::Stopped);
            }
            InboundMessage::TrainingUpdate {
                epochs,
                error,
                weights,
            } => {
                if let Some(weights) = weights {
                    if self.apply_weights(&weights, true) {
                        self.progress = Progress { epochs, error };
                    }
                }
            }
            InboundMessage::InputUploadSuccess => {
                self.predictable = true;
                self.touch();
            }
            InboundMessage::JsonSuccess => {}
            InboundMessage::PredictionSuccess { outputs } => {
                self.predicted = true;
                self.outputs_export = Some(PredictionExport { outputs });
                self.touch();
            }
            other => {
                let code = other.error_code().unwrap_or(ErrorCode::Protocol);
                if code.invalidates_inputs() {
                    self.predictable = false;
                }
                warn!("worker reported {code}");
                self.raise(Notice::new(code));
            }
        }
    }

    /// Maps `weights` onto the current matrix. A tensor built for another
    /// topology is dropped and the edges on display stay as they are.
    fn apply_weights(&mut self, weights: &WeightTensor, animate: bool) -> bool {
        match map_weights_to_edges(weights, &self.layout.matrix, animate) {
            Ok(edges) => {
                self.edges = edges;
                self.touch();
                true
            }
            Err(e) => {
                self.dropped_updates += 1;
                warn!(
                    "dropping weight update for [{}] ({} dropped so far): {e}",
                    self.layout.layers, self.dropped_updates
                );
                self.last_drop = Some(e);
                false
            }
        }
    }

    fn raise(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.touch();
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!("session {} -> {}", self.state, state);
            self.state = state;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn layers(&self) -> &LayerSpec {
        &self.layout.layers
    }

    /// Current layout snapshot; cheap to clone and safe to hold while the
    /// session moves on.
    pub fn layout(&self) -> SharedLayout {
        Arc::clone(&self.layout)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn hyperparams(&self) -> Hyperparams {
        self.hyperparams
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Takes the pending notice, clearing it.
    pub fn take_notice(&mut self) -> Option<Notice> {
        let notice = self.notice.take();
        if notice.is_some() {
            self.touch();
        }
        notice
    }

    pub fn is_predictable(&self) -> bool {
        self.predictable
    }

    pub fn has_predicted(&self) -> bool {
        self.predicted
    }

    pub fn weights_downloadable(&self) -> bool {
        self.weights_downloadable
    }

    pub fn weights_export(&self) -> Option<&WeightsExport> {
        self.weights_export.as_ref()
    }

    pub fn outputs_export(&self) -> Option<&PredictionExport> {
        self.outputs_export.as_ref()
    }

    pub fn dropped_updates(&self) -> u64 {
        self.dropped_updates
    }

    pub fn last_drop(&self) -> Option<&MapError> {
        self.last_drop.as_ref()
    }

    /// Bumped on every change visible to the user.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
