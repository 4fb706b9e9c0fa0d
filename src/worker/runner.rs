use std::sync::mpsc::{self, Receiver, RecvError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use serde_json::Value;

use crate::config::Hyperparams;
use crate::files::{InputFile, TrainingFile};
use crate::graph::{check_spec, LayerSpec};
use crate::protocol::{ErrorCode, InboundMessage, OutboundMessage};
use crate::worker::network::FeedForward;

/// The UI side of a running worker thread.
pub struct WorkerHandle {
    pub commands: Sender<OutboundMessage>,
    pub events: Receiver<InboundMessage>,
    pub thread: JoinHandle<()>,
}

/// Starts the training worker on its own thread.
///
/// The worker announces itself with `ModuleReady` and then serves commands
/// until either channel closes.
pub fn spawn() -> std::io::Result<WorkerHandle> {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (evt_tx, evt_rx) = mpsc::channel();
    let thread = thread::Builder::new()
        .name("training-worker".into())
        .spawn(move || run(cmd_rx, evt_tx))?;
    Ok(WorkerHandle {
        commands: cmd_tx,
        events: evt_rx,
        thread,
    })
}

/// Worker main loop. Blocks on commands while idle; while training, runs one
/// chunk of `training_speed` steps, reports, then drains pending commands.
pub fn run(commands: Receiver<OutboundMessage>, events: Sender<InboundMessage>) {
    let mut worker = Worker::new(events);
    if !worker.emit(InboundMessage::ModuleReady) {
        return;
    }
    info!("training worker started");

    loop {
        if worker.training {
            loop {
                match commands.try_recv() {
                    Ok(cmd) => worker.handle(cmd),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        info!("command channel closed, worker exiting");
                        return;
                    }
                }
            }
            if worker.training {
                worker.train_chunk();
            }
        } else {
            match commands.recv() {
                Ok(cmd) => worker.handle(cmd),
                Err(RecvError) => {
                    info!("command channel closed, worker exiting");
                    return;
                }
            }
        }
        if worker.disconnected {
            info!("event channel closed, worker exiting");
            return;
        }
    }
}

struct Worker {
    events: Sender<InboundMessage>,
    disconnected: bool,
    layers: Option<LayerSpec>,
    hyperparams: Hyperparams,
    data: Option<TrainingFile>,
    inputs: Option<Value>,
    network: Option<FeedForward>,
    training: bool,
    /// SGD steps since the network was (re)initialized.
    steps: u64,
    cursor: usize,
}

impl Worker {
    fn new(events: Sender<InboundMessage>) -> Self {
        Worker {
            events,
            disconnected: false,
            layers: None,
            hyperparams: Hyperparams::default(),
            data: None,
            inputs: None,
            network: None,
            training: false,
            steps: 0,
            cursor: 0,
        }
    }

    /// Sends an event; remembers when the UI side has gone away.
    fn emit(&mut self, msg: InboundMessage) -> bool {
        if self.events.send(msg).is_err() {
            self.disconnected = true;
            false
        } else {
            true
        }
    }

    fn fail(&mut self, code: ErrorCode) {
        warn!("worker reports {code}");
        self.emit(InboundMessage::failure(code));
    }

    fn handle(&mut self, cmd: OutboundMessage) {
        debug!("worker <- {}", cmd.name());
        match cmd {
            OutboundMessage::LayersSet { layers } => {
                if let Err(e) = check_spec(&layers) {
                    warn!("ignoring layer list [{layers}]: {e}");
                    return;
                }
                if self.layers.as_ref() != Some(&layers) {
                    self.network = None;
                    self.steps = 0;
                    self.cursor = 0;
                }
                self.layers = Some(layers);
            }
            OutboundMessage::ValuesUpdate {
                learning_rate,
                training_speed,
            } => {
                self.hyperparams = Hyperparams {
                    learning_rate,
                    training_speed: training_speed.max(1),
                };
            }
            OutboundMessage::TrainingUpload { file } => {
                let Some(layers) = self.layers.clone() else {
                    return self.fail(ErrorCode::JsonFormatError);
                };
                match TrainingFile::from_value(file, &layers) {
                    Ok(data) => {
                        info!("loaded {} training samples", data.data.len());
                        self.data = Some(data);
                        self.cursor = 0;
                        self.emit(InboundMessage::JsonSuccess);
                    }
                    Err(code) => self.fail(code),
                }
            }
            OutboundMessage::InputUpload { file } => {
                let width = self.layers.as_ref().and_then(LayerSpec::inputs).unwrap_or(0);
                match InputFile::from_value(&file, width) {
                    Ok(_) => {
                        self.inputs = Some(file);
                        self.emit(InboundMessage::InputUploadSuccess);
                    }
                    Err(code) => {
                        self.inputs = None;
                        self.fail(code);
                    }
                }
            }
            OutboundMessage::StartTraining => self.start(),
            OutboundMessage::StopTraining => {
                self.training = false;
                let weights = self.network.as_ref().map(FeedForward::to_tensor);
                info!("training stopped after {} steps", self.steps);
                self.emit(InboundMessage::StoppedTraining { weights });
            }
            OutboundMessage::RunPrediction => self.predict(),
        }
    }

    fn start(&mut self) {
        let Some(layers) = self.layers.clone() else {
            return self.fail(ErrorCode::JsonFormatError);
        };
        if !self.data.as_ref().is_some_and(|data| data.fits(&layers)) {
            return self.fail(ErrorCode::JsonFormatError);
        }
        if self.network.as_ref().map(FeedForward::layers) != Some(&layers) {
            self.network = Some(FeedForward::new(&layers));
            self.steps = 0;
            self.cursor = 0;
        }
        self.training = true;
        info!("training [{layers}] at rate {}", self.hyperparams.learning_rate);
        self.emit(InboundMessage::StartSuccess);
    }

    fn train_chunk(&mut self) {
        let (Some(network), Some(data)) = (self.network.as_mut(), self.data.as_ref()) else {
            self.training = false;
            return;
        };
        let n = data.data.len();
        if n == 0 {
            self.training = false;
            return;
        }

        let rate = self.hyperparams.learning_rate;
        for _ in 0..self.hyperparams.training_speed {
            let sample = &data.data[self.cursor];
            network.train_sample(&sample.input, &sample.output, rate);
            self.cursor = (self.cursor + 1) % n;
            self.steps += 1;
        }

        let error = network.mean_error(
            data.data
                .iter()
                .map(|s| (s.input.as_slice(), s.output.as_slice())),
        );
        let update = InboundMessage::TrainingUpdate {
            epochs: self.steps / n as u64,
            error,
            weights: Some(network.to_tensor()),
        };
        if !error.is_finite() {
            warn!("training diverged after {} steps", self.steps);
        }
        self.emit(update);
    }

    fn predict(&mut self) {
        let Some(layers) = self.layers.clone() else {
            return self.fail(ErrorCode::InvalidInputJsonFormat);
        };
        let Some(doc) = &self.inputs else {
            return self.fail(ErrorCode::InvalidInputJsonFormat);
        };
        let rows = match InputFile::from_value(doc, layers.inputs().unwrap_or(0)) {
            Ok(file) => file.inputs,
            Err(code) => return self.fail(code),
        };
        let network = self
            .network
            .get_or_insert_with(|| FeedForward::new(&layers));
        let outputs = rows.iter().map(|row| network.predict(row)).collect();
        self.emit(InboundMessage::PredictionSuccess { outputs });
    }
}
