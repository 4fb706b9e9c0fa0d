use std::sync::mpsc::{self, Receiver};

use netviz::error::LayoutError;
use netviz::{
    ConfigError, ErrorCode, Hyperparams, InboundMessage, LayerSpec, OutboundMessage, Rgb, Session,
    SessionError, SessionState, WeightTensor,
};

fn default_session() -> Session {
    Session::new(LayerSpec::new(vec![3, 2, 5, 3, 1]), Hyperparams::default()).unwrap()
}

/// A session whose fake worker has already reported `ModuleReady`; the
/// configuration push is drained.
fn ready_session() -> (Session, Receiver<OutboundMessage>) {
    let mut session = default_session();
    let (tx, rx) = mpsc::channel();
    session.attach(tx);
    session.handle_message(InboundMessage::ModuleReady);
    let _ = rx.try_iter().count();
    (session, rx)
}

/// A tensor for `widths`, every weight `fill` except the first (`-1`) and the
/// last (`+1`).
fn tensor_for(widths: &[usize], fill: f64) -> WeightTensor {
    let mut sources: Vec<usize> = widths.to_vec();
    sources[0] += 1;
    let mut t: Vec<Vec<Vec<f64>>> = (0..widths.len() - 1)
        .map(|i| vec![vec![fill; sources[i]]; widths[i + 1]])
        .collect();
    t[0][0][0] = -1.0;
    let last = t.last_mut().unwrap().last_mut().unwrap().last_mut().unwrap();
    *last = 1.0;
    WeightTensor::new(t)
}

#[test]
fn module_ready_pushes_layers_then_values() {
    let mut session = default_session();
    let (tx, rx) = mpsc::channel();
    session.attach(tx);
    assert_eq!(session.state(), SessionState::Configuring);

    session.handle_message(InboundMessage::ModuleReady);
    assert_eq!(session.state(), SessionState::Ready);

    let sent: Vec<OutboundMessage> = rx.try_iter().collect();
    assert_eq!(
        sent,
        vec![
            OutboundMessage::LayersSet {
                layers: LayerSpec::new(vec![3, 2, 5, 3, 1]),
            },
            OutboundMessage::ValuesUpdate {
                learning_rate: 0.1,
                training_speed: 100_000,
            },
        ]
    );
}

#[test]
fn skeleton_is_shown_before_any_weights() {
    let session = default_session();
    assert_eq!(session.layout().nodes.len(), 15);
    assert_eq!(session.edges().len(), 36);
    assert!(session.edges().iter().all(|e| e.stroke == Rgb::WHITE && !e.animated));
}

#[test]
fn training_update_colors_and_animates_edges() {
    let (mut session, _rx) = ready_session();
    session.handle_message(InboundMessage::StartSuccess);
    assert_eq!(session.state(), SessionState::Training);
    assert!(session.weights_downloadable());

    session.handle_message(InboundMessage::TrainingUpdate {
        epochs: 12,
        error: 0.25,
        weights: Some(tensor_for(&[3, 2, 5, 3, 1], 0.0)),
    });

    let edges = session.edges();
    assert_eq!(edges.len(), 36);
    assert!(edges.iter().all(|e| e.animated));
    assert_eq!(edges[0].stroke, Rgb::RED);
    assert_eq!(edges[35].stroke, Rgb::GREEN);
    assert_eq!(session.progress().epochs, 12);
    assert_eq!(session.progress().error, 0.25);
}

#[test]
fn stale_tensor_is_dropped_and_edges_are_kept() {
    let mut session =
        Session::new(LayerSpec::new(vec![3, 2, 5, 1]), Hyperparams::default()).unwrap();
    let before = session.edges().to_vec();
    let revision = session.revision();

    session.handle_message(InboundMessage::TrainingUpdate {
        epochs: 1,
        error: 0.5,
        weights: Some(tensor_for(&[3, 2, 1], 0.0)),
    });

    assert_eq!(session.edges(), &before[..]);
    assert_eq!(session.dropped_updates(), 1);
    assert!(session.last_drop().is_some());
    assert_eq!(session.progress().epochs, 0);
    assert_eq!(session.revision(), revision);
}

#[test]
fn relayout_is_refused_while_training() {
    let (mut session, rx) = ready_session();
    session.handle_message(InboundMessage::StartSuccess);

    let err = session.relayout(LayerSpec::new(vec![2, 2])).unwrap_err();
    assert!(matches!(err, SessionError::TrainingActive));
    assert_eq!(session.layers(), &LayerSpec::new(vec![3, 2, 5, 3, 1]));
    assert!(rx.try_recv().is_err());
}

#[test]
fn zero_width_relayout_keeps_the_old_graph() {
    let (mut session, rx) = ready_session();
    let revision = session.revision();

    let err = session.relayout(LayerSpec::new(vec![3, 0, 1])).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Layout(LayoutError::ZeroWidthLayer { layer: 1 })
    ));
    assert_eq!(session.layers(), &LayerSpec::new(vec![3, 2, 5, 3, 1]));
    assert_eq!(session.edges().len(), 36);
    assert_eq!(session.revision(), revision);
    assert!(rx.try_recv().is_err());
}

#[test]
fn oversized_relayout_is_refused_before_any_arithmetic() {
    let (mut session, rx) = ready_session();
    let revision = session.revision();

    let err = session
        .relayout("18446744073709551615, 1".parse().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Layout(LayoutError::LayerTooWide {
            layer: 0,
            width: usize::MAX,
            ..
        })
    ));

    let err = session
        .relayout("3, 10000000000, 1".parse().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Layout(LayoutError::LayerTooWide { layer: 1, .. })
    ));

    assert_eq!(session.layers(), &LayerSpec::new(vec![3, 2, 5, 3, 1]));
    assert_eq!(session.edges().len(), 36);
    assert_eq!(session.revision(), revision);
    assert!(rx.try_recv().is_err());
}

#[test]
fn relayout_sends_layers_and_leaves_stopped() {
    let (mut session, rx) = ready_session();
    session.handle_message(InboundMessage::StartSuccess);
    session.handle_message(InboundMessage::StoppedTraining { weights: None });
    assert_eq!(session.state(), SessionState::Stopped);

    session.relayout(LayerSpec::new(vec![2, 4, 1])).unwrap();
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.layout().nodes.len(), 8);
    assert_eq!(session.edges().len(), 16);
    assert_eq!(
        rx.try_recv().unwrap(),
        OutboundMessage::LayersSet {
            layers: LayerSpec::new(vec![2, 4, 1]),
        }
    );
}

#[test]
fn rejected_learning_rate_keeps_the_previous_value() {
    let (mut session, rx) = ready_session();

    assert_eq!(
        session.set_learning_rate("0.6"),
        Err(ConfigError::LearningRate {
            value: "0.6".into(),
        })
    );
    assert_eq!(session.hyperparams().learning_rate, 0.1);
    assert!(rx.try_recv().is_err());

    assert_eq!(session.set_learning_rate("0.2"), Ok(0.2));
    assert_eq!(
        rx.try_recv().unwrap(),
        OutboundMessage::ValuesUpdate {
            learning_rate: 0.2,
            training_speed: 100_000,
        }
    );
}

#[test]
fn rejected_training_speed_keeps_the_previous_value() {
    let (mut session, rx) = ready_session();
    assert!(session.set_training_speed("0").is_err());
    assert_eq!(
        session.set_training_speed("abc"),
        Err(ConfigError::TrainingSpeed {
            value: "abc".into(),
        })
    );
    assert_eq!(session.hyperparams().training_speed, 100_000);
    assert!(rx.try_recv().is_err());
    assert_eq!(session.set_training_speed("250"), Ok(250));
    assert!(rx.try_recv().is_ok());
}

#[test]
fn input_errors_withdraw_inputs_and_raise_a_notice() {
    let (mut session, _rx) = ready_session();
    session.handle_message(InboundMessage::InputUploadSuccess);
    assert!(session.is_predictable());

    session.handle_message(InboundMessage::InputFileEntrySizeError);
    assert!(!session.is_predictable());
    assert_eq!(
        session.notice().map(|n| n.code),
        Some(ErrorCode::InputFileEntrySizeError)
    );

    let notice = session.take_notice().unwrap();
    assert_eq!(notice.code, ErrorCode::InputFileEntrySizeError);
    assert!(session.notice().is_none());
}

#[test]
fn training_file_error_keeps_inputs() {
    let (mut session, _rx) = ready_session();
    session.handle_message(InboundMessage::InputUploadSuccess);
    session.handle_message(InboundMessage::JsonFormatError);
    assert!(session.is_predictable());
    assert_eq!(session.notice().map(|n| n.code), Some(ErrorCode::JsonFormatError));
}

#[test]
fn unknown_or_broken_messages_become_protocol_notices() {
    let (mut session, _rx) = ready_session();
    session.handle_json(r#"{"code":"SomethingNew"}"#);
    assert_eq!(session.notice().map(|n| n.code), Some(ErrorCode::Protocol));
    assert_eq!(session.state(), SessionState::Ready);

    session.take_notice();
    session.handle_json("not json");
    assert_eq!(session.notice().map(|n| n.code), Some(ErrorCode::Protocol));
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn wire_messages_decode_through_handle_json() {
    let (mut session, _rx) = ready_session();
    session.handle_json(r#"{"code":"StartSuccess"}"#);
    assert_eq!(session.state(), SessionState::Training);
    session.handle_json(r#"{"code":"InvalidInputJSONFormat"}"#);
    assert_eq!(
        session.notice().map(|n| n.code),
        Some(ErrorCode::InvalidInputJsonFormat)
    );
}

#[test]
fn stopped_training_freezes_edges_and_offers_the_weights() {
    let (mut session, _rx) = ready_session();
    session.handle_message(InboundMessage::StartSuccess);
    let weights = tensor_for(&[3, 2, 5, 3, 1], 0.5);
    session.handle_message(InboundMessage::StoppedTraining {
        weights: Some(weights.clone()),
    });

    assert_eq!(session.state(), SessionState::Stopped);
    assert!(session.edges().iter().all(|e| !e.animated));
    assert_eq!(session.weights_export().map(|e| &e.weights), Some(&weights));
}

#[test]
fn prediction_needs_accepted_inputs() {
    let (mut session, rx) = ready_session();
    assert!(matches!(
        session.run_prediction(),
        Err(SessionError::NotPredictable)
    ));
    assert!(rx.try_recv().is_err());

    session.handle_message(InboundMessage::InputUploadSuccess);
    session.run_prediction().unwrap();
    assert_eq!(rx.try_recv().unwrap(), OutboundMessage::RunPrediction);

    session.handle_message(InboundMessage::PredictionSuccess {
        outputs: vec![vec![0.25]],
    });
    assert!(session.has_predicted());
    assert_eq!(
        session.outputs_export().map(|e| e.outputs.clone()),
        Some(vec![vec![0.25]])
    );
}

#[test]
fn bad_upload_is_not_forwarded() {
    let (mut session, rx) = ready_session();
    let err = session
        .upload_training(Some("text/csv"), b"a,b\n1,2")
        .unwrap_err();
    assert!(matches!(err, SessionError::File(_)));
    assert_eq!(session.notice().map(|n| n.code), Some(ErrorCode::JsonFormatError));
    assert!(rx.try_recv().is_err());

    session
        .upload_training(Some("application/json"), br#"{"data":[{"input":[1,2,3],"output":[1]}]}"#)
        .unwrap();
    assert!(matches!(
        rx.try_recv().unwrap(),
        OutboundMessage::TrainingUpload { .. }
    ));
}

#[test]
fn closed_worker_channel_returns_to_idle() {
    let (mut session, rx) = ready_session();
    drop(rx);
    assert_eq!(session.set_learning_rate("0.3"), Ok(0.3));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(matches!(
        session.start_training(),
        Err(SessionError::WorkerUnavailable)
    ));
}

#[test]
fn commands_need_a_ready_worker() {
    let mut session = default_session();
    assert!(matches!(
        session.start_training(),
        Err(SessionError::WorkerUnavailable)
    ));

    let (tx, _rx) = mpsc::channel();
    session.attach(tx);
    assert!(matches!(
        session.start_training(),
        Err(SessionError::WorkerUnavailable)
    ));
}

#[test]
fn stop_needs_a_running_training() {
    let (mut session, rx) = ready_session();
    assert!(matches!(
        session.stop_training(),
        Err(SessionError::NotTraining)
    ));
    assert!(rx.try_recv().is_err());

    session.handle_message(InboundMessage::StartSuccess);
    session.stop_training().unwrap();
    assert_eq!(rx.try_recv().unwrap(), OutboundMessage::StopTraining);

    session.handle_message(InboundMessage::StoppedTraining { weights: None });
    assert!(matches!(
        session.stop_training(),
        Err(SessionError::NotTraining)
    ));
    assert!(rx.try_recv().is_err());
}
