use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use wwc_core::generation::PREPARING_MESSAGE;
use wwc_core::error::GENERIC_FAILURE_MESSAGE;
use wwc_core::{
    EventSink, GenerateError, GenerationState, GeneratorController, GeneratorEvent,
    HistoryState, ImagePayload, InfographicApi, InfographicRecord, ProgressSchedule, Screen,
    Session, Ticket,
};

// 1x1 transparent PNG
const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

struct ScriptedApi {
    outcomes: Mutex<VecDeque<Result<ImagePayload, GenerateError>>>,
    delay: Duration,
    calls: AtomicUsize,
    history: Result<Vec<InfographicRecord>, GenerateError>,
}

impl ScriptedApi {
    fn new(delay: Duration, outcomes: Vec<Result<ImagePayload, GenerateError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            delay,
            calls: AtomicUsize::new(0),
            history: Ok(Vec::new()),
        }
    }

    fn with_history(mut self, history: Result<Vec<InfographicRecord>, GenerateError>) -> Self {
        self.history = history;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InfographicApi for ScriptedApi {
    async fn generate(&self) -> Result<ImagePayload, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerateError::MalformedResponse))
    }

    async fn list_infographics(&self) -> Result<Vec<InfographicRecord>, GenerateError> {
        self.history.clone()
    }

    async fn status(&self) -> Result<String, GenerateError> {
        Ok("ok".into())
    }
}

fn channel_sink() -> (EventSink, UnboundedReceiver<GeneratorEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink: EventSink = Arc::new(move |event| {
        let _ = tx.send(event);
    });
    (sink, rx)
}

fn quiet_schedule() -> ProgressSchedule {
    ProgressSchedule::empty()
}

fn record(id: &str, image: &str) -> InfographicRecord {
    InfographicRecord {
        id: id.into(),
        image_base64: ImagePayload::new(image),
        prompt: "infographic".into(),
        timestamp: Utc::now(),
    }
}

/// Feeds events into the controller until the current generation settles.
/// Returns every event seen, in delivery order.
async fn settle(
    controller: &mut GeneratorController,
    rx: &mut UnboundedReceiver<GeneratorEvent>,
) -> Vec<GeneratorEvent> {
    let mut seen = Vec::new();
    while controller.state().is_loading() {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("generation did not settle")
            .expect("sink closed");
        seen.push(event.clone());
        controller.handle(event);
    }
    seen
}

async fn drain_history(
    controller: &mut GeneratorController,
    rx: &mut UnboundedReceiver<GeneratorEvent>,
) {
    while matches!(controller.history(), HistoryState::Loading) {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("history did not load")
            .expect("sink closed");
        controller.handle(event);
    }
}

#[tokio::test]
async fn generate_reaches_ready_with_exact_payload() {
    let api = Arc::new(ScriptedApi::new(
        Duration::from_millis(10),
        vec![Ok(ImagePayload::new("X"))],
    ));
    let (sink, mut rx) = channel_sink();
    let mut controller = GeneratorController::new(api.clone(), sink, quiet_schedule());

    let ticket = controller.generate().expect("ticket");
    assert_eq!(
        controller.state(),
        &GenerationState::Loading {
            ticket,
            message: PREPARING_MESSAGE.to_string()
        }
    );

    settle(&mut controller, &mut rx).await;

    match controller.state() {
        GenerationState::Ready { image } => assert_eq!(image.as_str(), "X"),
        other => panic!("expected ready, got {other:?}"),
    }
    assert_eq!(api.calls(), 1);
    // success triggers a history refresh
    assert_eq!(controller.history(), &HistoryState::Loading);
}

#[tokio::test]
async fn progress_messages_arrive_in_order_and_stop_at_completion() {
    let api = Arc::new(ScriptedApi::new(
        Duration::from_millis(150),
        vec![Ok(ImagePayload::new("X"))],
    ));
    let (sink, mut rx) = channel_sink();
    let schedule = ProgressSchedule::new([
        (Duration::from_millis(20), "first"),
        (Duration::from_millis(60), "second"),
        (Duration::from_secs(30), "never"),
    ]);
    let mut controller = GeneratorController::new(api, sink, schedule);

    controller.generate().expect("ticket");
    let seen = settle(&mut controller, &mut rx).await;

    let progress: Vec<&str> = seen
        .iter()
        .filter_map(|e| match e {
            GeneratorEvent::Progress { message, .. } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(progress, ["first", "second"]);
    assert!(matches!(seen.last(), Some(GeneratorEvent::Finished { .. })));

    // nothing but the history refresh may follow
    tokio::time::sleep(Duration::from_millis(100)).await;
    while let Ok(event) = rx.try_recv() {
        assert!(
            matches!(event, GeneratorEvent::HistoryLoaded { .. }),
            "unexpected event after completion: {event:?}"
        );
    }
    assert!(matches!(controller.state(), GenerationState::Ready { .. }));
}

#[tokio::test]
async fn progress_updates_loading_message() {
    let api = Arc::new(ScriptedApi::new(
        Duration::from_millis(200),
        vec![Ok(ImagePayload::new("X"))],
    ));
    let (sink, mut rx) = channel_sink();
    let schedule = ProgressSchedule::new([(Duration::from_millis(10), "Adding text and graphics…")]);
    let mut controller = GeneratorController::new(api, sink, schedule);

    let ticket = controller.generate().expect("ticket");
    let event = rx.recv().await.expect("progress");
    controller.handle(event);

    assert_eq!(
        controller.state(),
        &GenerationState::Loading {
            ticket,
            message: "Adding text and graphics…".into()
        }
    );
    settle(&mut controller, &mut rx).await;
}

#[tokio::test]
async fn duplicate_generate_is_refused() {
    let api = Arc::new(ScriptedApi::new(
        Duration::from_millis(50),
        vec![Ok(ImagePayload::new("X")), Ok(ImagePayload::new("Y"))],
    ));
    let (sink, mut rx) = channel_sink();
    let mut controller = GeneratorController::new(api.clone(), sink, quiet_schedule());

    assert!(controller.generate().is_some());
    assert!(controller.generate().is_none());
    assert!(controller.regenerate().is_none());

    settle(&mut controller, &mut rx).await;
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn retry_after_error_reissues_request() {
    let api = Arc::new(ScriptedApi::new(
        Duration::from_millis(5),
        vec![
            Err(GenerateError::Backend {
                status: 500,
                detail: Some("quota exceeded".into()),
            }),
            Ok(ImagePayload::new("second try")),
        ],
    ));
    let (sink, mut rx) = channel_sink();
    let mut controller = GeneratorController::new(api.clone(), sink, quiet_schedule());

    let first = controller.generate().expect("ticket");
    settle(&mut controller, &mut rx).await;
    assert_eq!(
        controller.state(),
        &GenerationState::Error {
            message: "quota exceeded".into()
        }
    );
    assert!(!controller.can_download());

    let second = controller.retry().expect("retry ticket");
    assert_ne!(first, second);
    assert!(controller.state().is_loading());

    settle(&mut controller, &mut rx).await;
    assert_eq!(api.calls(), 2);
    assert!(controller.can_download());
}

#[tokio::test]
async fn empty_transport_message_uses_fallback() {
    let api = Arc::new(ScriptedApi::new(
        Duration::ZERO,
        vec![Err(GenerateError::Transport(String::new()))],
    ));
    let (sink, mut rx) = channel_sink();
    let mut controller = GeneratorController::new(api, sink, quiet_schedule());

    controller.generate();
    settle(&mut controller, &mut rx).await;

    assert_eq!(
        controller.state(),
        &GenerationState::Error {
            message: GENERIC_FAILURE_MESSAGE.into()
        }
    );
}

#[tokio::test]
async fn download_is_noop_without_result() {
    let api = Arc::new(ScriptedApi::new(Duration::ZERO, vec![]));
    let (sink, _rx) = channel_sink();
    let controller = GeneratorController::new(api, sink, quiet_schedule());

    let path = std::env::temp_dir().join(format!("wwc_noop_{}.png", std::process::id()));
    assert!(!controller.can_download());
    assert!(!controller.download(&path).expect("no-op"));
    assert!(!path.exists());
}

#[tokio::test]
async fn download_writes_decoded_image() {
    let api = Arc::new(ScriptedApi::new(
        Duration::ZERO,
        vec![Ok(ImagePayload::new(PIXEL_PNG))],
    ));
    let (sink, mut rx) = channel_sink();
    let mut controller = GeneratorController::new(api, sink, quiet_schedule());

    controller.generate();
    settle(&mut controller, &mut rx).await;

    let dir = std::env::temp_dir().join(format!("wwc_download_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join(wwc_core::DOWNLOAD_FILE_NAME);

    assert!(controller.download(&path).expect("download"));
    let written = std::fs::read(&path).expect("written file");
    assert_eq!(&written[1..4], b"PNG");

    std::fs::remove_dir_all(dir).expect("cleanup");
}

#[tokio::test]
async fn history_can_be_opened_when_not_loading() {
    let api = Arc::new(
        ScriptedApi::new(Duration::from_millis(50), vec![Ok(ImagePayload::new("new"))])
            .with_history(Ok(vec![record("a1", "old image")])),
    );
    let (sink, mut rx) = channel_sink();
    let mut controller = GeneratorController::new(api, sink, quiet_schedule());

    assert!(!controller.open_record("a1"), "history not loaded yet");

    controller.refresh_history();
    drain_history(&mut controller, &mut rx).await;
    assert!(matches!(controller.history(), HistoryState::Loaded(records) if records.len() == 1));

    controller.generate();
    assert!(!controller.open_record("a1"), "refused while loading");
    settle(&mut controller, &mut rx).await;
    drain_history(&mut controller, &mut rx).await;

    assert!(controller.open_record("a1"));
    assert!(!controller.open_record("missing"));
    match controller.state() {
        GenerationState::Ready { image } => assert_eq!(image.as_str(), "old image"),
        other => panic!("expected ready, got {other:?}"),
    }
}

#[tokio::test]
async fn history_failure_is_reported() {
    let api = Arc::new(
        ScriptedApi::new(Duration::ZERO, vec![]).with_history(Err(GenerateError::Backend {
            status: 500,
            detail: Some("Error fetching infographics: timeout".into()),
        })),
    );
    let (sink, mut rx) = channel_sink();
    let mut controller = GeneratorController::new(api, sink, quiet_schedule());

    controller.refresh_history();
    drain_history(&mut controller, &mut rx).await;

    assert_eq!(
        controller.history(),
        &HistoryState::Failed("Error fetching infographics: timeout".into())
    );
}

#[tokio::test]
async fn navigation_resets_generator_state() {
    let api = Arc::new(ScriptedApi::new(
        Duration::from_millis(100),
        vec![Ok(ImagePayload::new("X"))],
    ));
    let (sink, mut rx) = channel_sink();
    let mut session = Session::with_schedule(api.clone(), sink, quiet_schedule());

    assert_eq!(session.screen(), Screen::Landing);
    assert!(session.generator().is_none());

    session.proceed();
    assert_eq!(session.screen(), Screen::Generator);
    let generator = session.generator_mut().expect("generator");
    assert_eq!(generator.state(), &GenerationState::Idle);
    generator.generate().expect("ticket");

    session.back();
    assert_eq!(session.screen(), Screen::Landing);
    assert!(session.generator().is_none());

    session.proceed();
    assert_eq!(
        session.generator().map(GeneratorController::state),
        Some(&GenerationState::Idle)
    );

    // the abandoned request never reaches the new generator
    tokio::time::sleep(Duration::from_millis(200)).await;
    while let Ok(event) = rx.try_recv() {
        assert!(
            !matches!(event, GeneratorEvent::Finished { .. }),
            "cancelled generation still reported"
        );
        session.handle(event);
    }
    assert_eq!(
        session.generator().map(GeneratorController::state),
        Some(&GenerationState::Idle)
    );
}

#[tokio::test]
async fn events_without_open_generator_are_dropped() {
    let api = Arc::new(ScriptedApi::new(Duration::ZERO, vec![]));
    let (sink, _rx) = channel_sink();
    let mut session = Session::with_schedule(api, sink, quiet_schedule());

    session.handle(GeneratorEvent::HistoryLoaded {
        fetch: Ticket::next(),
        result: Ok(vec![record("a1", "X")]),
    });
    assert_eq!(session.screen(), Screen::Landing);
    assert!(session.generator().is_none());
}

#[tokio::test]
async fn history_from_previous_visit_is_ignored() {
    let api = Arc::new(
        ScriptedApi::new(Duration::ZERO, vec![])
            .with_history(Ok(vec![record("earlier", "X")])),
    );
    let (sink, mut rx) = channel_sink();
    let mut session = Session::with_schedule(api, sink, quiet_schedule());

    session.proceed();
    let stale = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("history fetch posted")
        .expect("sink closed");
    assert!(matches!(stale, GeneratorEvent::HistoryLoaded { .. }));

    session.back();
    session.proceed();
    session.handle(stale);

    let generator = session.generator_mut().expect("generator");
    assert_eq!(generator.history(), &HistoryState::Loading);

    // the fresh fetch still lands
    drain_history(generator, &mut rx).await;
    assert!(matches!(generator.history(), HistoryState::Loaded(records) if records.len() == 1));
}

#[tokio::test]
async fn superseded_history_fetch_is_ignored() {
    let api = Arc::new(
        ScriptedApi::new(Duration::ZERO, vec![]).with_history(Ok(vec![record("a1", "X")])),
    );
    let (sink, mut rx) = channel_sink();
    let mut controller = GeneratorController::new(api, sink, quiet_schedule());

    controller.refresh_history();
    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("history fetch posted")
        .expect("sink closed");

    controller.refresh_history();
    controller.handle(first);
    assert_eq!(controller.history(), &HistoryState::Loading);

    drain_history(&mut controller, &mut rx).await;
    assert!(matches!(controller.history(), HistoryState::Loaded(records) if records.len() == 1));
}
