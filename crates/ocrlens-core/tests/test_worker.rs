mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbImage;
use ocrlens_core::engine::{OcrEngine, RawOcrOutput};
use ocrlens_core::error::{OcrLensError, Result};
use ocrlens_core::io::crop::CropRect;
use ocrlens_core::worker::{OcrWorker, ProgressStage, WorkerEvent, WorkerEventKind, WorkerState};

use common::{test_image, MockEngine, LEGACY_TWO_WORDS};

/// Engine whose `recognize` panics instead of returning an error.
struct PanickingEngine;

impl OcrEngine for PanickingEngine {
    fn name(&self) -> &str {
        "panicking"
    }

    fn recognize(&self, _image: &RgbImage) -> Result<RawOcrOutput> {
        panic!("detector weights corrupted");
    }
}

fn terminal_count(events: &[WorkerEvent]) -> usize {
    events.iter().filter(|e| e.is_terminal()).count()
}

fn stages(events: &[WorkerEvent]) -> Vec<ProgressStage> {
    events
        .iter()
        .filter_map(|e| match e.kind {
            WorkerEventKind::Progress(stage) => Some(stage),
            _ => None,
        })
        .collect()
}

#[test]
fn test_full_run_event_order() {
    let mut worker = OcrWorker::new(Arc::new(MockEngine::returning(LEGACY_TWO_WORDS)));
    assert_eq!(worker.state(), WorkerState::Idle);

    let run = worker.submit(Arc::new(test_image(200, 50)), None).unwrap();
    assert_eq!(worker.state(), WorkerState::Running(run));

    let events = worker.wait();
    assert_eq!(worker.state(), WorkerState::Idle);
    assert_eq!(
        stages(&events),
        vec![
            ProgressStage::Initializing,
            ProgressStage::Recognizing,
            ProgressStage::Normalizing
        ]
    );
    assert_eq!(terminal_count(&events), 1);
    let last = events.last().unwrap();
    assert!(last.is_terminal(), "terminal event comes after all progress");
    assert!(events.iter().all(|e| e.run == run));
    match &last.kind {
        WorkerEventKind::Succeeded { boxes, crop, .. } => {
            assert_eq!(boxes.len(), 2);
            assert!(crop.is_none());
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn test_submit_while_running_is_rejected() {
    let (engine, gate) = MockEngine::gated(LEGACY_TWO_WORDS);
    let engine = Arc::new(engine);
    let mut worker = OcrWorker::new(engine.clone());
    let image = Arc::new(test_image(64, 32));

    let run = worker.submit(image.clone(), None).unwrap();
    let err = worker.submit(image, None).unwrap_err();
    assert!(matches!(err, OcrLensError::Busy));
    assert_eq!(worker.state(), WorkerState::Running(run), "rejection changes nothing");

    gate.send(()).unwrap();
    let events = worker.wait();
    assert_eq!(terminal_count(&events), 1, "running job still finishes once");
    assert_eq!(engine.recorded_calls().len(), 1);
}

#[test]
fn test_failure_returns_to_idle() {
    let mut worker = OcrWorker::new(Arc::new(MockEngine::failing("model exploded")));
    worker.submit(Arc::new(test_image(10, 10)), None).unwrap();
    let events = worker.wait();
    assert_eq!(worker.state(), WorkerState::Idle);
    match &events.last().unwrap().kind {
        WorkerEventKind::Failed(message) => assert!(message.contains("model exploded")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(worker.submit(Arc::new(test_image(10, 10)), None).is_ok());
}

#[test]
fn test_cropped_run_translates_boxes_back() {
    let engine = Arc::new(MockEngine::returning(
        r#"[[[[1, 2], [11, 2], [11, 7], [1, 7]], ["crop", 0.9]]]"#,
    ));
    let mut worker = OcrWorker::new(engine.clone());
    let crop = CropRect {
        x: 40,
        y: 30,
        width: 50,
        height: 20,
    };
    worker.submit(Arc::new(test_image(200, 100)), Some(crop)).unwrap();
    let events = worker.wait();

    assert!(stages(&events).contains(&ProgressStage::Cropping));
    assert_eq!(engine.recorded_calls(), vec![(50, 20)], "engine sees only the crop");
    let WorkerEventKind::Succeeded { boxes, crop: got, .. } = &events.last().unwrap().kind else {
        panic!("expected success");
    };
    assert_eq!(*got, Some(crop));
    let tl = boxes[0].polygon.points()[0];
    assert_eq!((tl.x, tl.y), (41.0, 32.0));
}

#[test]
fn test_out_of_bounds_crop_fails_the_run() {
    let mut worker = OcrWorker::new(Arc::new(MockEngine::returning("[]")));
    let crop = CropRect {
        x: 90,
        y: 0,
        width: 20,
        height: 10,
    };
    worker.submit(Arc::new(test_image(100, 100)), Some(crop)).unwrap();
    let events = worker.wait();
    assert!(matches!(
        events.last().unwrap().kind,
        WorkerEventKind::Failed(_)
    ));
}

#[test]
fn test_invalidated_run_is_discarded() {
    let (engine, gate) = MockEngine::gated(LEGACY_TWO_WORDS);
    let mut worker = OcrWorker::new(Arc::new(engine));
    let image = Arc::new(test_image(64, 32));

    worker.submit(image.clone(), None).unwrap();
    worker.invalidate();
    assert!(worker.is_running(), "stale run still occupies the worker");
    assert!(matches!(worker.submit(image.clone(), None), Err(OcrLensError::Busy)));

    gate.send(()).unwrap();
    let events = worker.wait();
    assert!(events.is_empty(), "stale events never surface: {events:?}");
    assert_eq!(worker.state(), WorkerState::Idle);

    gate.send(()).unwrap();
    let fresh = worker.submit(image, None).unwrap();
    let events = worker.wait();
    assert_eq!(terminal_count(&events), 1);
    assert!(events.iter().all(|e| e.run == fresh));
}

#[test]
fn test_poll_is_non_blocking_and_waker_fires() {
    let (engine, gate) = MockEngine::gated("[]");
    let wakes = Arc::new(AtomicUsize::new(0));
    let counter = wakes.clone();
    let mut worker = OcrWorker::new(Arc::new(engine)).with_waker(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    worker.submit(Arc::new(test_image(8, 8)), None).unwrap();
    let early = worker.poll();
    assert_eq!(terminal_count(&early), 0);
    assert!(worker.is_running());

    gate.send(()).unwrap();
    let rest = worker.wait();
    assert_eq!(terminal_count(&rest), 1);

    // Initializing, Recognizing, Normalizing, Succeeded. The last wake fires
    // just after its event is sent, so give the run thread a moment.
    let deadline = Instant::now() + Duration::from_secs(5);
    while wakes.load(Ordering::SeqCst) < 4 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(wakes.load(Ordering::SeqCst), 4);
}

#[test]
fn test_engine_prepared_once() {
    let engine = Arc::new(MockEngine::returning("[]"));
    let mut worker = OcrWorker::new(engine.clone());
    for _ in 0..3 {
        worker.submit(Arc::new(test_image(8, 8)), None).unwrap();
        worker.wait();
    }
    assert_eq!(*engine.prepare_calls.lock().unwrap(), 1);
    assert_eq!(engine.recorded_calls().len(), 3);
}

#[test]
fn test_engine_panic_fails_the_run_and_frees_the_worker() {
    let mut worker = OcrWorker::new(Arc::new(PanickingEngine));
    let image = Arc::new(test_image(16, 16));

    let run = worker.submit(image.clone(), None).unwrap();
    let events = worker.wait();
    assert_eq!(worker.state(), WorkerState::Idle);
    assert_eq!(terminal_count(&events), 1);
    let last = events.last().unwrap();
    assert_eq!(last.run, run);
    match &last.kind {
        WorkerEventKind::Failed(message) => {
            assert!(message.contains("panicked"), "{message}");
            assert!(message.contains("detector weights corrupted"), "{message}");
        }
        other => panic!("expected failure, got {other:?}"),
    }

    let next = worker.submit(image, None).unwrap();
    assert_ne!(next, run);
    assert_eq!(terminal_count(&worker.wait()), 1);
}

#[test]
fn test_engine_panic_surfaces_through_poll() {
    let mut worker = OcrWorker::new(Arc::new(PanickingEngine));
    worker.submit(Arc::new(test_image(16, 16)), None).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while worker.is_running() && Instant::now() < deadline {
        events.extend(worker.poll());
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(!worker.is_running(), "worker must not stay busy after a panic");
    assert!(matches!(
        events.last().map(|e| &e.kind),
        Some(WorkerEventKind::Failed(_))
    ));
    assert!(worker.submit(Arc::new(test_image(16, 16)), None).is_ok());
}
