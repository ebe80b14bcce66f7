//! Background recognition runs.
//!
//! Each [`OcrWorker::submit`] spawns one thread that runs the engine and sends
//! [`WorkerEvent`]s back over an `mpsc` channel. Nothing produced by a run is
//! applied until the owning thread calls [`OcrWorker::poll`]; that call is the
//! only point where results cross back onto the interactive thread.

use std::borrow::Cow;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use image::RgbImage;
use tracing::{info, warn};

use crate::engine::{normalize, OcrEngine};
use crate::error::{OcrLensError, Result};
use crate::io::crop::{crop_image, CropRect};
use crate::text_box::TextBox;

pub type RunId = u64;

/// Callback fired after every event is sent, e.g. to request a UI repaint.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Recognition stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressStage {
    Initializing,
    Cropping,
    Recognizing,
    Normalizing,
    /// Reported by the controller once a run succeeds; never sent as an event.
    Finished,
}

impl ProgressStage {
    /// Progress shown when this stage begins.
    pub fn percent(self) -> u8 {
        match self {
            Self::Initializing => 10,
            Self::Cropping => 30,
            Self::Recognizing => 50,
            Self::Normalizing => 80,
            Self::Finished => 100,
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "Initializing OCR engine"),
            Self::Cropping => write!(f, "Cropping selection"),
            Self::Recognizing => write!(f, "Recognizing text"),
            Self::Normalizing => write!(f, "Processing results"),
            Self::Finished => write!(f, "Done"),
        }
    }
}

#[derive(Clone, Debug)]
pub enum WorkerEventKind {
    Progress(ProgressStage),
    /// Boxes are in full-image coordinates, even for cropped runs.
    Succeeded {
        boxes: Vec<TextBox>,
        crop: Option<CropRect>,
        elapsed: Duration,
    },
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct WorkerEvent {
    pub run: RunId,
    pub kind: WorkerEventKind,
}

impl WorkerEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind, WorkerEventKind::Progress(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running(RunId),
}

pub struct OcrWorker {
    engine: Arc<dyn OcrEngine>,
    prepared: Arc<AtomicBool>,
    tx: mpsc::Sender<WorkerEvent>,
    rx: mpsc::Receiver<WorkerEvent>,
    state: WorkerState,
    /// The in-flight run was invalidated; its events are dropped on arrival.
    stale: bool,
    next_run: RunId,
    waker: Option<Waker>,
}

impl OcrWorker {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            engine,
            prepared: Arc::new(AtomicBool::new(false)),
            tx,
            rx,
            state: WorkerState::Idle,
            stale: false,
            next_run: 1,
            waker: None,
        }
    }

    pub fn with_waker(mut self, waker: Waker) -> Self {
        self.waker = Some(waker);
        self
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, WorkerState::Running(_))
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Start a run over `image`, optionally restricted to `crop`.
    ///
    /// Returns [`OcrLensError::Busy`] without side effects while a run is in
    /// flight, including a run that was invalidated but has not finished yet.
    pub fn submit(&mut self, image: Arc<RgbImage>, crop: Option<CropRect>) -> Result<RunId> {
        if let WorkerState::Running(run) = self.state {
            warn!(run, "Recognition rejected: worker busy");
            return Err(OcrLensError::Busy);
        }

        let run = self.next_run;
        let engine = Arc::clone(&self.engine);
        let prepared = Arc::clone(&self.prepared);
        let tx = self.tx.clone();
        let waker = self.waker.clone();

        std::thread::Builder::new()
            .name(format!("ocrlens-run-{run}"))
            .spawn(move || {
                let emit = |kind: WorkerEventKind| {
                    let _ = tx.send(WorkerEvent { run, kind });
                    if let Some(w) = &waker {
                        w();
                    }
                };
                let start = Instant::now();
                // A panicking engine still has to end the run with a terminal event.
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    execute(engine.as_ref(), &prepared, &image, crop, &emit)
                }));
                let kind = match outcome {
                    Ok(Ok(boxes)) => {
                        let elapsed = start.elapsed();
                        info!(run, boxes = boxes.len(), ?elapsed, "Recognition finished");
                        WorkerEventKind::Succeeded {
                            boxes,
                            crop,
                            elapsed,
                        }
                    }
                    Ok(Err(e)) => {
                        warn!(run, error = %e, "Recognition failed");
                        WorkerEventKind::Failed(e.to_string())
                    }
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        warn!(run, %message, "OCR engine panicked");
                        WorkerEventKind::Failed(format!("OCR engine panicked: {message}"))
                    }
                };
                emit(kind);
            })?;

        self.next_run += 1;
        self.stale = false;
        self.state = WorkerState::Running(run);
        info!(run, cropped = crop.is_some(), "Recognition started");
        Ok(run)
    }

    /// Mark the in-flight run stale. Its remaining events will be discarded,
    /// and the worker returns to idle once it terminates.
    pub fn invalidate(&mut self) {
        if self.is_running() {
            self.stale = true;
        }
    }

    /// Drain events that have arrived since the last call.
    ///
    /// Events from stale runs are dropped. A terminal event returns the worker
    /// to [`WorkerState::Idle`].
    pub fn poll(&mut self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.extend(self.accept(event));
        }
        events
    }

    /// Block until the current run terminates and return its events.
    /// Returns immediately when idle.
    pub fn wait(&mut self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        while self.is_running() {
            match self.rx.recv() {
                Ok(event) => events.extend(self.accept(event)),
                Err(_) => self.state = WorkerState::Idle,
            }
        }
        events
    }

    fn accept(&mut self, event: WorkerEvent) -> Option<WorkerEvent> {
        let current = self.state == WorkerState::Running(event.run);
        if current && event.is_terminal() {
            self.state = WorkerState::Idle;
        }
        if current && !self.stale {
            return Some(event);
        }
        if event.is_terminal() {
            warn!(run = event.run, "Discarding result of stale recognition run");
            self.stale = false;
        }
        None
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn execute(
    engine: &dyn OcrEngine,
    prepared: &AtomicBool,
    image: &RgbImage,
    crop: Option<CropRect>,
    emit: &impl Fn(WorkerEventKind),
) -> Result<Vec<TextBox>> {
    emit(WorkerEventKind::Progress(ProgressStage::Initializing));
    if !prepared.load(Ordering::Acquire) {
        engine.prepare()?;
        prepared.store(true, Ordering::Release);
    }

    let target = match crop {
        Some(c) => {
            emit(WorkerEventKind::Progress(ProgressStage::Cropping));
            Cow::Owned(crop_image(image, &c)?)
        }
        None => Cow::Borrowed(image),
    };

    emit(WorkerEventKind::Progress(ProgressStage::Recognizing));
    let raw = engine.recognize(&target)?;

    emit(WorkerEventKind::Progress(ProgressStage::Normalizing));
    let boxes = normalize(raw);
    Ok(match crop {
        Some(c) => boxes
            .iter()
            .map(|b| b.translated(c.x as f64, c.y as f64))
            .collect(),
        None => boxes,
    })
}
