//! Shared test doubles and scenario builders for the engine suite.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use mixlane_core::{Actor, Amount, ClientRef, FileId, PitchId, ProjectId, Timestamp, UserId, WorkflowMode};
use mixlane_engine::{
    Engine, EngineConfig, FileStore, FileStoreError, GatewayError, NotificationSink, NotifyError,
    PaymentGateway, Recipient,
};
use mixlane_events::EventRecord;
use mixlane_ledger::PaymentHandle;
use mixlane_snapshot::FileRef;

/// File store double. `advance()` shifts the timestamps of subsequent
/// stores forward so tests can produce files created strictly after a
/// submission without sleeping.
pub struct MemoryFileStore {
    skew_secs: AtomicI64,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self {
            skew_secs: AtomicI64::new(0),
        }
    }

    /// Shift subsequent upload timestamps forward by `secs`.
    pub fn advance(&self, secs: i64) {
        self.skew_secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl FileStore for MemoryFileStore {
    fn store(&self, name: &str, bytes: &[u8]) -> Result<FileRef, FileStoreError> {
        let base = Timestamp::now().epoch_secs();
        let created_at = Timestamp::from_epoch_secs(base + self.skew_secs.load(Ordering::SeqCst))
            .map_err(|e| FileStoreError::Storage(e.to_string()))?;
        Ok(FileRef {
            id: FileId::new(),
            name: name.to_string(),
            size_bytes: bytes.len() as u64,
            created_at,
        })
    }

    fn delete(&self, _file: &FileRef) -> Result<(), FileStoreError> {
        Ok(())
    }

    fn signed_download_url(&self, file: &FileRef, ttl_secs: u64) -> Result<String, FileStoreError> {
        Ok(format!("https://files.test/{}?ttl={ttl_secs}", file.id))
    }
}

/// Notification double recording every delivered event name.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, _recipient: &Recipient, event: &EventRecord) -> Result<(), NotifyError> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.kind.name().to_string());
        Ok(())
    }
}

/// Gateway double. Charges succeed with sequential handles unless
/// `decline()` is set.
pub struct MockGateway {
    decline: AtomicBool,
    charges: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            decline: AtomicBool::new(false),
            charges: AtomicUsize::new(0),
        }
    }

    pub fn decline(&self, on: bool) {
        self.decline.store(on, Ordering::SeqCst);
    }

    pub fn charge_count(&self) -> usize {
        self.charges.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for MockGateway {
    fn charge(&self, _amount: Amount, _payment_method: &str) -> Result<PaymentHandle, GatewayError> {
        if self.decline.load(Ordering::SeqCst) {
            return Err(GatewayError::Declined("card declined".into()));
        }
        let n = self.charges.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PaymentHandle(format!("ch_{n}")))
    }
}

/// An engine wired to the three doubles, with handles kept for
/// assertions.
pub struct Harness {
    pub engine: Engine,
    pub files: Arc<MemoryFileStore>,
    pub sink: Arc<RecordingSink>,
    pub gateway: Arc<MockGateway>,
}

pub fn harness() -> Harness {
    harness_with(EngineConfig::default())
}

pub fn harness_with(config: EngineConfig) -> Harness {
    let files = Arc::new(MemoryFileStore::new());
    let sink = Arc::new(RecordingSink::new());
    let gateway = Arc::new(MockGateway::new());
    let engine = Engine::new(
        Arc::clone(&files) as Arc<dyn FileStore>,
        Arc::clone(&sink) as Arc<dyn NotificationSink>,
        Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
        config,
    );
    Harness {
        engine,
        files,
        sink,
        gateway,
    }
}

pub fn producer(user: UserId) -> Actor {
    Actor::Producer { user }
}

pub fn owner(user: UserId) -> Actor {
    Actor::ProjectOwner { user }
}

pub fn client(reference: &str) -> Actor {
    Actor::Client {
        client: ClientRef(reference.to_string()),
    }
}

/// An open-marketplace pitch already accepted into IN_PROGRESS.
/// Returns (project id, pitch id, owner actor, producer actor).
pub fn open_pitch_in_progress(h: &Harness) -> (ProjectId, PitchId, Actor, Actor) {
    let owner_id = UserId::new();
    let producer_id = UserId::new();
    let project = h
        .engine
        .create_project(owner_id, WorkflowMode::Open, Amount::from_dollars(500))
        .unwrap();
    let pitch = h
        .engine
        .create_pitch(project.id, producer_id, Amount::from_dollars(200))
        .unwrap();
    let ow = owner(owner_id);
    let pr = producer(producer_id);
    h.engine.accept(pitch.id, &ow).unwrap();
    (project.id, pitch.id, ow, pr)
}

/// Attach one file and submit, landing the pitch in READY_FOR_REVIEW.
pub fn submit_once(h: &Harness, pitch: PitchId, pr: &Actor) {
    h.engine
        .attach_file(pitch, pr, "mix_v1.wav", &[0u8; 2048])
        .unwrap();
    h.engine.submit_for_review(pitch, pr, None).unwrap();
}
