//! # Collaborator Interfaces
//!
//! The engine's view of the host system: file storage, outbound
//! notifications, and the payment gateway. Each is a narrow trait the
//! host implements; the engine never reaches past these seams.
//!
//! `Send + Sync` bounds let one engine instance serve concurrent
//! request-scoped calls.

use thiserror::Error;

use mixlane_core::{Amount, ClientRef, UserId};
use mixlane_events::EventRecord;
use mixlane_ledger::PaymentHandle;
use mixlane_snapshot::FileRef;

/// Error from the host's file store.
#[derive(Error, Debug)]
pub enum FileStoreError {
    /// The backing store rejected or lost the object.
    #[error("file store failure: {0}")]
    Storage(String),
}

/// Error from the host's notification delivery.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Delivery failed. The engine logs this and moves on.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Error from the payment gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The gateway declined the charge synchronously.
    #[error("charge declined: {0}")]
    Declined(String),
    /// The gateway was unreachable or returned an unexpected response.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// An authenticated platform user.
    User(UserId),
    /// An external client reached through the portal link.
    Client(ClientRef),
}

/// Storage of pitch file bytes. Bytes never pass through the engine
/// again after `store`; only the returned `FileRef` does.
pub trait FileStore: Send + Sync {
    /// Store a file and return its reference.
    fn store(&self, name: &str, bytes: &[u8]) -> Result<FileRef, FileStoreError>;

    /// Delete a stored file.
    fn delete(&self, file: &FileRef) -> Result<(), FileStoreError>;

    /// A time-limited signed download URL for a stored file.
    fn signed_download_url(&self, file: &FileRef, ttl_secs: u64) -> Result<String, FileStoreError>;
}

/// Outbound notification delivery. Fire-and-forget from the engine's
/// perspective: a failed delivery never rolls back a transition.
pub trait NotificationSink: Send + Sync {
    /// Deliver one event notification to a recipient.
    fn notify(&self, recipient: &Recipient, event: &EventRecord) -> Result<(), NotifyError>;
}

/// The payment gateway's synchronous half. Charges resolve later
/// through the webhook entry points (`confirm_milestone_payment`,
/// `fail_milestone_payment`).
pub trait PaymentGateway: Send + Sync {
    /// Start a charge against a stored payment method. Returns the
    /// gateway's handle for the in-flight charge.
    fn charge(&self, amount: Amount, payment_method: &str) -> Result<PaymentHandle, GatewayError>;
}
