pub mod dispatch;
pub mod notify;
pub mod pacing;
pub mod runner;
pub mod summary;

pub use dispatch::{DispatchOutcome, Dispatcher, ScoredCandidate};
pub use notify::{Alert, Notifier, NotifierBackend};
pub use pacing::Pacer;
pub use runner::{RunPhase, ScanRunner};
pub use summary::RunSummary;
