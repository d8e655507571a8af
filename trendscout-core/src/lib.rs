pub mod config;
pub mod error;
pub mod error_utils;
pub mod phrases;
pub mod qualify;
pub mod rank;
pub mod seen;
pub mod signals;
pub mod source;
pub mod tier;
pub mod types;
pub mod velocity;

pub use config::*;
pub use error::*;
pub use error_utils::*;
pub use phrases::PhraseSet;
pub use qualify::{Exclusion, QualificationPath, QualificationResult, Qualifier};
pub use seen::{InMemorySeenStore, SeenStore};
pub use signals::SignalReport;
pub use source::ContentSource;
pub use tier::{Tier, TierCutoffs};
pub use types::*;
pub use velocity::VelocityWindow;
