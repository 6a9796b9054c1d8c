//! Opening practice engine: turns stored opening records into target move
//! lines and drives practice sessions against them.

pub mod config;
pub mod feedback;
pub mod notation;
pub mod openings;
pub mod session;

pub use config::PracticeConfig;
pub use feedback::{Feedback, FeedbackSink};
pub use openings::{
    FileOpeningStore, MemoryOpeningStore, Opening, OpeningChange, OpeningDraft, OpeningStore,
    OpeningSummary, StoreError,
};
pub use session::{
    spawn_session, AutoAdvance, LineChange, MoveAttempt, MoveOutcome, PracticeState,
    PracticeStatus, PracticeView, RejectReason, SessionError, SessionEvent, SessionHandle,
    SessionOptions, SessionSnapshot,
};
