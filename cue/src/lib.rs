#![deny(missing_docs)]
//! # cue: umbrella crate
//!
//! One import surface for the cue answer pipeline. Re-exports the member
//! crates behind feature flags, plus a `prelude` for the common path:
//! build an [`AppContext`](prelude::AppContext), ask the backend through a
//! [`BackendClient`](prelude::BackendClient), render into a
//! [`RenderSink`](prelude::RenderSink).

#[cfg(feature = "backend")]
pub use cue_backend as backend;
#[cfg(feature = "core")]
pub use cue_format as format;
#[cfg(feature = "session")]
pub use cue_session as session;
#[cfg(feature = "core")]
pub use cue_stream as stream;
#[cfg(feature = "core")]
pub use cue_types as types;

/// Happy-path imports.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use cue_types::{
        AiRequest, BackendError, Completion, CueConfig, LicenseStatus, ModelInfo, RenderSink,
        Seconds, SessionError, StreamError, StreamEvent, StreamReport,
    };

    #[cfg(feature = "core")]
    pub use cue_format::{
        ConversationEntry, CostDisplay, FormatStyle, ModelBadge, format_markdown,
    };

    #[cfg(feature = "core")]
    pub use cue_stream::{NullSink, RecordingSink, StreamRenderer, drive_stream};

    #[cfg(feature = "backend")]
    pub use cue_backend::BackendClient;

    #[cfg(feature = "session")]
    pub use cue_session::{AppContext, LicenseTier, SessionClock, TimerTick};
}
