//! `easel` is the editing-session core of a raster/vector image
//! composition editor: a scene of nodes over a background raster, an
//! ordered effect pipeline, a pannable/zoomable viewport, a clip-frame
//! mask, and resolution-independent persistence.
//!
//! Rendering and storage are collaborators behind traits
//! ([`render::SnapshotRenderer`], [`store::ProjectStore`]); the crate
//! itself only models session state and its persisted form.

#![forbid(unsafe_code)]

pub mod activity;
pub mod codec;
pub mod controls;
pub mod effects;
pub mod error;
pub mod frame;
pub mod geom;
pub mod gesture;
pub mod model;
pub mod render;
pub mod session;
pub mod store;
pub mod viewport;

pub use activity::{ActivityEntry, ActivityLog};
pub use codec::{DOCUMENT_VERSION, Document, from_document, to_document};
pub use controls::{AdjustControls, load_from_named_list, sync_pipeline};
pub use effects::{Effect, EffectEntry, EffectPipeline, parse_effect};
pub use error::{EaselError, EaselResult};
pub use frame::{ClipFrameController, FrameKind};
pub use gesture::{DraftKind, ShapeDraft, add_text};
pub use model::{Node, NodeId, NodeShape, NodeStyle, Origin, Scene};
pub use render::{FlatRenderer, SnapshotRenderer, export, export_bounds};
pub use session::{Session, SessionMode};
pub use store::{MemoryStore, ProjectId, ProjectStore, SaveReceipt, SaveStatus};
pub use viewport::Viewport;
