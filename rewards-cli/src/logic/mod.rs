//! Pure functional business logic
//!
//! Parsing of input documents, event replay and table rendering.
//! Nothing here touches the filesystem or prints; commands/ does that.

pub mod inputs;
pub mod paths;
pub mod render;
pub mod replay;

pub use inputs::{parse_events, parse_graph_snapshot, parse_status_snapshot, PalliativeEvent};
pub use paths::{expand_home_directory, normalize_path};
pub use render::{
    format_amount, render_earnings, render_palliative, render_projection, render_qualification,
};
pub use replay::{replay_events, PalliativeSummary};
