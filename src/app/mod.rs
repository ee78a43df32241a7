//! The session layer that sits between a UI and the search engine.

pub mod events;
pub mod sink;
pub mod state;
pub mod tasks;

pub use events::{ResultRow, SearchEvent};
pub use sink::ResultSink;
pub use state::SearchSession;
