//! Defines an abstraction over where search results are delivered.

use tokio::sync::mpsc;

use super::events::{ResultRow, SearchEvent};

/// A trait that abstracts the delivery of search events to the UI.
/// This is "fire-and-forget" and doesn't return a result, simplifying its use.
pub trait ResultSink: Send + Sync + Clone + 'static {
    fn send_event(&self, event: SearchEvent);

    fn on_results(&self, generation: u64, rows: Vec<ResultRow>) {
        self.send_event(SearchEvent::Results { generation, rows });
    }

    fn on_error(&self, message: String) {
        self.send_event(SearchEvent::ShowError(message));
    }
}

/// A channel sender works as a sink; a dropped receiver is only logged.
impl ResultSink for mpsc::UnboundedSender<SearchEvent> {
    fn send_event(&self, event: SearchEvent) {
        if let Err(e) = self.send(event) {
            tracing::warn!("Failed to deliver search event: {}", e);
        }
    }
}
