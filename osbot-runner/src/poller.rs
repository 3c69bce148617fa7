//! Incremental polling of the collection event feed.

use osbot_core::config::ChannelSubscriptions;
use osbot_sdk::client::{ClientError, OpenSeaClient};
use osbot_sdk::objects::{EventBatch, RawEvent};
use time::OffsetDateTime;

/// Fetches the events of one collection, remembering how far it has read.
///
/// The cursor only lives in memory; a restart begins again at the lookback
/// window.
pub struct EventPoller {
    client: OpenSeaClient,
    slug: String,
    event_types: Vec<&'static str>,
    max_pages: usize,
    cursor: i64,
}

impl EventPoller {
    pub fn new(
        client: OpenSeaClient,
        slug: impl Into<String>,
        subscriptions: &ChannelSubscriptions,
        max_pages: usize,
        start: OffsetDateTime,
    ) -> Self {
        Self {
            client,
            slug: slug.into(),
            event_types: subscriptions
                .wire_kinds()
                .into_iter()
                .map(|kind| kind.as_str())
                .collect(),
            max_pages,
            cursor: start.unix_timestamp(),
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Fetch everything newer than the cursor, oldest first, and advance it.
    ///
    /// The cursor is left untouched when the request fails so the next poll
    /// retries the same window. Records that do not decode are logged and
    /// skipped; the cursor still moves past them.
    pub async fn poll(&mut self) -> Result<Vec<RawEvent>, ClientError> {
        let batch = self
            .client
            .collection_events(&self.slug, self.cursor, &self.event_types, self.max_pages)
            .await?;

        for rejected in &batch.rejected {
            tracing::warn!(
                event_type = rejected.event_type.as_deref().unwrap_or("?"),
                error = %rejected.error,
                "Skipping undecodable feed record"
            );
        }
        if batch.truncated {
            tracing::warn!(
                slug = %self.slug,
                max_pages = self.max_pages,
                "Page limit reached, older events in this window were not fetched"
            );
        }

        let next = next_cursor(self.cursor, &batch);
        tracing::debug!(
            slug = %self.slug,
            fetched = batch.events.len(),
            rejected = batch.rejected.len(),
            from = self.cursor,
            to = next,
            "Polled event feed"
        );
        self.cursor = next;
        Ok(batch.events)
    }
}

/// One second past the newest event timestamp in `batch`, or `current` if
/// nothing newer was seen.
pub fn next_cursor(current: i64, batch: &EventBatch) -> i64 {
    batch
        .newest_timestamp()
        .map(|newest| current.max(newest.saturating_add(1)))
        .unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use osbot_sdk::objects::AssetEventsPage;

    fn event_at(timestamp: Option<i64>) -> RawEvent {
        let mut value = serde_json::json!({ "event_type": "sale" });
        if let Some(ts) = timestamp {
            value["event_timestamp"] = ts.into();
        }
        serde_json::from_value(value).unwrap()
    }

    fn batch_of(events: Vec<RawEvent>) -> EventBatch {
        EventBatch {
            events,
            ..Default::default()
        }
    }

    #[test]
    fn test_next_cursor_moves_past_newest_event() {
        let batch = batch_of(vec![
            event_at(Some(1_700_000_000)),
            event_at(Some(1_700_000_100)),
        ]);
        assert_eq!(next_cursor(1_600_000_000, &batch), 1_700_000_101);
    }

    #[test]
    fn test_next_cursor_without_events() {
        assert_eq!(next_cursor(42, &EventBatch::default()), 42);
        assert_eq!(next_cursor(42, &batch_of(vec![event_at(None)])), 42);
    }

    #[test]
    fn test_next_cursor_never_moves_backwards() {
        assert_eq!(next_cursor(500, &batch_of(vec![event_at(Some(100))])), 500);
    }

    #[test]
    fn test_next_cursor_moves_past_rejected_records() {
        let page: AssetEventsPage = serde_json::from_value(serde_json::json!({
            "asset_events": [
                { "event_type": "sale", "event_timestamp": 1_700_000_000 },
                { "event_type": "order", "maker": 7, "event_timestamp": 1_700_000_500 }
            ]
        }))
        .unwrap();
        let mut batch = EventBatch::default();
        batch.push_page(page);

        assert_eq!(batch.events.len(), 1);
        assert_eq!(next_cursor(1_600_000_000, &batch), 1_700_000_501);
    }

    #[test]
    fn test_event_types_follow_subscriptions() {
        let subscriptions =
            ChannelSubscriptions::parse(Some("1=listing,sale&2=transfer,sale")).unwrap();
        let poller = EventPoller::new(
            OpenSeaClient::new("key").unwrap(),
            "slug",
            &subscriptions,
            1,
            OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        );
        assert_eq!(poller.event_types, vec!["sale", "order", "transfer"]);
        assert_eq!(poller.cursor(), 1_700_000_000);
    }
}
