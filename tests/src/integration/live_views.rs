//! Login → connect → pushed updates reach every open view.

use super::fixtures::{token, update_json, Client, NOW};
use chrono::NaiveDate;
use fc_02_realtime::{ConnectionState, FEEDBACK_TOPIC};
use fc_03_views::{FeedbackListView, FeedbackSummaryView, SummaryState};
use shared_types::{EventId, FeedbackId, FeedbackItem, FeedbackSummary, Route, SentimentType};
use std::time::Duration;

fn item(id: FeedbackId, event: EventId) -> FeedbackItem {
    FeedbackItem {
        feedback_id: id,
        event_id: Some(event),
        content: "Great talk".to_string(),
        created_at: NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
        sentiment_type: SentimentType::Pending,
    }
}

fn summary(event: EventId, positive: u64) -> FeedbackSummary {
    FeedbackSummary {
        event_id: event,
        total_feedback_count: 2,
        positive_count: positive,
        neutral_count: 0,
        negative_count: 0,
    }
}

async fn fetched(view: &FeedbackSummaryView, count: u64) -> SummaryState {
    let mut rx = view.watch();
    let state = rx
        .wait_for(|s| s.fetch_count >= count && !s.loading)
        .await
        .unwrap()
        .clone();
    state
}

#[tokio::test(start_paused = true)]
async fn test_pushed_update_reaches_list_and_summary() {
    let client = Client::new();
    let event = EventId::new_v4();
    let (a, b) = (FeedbackId::new_v4(), FeedbackId::new_v4());
    client.source.set_feedback(event, vec![item(a, event), item(b, event)]);
    client.source.set_summary(summary(event, 0));

    client.controller.complete_login(token(NOW + 3600, &["ROLE_USER"]));
    assert_eq!(client.navigator.current(), Some(Route::Events));
    client.wait_for(ConnectionState::Connected).await;

    let list = FeedbackListView::open(event, client.source.clone(), &client.bus).await;
    let summary_view = FeedbackSummaryView::open(event, client.source.clone(), &client.bus);
    fetched(&summary_view, 1).await;

    client.source.set_summary(summary(event, 1));
    assert_eq!(
        client.server.send(FEEDBACK_TOPIC, &update_json(b, event, "POSITIVE")),
        1
    );
    tokio::time::sleep(Duration::from_millis(10)).await;

    let items = list.items();
    assert_eq!(items[0].sentiment_type, SentimentType::Pending);
    assert_eq!(items[1].sentiment_type, SentimentType::Positive);
    assert_eq!(fetched(&summary_view, 2).await.summary, Some(summary(event, 1)));
    assert_eq!(client.source.feedback_fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_updates_for_other_events_are_ignored_by_views() {
    let client = Client::new();
    let event = EventId::new_v4();
    let a = FeedbackId::new_v4();
    client.source.set_feedback(event, vec![item(a, event)]);
    client.source.set_summary(summary(event, 0));

    client.controller.complete_login(token(NOW + 3600, &["ROLE_USER"]));
    client.wait_for(ConnectionState::Connected).await;

    let list = FeedbackListView::open(event, client.source.clone(), &client.bus).await;
    let summary_view = FeedbackSummaryView::open(event, client.source.clone(), &client.bus);
    fetched(&summary_view, 1).await;

    client
        .server
        .send(FEEDBACK_TOPIC, &update_json(a, EventId::new_v4(), "NEGATIVE"));
    tokio::time::sleep(Duration::from_millis(10)).await;

    // The list matches by feedback id alone
    assert_eq!(list.items()[0].sentiment_type, SentimentType::Negative);
    assert_eq!(client.source.summary_fetches(), 1);
    assert_eq!(summary_view.snapshot().fetch_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_closed_views_stop_listening_while_channel_stays_up() {
    let client = Client::new();
    let event = EventId::new_v4();
    let a = FeedbackId::new_v4();
    client.source.set_feedback(event, vec![item(a, event)]);
    client.source.set_summary(summary(event, 0));

    client.controller.complete_login(token(NOW + 3600, &["ROLE_USER"]));
    client.wait_for(ConnectionState::Connected).await;

    let mut list = FeedbackListView::open(event, client.source.clone(), &client.bus).await;
    let mut summary_view = FeedbackSummaryView::open(event, client.source.clone(), &client.bus);
    fetched(&summary_view, 1).await;
    assert_eq!(client.bus.subscriber_count(), 2);

    list.close();
    summary_view.close();
    client.server.send(FEEDBACK_TOPIC, &update_json(a, event, "POSITIVE"));
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(client.bus.subscriber_count(), 0);
    assert_eq!(list.items()[0].sentiment_type, SentimentType::Pending);
    assert_eq!(client.source.summary_fetches(), 1);
    assert!(client.connection.is_connected());
}
