//! Session expiry notices, logout, reconnect gating and resume from disk.

use super::fixtures::{token, Client, NOW};
use client_runtime::{ClientConfig, ClientRuntime};
use fc_01_session::{FileClientStorage, FixedClock, RouteGuard, SessionEvaluator};
use fc_02_realtime::{loopback, ConnectionState, SESSION_QUEUE};
use fc_03_views::session_ui::{LOGIN_SUCCESS_TEXT, LOGOUT_SUCCESS_TEXT};
use fc_03_views::toast::SESSION_EXPIRED_TEXT;
use fc_03_views::{FetchError, InMemoryAuthApi};
use shared_types::Route;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_session_expired_notice_shows_exactly_one_toast() {
    let client = Client::new();
    client.controller.complete_login(token(NOW + 3600, &["ROLE_USER"]));
    client.wait_for(ConnectionState::Connected).await;

    client.server.send(SESSION_QUEUE, r#"{"type":"SESSION_EXPIRED"}"#);
    client.server.send(SESSION_QUEUE, r#"{"type":"SOMETHING_ELSE","data":"x"}"#);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(
        client.shown_toasts(),
        vec![LOGIN_SUCCESS_TEXT.to_string(), SESSION_EXPIRED_TEXT.to_string()]
    );
    // The notice alone does not end the session
    assert!(client.session.is_authenticated());
    assert!(client.connection.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_logout_closes_channel_and_never_reconnects() {
    let client = Client::new();
    client.controller.complete_login(token(NOW + 3600, &["ROLE_USER"]));
    client.wait_for(ConnectionState::Connected).await;

    client.controller.logout().await.unwrap();
    assert_eq!(client.connection.state(), ConnectionState::Disconnected);
    assert_eq!(client.navigator.current(), Some(Route::Login));
    assert_eq!(client.auth.logouts(), 1);
    assert_eq!(client.shown_toasts().last().map(String::as_str), Some(LOGOUT_SUCCESS_TEXT));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(client.server.handshakes().len(), 1);
    assert!(!client.connection.connect());
}

#[tokio::test(start_paused = true)]
async fn test_server_logout_failure_still_disconnects() {
    let client = Client::new();
    client.controller.complete_login(token(NOW + 3600, &["ROLE_USER"]));
    client.wait_for(ConnectionState::Connected).await;
    client.auth.set_failure(Some(FetchError::Unauthorized));

    assert_eq!(client.controller.logout().await, Err(FetchError::Unauthorized));
    assert_eq!(client.connection.state(), ConnectionState::Disconnected);
    assert!(!client.session.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_channel_reconnects_while_token_valid() {
    let client = Client::new();
    client.controller.complete_login(token(NOW + 3600, &["ROLE_USER"]));
    client.wait_for(ConnectionState::Connected).await;

    client.server.drop_connections();
    client.wait_for(ConnectionState::Disconnected).await;
    client.wait_for(ConnectionState::Connected).await;

    assert_eq!(client.server.handshakes().len(), 2);
    assert_eq!(client.server.subscriptions().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_token_blocks_reconnect_and_is_swept() {
    let client = Client::new();
    client.controller.complete_login(token(NOW + 60, &["ROLE_USER"]));
    client.wait_for(ConnectionState::Connected).await;

    client.clock.advance(120);
    client.server.drop_connections();
    client.wait_for(ConnectionState::Disconnected).await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(client.connection.state(), ConnectionState::Disconnected);
    assert_eq!(client.server.handshakes().len(), 1);
    assert_eq!(client.session.store().get(), None);
    assert!(!RouteGuard::RequireAuthenticated.enforce(&client.session));
    assert_eq!(client.navigator.current(), Some(Route::Login));
}

#[tokio::test(start_paused = true)]
async fn test_admin_guard_follows_token_roles() {
    let client = Client::new();
    client.controller.complete_login(token(NOW + 3600, &["ROLE_USER"]));
    assert!(!client.controller.is_admin());
    assert!(!RouteGuard::RequireAdmin.check(&client.session).is_allowed());

    client.controller.complete_login(token(NOW + 3600, &["ROLE_ADMIN"]));
    assert!(client.controller.is_admin());
    assert!(RouteGuard::RequireAdmin.check(&client.session).is_allowed());
    // Already connecting or connected: the second login does not open another channel
    client.wait_for(ConnectionState::Connected).await;
    assert_eq!(client.server.handshakes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_runtime_resumes_session_persisted_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    let first = SessionEvaluator::new(
        Arc::new(FileClientStorage::in_dir(dir.path())),
        Arc::new(FixedClock::at(NOW)),
        Arc::new(fc_01_session::RecordingNavigator::new()),
    );
    first.store().set(token(NOW + 3600, &["ROLE_USER"]));

    let (connector, server) = loopback();
    let config = ClientConfig {
        data_dir: dir.path().to_path_buf(),
        ..ClientConfig::default()
    };
    let runtime = ClientRuntime::with_parts(
        config,
        Arc::new(FileClientStorage::in_dir(dir.path())),
        Arc::new(FixedClock::at(NOW)),
        Arc::new(connector),
        Arc::new(InMemoryAuthApi::new()),
    );

    assert!(runtime.start());
    let mut state = runtime.connection().watch_state();
    state
        .wait_for(|s| *s == ConnectionState::Connected)
        .await
        .unwrap();
    assert_eq!(server.handshakes()[0].credential.as_str(), first.credential().unwrap().as_str());

    runtime.shutdown();
    assert_eq!(runtime.connection().state(), ConnectionState::Disconnected);
}
