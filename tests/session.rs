//! Chat session behaviour end to end: conversation, state, store and notifications.

mod common;

use agent_webhook::notify::InMemoryNotificationSink;
use agent_webhook::{
    ChatSession, ConfigStore, DispatchState, Error, ErrorKind, FileConfigStore,
    MemoryConfigStore, MessageRole, NotificationLevel,
};
use common::{
    default_client, ok_response, refused_endpoint, scripted_endpoint, silent_endpoint, MockAgent,
};
use std::sync::Arc;
use std::time::Duration;

fn session_for(url: Option<&str>) -> (ChatSession, Arc<MemoryConfigStore>, Arc<InMemoryNotificationSink>) {
    let store = Arc::new(match url {
        Some(u) => MemoryConfigStore::with_url(u).unwrap(),
        None => MemoryConfigStore::new(),
    });
    let sink = Arc::new(InMemoryNotificationSink::default());
    let session = ChatSession::new(default_client(), store.clone()).with_notifier(sink.clone());
    (session, store, sink)
}

#[tokio::test]
async fn successful_send_records_both_sides() {
    let mut agent = MockAgent::new().await;
    let _mock = agent.reply_to("Hello, how are you?", 200, r#"[{"output":"Fine, thanks."}]"#).await;
    let (mut session, _, sink) = session_for(Some(agent.url().as_str()));

    let reply = session.send_message("Hello, how are you?").await.unwrap();

    assert!(reply.outcome.is_success());
    assert_eq!(reply.message.content, "Fine, thanks.");
    assert_eq!(session.state(), DispatchState::Succeeded);
    let roles: Vec<_> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, [MessageRole::User, MessageRole::Assistant]);
    assert_eq!(session.messages()[0].content, "Hello, how are you?");
    assert_eq!(sink.count(NotificationLevel::Error), 0);
}

#[tokio::test]
async fn failed_send_appends_explanation_and_notifies() {
    let mut agent = MockAgent::new().await;
    let _mock = agent.reply(502, "").await;
    let (mut session, _, sink) = session_for(Some(agent.url().as_str()));

    let reply = session.send_message("ping").await.unwrap();

    assert_eq!(reply.outcome.kind(), Some(ErrorKind::RemoteError(502)));
    assert_eq!(session.state(), DispatchState::Failed);
    assert!(!session.is_busy());
    assert_eq!(session.messages().len(), 2);
    let last = &session.messages()[1];
    assert_eq!(last.role, MessageRole::Assistant);
    assert!(last.content.contains("HTTP 502"));
    assert_eq!(sink.count(NotificationLevel::Error), 1);
}

#[tokio::test]
async fn unreachable_endpoint_still_ends_with_an_assistant_message() {
    let (mut session, _, _) = session_for(Some(refused_endpoint().as_str()));

    let reply = session.send_message("ping").await.unwrap();

    assert_eq!(reply.outcome.kind(), Some(ErrorKind::NetworkUnreachable));
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn blank_input_is_rejected_without_recording() {
    let (mut session, _, _) = session_for(Some("http://127.0.0.1:9/hook"));

    let err = session.send_message("   ").await.unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert!(session.messages().is_empty());
    assert_eq!(session.state(), DispatchState::Idle);
}

#[tokio::test]
async fn missing_endpoint_is_a_configuration_error() {
    let (mut session, _, _) = session_for(None);

    let err = session.send_message("hello").await.unwrap_err();

    assert!(matches!(err, Error::Configuration { .. }));
    assert!(session.messages().is_empty());
}

#[tokio::test]
async fn clear_empties_the_conversation() {
    let mut agent = MockAgent::new().await;
    let _mock = agent.reply(200, "ok").await;
    let (mut session, _, sink) = session_for(Some(agent.url().as_str()));
    session.send_message("one").await.unwrap();

    session.clear().await;

    assert!(session.messages().is_empty());
    assert_eq!(session.state(), DispatchState::Idle);
    assert_eq!(sink.count(NotificationLevel::Success), 1);
}

#[tokio::test]
async fn save_endpoint_persists_even_when_probe_fails() {
    let (session, store, sink) = session_for(None);
    let url = refused_endpoint();

    let probe = session.save_endpoint(&url).await.unwrap();
    probe.await.unwrap();

    assert_eq!(store.get().as_deref(), Some(url.as_str()));
    assert_eq!(session.endpoint().as_deref(), Some(url.as_str()));
    assert_eq!(sink.count(NotificationLevel::Success), 1);
    assert_eq!(sink.count(NotificationLevel::Error), 0);
}

#[tokio::test]
async fn save_endpoint_reports_a_passing_probe() {
    let mut agent = MockAgent::new().await;
    let _mock = agent.reply(200, r#"{"output":"pong"}"#).await;
    let (session, _, sink) = session_for(None);

    let probe = session.save_endpoint(&agent.url()).await.unwrap();
    probe.await.unwrap();

    assert_eq!(sink.count(NotificationLevel::Success), 2);
}

#[tokio::test]
async fn save_endpoint_rejects_invalid_urls() {
    let (session, store, sink) = session_for(None);

    let err = session.save_endpoint("not a url").await.unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert!(store.get().is_none());
    assert!(sink.is_empty());
}

#[tokio::test]
async fn saved_endpoint_survives_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let store = Arc::new(FileConfigStore::open(&path).unwrap());
    let session = ChatSession::new(default_client(), store);

    let url = refused_endpoint();
    session.save_endpoint(&url).await.unwrap().await.unwrap();

    let reopened = FileConfigStore::open(&path).unwrap();
    assert_eq!(reopened.settings().endpoint_url.as_deref(), Some(url.as_str()));
}

#[tokio::test]
async fn test_endpoint_notifies_failures() {
    let (session, _, sink) = session_for(None);

    let report = session.test_endpoint(Some(refused_endpoint().as_str())).await.unwrap();

    assert!(!report.ok);
    assert_eq!(sink.count(NotificationLevel::Error), 1);
}

#[tokio::test]
async fn busy_state_is_visible_while_a_send_is_in_flight() {
    let (url, server) = scripted_endpoint(
        Duration::from_millis(300),
        ok_response(r#"{"output":"late but fine"}"#),
    )
    .await;
    let (mut session, _, _) = session_for(Some(url.as_str()));
    let mut state = session.watch_state();

    let send = tokio::spawn(async move {
        let reply = session.send_message("hello").await.unwrap();
        (session, reply)
    });

    state
        .wait_for(|s| *s == DispatchState::Dispatching)
        .await
        .unwrap();
    let (session, reply) = send.await.unwrap();

    assert_eq!(reply.message.content, "late but fine");
    assert!(!session.is_busy());
    assert_eq!(*state.borrow(), DispatchState::Succeeded);
    server.abort();
}

#[tokio::test]
async fn dropped_send_records_nothing_and_resets_state() {
    let (url, server) = silent_endpoint().await;
    let (mut session, _, _) = session_for(Some(url.as_str()));

    let res = tokio::time::timeout(Duration::from_millis(200), session.send_message("hello")).await;

    assert!(res.is_err(), "send should still be waiting");
    assert!(session.messages().is_empty());
    assert_eq!(session.state(), DispatchState::Idle);
    server.abort();
}

#[tokio::test]
async fn endpoint_change_during_a_send_applies_to_the_next_one() {
    let (first, server) = scripted_endpoint(
        Duration::from_millis(300),
        ok_response(r#"{"output":"from the first endpoint"}"#),
    )
    .await;
    let (mut session, store, _) = session_for(Some(first.as_str()));
    let mut state = session.watch_state();

    let send = tokio::spawn(async move {
        let reply = session.send_message("one").await.unwrap();
        (session, reply)
    });
    state
        .wait_for(|s| *s == DispatchState::Dispatching)
        .await
        .unwrap();

    let second = refused_endpoint();
    store.set(&second).unwrap();

    let (mut session, reply) = send.await.unwrap();
    assert_eq!(reply.message.content, "from the first endpoint");

    let next = session.send_message("two").await.unwrap();
    assert_eq!(next.outcome.kind(), Some(ErrorKind::NetworkUnreachable));
    assert_eq!(session.endpoint().as_deref(), Some(second.as_str()));
    server.abort();
}
