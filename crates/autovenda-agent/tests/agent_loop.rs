// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent loop tests: replies, unlock notices and per-user ordering.

use std::sync::Arc;
use std::time::Duration;

use autovenda_agent::orchestrator::UNLOCK_NOTICE;
use autovenda_agent::AgentLoop;
use autovenda_core::types::Role;
use autovenda_test_utils::{inbound, TestHarness};
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn replies_are_sent_back_to_the_sender() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec!["Olá!".into()])
        .build()
        .await
        .unwrap();
    let channel = harness.mock_channel.clone();
    let mut agent = AgentLoop::new(channel.clone(), harness.orchestrator.clone())
        .with_notices(harness.notices.take().unwrap());

    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { agent.run(cancel).await }
    });

    channel.inject_message(inbound("u1", "oi")).await;
    let sent = tokio::time::timeout(WAIT, channel.wait_for_sent(1))
        .await
        .expect("no reply sent");
    assert_eq!(sent[0].recipient_id, "u1");
    assert_eq!(sent[0].content, "Olá!");

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn blank_messages_get_no_reply() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Olá!".into()])
        .build()
        .await
        .unwrap();
    let channel = harness.mock_channel.clone();
    let mut agent = AgentLoop::new(channel.clone(), harness.orchestrator.clone());

    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { agent.run(cancel).await }
    });

    channel.inject_message(inbound("u1", "  ")).await;
    channel.inject_message(inbound("u1", "oi")).await;
    let sent = tokio::time::timeout(WAIT, channel.wait_for_sent(1))
        .await
        .expect("no reply sent");
    assert_eq!(sent[0].content, "Olá!");
    assert_eq!(channel.sent_count().await, 1);

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn activation_delivers_unlock_notice_once() {
    let mut harness = TestHarness::builder().build().await.unwrap();
    let channel = harness.mock_channel.clone();
    let mut agent = AgentLoop::new(channel.clone(), harness.orchestrator.clone())
        .with_notices(harness.notices.take().unwrap());

    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { agent.run(cancel).await }
    });

    harness
        .broker
        .create_session("u1", "flash", None)
        .await
        .unwrap();
    harness.complete_payment("u1").await.unwrap();
    harness.complete_payment("u1").await.unwrap();

    let sent = tokio::time::timeout(WAIT, channel.wait_for_sent(1))
        .await
        .expect("no unlock notice sent");
    assert_eq!(sent[0].content, UNLOCK_NOTICE);

    // A duplicate event must not produce a second notice.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(channel.sent_count().await, 1);

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn turns_for_one_user_are_recorded_in_arrival_order() {
    let harness = TestHarness::builder().build().await.unwrap();
    let channel = harness.mock_channel.clone();
    let mut agent = AgentLoop::new(channel.clone(), harness.orchestrator.clone());

    for i in 0..5 {
        channel.inject_message(inbound("u1", &format!("mensagem {i}"))).await;
    }

    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { agent.run(cancel).await }
    });

    tokio::time::timeout(WAIT, channel.wait_for_sent(5))
        .await
        .expect("not every turn replied");
    cancel.cancel();
    handle.await.unwrap().unwrap();

    let users: Vec<String> = harness
        .history("u1")
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.role == Role::User)
        .map(|e| e.content)
        .collect();
    let expected: Vec<String> = (0..5).map(|i| format!("mensagem {i}")).collect();
    assert_eq!(users, expected);
}

#[tokio::test]
async fn cancellation_stops_an_idle_loop() {
    let harness = Arc::new(TestHarness::builder().build().await.unwrap());
    let mut agent = AgentLoop::new(harness.mock_channel.clone(), harness.orchestrator.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();
    tokio::time::timeout(WAIT, agent.run(cancel))
        .await
        .expect("loop did not stop")
        .unwrap();
}
