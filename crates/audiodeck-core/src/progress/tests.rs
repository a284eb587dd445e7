use std::path::PathBuf;
use std::time::Duration;

use futures::StreamExt;

use super::*;
use crate::job::{Job, JobHandle, JobId, JobRegistry, JobStatus};
use crate::job::sampler::Sample;
use crate::origin::OriginKey;

const TICK: Duration = Duration::from_millis(5);

fn register(registry: &JobRegistry) -> JobHandle {
    registry.register(Job::new(
        JobId::new(),
        "https://vimeo.com/1",
        OriginKey::from_host("vimeo.com"),
        30,
        PathBuf::from("/clips/x.mp3"),
    ))
}

async fn collect(sub: Subscription) -> Vec<ProgressMessage> {
    tokio::time::timeout(Duration::from_secs(5), sub.into_stream().collect::<Vec<_>>())
        .await
        .expect("subscription should end")
}

#[test]
fn progress_payload_is_camel_case() {
    let registry = JobRegistry::new();
    let handle = register(&registry);
    let msg = ProgressMessage::from_job(&handle.snapshot().unwrap());
    let json: serde_json::Value = serde_json::from_str(&msg.to_json()).unwrap();
    assert_eq!(json["type"], "progress");
    assert_eq!(json["status"], "queued");
    assert_eq!(json["downloadedBytes"], 0);
    assert_eq!(json["totalBytes"], 0);
    assert_eq!(json["videoDuration"], 30);
    assert!(json["error"].is_null());
    assert_eq!(msg.event_name(), "progress");
}

#[test]
fn connected_ack_shape() {
    let json: serde_json::Value =
        serde_json::from_str(&ProgressMessage::connected("abc").to_json()).unwrap();
    assert_eq!(json, serde_json::json!({"type": "connected", "downloadId": "abc"}));
}

#[tokio::test]
async fn unknown_id_gets_ack_then_ends() {
    let hub = ProgressHub::new(JobRegistry::new(), TICK);
    let id = JobId::new();
    let got = collect(hub.subscribe(&id)).await;
    assert_eq!(got, vec![ProgressMessage::connected(id.to_string())]);
}

#[tokio::test]
async fn ack_only_subscription() {
    let got = collect(Subscription::ack_only("garbage")).await;
    assert_eq!(got, vec![ProgressMessage::connected("garbage")]);
}

#[tokio::test]
async fn two_subscribers_see_the_same_sequence() {
    let registry = JobRegistry::new();
    let hub = ProgressHub::new(registry.clone(), TICK);
    let handle = register(&registry);
    hub.open(handle.id());

    let a = tokio::spawn(collect(hub.subscribe(&handle.id())));
    let b = tokio::spawn(collect(hub.subscribe(&handle.id())));

    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.mark_downloading(1_000_000);
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.record_progress(Sample {
        progress: 40,
        downloaded_bytes: 400_000,
        total_bytes: 1_000_000,
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.complete(500_000);

    let a = a.await.unwrap();
    let b = b.await.unwrap();
    assert_eq!(a, b);

    let terminal: Vec<_> = a.iter().filter(|m| m.ends_stream()).collect();
    assert_eq!(terminal.len(), 1);
    assert_eq!(a.last().unwrap().status(), Some(JobStatus::Complete));

    let mut last = 0u8;
    for m in &a {
        if let ProgressMessage::Progress { progress, status, .. } = m {
            assert!(*progress >= last);
            assert!(*progress < 100 || *status == JobStatus::Complete);
            last = *progress;
        }
    }
}

#[tokio::test]
async fn late_subscriber_gets_terminal_state_once() {
    let registry = JobRegistry::new();
    let hub = ProgressHub::new(registry.clone(), TICK);
    let handle = register(&registry);
    hub.open(handle.id());
    handle.mark_downloading(0);
    handle.fail("nope");
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert_eq!(hub.open_sources(), 0);
    let got = collect(hub.subscribe(&handle.id())).await;
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].status(), Some(JobStatus::Error));
}

#[tokio::test]
async fn dropped_subscriber_does_not_stop_the_source() {
    let registry = JobRegistry::new();
    let hub = ProgressHub::new(registry.clone(), TICK);
    let handle = register(&registry);
    hub.open(handle.id());

    drop(hub.subscribe(&handle.id()));
    let keep = tokio::spawn(collect(hub.subscribe(&handle.id())));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(hub.open_sources(), 1);

    handle.mark_downloading(10);
    handle.complete(10);
    let got = keep.await.unwrap();
    assert_eq!(got.last().unwrap().status(), Some(JobStatus::Complete));
}

#[tokio::test]
async fn evicted_job_closes_the_source() {
    let registry = JobRegistry::new();
    let hub = ProgressHub::new(registry.clone(), TICK);
    let handle = register(&registry);
    let id = handle.id();
    hub.open(id);
    let sub = tokio::spawn(collect(hub.subscribe(&id)));

    tokio::time::sleep(Duration::from_millis(20)).await;
    handle.evict();
    let got = sub.await.unwrap();
    assert!(got.iter().all(|m| m.status() == Some(JobStatus::Queued)));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(hub.open_sources(), 0);
}

#[tokio::test]
async fn close_publishes_final_state_exactly_once() {
    let registry = JobRegistry::new();
    // Long interval: only `close` can deliver the terminal payload in time.
    let hub = ProgressHub::new(registry.clone(), Duration::from_secs(3600));
    let handle = register(&registry);
    hub.open(handle.id());
    let sub = tokio::spawn(collect(hub.subscribe(&handle.id())));
    tokio::task::yield_now().await;

    handle.mark_downloading(10);
    handle.complete(10);
    hub.close(&handle.id());
    hub.close(&handle.id());

    let got = sub.await.unwrap();
    assert_eq!(got.iter().filter(|m| m.ends_stream()).count(), 1);
    assert_eq!(got.last().unwrap().status(), Some(JobStatus::Complete));
    assert_eq!(hub.open_sources(), 0);
}
