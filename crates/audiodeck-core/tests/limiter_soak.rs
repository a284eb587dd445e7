//! Integration test: per-origin concurrency under a burst of jobs.

mod common;

use std::sync::Arc;
use std::time::Duration;

use audiodeck_core::origin::OriginKey;
use audiodeck_core::pipeline::SubmitRequest;
use tempfile::tempdir;

use common::fake_tools::FakeExtractor;
use common::{follow, last_progress, pipeline, test_config};

#[tokio::test]
async fn five_jobs_one_slot_run_one_at_a_time_in_order() {
    let dir = tempdir().unwrap();
    let cfg = test_config(dir.path());
    assert_eq!(cfg.max_concurrent_per_origin, 1);
    let fake = Arc::new(FakeExtractor::new("Song", "0:30").with_delay(Duration::from_millis(45)));
    let p = pipeline(&cfg, &fake);

    let urls: Vec<String> = (0..5).map(|i| format!("https://youtu.be/clip{i}")).collect();
    let mut ids = Vec::new();
    for (i, url) in urls.iter().enumerate() {
        let sub = p
            .submit(SubmitRequest {
                url: url.clone(),
                name: format!("clip {i}"),
            })
            .await
            .unwrap();
        ids.push(sub.job_id);
    }

    for id in &ids {
        let messages = follow(&p, id).await;
        let (progress, _, _, status, _) = last_progress(&messages);
        assert_eq!(status, "complete");
        assert_eq!(progress, 100);
    }

    assert_eq!(fake.max_active(), 1, "origin limit exceeded");
    assert_eq!(fake.fetch_order(), urls);
    let key = OriginKey::from_host("youtu.be");
    assert_eq!(p.limiter().active(&key), 0);
    assert_eq!(p.limiter().pending(&key), 0);
}

#[tokio::test]
async fn different_origins_overlap() {
    let dir = tempdir().unwrap();
    let cfg = test_config(dir.path());
    let fake = Arc::new(FakeExtractor::new("Song", "0:30").with_delay(Duration::from_millis(150)));
    let p = pipeline(&cfg, &fake);

    let a = p
        .submit(SubmitRequest {
            url: "https://www.youtube.com/watch?v=a".into(),
            name: "a".into(),
        })
        .await
        .unwrap();
    let b = p
        .submit(SubmitRequest {
            url: "https://vimeo.com/b".into(),
            name: "b".into(),
        })
        .await
        .unwrap();

    let (ma, mb) = tokio::join!(follow(&p, &a.job_id), follow(&p, &b.job_id));
    assert_eq!(last_progress(&ma).3, "complete");
    assert_eq!(last_progress(&mb).3, "complete");
    assert_eq!(fake.max_active(), 2);
}

#[tokio::test]
async fn failing_jobs_release_their_slot() {
    use common::fake_tools::FetchBehavior;

    let dir = tempdir().unwrap();
    let cfg = test_config(dir.path());
    let fake = Arc::new(
        FakeExtractor::new("Song", "0:30")
            .with_behavior(FetchBehavior::Fail("ERROR: boom".into()))
            .with_delay(Duration::from_millis(20)),
    );
    let p = pipeline(&cfg, &fake);

    let mut ids = Vec::new();
    for i in 0..3 {
        let sub = p
            .submit(SubmitRequest {
                url: format!("https://youtu.be/fail{i}"),
                name: "f".into(),
            })
            .await
            .unwrap();
        ids.push(sub.job_id);
    }
    for id in &ids {
        let messages = follow(&p, id).await;
        assert_eq!(last_progress(&messages).3, "error");
    }
    assert_eq!(p.limiter().active(&OriginKey::from_host("youtu.be")), 0);
}
