mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use common::{MockAction, WAIT, settle, wait_for, wait_killed};
use peerpool::{
    AgentConfig, AgentFactory, EventKind, Medium, PeerActionPool, PoolConfig, PoolError,
};

fn wifi_pool() -> Arc<PeerActionPool> {
    PeerActionPool::builder(PoolConfig::for_medium(Medium::Wifi)).build()
}

#[tokio::test]
async fn enqueue_on_never_started_pool_fails_without_touching_action() {
    let pool = wifi_pool();
    let a = MockAction::replication("a", "p1").arc();

    assert_eq!(pool.enqueue(a.clone()), Err(PoolError::AlreadyStopped));

    settle().await;
    assert_eq!(a.starts(), 0);
    assert_eq!(a.kills(), 0);
    assert_eq!(pool.replication_count("p1"), 0);
}

#[tokio::test]
async fn start_is_not_idempotent_and_stop_is() {
    let pool = wifi_pool();

    pool.start().unwrap();
    assert_eq!(pool.start(), Err(PoolError::AlreadyRunning));
    assert!(pool.is_running());

    pool.stop();
    pool.stop();
    assert!(!pool.is_running());

    pool.start().unwrap();
    assert!(pool.is_running());
}

#[tokio::test]
async fn enqueue_after_stop_fails() {
    let pool = wifi_pool();
    pool.start().unwrap();
    pool.stop();

    let a = MockAction::notification("n", "p1").arc();
    assert_eq!(pool.enqueue(a.clone()), Err(PoolError::AlreadyStopped));
    settle().await;
    assert_eq!(a.starts(), 0);
}

#[tokio::test]
async fn third_replication_for_same_peer_is_killed_without_start() {
    let pool = wifi_pool();
    let mut rx = pool.subscribe();
    pool.start().unwrap();

    let a1 = MockAction::replication("a1", "p1").held().arc();
    let a2 = MockAction::replication("a2", "p1").held().arc();
    let a3 = MockAction::replication("a3", "p1").arc();

    pool.enqueue(a1.clone()).unwrap();
    assert_eq!(pool.replication_count("p1"), 1);
    pool.enqueue(a2.clone()).unwrap();
    assert_eq!(pool.replication_count("p1"), 2);
    pool.enqueue(a3.clone()).unwrap();

    // Rejection is synchronous with enqueue.
    assert_eq!(a3.kills(), 1);
    assert_eq!(pool.replication_count("p1"), 2);

    let ev = wait_for(&mut rx, EventKind::ActionRejected, Some("a3")).await;
    assert_eq!(ev.reason.as_deref(), Some("replication_cap_reached"));
    assert_eq!(ev.count, Some(2));

    settle().await;
    assert_eq!(a3.starts(), 0);
    assert_eq!(a3.kills(), 1);
    assert_eq!(a1.starts(), 1);
    assert_eq!(a2.starts(), 1);

    a1.release();
    a2.release();
    wait_killed(&a1).await;
    wait_killed(&a2).await;
}

#[tokio::test]
async fn slot_frees_when_replication_settles() {
    let pool = wifi_pool();
    let mut rx = pool.subscribe();
    pool.start().unwrap();

    let a1 = MockAction::replication("a1", "p1").held().arc();
    let a2 = MockAction::replication("a2", "p1").held().arc();
    let a3 = MockAction::replication("a3", "p1").arc();
    let a4 = MockAction::replication("a4", "p1").held().arc();

    pool.enqueue(a1.clone()).unwrap();
    pool.enqueue(a2.clone()).unwrap();
    pool.enqueue(a3.clone()).unwrap();
    assert_eq!(pool.replication_count("p1"), 2);
    assert_eq!(a3.kills(), 1);

    a1.release();
    wait_for(&mut rx, EventKind::ActionKilled, Some("a1")).await;
    assert_eq!(a1.kills(), 1);
    assert_eq!(pool.replication_count("p1"), 1);

    pool.enqueue(a4.clone()).unwrap();
    assert_eq!(pool.replication_count("p1"), 2);
    let admitted = wait_for(&mut rx, EventKind::ActionAdmitted, Some("a4")).await;
    assert_eq!(admitted.count, Some(2));

    a2.release();
    a4.release();
    wait_for(&mut rx, EventKind::ActionKilled, Some("a2")).await;
    wait_killed(&a4).await;
    settle().await;

    assert_eq!(pool.replication_count("p1"), 0);
    assert_eq!(a4.starts(), 1);
    assert_eq!(a4.kills(), 1);
}

#[tokio::test]
async fn peers_are_counted_independently() {
    let pool = wifi_pool();
    pool.start().unwrap();

    let actions: Vec<_> = ["a1", "a2"]
        .iter()
        .map(|id| MockAction::replication(id, "p1").held().arc())
        .collect();
    for a in &actions {
        pool.enqueue(a.clone()).unwrap();
    }
    let other = MockAction::replication("b1", "p2").held().arc();
    pool.enqueue(other.clone()).unwrap();

    assert_eq!(pool.replication_count("p1"), 2);
    assert_eq!(pool.replication_count("p2"), 1);
    assert_eq!(other.kills(), 0);

    for a in &actions {
        a.release();
    }
    other.release();
    for a in &actions {
        wait_killed(a).await;
    }
    wait_killed(&other).await;
}

#[tokio::test]
async fn non_replication_actions_are_not_capped() {
    let pool = wifi_pool();
    pool.start().unwrap();

    let actions: Vec<_> = (0..5)
        .map(|i| MockAction::notification(&format!("n{i}"), "p1").held().arc())
        .collect();
    for a in &actions {
        pool.enqueue(a.clone()).unwrap();
    }
    settle().await;

    for a in &actions {
        assert_eq!(a.starts(), 1);
        assert_eq!(a.kills(), 0);
    }
    assert_eq!(pool.replication_count("p1"), 0);

    for a in &actions {
        a.release();
    }
    for a in &actions {
        wait_killed(a).await;
    }
}

#[tokio::test]
async fn kill_runs_exactly_once_for_every_settlement() {
    let pool = wifi_pool();
    let mut rx = pool.subscribe();
    pool.start().unwrap();

    let ok = MockAction::replication("ok", "p1").arc();
    let failed = MockAction::replication("failed", "p2").failing("connection reset").arc();
    let panicked = MockAction::notification("panicked", "p3").panicking().arc();

    pool.enqueue(ok.clone()).unwrap();
    pool.enqueue(failed.clone()).unwrap();
    pool.enqueue(panicked.clone()).unwrap();

    let mut reasons = std::collections::HashMap::new();
    while reasons.len() < 2 {
        let ev = wait_for(&mut rx, EventKind::ActionFailed, None).await;
        reasons.insert(
            ev.action.as_deref().unwrap_or_default().to_owned(),
            ev.reason.as_deref().unwrap_or_default().to_owned(),
        );
    }
    assert!(reasons["failed"].contains("connection reset"));
    assert!(reasons["panicked"].contains("exploded"));

    wait_killed(&ok).await;
    wait_killed(&failed).await;
    wait_killed(&panicked).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    for a in [&ok, &failed, &panicked] {
        assert_eq!(a.starts(), 1);
        assert_eq!(a.kills(), 1);
    }
    assert_eq!(pool.replication_count("p1"), 0);
    assert_eq!(pool.replication_count("p2"), 0);
}

#[tokio::test]
async fn stop_resets_counts_and_stale_settlements_do_not_leak() {
    let pool = wifi_pool();
    pool.start().unwrap();

    let a1 = MockAction::replication("a1", "p1").held().arc();
    let a2 = MockAction::replication("a2", "p1").held().arc();
    pool.enqueue(a1.clone()).unwrap();
    pool.enqueue(a2.clone()).unwrap();
    settle().await;
    assert_eq!(pool.replication_count("p1"), 2);

    pool.stop();
    assert_eq!(pool.replication_count("p1"), 0);

    pool.start().unwrap();
    let b1 = MockAction::replication("b1", "p1").held().arc();
    pool.enqueue(b1.clone()).unwrap();
    assert_eq!(pool.replication_count("p1"), 1);

    // In-flight actions from before the stop still get killed, but their
    // settlement must not touch the fresh count.
    a1.release();
    a2.release();
    wait_killed(&a1).await;
    wait_killed(&a2).await;
    settle().await;
    assert_eq!(a1.kills(), 1);
    assert_eq!(a2.kills(), 1);
    assert_eq!(pool.replication_count("p1"), 1);

    b1.release();
    wait_killed(&b1).await;
    settle().await;
    assert_eq!(pool.replication_count("p1"), 0);
}

#[tokio::test]
async fn action_receives_agent_built_from_its_psk() {
    let pool = wifi_pool();
    pool.start().unwrap();

    let a = MockAction::notification("n1", "peer-42").arc();
    pool.enqueue(a.clone()).unwrap();
    wait_killed(&a).await;

    assert_eq!(a.agent_identity().as_deref(), Some("peer-42"));
}

#[tokio::test]
async fn local_wireless_uses_the_parallel_policy() {
    let pool = PeerActionPool::builder(PoolConfig::for_medium(Medium::LocalWireless)).build();
    pool.start().unwrap();

    let a1 = MockAction::replication("a1", "p1").held().arc();
    let a2 = MockAction::replication("a2", "p1").held().arc();
    pool.enqueue(a1.clone()).unwrap();
    pool.enqueue(a2.clone()).unwrap();
    settle().await;

    // Both run at the same time.
    assert_eq!(a1.starts(), 1);
    assert_eq!(a2.starts(), 1);
    assert_eq!(pool.replication_count("p1"), 2);

    a1.release();
    a2.release();
    wait_killed(&a1).await;
    wait_killed(&a2).await;
}

#[tokio::test]
async fn lifecycle_events_are_published_in_order() {
    let pool = wifi_pool();
    let mut rx = pool.subscribe();
    pool.start().unwrap();

    let a = MockAction::replication("a1", "p1").arc();
    pool.enqueue(a.clone()).unwrap();
    wait_killed(&a).await;

    let expected = [
        EventKind::PoolStarted,
        EventKind::ActionEnqueued,
        EventKind::ActionAdmitted,
        EventKind::ActionStarting,
        EventKind::ActionSucceeded,
        EventKind::ActionKilled,
    ];
    let mut last_seq = None;
    for kind in expected {
        let action = (kind != EventKind::PoolStarted).then_some("a1");
        let ev = wait_for(&mut rx, kind, action).await;
        if let Some(prev) = last_seq {
            assert!(ev.seq > prev, "{kind:?} out of order");
        }
        last_seq = Some(ev.seq);
    }
}

#[tokio::test]
async fn rejected_action_kill_can_call_back_into_pool() {
    let pool = wifi_pool();
    let mut rx = pool.subscribe();
    pool.start().unwrap();

    let a1 = MockAction::replication("a1", "p1").held().arc();
    let a2 = MockAction::replication("a2", "p1").held().arc();
    pool.enqueue(a1.clone()).unwrap();
    pool.enqueue(a2.clone()).unwrap();

    let saw_running = Arc::new(AtomicBool::new(false));
    let retry = MockAction::notification("retry", "p1").arc();
    let a3 = {
        let weak = Arc::downgrade(&pool);
        let saw_running = Arc::clone(&saw_running);
        let retry = retry.clone();
        MockAction::replication("a3", "p1")
            .on_kill(move || {
                if let Some(pool) = weak.upgrade() {
                    saw_running.store(pool.is_running(), Ordering::SeqCst);
                    let _ = pool.enqueue(retry.clone());
                }
            })
            .arc()
    };

    let enqueuing = Arc::clone(&pool);
    let third = a3.clone();
    let res = tokio::time::timeout(
        WAIT,
        tokio::task::spawn_blocking(move || enqueuing.enqueue(third)),
    )
    .await
    .expect("enqueue of a rejected action must not block")
    .unwrap();

    assert_eq!(res, Ok(()));
    assert_eq!(a3.kills(), 1);
    assert_eq!(a3.starts(), 0);
    assert!(saw_running.load(Ordering::SeqCst));

    wait_killed(&retry).await;
    assert_eq!(retry.starts(), 1);
    let ev = wait_for(&mut rx, EventKind::ActionRejected, Some("a3")).await;
    assert_eq!(ev.reason.as_deref(), Some("replication_cap_reached"));

    a1.release();
    a2.release();
    wait_killed(&a1).await;
    wait_killed(&a2).await;
}

#[tokio::test]
async fn panicking_kill_still_frees_the_replication_slot() {
    let pool = wifi_pool();
    let mut rx = pool.subscribe();
    pool.start().unwrap();

    let bad = MockAction::replication("bad", "p1")
        .on_kill(|| panic!("kill exploded"))
        .arc();
    pool.enqueue(bad.clone()).unwrap();

    let ev = wait_for(&mut rx, EventKind::ActionKilled, Some("bad")).await;
    assert!(ev.reason.as_deref().unwrap_or_default().contains("kill exploded"));
    assert_eq!(bad.kills(), 1);
    assert_eq!(pool.replication_count("p1"), 0);
}

#[tokio::test]
async fn custom_agent_factory_is_used_for_every_action() {
    let agents = AgentFactory::new(&AgentConfig {
        keep_alive: false,
        max_sockets: 4,
        ..AgentConfig::default()
    });
    let pool = PeerActionPool::builder(PoolConfig::for_medium(Medium::Wifi))
        .with_agent_factory(agents)
        .build();
    pool.start().unwrap();

    let a = MockAction::notification("n1", "p1").arc();
    pool.enqueue(a.clone()).unwrap();
    wait_killed(&a).await;

    let options = a.agent_options().expect("agent handed to start");
    assert!(!options.keep_alive);
    assert_eq!(options.keep_alive_interval, None);
    assert_eq!(options.max_sockets, Some(4));
}

#[tokio::test]
async fn pool_reports_its_medium_and_config() {
    let cfg = PoolConfig {
        bus_capacity: 32,
        ..PoolConfig::for_medium(Medium::Bluetooth)
    };
    let pool = PeerActionPool::builder(cfg).build();

    assert_eq!(pool.medium(), Medium::Bluetooth);
    assert_eq!(pool.config().bus_capacity, 32);
    assert!(!pool.is_running());
}
