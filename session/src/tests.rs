use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use ringside_protocol::PlayerSpec;

use crate::engine::{EngineConfig, EngineLink};
use crate::registry::SessionRegistry;
use crate::service::{BattleService, ErrorKind};
use crate::session::{SessionId, SessionState};
use crate::SessionError;

fn test_config() -> EngineConfig {
    EngineConfig {
        settle: Duration::from_millis(200),
        idle: Duration::from_millis(20),
        ..EngineConfig::default()
    }
}

fn chunk(lines: &[&str]) -> String {
    lines.join("\n")
}

/// Scripted stand-in for the simulator: the i-th write receives the i-th
/// burst of chunks in reply.
fn scripted(bursts: Vec<Vec<String>>) -> EngineLink {
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let mut bursts = bursts.into_iter();
        while out_rx.recv().await.is_some() {
            if let Some(chunks) = bursts.next() {
                for chunk in chunks {
                    if in_tx.send(chunk).is_err() {
                        return;
                    }
                }
            }
        }
    });

    EngineLink::from_channels(out_tx, in_rx)
}

fn init_burst() -> Vec<String> {
    vec![
        chunk(&[
            "update",
            "|player|p1|Alice|1",
            "|player|p2|Cpu|2",
            "|gen|9",
            "|start",
            "|switch|p1a: Pikachu|Pikachu, L50|100/100",
            "|switch|p2a: Eevee|Eevee, L50|100/100",
            "|turn|1",
        ]),
        chunk(&[
            "sideupdate",
            "p1",
            r#"|request|{"rqid":1,"active":[{"moves":[{"move":"Thunderbolt","id":"thunderbolt","pp":24,"maxpp":24}]}],"side":{"name":"Alice","id":"p1"}}"#,
        ]),
    ]
}

/// Bursts for a session that only gets initialized: the two player writes
/// get silence, the drain after the third write gets the opening burst.
fn init_bursts(extra: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut bursts = vec![Vec::new(), Vec::new(), init_burst()];
    bursts.extend(extra);
    bursts
}

fn sides() -> (PlayerSpec, PlayerSpec) {
    (
        PlayerSpec::new("Alice", "Pikachu||||thunderbolt|||||"),
        PlayerSpec::new("Cpu", "Eevee||||tackle|||||"),
    )
}

#[tokio::test]
async fn test_initialize_round_trip() {
    let registry = SessionRegistry::new(test_config());
    let id = registry
        .create_with_engine("gen9ou", scripted(init_bursts(Vec::new())))
        .await;

    let (side_a, side_b) = sides();
    let outcome = registry.initialize(&id, side_a, side_b).await.unwrap();

    assert_eq!(outcome.state, SessionState::Active);
    assert!(!outcome.events.is_empty());
    assert!(outcome.events.contains(&"The battle began!".to_string()));
    assert!(outcome.events.contains(&"Turn 1".to_string()));
    assert!(!outcome.player_force_switch);
}

#[tokio::test]
async fn test_initialize_twice_is_invalid_state() {
    let registry = SessionRegistry::new(test_config());
    let id = registry
        .create_with_engine("gen9ou", scripted(init_bursts(Vec::new())))
        .await;

    let (side_a, side_b) = sides();
    registry
        .initialize(&id, side_a.clone(), side_b.clone())
        .await
        .unwrap();

    let err = registry.initialize(&id, side_a, side_b).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidState { .. }));
}

#[tokio::test]
async fn test_dispatch_relays_and_translates() {
    let turn_burst = vec![
        chunk(&[
            "update",
            "|move|p1a: Pikachu|Thunderbolt|p2a: Eevee",
            "|-supereffective|p2a: Eevee",
            "|-damage|p2a: Eevee|30/100",
            "|turn|2",
        ]),
        chunk(&[
            "sideupdate",
            "p1",
            r#"|request|{"rqid":2,"active":[{"moves":[]}],"side":{"name":"Alice","id":"p1"}}"#,
        ]),
    ];
    let registry = SessionRegistry::new(test_config());
    let id = registry
        .create_with_engine("gen9ou", scripted(init_bursts(vec![turn_burst])))
        .await;

    let (side_a, side_b) = sides();
    registry.initialize(&id, side_a, side_b).await.unwrap();

    let outcome = registry.dispatch(&id, "p1 move 1").await.unwrap();
    assert_eq!(
        outcome.events,
        vec![
            "Pikachu used Thunderbolt!",
            "Eevee took damage (30/100)!",
            "It's super effective!",
            "Turn 2",
        ]
    );
    assert_eq!(outcome.state, SessionState::Active);
}

#[tokio::test]
async fn test_dispatch_on_setup_session_is_invalid_state() {
    let registry = SessionRegistry::new(test_config());
    let id = registry
        .create_with_engine("gen9ou", scripted(Vec::new()))
        .await;

    let err = registry.dispatch(&id, "p1 move 1").await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidState { .. }));
}

#[tokio::test]
async fn test_dispatch_on_completed_session_leaves_log_untouched() {
    let won = vec![
        Vec::new(),
        Vec::new(),
        vec![chunk(&["update", "|start", "|win|Cpu"])],
    ];
    let registry = SessionRegistry::new(test_config());
    let id = registry.create_with_engine("gen9ou", scripted(won)).await;

    let (side_a, side_b) = sides();
    let outcome = registry.initialize(&id, side_a, side_b).await.unwrap();
    assert_eq!(outcome.state, SessionState::Completed);

    let before = registry.status(&id).await.unwrap().events;
    let err = registry.dispatch(&id, "p1 move 1").await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidState { .. }));
    let after = registry.status(&id).await.unwrap().events;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_dispatch_timeout_yields_empty_events() {
    // No burst scripted for the dispatch write: the engine stays silent.
    let registry = SessionRegistry::new(test_config());
    let id = registry
        .create_with_engine("gen9ou", scripted(init_bursts(Vec::new())))
        .await;

    let (side_a, side_b) = sides();
    registry.initialize(&id, side_a, side_b).await.unwrap();
    let before = registry.status(&id).await.unwrap();

    let outcome = registry.dispatch(&id, "p1 move 1").await.unwrap();
    assert!(outcome.events.is_empty());
    assert_eq!(outcome.state, SessionState::Active);
    assert_eq!(
        outcome.player_force_switch,
        before.player_force_switch
    );
    assert_eq!(outcome.team_preview_pending, before.team_preview_pending);
}

#[tokio::test]
async fn test_force_switch_flags_are_both_set() {
    let double_faint = vec![
        chunk(&[
            "update",
            "|faint|p1a: Pikachu",
            "|faint|p2a: Eevee",
        ]),
        chunk(&[
            "sideupdate",
            "p1",
            r#"|request|{"forceSwitch":[true],"side":{"name":"Alice","id":"p1"}}"#,
        ]),
        chunk(&[
            "sideupdate",
            "p2",
            r#"|request|{"forceSwitch":[true],"side":{"name":"Cpu","id":"p2"}}"#,
        ]),
    ];
    let registry = SessionRegistry::new(test_config());
    let id = registry
        .create_with_engine("gen9ou", scripted(init_bursts(vec![double_faint])))
        .await;

    let (side_a, side_b) = sides();
    registry.initialize(&id, side_a, side_b).await.unwrap();

    let outcome = registry.dispatch(&id, "p1 move 1").await.unwrap();
    assert!(outcome.player_force_switch);
    assert!(outcome.cpu_force_switch);
}

#[tokio::test]
async fn test_duplicate_events_deduped_except_boundaries() {
    let noisy = vec![chunk(&[
        "update",
        "|faint|p2a: Eevee",
        "|faint|p2a: Eevee",
        "|turn|3",
        "|turn|3",
    ])];
    let registry = SessionRegistry::new(test_config());
    let id = registry
        .create_with_engine("gen9ou", scripted(init_bursts(vec![noisy])))
        .await;

    let (side_a, side_b) = sides();
    registry.initialize(&id, side_a, side_b).await.unwrap();

    let outcome = registry.dispatch(&id, "p1 move 1").await.unwrap();
    assert_eq!(
        outcome.events,
        vec!["Eevee fainted!", "Turn 3", "Turn 3"]
    );
}

#[tokio::test]
async fn test_end_removes_session() {
    let registry = SessionRegistry::new(test_config());
    let id = registry
        .create_with_engine("gen9ou", scripted(Vec::new()))
        .await;
    let other = registry
        .create_with_engine("gen9ou", scripted(Vec::new()))
        .await;
    assert_eq!(registry.len().await, 2);

    registry.end(&id).await.unwrap();
    assert!(!registry.contains(&id).await);
    assert!(registry.contains(&other).await);

    let err = registry.status(&id).await.unwrap_err();
    assert!(matches!(err, SessionError::NotFound(_)));
}

#[tokio::test]
async fn test_end_waits_for_outstanding_dispatch() {
    let registry = Arc::new(SessionRegistry::new(test_config()));
    let id = registry
        .create_with_engine("gen9ou", scripted(init_bursts(Vec::new())))
        .await;

    let (side_a, side_b) = sides();
    registry.initialize(&id, side_a, side_b).await.unwrap();

    // No burst scripted for this write: the dispatch sits in its full
    // 200ms settle window holding the session mutex.
    let dispatch = {
        let registry = Arc::clone(&registry);
        let id = id.clone();
        tokio::spawn(async move { registry.dispatch(&id, "p1 move 1").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    registry.end(&id).await.unwrap();
    assert!(
        started.elapsed() >= Duration::from_millis(100),
        "end returned before the outstanding dispatch finished"
    );

    let outcome = dispatch.await.unwrap().unwrap();
    assert!(outcome.events.is_empty());
    assert!(!registry.contains(&id).await);
}

#[tokio::test]
async fn test_engine_write_failure_surfaces() {
    let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
    drop(out_rx);
    let (_in_tx, in_rx) = mpsc::unbounded_channel::<String>();

    let registry = SessionRegistry::new(test_config());
    let id = registry
        .create_with_engine("gen9ou", EngineLink::from_channels(out_tx, in_rx))
        .await;

    let (side_a, side_b) = sides();
    let err = registry.initialize(&id, side_a, side_b).await.unwrap_err();
    assert!(matches!(err, SessionError::EngineWrite(_)));
}

#[tokio::test]
async fn test_service_error_reply_shape() {
    let service = BattleService::new(test_config());
    let missing = SessionId::new("no-such-session");

    let err = service.status(&missing).await.unwrap_err();
    assert_eq!(err.reply().error, ErrorKind::SessionNotFound);

    let json = serde_json::to_string(&err.reply()).unwrap();
    assert_eq!(json, r#"{"error":"sessionNotFound"}"#);
}

#[tokio::test]
async fn test_session_reply_serializes_camel_case() {
    let registry = SessionRegistry::new(test_config());
    let id = registry
        .create_with_engine("gen9ou", scripted(init_bursts(Vec::new())))
        .await;

    let (side_a, side_b) = sides();
    let outcome = registry.initialize(&id, side_a, side_b).await.unwrap();
    let reply: crate::service::SessionReply = outcome.into();

    let value = serde_json::to_value(&reply).unwrap();
    assert_eq!(value["state"], "active");
    assert!(value.get("playerForceSwitch").is_some());
    assert!(value.get("cpuForceSwitch").is_some());
    assert!(value.get("teamPreviewPending").is_some());
}
