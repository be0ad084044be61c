//! Squad chat: posting rules and history reads.

use squad_arena_server::{
    accounts::{self, Registration},
    chat::{self, ChatPolicy},
    config::Settings,
    db::{models::Account, MemoryStore, Store},
    registry::{self, SquadPolicy},
    ArenaError,
};
use std::sync::Arc;

const STRICT: ChatPolicy = ChatPolicy { require_approval: true };
const OPEN: ChatPolicy = ChatPolicy { require_approval: false };

async fn player(store: &dyn Store, ff_id: &str, name: &str) -> Account {
    accounts::register(
        store,
        &Settings::default(),
        Registration {
            display_name: name.into(),
            external_id: ff_id.into(),
            contact: String::new(),
            password: "pw".into(),
        },
    )
    .await
    .expect("register")
}

/// A leader with an approved membership in a fresh squad.
async fn approved_leader(store: &dyn Store) -> Account {
    let p = player(store, "FF100", "Leader").await;
    registry::create_squad(store, SquadPolicy { auto_approve: true }, &p, "Alpha")
        .await
        .unwrap();
    store.account(p.id).await.unwrap().unwrap()
}

#[tokio::test]
async fn posting_requires_a_squad() {
    let store = MemoryStore::new();
    let loner = player(&store, "FF1", "Loner").await;

    let res = chat::post_message(&store, OPEN, &loner, "hello?").await;
    assert!(matches!(res, Err(ArenaError::NotInSquad)));
}

#[tokio::test]
async fn strict_policy_rejects_unapproved_members() {
    let store = MemoryStore::new();
    let leader = approved_leader(&store).await;
    let squad_id = leader.squad_id.unwrap();

    let rookie = player(&store, "FF200", "Rookie").await;
    registry::join_squad(&store, &rookie, squad_id).await.unwrap();
    let rookie = store.account(rookie.id).await.unwrap().unwrap();

    let res = chat::post_message(&store, STRICT, &rookie, "hi team").await;
    assert!(matches!(res, Err(ArenaError::NotApproved)));
    assert!(chat::recent_messages(&store, squad_id, 10).await.unwrap().is_empty());

    // the lenient variant only needs membership
    chat::post_message(&store, OPEN, &rookie, "hi team").await.unwrap();
    assert_eq!(chat::recent_messages(&store, squad_id, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn message_carries_sender_name_snapshot() {
    let store = MemoryStore::new();
    let leader = approved_leader(&store).await;

    let msg = chat::post_message(&store, STRICT, &leader, "  gg  ").await.unwrap();
    assert_eq!(msg.sender, "Leader");
    assert_eq!(msg.text, "gg");

    let log = chat::recent_messages(&store, leader.squad_id.unwrap(), 5).await.unwrap();
    assert_eq!(log, vec![msg]);
}

#[tokio::test]
async fn recent_returns_last_n_oldest_first() {
    let store = MemoryStore::new();
    let leader = approved_leader(&store).await;
    let squad_id = leader.squad_id.unwrap();

    for i in 0..20 {
        chat::post_message(&store, STRICT, &leader, &format!("msg {i}"))
            .await
            .unwrap();
    }

    let texts: Vec<String> = chat::recent_messages(&store, squad_id, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.text)
        .collect();
    let expected: Vec<String> = (10..20).map(|i| format!("msg {i}")).collect();
    assert_eq!(texts, expected);

    // asking for more than exists returns the whole log
    assert_eq!(chat::recent_messages(&store, squad_id, 100).await.unwrap().len(), 20);
}

#[tokio::test]
async fn concurrent_posts_all_survive() {
    let store = Arc::new(MemoryStore::new());
    let leader = approved_leader(&*store).await;
    let squad_id = leader.squad_id.unwrap();

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let store = store.clone();
            let leader = leader.clone();
            tokio::spawn(async move {
                chat::post_message(&*store, STRICT, &leader, &format!("line {i}")).await
            })
        })
        .collect();
    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(chat::recent_messages(&*store, squad_id, 1_000).await.unwrap().len(), 50);
}

#[tokio::test]
async fn blank_message_is_invalid() {
    let store = MemoryStore::new();
    let leader = approved_leader(&store).await;
    let res = chat::post_message(&store, STRICT, &leader, "   ").await;
    assert!(matches!(res, Err(ArenaError::Invalid(_))));
}

#[tokio::test]
async fn posting_to_a_deleted_squad_is_not_found() {
    let store = MemoryStore::new();
    // snapshot taken before the delete still references the squad
    let leader = approved_leader(&store).await;
    registry::delete_squad(&store, leader.squad_id.unwrap()).await.unwrap();

    let res = chat::post_message(&store, STRICT, &leader, "anyone?").await;
    assert!(matches!(res, Err(ArenaError::NotFound)));
}
