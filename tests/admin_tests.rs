//! Admin console: role gating and the end-to-end squad approval scenario.

use squad_arena_server::{
    accounts::{self, Registration},
    admin,
    chat::{self, ChatPolicy},
    config::Settings,
    db::{
        models::{Account, ConfigPatch, SquadStatus},
        MemoryStore, Store,
    },
    gate::{self, MemorySessions},
    match_config,
    registry::{self, SquadPolicy},
    ArenaError,
};

const SECRET: &str = "tourney-admin";

fn settings() -> Settings {
    Settings {
        admin_secret: Some(SECRET.into()),
        ..Settings::default()
    }
}

async fn register(store: &dyn Store, ff_id: &str, name: &str) {
    accounts::register(
        store,
        &settings(),
        Registration {
            display_name: name.into(),
            external_id: ff_id.into(),
            contact: format!("wa-{ff_id}"),
            password: format!("pw-{ff_id}"),
        },
    )
    .await
    .expect("register");
}

async fn login(store: &dyn Store, sessions: &MemorySessions, ff_id: &str, password: &str) -> Account {
    gate::authenticate(store, sessions, &settings(), ff_id, password)
        .await
        .expect("login")
        .account
}

async fn reload(store: &dyn Store, a: &Account) -> Account {
    store.account(a.id).await.unwrap().unwrap()
}

#[tokio::test]
async fn squad_approval_does_not_approve_members() {
    let store = MemoryStore::new();
    let sessions = MemorySessions::default();
    let pending = SquadPolicy { auto_approve: false };
    let strict = ChatPolicy { require_approval: true };

    register(&store, "FF100", "P1").await;
    let p1 = login(&store, &sessions, "FF100", "pw-FF100").await;
    let alpha = registry::create_squad(&store, pending, &p1, "Alpha").await.unwrap();
    assert_eq!(reload(&store, &p1).await.squad_id, Some(alpha.id));

    register(&store, "FF200", "P2").await;
    let p2 = login(&store, &sessions, "FF200", "pw-FF200").await;
    registry::join_squad(&store, &p2, alpha.id).await.unwrap();
    assert!(!reload(&store, &p2).await.approved);

    let boss = login(&store, &sessions, "BOSS", SECRET).await;
    admin::approve_squad(&store, &boss, alpha.id).await.unwrap();

    let alpha = registry::find(&store, alpha.id).await.unwrap();
    assert_eq!(alpha.status, SquadStatus::Approved);
    let p2 = reload(&store, &p2).await;
    assert!(!p2.approved);

    let res = chat::post_message(&store, strict, &p2, "let's go").await;
    assert!(matches!(res, Err(ArenaError::NotApproved)));

    // confirming the membership unlocks chat
    admin::approve_member(&store, &boss, p2.id).await.unwrap();
    let p2 = reload(&store, &p2).await;
    chat::post_message(&store, strict, &p2, "let's go").await.unwrap();
}

#[tokio::test]
async fn players_cannot_run_admin_operations() {
    let store = MemoryStore::new();
    let sessions = MemorySessions::default();
    register(&store, "FF100", "P1").await;
    let p1 = login(&store, &sessions, "FF100", "pw-FF100").await;
    let alpha = registry::create_squad(&store, SquadPolicy::default(), &p1, "Alpha")
        .await
        .unwrap();
    let before = match_config::get_or_create(&store).await.unwrap();

    let patch = ConfigPatch {
        announcement: Some("hacked".into()),
        ..ConfigPatch::default()
    };
    let results = [
        admin::update_config(&store, &p1, &patch).await.map(|_| ()),
        admin::add_standing(&store, &p1, "Alpha", 999).await,
        admin::reset_standings(&store, &p1).await,
        admin::approve_squad(&store, &p1, alpha.id).await,
        admin::delete_squad(&store, &p1, alpha.id).await,
        admin::verify_account(&store, &p1, p1.id).await,
        admin::approve_member(&store, &p1, p1.id).await,
        admin::list_contacts(&store, &p1).await.map(|_| ()),
        admin::overview(&store, &p1, false).await.map(|_| ()),
    ];
    for r in results {
        assert!(matches!(r, Err(ArenaError::Forbidden)));
    }

    // nothing changed
    let after = match_config::get_or_create(&store).await.unwrap();
    assert_eq!(after.announcement, before.announcement);
    assert_eq!(after.version, before.version);
    assert!(after.standings.is_empty());
    let alpha = registry::find(&store, alpha.id).await.unwrap();
    assert_eq!(alpha.status, SquadStatus::Pending);
    let p1 = reload(&store, &p1).await;
    assert!(!p1.verified);
    assert!(!p1.approved);
}

#[tokio::test]
async fn admin_manages_config_and_standings() {
    let store = MemoryStore::new();
    let sessions = MemorySessions::default();
    let boss = login(&store, &sessions, "BOSS", SECRET).await;

    admin::update_config(
        &store,
        &boss,
        &ConfigPatch {
            announcement: Some("Finals at 8pm".into()),
            room_pass: Some("9911".into()),
            ..ConfigPatch::default()
        },
    )
    .await
    .unwrap();
    admin::add_standing(&store, &boss, "Alpha", 10).await.unwrap();
    admin::add_standing(&store, &boss, "Beta", 25).await.unwrap();

    let view = admin::overview(&store, &boss, false).await.unwrap();
    assert_eq!(view.config.announcement, "Finals at 8pm");
    assert_eq!(view.config.room_pass, "9911");
    assert_eq!(view.leaderboard[0].team_name, "Beta");

    admin::reset_standings(&store, &boss).await.unwrap();
    let view = admin::overview(&store, &boss, false).await.unwrap();
    assert!(view.leaderboard.is_empty());
    assert_eq!(view.config.announcement, "Finals at 8pm");
}

#[tokio::test]
async fn admin_delete_verify_and_contacts() {
    let store = MemoryStore::new();
    let sessions = MemorySessions::default();
    register(&store, "FF100", "P1").await;
    register(&store, "FF200", "P2").await;
    let p1 = login(&store, &sessions, "FF100", "pw-FF100").await;
    let p2 = login(&store, &sessions, "FF200", "pw-FF200").await;
    let boss = login(&store, &sessions, "BOSS", SECRET).await;

    let alpha = registry::create_squad(&store, SquadPolicy::default(), &p1, "Alpha")
        .await
        .unwrap();
    registry::join_squad(&store, &p2, alpha.id).await.unwrap();
    admin::approve_member(&store, &boss, p2.id).await.unwrap();

    let view = admin::overview(&store, &boss, false).await.unwrap();
    assert_eq!(view.pending_squads.len(), 1);
    assert!(view.approved_squads.is_empty());

    admin::delete_squad(&store, &boss, alpha.id).await.unwrap();
    let p2 = reload(&store, &p2).await;
    assert_eq!(p2.squad_id, None);
    assert!(!p2.approved);

    // no squad, nothing to approve
    assert!(matches!(
        admin::approve_member(&store, &boss, p2.id).await,
        Err(ArenaError::NotInSquad)
    ));

    admin::verify_account(&store, &boss, p1.id).await.unwrap();
    assert!(matches!(
        admin::verify_account(&store, &boss, uuid::Uuid::new_v4()).await,
        Err(ArenaError::NotFound)
    ));

    let contacts = admin::list_contacts(&store, &boss).await.unwrap();
    let ids: Vec<_> = contacts.iter().map(|c| c.external_id.as_str()).collect();
    assert_eq!(ids, ["FF100", "FF200", "BOSS"]);
    let c1 = contacts.iter().find(|c| c.external_id == "FF100").unwrap();
    assert!(c1.verified);
    assert_eq!(c1.contact, "wa-FF100");
}
