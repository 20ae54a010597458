//! End-to-end scenario through the fully wired instance
//!
//! Exercises the whole flow a library consumer sees: people and
//! relationships recorded in the graph, commits flowing into the archive
//! through the hook registry, media archived before attachment, and verified
//! reads of every committed snapshot.

use chrono::NaiveDate;
use kizuna::prelude::*;
use kizuna::storage::{AnchorLedger, ContentStore};
use std::sync::Arc;

async fn wired() -> (Kizuna, Arc<MemoryContentStore>, Arc<MemoryLedger>) {
    let store = Arc::new(MemoryContentStore::new());
    let ledger = Arc::new(MemoryLedger::new());
    let config = ConfigBuilder::new().build().unwrap();
    let store_seam: Arc<dyn ContentStore> = store.clone();
    let ledger_seam: Arc<dyn AnchorLedger> = ledger.clone();
    let kizuna = init_with_backends(config, store_seam, ledger_seam)
        .await
        .unwrap();
    (kizuna, store, ledger)
}

#[tokio::test]
async fn family_history_flows_into_the_archive() {
    let (kizuna, store, ledger) = wired().await;
    let actor = ActorId::from_string("akiko");

    // A grandmother and her son.
    let hanako = kizuna
        .graph()
        .create_person(
            &actor,
            Person::builder("Hanako")
                .gender(Gender::Female)
                .birth_date(NaiveDate::from_ymd_opt(1932, 3, 1).unwrap())
                .biography("Calligraphy teacher in Kanazawa.")
                .build(),
        )
        .await
        .unwrap();
    let taro = kizuna
        .graph()
        .create_person(&actor, Person::new("Taro", Gender::Male))
        .await
        .unwrap();

    kizuna
        .graph()
        .link_relationship(&actor, RelationshipKind::Parent, &hanako.id, &taro.id)
        .await
        .unwrap();

    // Everything committed so far is anchored: both creations plus the two
    // relationship-updated snapshots.
    assert_eq!(ledger.receipt_count().await, 4);

    // A scanned photo is archived first, then attached to a memory.
    let photo = kizuna
        .archive()
        .put_media(b"scanned summer festival photo", MediaType::Image)
        .await
        .unwrap();
    let memory = kizuna
        .graph()
        .create_memory(
            &actor,
            Memory::builder(hanako.id.clone(), "Summer festival, 1964")
                .also_about(taro.id.clone())
                .body("Hanako took Taro to the river festival.")
                .media(photo)
                .tag("festival")
                .created_by(actor.clone())
                .build(),
        )
        .await
        .unwrap();

    // Verified reads return exactly what was committed.
    let entity = kizuna
        .archive()
        .read_verified(&EntityId::from(&memory.id))
        .await
        .unwrap();
    assert_eq!(entity, ArchiveEntity::Memory(memory.clone()));

    let entity = kizuna
        .archive()
        .read_verified(&EntityId::from(&taro.id))
        .await
        .unwrap();
    match entity {
        ArchiveEntity::Person(p) => assert_eq!(p.parent_ids, vec![hanako.id.clone()]),
        other => panic!("expected a person, got a {}", other.kind()),
    }

    // The photo blob itself is retrievable by content id.
    assert_eq!(
        store.get(&photo).await.unwrap(),
        b"scanned summer festival photo".to_vec()
    );
}

#[tokio::test]
async fn reversing_the_generations_is_rejected() {
    let (kizuna, _, _) = wired().await;
    let actor = ActorId::system();

    let hanako = kizuna
        .graph()
        .create_person(&actor, Person::new("Hanako", Gender::Female))
        .await
        .unwrap();
    let taro = kizuna
        .graph()
        .create_person(&actor, Person::new("Taro", Gender::Male))
        .await
        .unwrap();
    kizuna
        .graph()
        .link_relationship(&actor, RelationshipKind::Parent, &hanako.id, &taro.id)
        .await
        .unwrap();

    // The child cannot also become the parent's parent.
    let err = kizuna
        .graph()
        .link_relationship(&actor, RelationshipKind::Parent, &taro.id, &hanako.id)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::CycleDetected { .. }));
}

#[tokio::test]
async fn dangling_media_is_rejected_by_the_wired_graph() {
    let (kizuna, _, _) = wired().await;
    let actor = ActorId::system();

    let hanako = kizuna
        .graph()
        .create_person(&actor, Person::new("Hanako", Gender::Female))
        .await
        .unwrap();

    // A content id nothing was archived under.
    let dangling = ContentId::identify(b"never pushed");
    let err = kizuna
        .graph()
        .create_memory(
            &actor,
            Memory::builder(hanako.id.clone(), "phantom attachment")
                .media(dangling)
                .build(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::InvariantViolation { rule: "dangling-media", .. }
    ));
}

#[tokio::test]
async fn tombstoned_snapshot_is_anchored_and_verifiable() {
    let (kizuna, _, _) = wired().await;
    let actor = ActorId::system();

    let hanako = kizuna
        .graph()
        .create_person(&actor, Person::new("Hanako", Gender::Female))
        .await
        .unwrap();
    let entity_id = EntityId::from(&hanako.id);

    kizuna.graph().tombstone(&actor, &entity_id).await.unwrap();

    // The latest anchored snapshot carries the tombstone, and the full
    // history still holds both versions.
    let entity = kizuna.archive().read_verified(&entity_id).await.unwrap();
    match entity {
        ArchiveEntity::Person(p) => assert!(p.tombstoned),
        other => panic!("expected a person, got a {}", other.kind()),
    }
    assert_eq!(kizuna.archive().receipts_of(&entity_id).await.unwrap().len(), 2);

    let mut history = kizuna.archive().history_of(&entity_id).await;
    let first = history.next().unwrap();
    let second = history.next().unwrap();
    assert_eq!(second.previous, Some(first.content_id));
    assert!(history.next().is_none());
}
