#![cfg(feature = "mongo-tests")]

use casbin::{Adapter, CoreApi, DefaultModel, Enforcer, Filter, MgmtApi, Model};
use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use serial_test::serial;
use warden_store::repo;
use warden_store::{MongoAdapter, MongoConfig, MongoStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    name: String,
    rank: i32,
}

async fn mongo_store(collection: &str) -> Option<MongoStore> {
    let url = match std::env::var("WARDEN_TEST_MONGO_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping mongo-tests: set WARDEN_TEST_MONGO_URL");
            return None;
        }
    };
    let config = MongoConfig {
        url,
        database: "warden_test".to_string(),
        collection: collection.to_string(),
        connect_timeout: std::time::Duration::from_secs(2),
    };
    let store = match MongoStore::connect(&config).await {
        Ok(store) => store,
        Err(err) => {
            eprintln!("skipping mongo-tests: cannot connect to mongodb: {err}");
            return None;
        }
    };
    repo::delete_many(&store.rules(), Document::new(), None)
        .await
        .expect("reset rules");
    Some(store)
}

#[tokio::test]
#[serial]
async fn enforcer_policy_survives_reload() {
    let Some(store) = mongo_store("casbin_rule_reload").await else {
        return;
    };
    let model = DefaultModel::from_str(warden_authz::MODEL_CONF)
        .await
        .expect("model");
    let mut enforcer = Enforcer::new(model, MongoAdapter::new(&store))
        .await
        .expect("enforcer");
    enforcer
        .add_policy(vec!["role:admin".to_string(), "/*".to_string()])
        .await
        .expect("add policy");
    enforcer
        .add_grouping_policy(vec!["xdorro".to_string(), "role:admin".to_string()])
        .await
        .expect("add grouping");
    enforcer.save_policy().await.expect("save");
    assert_eq!(store.rule_count().await.expect("count"), 2);

    let model = DefaultModel::from_str(warden_authz::MODEL_CONF)
        .await
        .expect("model");
    let reloaded = Enforcer::new(model, MongoAdapter::new(&store))
        .await
        .expect("reloaded");
    assert!(reloaded.enforce(("xdorro", "/protected")).expect("enforce"));
    assert!(!reloaded.enforce(("ahihi", "/protected")).expect("enforce"));
}

#[tokio::test]
#[serial]
async fn remove_policy_deletes_row() {
    let Some(store) = mongo_store("casbin_rule_remove").await else {
        return;
    };
    let model = DefaultModel::from_str(warden_authz::MODEL_CONF)
        .await
        .expect("model");
    let mut enforcer = Enforcer::new(model, MongoAdapter::new(&store))
        .await
        .expect("enforcer");
    enforcer
        .add_policy(vec!["role:user".to_string(), "/time".to_string()])
        .await
        .expect("add");
    assert_eq!(store.rule_count().await.expect("count"), 1);
    let removed = enforcer
        .remove_policy(vec!["role:user".to_string(), "/time".to_string()])
        .await
        .expect("remove");
    assert!(removed);
    assert_eq!(store.rule_count().await.expect("count"), 0);
}

#[tokio::test]
#[serial]
async fn generic_helpers_round_trip_documents() {
    let Some(store) = mongo_store("casbin_rule_helpers").await else {
        return;
    };
    let notes = store.collection::<Note>("warden_notes");
    repo::delete_many(&notes, Document::new(), None)
        .await
        .expect("reset");

    let ids = repo::insert_many(
        &notes,
        &[
            Note {
                name: "a".to_string(),
                rank: 1,
            },
            Note {
                name: "b".to_string(),
                rank: 2,
            },
        ],
        None,
    )
    .await
    .expect("insert many");
    assert_eq!(ids.len(), 2);

    let before = repo::find_one_and_update(
        &notes,
        doc! { "name": "a" },
        doc! { "$set": { "rank": 10 } },
        None,
    )
    .await
    .expect("find and update");
    assert_eq!(before.rank, 1);

    let updated = repo::update_many(&notes, doc! {}, doc! { "$inc": { "rank": 1 } }, None)
        .await
        .expect("update many");
    assert_eq!(updated.modified_count, 2);

    let soft = repo::soft_delete_one(&notes, doc! { "name": "b" }, None)
        .await
        .expect("soft delete");
    assert_eq!(soft.modified_count, 1);
    let deleted = repo::count_documents(&notes, doc! { "deleted_at": { "$exists": true } }, None)
        .await
        .expect("count");
    assert_eq!(deleted, 1);

    let all = repo::find(&notes, Document::new(), None).await.expect("find");
    assert_eq!(all.len(), 2);

    repo::delete_one(&notes, doc! { "name": "a" }, None)
        .await
        .expect("delete one");
    let missing = repo::find_one(&notes, doc! { "name": "a" }, None).await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}

async fn seeded_enforcer(store: &MongoStore) -> Enforcer {
    let model = DefaultModel::from_str(warden_authz::MODEL_CONF)
        .await
        .expect("model");
    let mut enforcer = Enforcer::new(model, MongoAdapter::new(store))
        .await
        .expect("enforcer");
    for (subject, object) in [("role:user", "/"), ("role:user", "/time"), ("role:admin", "/*")] {
        enforcer
            .add_policy(vec![subject.to_string(), object.to_string()])
            .await
            .expect("add policy");
    }
    enforcer
        .add_grouping_policy(vec!["xdorro".to_string(), "role:admin".to_string()])
        .await
        .expect("add grouping");
    enforcer
}

#[tokio::test]
#[serial]
async fn filtered_load_keeps_matching_rows_only() {
    let Some(store) = mongo_store("casbin_rule_filtered_load").await else {
        return;
    };
    let mut enforcer = seeded_enforcer(&store).await;
    enforcer
        .load_filtered_policy(Filter {
            p: vec!["role:user"],
            g: vec!["", "role:admin"],
        })
        .await
        .expect("filtered load");

    assert_eq!(
        enforcer.get_policy(),
        vec![
            vec!["role:user".to_string(), "/".to_string()],
            vec!["role:user".to_string(), "/time".to_string()],
        ]
    );
    assert_eq!(
        enforcer.get_grouping_policy(),
        vec![vec!["xdorro".to_string(), "role:admin".to_string()]]
    );
    assert_eq!(store.rule_count().await.expect("count"), 4);
}

#[tokio::test]
#[serial]
async fn filtered_remove_deletes_matching_rows() {
    let Some(store) = mongo_store("casbin_rule_filtered_remove").await else {
        return;
    };
    let mut enforcer = seeded_enforcer(&store).await;
    let removed = enforcer
        .remove_filtered_policy(0, vec!["role:user".to_string()])
        .await
        .expect("filtered remove");
    assert!(removed);
    assert_eq!(store.rule_count().await.expect("count"), 2);

    let mut adapter = MongoAdapter::new(&store);
    let removed = adapter
        .remove_filtered_policy("p", "p", 6, vec!["role:admin".to_string()])
        .await
        .expect("out of range filter");
    assert!(!removed);
    assert_eq!(store.rule_count().await.expect("count"), 2);
}

#[tokio::test]
#[serial]
async fn save_and_clear_replace_collection() {
    let Some(store) = mongo_store("casbin_rule_save_clear").await else {
        return;
    };
    repo::insert_one(
        &store.rules(),
        &warden_store::CasbinRule::from_line("p", &["stale".to_string(), "/".to_string()])
            .expect("row"),
        None,
    )
    .await
    .expect("stale row");

    let mut model = DefaultModel::from_str(warden_authz::MODEL_CONF)
        .await
        .expect("model");
    model.add_policy("p", "p", vec!["role:admin".to_string(), "/*".to_string()]);
    let mut adapter = MongoAdapter::new(&store);
    adapter.save_policy(&mut model).await.expect("save");
    let rows = repo::find(&store.rules(), Document::new(), None)
        .await
        .expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].v0, "role:admin");

    adapter.clear_policy().await.expect("clear collection");
    assert_eq!(store.rule_count().await.expect("count"), 0);
}
