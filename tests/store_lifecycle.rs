//! End-to-end store lifecycle tests against the in-memory gateway:
//! attach, snapshot flow, mutation round-trips, error projection and
//! detach teardown.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use larder::{
    CollectionStore, Entity, EntityGateway, GatewayError, InMemoryGateway, Ingredient,
    IngredientDraft,
    IngredientFilters, IngredientStore, MealPlan, MealPlanStore, MealType, ShoppingList,
    ShoppingListItem, ShoppingListStore, StorageLocation, StoreError, SyncPhase,
};
use larder::models::{slot_id, ShoppingListDraft};

/// Routes store and gateway tracing to the test harness; visible with
/// `--nocapture` and a `RUST_LOG` filter.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn seeded(id: &str, name: &str, quantity: f64, unit: &str) -> Ingredient {
    Ingredient::from_draft(id.into(), IngredientDraft::new(name, quantity, unit))
}

/// Polls until the probe yields a value; snapshots are applied by a
/// background task, so state changes land shortly after mutations.
async fn wait_for<T>(mut probe: impl FnMut() -> Option<T>) -> T {
    for _ in 0..200 {
        if let Some(value) = probe() {
            return value;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within one second");
}

fn ingredient_store() -> (Arc<InMemoryGateway<Ingredient>>, IngredientStore<InMemoryGateway<Ingredient>>) {
    init_tracing();
    let gateway = Arc::new(InMemoryGateway::new());
    let store = CollectionStore::new(gateway.clone());
    (gateway, store)
}

#[tokio::test]
async fn attach_delivers_seeded_snapshot() {
    let (gateway, mut store) = ingredient_store();
    gateway.seed(
        "u1",
        vec![seeded("i1", "flour", 500.0, "g")],
    );

    assert_eq!(store.phase(), SyncPhase::Unsubscribed);
    store.attach("u1").await.unwrap();

    wait_for(|| (store.phase() == SyncPhase::Live).then_some(())).await;
    let items = store.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "flour");
    assert_eq!(store.user_id(), Some("u1"));
    assert!(store.error().is_none());
}

#[tokio::test]
async fn mutations_flow_back_through_snapshots() {
    let (_gateway, mut store) = ingredient_store();
    store.attach("u1").await.unwrap();
    wait_for(|| (store.phase() == SyncPhase::Live).then_some(())).await;

    let id = store
        .add(IngredientDraft::new("milk", 1.0, "l").with_location(StorageLocation::Fridge))
        .await
        .unwrap();
    wait_for(|| (!store.items().is_empty()).then_some(())).await;
    assert_eq!(store.items()[0].id, id);

    store.delete(&id).await.unwrap();
    wait_for(|| store.items().is_empty().then_some(())).await;
}

#[tokio::test]
async fn unauthenticated_mutations_are_rejected() {
    let (gateway, store) = ingredient_store();

    let err = store
        .add(IngredientDraft::new("milk", 1.0, "l"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotAuthenticated));
    assert_eq!(err.to_string(), "User not authenticated");
    assert_eq!(store.error().as_deref(), Some("User not authenticated"));

    // Nothing reached the backend.
    assert!(gateway.get_all("u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn subscription_loss_keeps_stale_data_and_records_error() {
    let (gateway, mut store) = ingredient_store();
    gateway.seed(
        "u1",
        vec![seeded("i1", "flour", 500.0, "g")],
    );
    store.attach("u1").await.unwrap();
    wait_for(|| (!store.items().is_empty()).then_some(())).await;

    gateway.emit_error("u1", GatewayError::message("boom"));
    let error = wait_for(|| store.error()).await;
    assert_eq!(error, "Failed to load ingredients: boom");

    // Stale data stays visible and nothing spins.
    assert_eq!(store.items().len(), 1);
    assert_eq!(store.phase(), SyncPhase::Live);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn detach_tears_down_subscription() {
    let (gateway, mut store) = ingredient_store();
    store.attach("u1").await.unwrap();
    wait_for(|| (store.phase() == SyncPhase::Live).then_some(())).await;
    assert_eq!(gateway.subscriber_count("u1"), 1);

    store.detach();
    assert_eq!(gateway.subscriber_count("u1"), 0);
    assert_eq!(store.phase(), SyncPhase::Unsubscribed);
    assert!(store.items().is_empty());
    assert!(store.user_id().is_none());

    // Writes after detach never reach the detached store.
    gateway
        .create("u1", IngredientDraft::new("milk", 1.0, "l"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.items().is_empty());
}

#[tokio::test]
async fn reattach_switches_users() {
    let (gateway, mut store) = ingredient_store();
    gateway.seed(
        "u1",
        vec![seeded("i1", "flour", 500.0, "g")],
    );
    gateway.seed(
        "u2",
        vec![seeded("i2", "sugar", 250.0, "g")],
    );

    store.attach("u1").await.unwrap();
    wait_for(|| (!store.items().is_empty()).then_some(())).await;
    assert_eq!(store.items()[0].name, "flour");

    store.attach("u2").await.unwrap();
    wait_for(|| {
        let items = store.items();
        (items.len() == 1 && items[0].name == "sugar").then_some(())
    })
    .await;
    assert_eq!(gateway.subscriber_count("u1"), 0);
    assert_eq!(gateway.subscriber_count("u2"), 1);
}

#[tokio::test]
async fn filters_round_trip_through_clear() {
    let (gateway, mut store) = ingredient_store();
    gateway.seed(
        "u1",
        vec![
            seeded("i1", "milk", 1.0, "l"),
            seeded("i2", "rice", 2.0, "kg"),
        ],
    );
    store.attach("u1").await.unwrap();
    wait_for(|| (store.items().len() == 2).then_some(())).await;

    store.set_filters(|f| f.search = "milk".into());
    assert_eq!(store.filtered_items().len(), 1);

    store.clear_filters();
    assert_eq!(store.filters(), &IngredientFilters::default());
    assert_eq!(store.filtered_items().len(), 2);
}

#[tokio::test]
async fn week_plan_creation_is_idempotent_per_week() {
    init_tracing();
    let gateway: Arc<InMemoryGateway<MealPlan>> = Arc::new(InMemoryGateway::new());
    let mut store: MealPlanStore<_> = CollectionStore::new(gateway.clone());
    store.attach("u1").await.unwrap();
    wait_for(|| (store.phase() == SyncPhase::Live).then_some(())).await;

    let wednesday = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
    let sunday = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();

    let first = store.load_or_create_week_plan(wednesday).await.unwrap();
    assert_eq!(first.week_start, sunday);
    assert_eq!(first.slots.len(), 28);

    // Asking again for any date in the same week returns the same plan.
    let second = store.load_or_create_week_plan(sunday).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(gateway.get_all("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn slot_assignment_round_trip() {
    init_tracing();
    let gateway: Arc<InMemoryGateway<MealPlan>> = Arc::new(InMemoryGateway::new());
    let mut store: MealPlanStore<_> = CollectionStore::new(gateway.clone());
    store.attach("u1").await.unwrap();
    wait_for(|| (store.phase() == SyncPhase::Live).then_some(())).await;

    let monday = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
    let plan = store.load_or_create_week_plan(monday).await.unwrap();
    wait_for(|| (!store.items().is_empty()).then_some(())).await;

    let slot = slot_id(monday, MealType::Dinner);
    store.assign_recipe(&plan.id, &slot, "r1", 4).await.unwrap();

    let updated = wait_for(|| {
        store
            .week_plan(monday)
            .filter(|p| !p.slot(&slot).unwrap().is_empty())
    })
    .await;
    assert_eq!(updated.slot(&slot).unwrap().recipe_id.as_deref(), Some("r1"));
    assert_eq!(updated.slot(&slot).unwrap().servings, Some(4));

    store.clear_slot(&plan.id, &slot).await.unwrap();
    wait_for(|| {
        store
            .week_plan(monday)
            .filter(|p| p.slot(&slot).unwrap().is_empty())
    })
    .await;
}

#[tokio::test]
async fn shopping_list_cost_tracks_item_edits() {
    init_tracing();
    let gateway: Arc<InMemoryGateway<ShoppingList>> = Arc::new(InMemoryGateway::new());
    let mut store: ShoppingListStore<_> = CollectionStore::new(gateway.clone());
    store.attach("u1").await.unwrap();
    wait_for(|| (store.phase() == SyncPhase::Live).then_some(())).await;

    let list_id = store
        .add(ShoppingListDraft::new("u1", "Weekly"))
        .await
        .unwrap();
    wait_for(|| (!store.items().is_empty()).then_some(())).await;

    store
        .add_item(&list_id, ShoppingListItem::new("a", "eggs", 12.0, "").with_cost(3.5))
        .await
        .unwrap();
    store
        .add_item(&list_id, ShoppingListItem::new("b", "rice", 1.0, "kg").with_cost(2.0))
        .await
        .unwrap();

    let list = wait_for(|| store.items().into_iter().find(|l| l.items.len() == 2)).await;
    assert_eq!(list.estimated_cost, 5.5);
    assert_eq!(list.unpurchased_count(), 2);

    let purchased = store.toggle_purchased(&list_id, "a").await.unwrap();
    assert!(purchased);
    let list = wait_for(|| {
        store
            .items()
            .into_iter()
            .find(|l| l.unpurchased_count() == 1)
    })
    .await;
    // Purchasing does not change the estimate; removing the item does.
    assert_eq!(list.estimated_cost, 5.5);

    store.remove_item(&list_id, "a").await.unwrap();
    let list = wait_for(|| store.items().into_iter().find(|l| l.items.len() == 1)).await;
    assert_eq!(list.estimated_cost, 2.0);
}
