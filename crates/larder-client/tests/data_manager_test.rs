//! Integration tests for the data-manager against the real router.
//!
//! The router runs on a loopback listener with the in-memory repository, so
//! the full HTTP round trip is exercised without a database.

use std::sync::Arc;

use larder_api::{app, AppState};
use larder_client::{DataManager, Phase};
use larder_core::{AccessPolicy, Collection, MemoryEntryRepository, Season};

const ADMIN: &str = "admin@example.com";
const GUEST: &str = "guest@example.com";

async fn spawn_app() -> String {
    let repo = Arc::new(MemoryEntryRepository::new());
    let state = AppState::new(repo, AccessPolicy::new(ADMIN));
    let router = app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn admin_manager(base: &str, collection: Collection) -> DataManager {
    DataManager::new(base, collection).with_identity(ADMIN)
}

#[tokio::test]
async fn test_load_of_empty_collection_succeeds() {
    let base = spawn_app().await;
    let mut manager = admin_manager(&base, Collection::Meals);

    manager.load().await.unwrap();

    assert_eq!(manager.phase(), Phase::Ready);
    assert!(manager.entries().is_empty());
    assert!(manager.error().is_none());
}

#[tokio::test]
async fn test_unauthenticated_load_records_error_and_keeps_prior_list() {
    let base = spawn_app().await;

    let mut manager = admin_manager(&base, Collection::Meals);
    manager.begin_create();
    manager.draft_mut().unwrap().set_field("name", "Stew");
    manager.submit().await.unwrap();
    assert_eq!(manager.entries().len(), 1);

    // Same server, no identity header
    let mut anonymous = DataManager::new(&base, Collection::Meals);
    assert!(anonymous.load().await.is_err());
    assert!(anonymous.error().is_some());
    assert!(anonymous.entries().is_empty());
}

#[tokio::test]
async fn test_create_submit_reloads_the_list() {
    let base = spawn_app().await;
    let mut manager = admin_manager(&base, Collection::Ideas);
    manager.load().await.unwrap();

    manager.begin_create();
    manager.draft_mut().unwrap().set_field("name", "Tacos");
    manager.draft_mut().unwrap().set_field("notes", "tuesday");
    manager.submit().await.unwrap();

    assert!(manager.draft().is_none());
    assert_eq!(manager.entries().len(), 1);
    assert_eq!(manager.entries()[0].fields["name"], "Tacos");
    assert_eq!(manager.entries()[0].fields["notes"], "tuesday");
}

#[tokio::test]
async fn test_edit_submit_updates_only_changed_fields() {
    let base = spawn_app().await;
    let mut manager = admin_manager(&base, Collection::Sides);
    manager.begin_create();
    manager.draft_mut().unwrap().set_field("name", "Polenta");
    manager.draft_mut().unwrap().set_field("notes", "stir");
    manager.submit().await.unwrap();
    let id = manager.entries()[0].id;

    manager.begin_edit(id).unwrap();
    manager
        .draft_mut()
        .unwrap()
        .set_field("notes", "use coarse grind");
    manager.submit().await.unwrap();

    assert_eq!(manager.entries().len(), 1);
    assert_eq!(manager.entries()[0].id, id);
    assert_eq!(manager.entries()[0].fields["name"], "Polenta");
    assert_eq!(manager.entries()[0].fields["notes"], "use coarse grind");
}

#[tokio::test]
async fn test_guest_submit_fails_and_keeps_the_draft_open() {
    let base = spawn_app().await;
    let mut manager = DataManager::new(&base, Collection::Meals).with_identity(GUEST);

    manager.begin_create();
    manager.draft_mut().unwrap().set_field("name", "Stew");
    assert!(manager.submit().await.is_err());

    // Draft survives so the user's input is not lost
    assert!(manager.draft().is_some());
    assert!(manager.error().is_some());
}

#[tokio::test]
async fn test_delete_removes_the_entry() {
    let base = spawn_app().await;
    let mut manager = admin_manager(&base, Collection::Meals);
    manager.begin_create();
    manager.draft_mut().unwrap().set_field("name", "Stew");
    manager.submit().await.unwrap();
    let id = manager.entries()[0].id;

    manager.delete(id).await.unwrap();
    assert!(manager.entries().is_empty());

    // Deleting again surfaces the server's not-found as a plain error
    assert!(manager.delete(id).await.is_err());
    assert!(manager.error().is_some());
}

#[tokio::test]
async fn test_csv_import_posts_one_batch_and_reloads() {
    let base = spawn_app().await;
    let mut manager = admin_manager(&base, Collection::SeasonalIngredients);

    let csv =
        "name,seasons,description\nRhubarb,\"spring, summer\",tart\nSquash,autumn,roast\n";
    manager.import_csv(csv).await.unwrap();

    assert_eq!(manager.entries().len(), 2);
    let spring = manager.in_season(Season::Spring);
    assert_eq!(spring.len(), 1);
    assert_eq!(spring[0].fields["name"], "Rhubarb");
}

#[tokio::test]
async fn test_csv_import_with_bad_header_never_hits_the_server() {
    let base = spawn_app().await;
    let mut manager = admin_manager(&base, Collection::Meals);

    let err = manager.import_csv("name\nStew\n").await.unwrap_err();
    assert!(err.to_string().contains("Missing required fields"));

    manager.load().await.unwrap();
    assert!(manager.entries().is_empty());
}

#[tokio::test]
async fn test_search_narrows_the_visible_list() {
    let base = spawn_app().await;
    let mut manager = admin_manager(&base, Collection::Ideas);
    for (name, notes) in [("Tacos", "crowd favourite"), ("Pasta", "weeknight")] {
        manager.begin_create();
        manager.draft_mut().unwrap().set_field("name", name);
        manager.draft_mut().unwrap().set_field("notes", notes);
        manager.submit().await.unwrap();
    }

    manager.set_search_term("weeknight");
    let visible = manager.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].fields["name"], "Pasta");

    manager.set_search_term("");
    assert_eq!(manager.visible().len(), 2);
}

#[tokio::test]
async fn test_check_write_access_reflects_identity() {
    let base = spawn_app().await;

    let admin = admin_manager(&base, Collection::Meals);
    assert!(admin.check_write_access().await.unwrap());

    let guest = DataManager::new(&base, Collection::Meals).with_identity(GUEST);
    assert!(!guest.check_write_access().await.unwrap());

    let anonymous = DataManager::new(&base, Collection::Meals);
    assert!(!anonymous.check_write_access().await.unwrap());
}
