//! Service behaviour in local mode, over an in-memory key-value store.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use wayfarer_core::error::CoreError;
use wayfarer_core::itinerary::{Itinerary, ItineraryActivity, ItineraryDay};
use wayfarer_db::models::day_plan::{CreateActivity, CreateDayPlan, UpdateActivity, UpdateDayPlan};
use wayfarer_db::models::status::{BudgetTier, TripStatus};
use wayfarer_db::models::story::{CreateStory, UpdateStory};
use wayfarer_db::models::trip::{CreateTrip, UpdateTrip};
use wayfarer_store::blob::{BlobStore, FsBlobStore};
use wayfarer_store::kv::{keys, FileKv, KeyValueStore, MemoryKv};
use wayfarer_store::local::LocalCollections;
use wayfarer_store::services::StoryService;
use wayfarer_store::Services;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
}

fn new_trip(destination: &str) -> CreateTrip {
    CreateTrip {
        destination: destination.into(),
        start_date: date(10),
        end_date: date(14),
        budget: BudgetTier::Moderate,
        travelers: 2,
        interests: vec!["beaches".into(), "food".into()],
        accommodation: Some("Guesthouse".into()),
        transport: None,
        itinerary: None,
        status: None,
    }
}

fn new_plan(trip_id: &str, day_number: i32) -> CreateDayPlan {
    CreateDayPlan {
        trip_id: trip_id.into(),
        day_number,
        date: date(9 + day_number as u32),
        activities: vec![CreateActivity {
            time: "09:00".into(),
            title: "Breakfast".into(),
            ..Default::default()
        }],
        notes: None,
        budget: Some(40.0),
    }
}

fn services() -> (Services, Arc<dyn KeyValueStore>) {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKv::new());
    (Services::local(kv.clone()), kv)
}

// ---------------------------------------------------------------------------
// Trips
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_trip_reads_back_identically() {
    let (services, _) = services();
    let created = services.trips.create(new_trip("Goa")).await.unwrap();

    assert_eq!(created.status, TripStatus::Planning);
    assert_eq!(created.user_id, "local-user");
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(services.trips.get_by_id(&created.id).await.unwrap(), created);
}

#[tokio::test]
async fn get_all_is_newest_first() {
    let (services, _) = services();
    let goa = services.trips.create(new_trip("Goa")).await.unwrap();
    let jaipur = services.trips.create(new_trip("Jaipur")).await.unwrap();

    let all = services.trips.get_all().await.unwrap();
    assert_eq!(all, vec![jaipur, goa]);
}

#[tokio::test]
async fn update_merges_and_advances_updated_at() {
    let (services, _) = services();
    let created = services.trips.create(new_trip("Goa")).await.unwrap();

    let updated = services
        .trips
        .update(
            &created.id,
            UpdateTrip {
                travelers: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.travelers, 4);
    assert_eq!(updated.destination, "Goa");
    assert_eq!(updated.interests, created.interests);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.created_at);
    assert_eq!(services.trips.get_by_id(&created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn invalid_trip_input_is_rejected_before_storage() {
    let (services, kv) = services();

    let mut blank = new_trip("  ");
    blank.destination = "  ".into();
    assert_matches!(services.trips.create(blank).await, Err(CoreError::Validation(_)));

    let mut backwards = new_trip("Goa");
    backwards.end_date = date(1);
    assert_matches!(services.trips.create(backwards).await, Err(CoreError::Validation(_)));

    let mut nobody = new_trip("Goa");
    nobody.travelers = 0;
    assert_matches!(services.trips.create(nobody).await, Err(CoreError::Validation(_)));

    assert_eq!(kv.get_item(keys::TRIPS).await.unwrap(), None);
}

#[tokio::test]
async fn update_cannot_invert_date_range() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();
    assert_matches!(
        services
            .trips
            .update(
                &trip.id,
                UpdateTrip {
                    end_date: Some(date(1)),
                    ..Default::default()
                },
            )
            .await,
        Err(CoreError::Validation(_))
    );
}

#[tokio::test]
async fn missing_trip_is_not_found() {
    let (services, _) = services();
    assert_matches!(
        services.trips.get_by_id("nope").await,
        Err(CoreError::NotFound { entity: "Trip", .. })
    );
    assert_matches!(
        services.trips.update("nope", UpdateTrip::default()).await,
        Err(CoreError::NotFound { .. })
    );
    assert_matches!(services.trips.delete("nope").await, Err(CoreError::NotFound { .. }));
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();
    services.trips.delete(&trip.id).await.unwrap();
    assert_matches!(services.trips.get_by_id(&trip.id).await, Err(CoreError::NotFound { .. }));
}

#[tokio::test]
async fn status_and_itinerary_helpers() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();

    let upcoming = services.trips.set_status(&trip.id, TripStatus::Upcoming).await.unwrap();
    assert_eq!(upcoming.status, TripStatus::Upcoming);

    let itinerary = Itinerary::parse_generated(
        r#"{"summary":"Sun","days":[{"day":1,"activities":[{"time":"10:00","title":"Baga Beach"}]}]}"#,
    )
    .unwrap();
    let planned = services
        .trips
        .update_itinerary(&trip.id, itinerary.clone())
        .await
        .unwrap();
    assert_eq!(planned.itinerary, itinerary);
    assert_eq!(planned.status, TripStatus::Upcoming);
}

#[tokio::test]
async fn sharing_counts_views_and_can_be_withdrawn() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();

    let token = services.trips.share(&trip.id).await.unwrap();
    assert_eq!(services.trips.share(&trip.id).await.unwrap(), token);

    let shared = services.trips.get_shared(&token).await.unwrap().unwrap();
    assert_eq!(shared.id, trip.id);
    assert_eq!(shared.view_count, 1);
    let again = services.trips.get_shared(&token).await.unwrap().unwrap();
    assert_eq!(again.view_count, 2);
    assert_eq!(again.updated_at, shared.updated_at);

    services.trips.unshare(&trip.id).await.unwrap();
    assert!(services.trips.get_shared(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn active_trip_slot() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();

    assert_eq!(services.trips.get_active_id().await.unwrap(), None);
    assert_matches!(services.trips.set_active("nope").await, Err(CoreError::NotFound { .. }));

    services.trips.set_active(&trip.id).await.unwrap();
    assert_eq!(services.trips.get_active_id().await.unwrap(), Some(trip.id.clone()));

    services.trips.delete(&trip.id).await.unwrap();
    assert_eq!(services.trips.get_active_id().await.unwrap(), None);
}

// ---------------------------------------------------------------------------
// Day plans
// ---------------------------------------------------------------------------

#[tokio::test]
async fn day_plans_by_number_and_order() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();

    let day2 = services.day_plans.create(new_plan(&trip.id, 2)).await.unwrap();
    let day1 = services.day_plans.create(new_plan(&trip.id, 1)).await.unwrap();

    assert_eq!(
        services.day_plans.get_by_number(&trip.id, 2).await.unwrap(),
        Some(day2.clone())
    );
    assert_eq!(services.day_plans.get_by_number(&trip.id, 7).await.unwrap(), None);
    assert_eq!(services.day_plans.get_by_trip(&trip.id).await.unwrap(), vec![day1, day2]);
    assert!(services.day_plans.get_by_trip("other").await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_day_number_is_a_conflict() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();
    services.day_plans.create(new_plan(&trip.id, 1)).await.unwrap();

    assert_matches!(
        services.day_plans.create(new_plan(&trip.id, 1)).await,
        Err(CoreError::Conflict(_))
    );

    let day2 = services.day_plans.create(new_plan(&trip.id, 2)).await.unwrap();
    assert_matches!(
        services
            .day_plans
            .update(
                &day2.id,
                UpdateDayPlan {
                    day_number: Some(1),
                    ..Default::default()
                },
            )
            .await,
        Err(CoreError::Conflict(_))
    );
}

#[tokio::test]
async fn day_plan_for_unknown_trip_is_not_found() {
    let (services, _) = services();
    assert_matches!(
        services.day_plans.create(new_plan("ghost", 1)).await,
        Err(CoreError::NotFound { entity: "Trip", .. })
    );
}

#[tokio::test]
async fn add_activity_assigns_distinct_ids() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();
    let plan = services.day_plans.create(new_plan(&trip.id, 1)).await.unwrap();
    assert_eq!(plan.activities.len(), 1);

    let updated = services
        .day_plans
        .add_activity(
            &plan.id,
            CreateActivity {
                title: "Beach".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.activities.len(), 2);
    assert_ne!(updated.activities[0].id, updated.activities[1].id);
    assert_eq!(updated.activities[1].title, "Beach");
    assert!(!updated.activities[1].completed);
}

#[tokio::test]
async fn activity_edit_toggle_and_delete() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();
    let plan = services.day_plans.create(new_plan(&trip.id, 1)).await.unwrap();
    let activity_id = plan.activities[0].id.clone();

    let edited = services
        .day_plans
        .update_activity(
            &plan.id,
            &activity_id,
            UpdateActivity {
                location: Some("Panjim".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.activities[0].location.as_deref(), Some("Panjim"));
    assert_eq!(edited.activities[0].title, "Breakfast");

    let toggled = services.day_plans.toggle_activity(&plan.id, &activity_id).await.unwrap();
    assert!(toggled.activities[0].completed);
    let toggled = services.day_plans.toggle_activity(&plan.id, &activity_id).await.unwrap();
    assert!(!toggled.activities[0].completed);

    assert_matches!(
        services.day_plans.toggle_activity(&plan.id, "act_missing").await,
        Err(CoreError::NotFound { entity: "Activity", .. })
    );

    let emptied = services.day_plans.delete_activity(&plan.id, &activity_id).await.unwrap();
    assert!(emptied.activities.is_empty());
    assert_matches!(
        services.day_plans.delete_activity(&plan.id, &activity_id).await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn blank_activity_title_rejected() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();
    let plan = services.day_plans.create(new_plan(&trip.id, 1)).await.unwrap();
    assert_matches!(
        services
            .day_plans
            .add_activity(&plan.id, CreateActivity::default())
            .await,
        Err(CoreError::Validation(_))
    );
}

#[tokio::test]
async fn itinerary_becomes_dated_day_plans() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();

    let activity = |title: &str| ItineraryActivity {
        time: "10:00".into(),
        title: title.into(),
        description: None,
        duration: None,
        cost: Some(12.5),
        location: None,
    };
    let itinerary = Itinerary {
        days: vec![
            ItineraryDay {
                day: 1,
                title: Some("Arrival".into()),
                activities: vec![activity("Check in"), activity("Sunset walk")],
            },
            ItineraryDay {
                day: 2,
                title: None,
                activities: vec![activity("Spice farm")],
            },
        ],
        ..Default::default()
    };

    let plans = services
        .day_plans
        .create_from_itinerary(&trip.id, trip.start_date, &itinerary)
        .await
        .unwrap();

    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].date, date(10));
    assert_eq!(plans[1].date, date(11));
    assert_eq!(plans[0].notes.as_deref(), Some("Arrival"));
    assert_eq!(plans[0].activities.len(), 2);
    assert_ne!(plans[0].activities[0].id, plans[0].activities[1].id);

    assert_eq!(services.day_plans.delete_by_trip(&trip.id).await.unwrap(), 2);
    assert!(services.day_plans.get_by_trip(&trip.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn shared_view_includes_day_plans() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();
    services.day_plans.create(new_plan(&trip.id, 1)).await.unwrap();
    let token = services.trips.share(&trip.id).await.unwrap();

    assert_eq!(services.day_plans.get_shared(&token).await.unwrap().len(), 1);
    assert!(services.day_plans.get_shared("unknown").await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Stories
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stories_crud_and_trip_filter() {
    let (services, _) = services();
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();

    let loose = services
        .stories
        .create(CreateStory {
            content: "Monsoon rain".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let linked = services
        .stories
        .create(CreateStory {
            trip_id: Some(trip.id.clone()),
            content: "Fish thali".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(services.stories.get_all().await.unwrap(), vec![linked.clone(), loose.clone()]);
    assert_eq!(services.stories.get_by_trip(&trip.id).await.unwrap(), vec![linked.clone()]);

    let updated = services
        .stories
        .update(
            &loose.id,
            UpdateStory {
                title: Some("Rain".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title.as_deref(), Some("Rain"));
    assert_eq!(updated.content, "Monsoon rain");
    assert!(updated.updated_at > updated.created_at);

    services.stories.delete(&loose.id).await.unwrap();
    assert_matches!(services.stories.get_by_id(&loose.id).await, Err(CoreError::NotFound { .. }));
}

#[tokio::test]
async fn empty_story_rejected() {
    let (services, _) = services();
    assert_matches!(
        services.stories.create(CreateStory::default()).await,
        Err(CoreError::Validation(_))
    );
}

#[tokio::test]
async fn local_images_are_inlined() {
    let (services, _) = services();
    let url = services.stories.upload_image(b"GIF89a", "image/gif").await.unwrap();
    assert!(url.starts_with("data:image/gif;base64,"));

    let story = services
        .stories
        .create(CreateStory {
            image_url: Some(url.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(story.image_url, Some(url.clone()));
    services.stories.remove_image(&url).await.unwrap();

    assert_matches!(
        services.stories.upload_image(b"%PDF", "application/pdf").await,
        Err(CoreError::Validation(_))
    );
}

#[tokio::test]
async fn stored_images_are_removed_only_by_their_owner() {
    let dir = tempfile::tempdir().unwrap();
    let collections = LocalCollections::new(Arc::new(MemoryKv::new()));
    let blobs = Arc::new(FsBlobStore::new(dir.path(), "http://localhost:3000"));
    let stories = StoryService::new(Arc::new(collections.story_store()), blobs.clone());

    let own = stories.upload_image(b"png", "image/png").await.unwrap();
    let foreign = blobs
        .upload("stories/someone-else/x.png", b"png", "image/png")
        .await
        .unwrap();

    assert_matches!(
        stories.remove_image(&foreign).await,
        Err(CoreError::NotFound { entity: "Image", .. })
    );
    assert!(dir.path().join("stories/someone-else/x.png").exists());

    let own_path = dir.path().join(own.trim_start_matches("http://localhost:3000/files/"));
    assert!(own_path.exists());
    stories.remove_image(&own).await.unwrap();
    assert!(!own_path.exists());

    stories.remove_image("https://elsewhere.example/x.png").await.unwrap();
}

// ---------------------------------------------------------------------------
// Storage robustness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn corrupt_collection_reads_as_empty() {
    let (services, kv) = services();
    kv.set_item(keys::TRIPS, "[{\"broken\":").await.unwrap();

    assert!(services.trips.get_all().await.unwrap().is_empty());
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();
    assert_eq!(services.trips.get_all().await.unwrap(), vec![trip]);
}

#[tokio::test]
async fn concurrent_activity_adds_never_lose_each_other_silently() {
    let (services, _) = services();
    let services = Arc::new(services);
    let trip = services.trips.create(new_trip("Goa")).await.unwrap();
    let plan = services.day_plans.create(new_plan(&trip.id, 1)).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let services = services.clone();
        let plan_id = plan.id.clone();
        handles.push(tokio::spawn(async move {
            services
                .day_plans
                .add_activity(
                    &plan_id,
                    CreateActivity {
                        title: format!("Stop {i}"),
                        ..Default::default()
                    },
                )
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) => assert_matches!(e, CoreError::Conflict(_)),
        }
    }

    let stored = services.day_plans.get_by_id(&plan.id).await.unwrap();
    assert_eq!(stored.activities.len(), 1 + succeeded);
}

#[tokio::test]
async fn file_backed_data_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let trip_id = {
        let services = Services::local(Arc::new(FileKv::new(dir.path())));
        services.trips.create(new_trip("Goa")).await.unwrap().id
    };

    let reopened = Services::local(Arc::new(FileKv::new(dir.path())));
    assert_eq!(reopened.trips.get_by_id(&trip_id).await.unwrap().destination, "Goa");
}
