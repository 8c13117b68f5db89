//! High concurrency stress tests for rating submission
//!
//! Concurrent submissions against the same entity must never lose an
//! increment, and listings and pairings must keep working alongside them.

use court_finder::catalog::{FilterSpec, SortKey};
use court_finder::config::DiscoverySettings;
use court_finder::repository::DiscoveryRepository;
use court_finder::service::DiscoveryService;
use court_finder::types::{CatalogKind, RatingObservation};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::fixtures::{create_repository, create_test_players, scenario_venues, RecordingRepository};

/// Service over the scenario venues with a repository that yields mid-update
fn create_load_test_system() -> (Arc<DiscoveryService>, Arc<RecordingRepository>) {
    let players = create_test_players(&[2.5, 2.8, 3.0, 3.2, 3.5, 4.1, 4.3, 4.5]);
    let repository = Arc::new(
        RecordingRepository::new(create_repository(scenario_venues(), players)).with_yielding(),
    );
    let service = Arc::new(DiscoveryService::new(
        repository.clone(),
        &DiscoverySettings::default(),
    ));
    (service, repository)
}

async fn submit_concurrently(
    service: &Arc<DiscoveryService>,
    observations: Vec<RatingObservation>,
) -> usize {
    let handles: Vec<_> = observations
        .into_iter()
        .map(|observation| {
            let service = service.clone();
            tokio::spawn(async move { service.submit_rating(observation).await })
        })
        .collect();

    let results = futures::future::join_all(handles).await;

    let mut successful = 0;
    for result in results {
        match result {
            Ok(Ok(_)) => successful += 1,
            Ok(Err(e)) => eprintln!("Rating failed: {}", e),
            Err(e) => eprintln!("Task failed: {}", e),
        }
    }
    successful
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_500_concurrent_ratings_on_one_entity() {
    let (service, repository) = create_load_test_system();
    let concurrent_ratings = 500;

    let observations: Vec<RatingObservation> = (0..concurrent_ratings)
        .map(|i| RatingObservation::new("venue-a", (i % 5) as i64 + 1))
        .collect();
    let expected_sum: f64 = observations.iter().map(|o| o.value as f64).sum();

    let start_time = Instant::now();
    let successful = submit_concurrently(&service, observations).await;
    let duration = start_time.elapsed();

    assert_eq!(successful, concurrent_ratings, "All ratings should succeed");

    let state = repository.load_rating_state("venue-a").await.unwrap();
    assert_eq!(state.count, concurrent_ratings as u64, "No increment may be lost");
    assert_eq!(state.sum, expected_sum);
    assert_eq!(state.mean(), 3.0);

    let venue = repository.find_item("venue-a").await.unwrap().unwrap();
    assert_eq!(venue.review_count, concurrent_ratings as u64);
    assert_eq!(venue.rating, 3.0);

    assert!(
        duration < Duration::from_secs(10),
        "500 ratings should complete within 10 seconds, took: {:?}",
        duration
    );

    let throughput = concurrent_ratings as f64 / duration.as_secs_f64();
    println!(
        "500 concurrent ratings on one entity - Throughput: {:.1} ratings/sec",
        throughput
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ratings_across_entities() {
    let (service, repository) = create_load_test_system();
    let entities = ["venue-a", "venue-b", "venue-c", "venue-d"];
    let per_entity = 100;

    let observations: Vec<RatingObservation> = (0..per_entity)
        .flat_map(|i| {
            entities
                .iter()
                .enumerate()
                .map(move |(e, id)| RatingObservation::new(*id, ((i + e) % 5) as i64 + 1))
        })
        .collect();

    let successful = submit_concurrently(&service, observations).await;
    assert_eq!(successful, per_entity * entities.len());

    for (e, id) in entities.iter().enumerate() {
        let expected_sum: f64 = (0..per_entity).map(|i| (((i + e) % 5) + 1) as f64).sum();
        let state = repository.load_rating_state(id).await.unwrap();
        assert_eq!(state.count, per_entity as u64, "{}", id);
        assert_eq!(state.sum, expected_sum, "{}", id);
    }

    assert_eq!(service.stats().ratings_accepted, (per_entity * entities.len()) as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_invalid_ratings_mixed_into_concurrent_load() {
    let (service, repository) = create_load_test_system();

    let observations: Vec<RatingObservation> = (0..200)
        .map(|i| {
            let value = if i % 4 == 0 { 0 } else { 4 };
            RatingObservation::new("venue-b", value)
        })
        .collect();

    let successful = submit_concurrently(&service, observations).await;
    assert_eq!(successful, 150);

    let state = repository.load_rating_state("venue-b").await.unwrap();
    assert_eq!(state.count, 150);
    assert_eq!(state.mean(), 4.0);
    assert_eq!(service.stats().ratings_rejected, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_listings_and_pairings_during_rating_load() {
    let (service, repository) = create_load_test_system();

    let writer = {
        let service = service.clone();
        tokio::spawn(async move {
            let observations: Vec<RatingObservation> = (0..200)
                .map(|i| RatingObservation::new("venue-d", (i % 5) as i64 + 1))
                .collect();
            submit_concurrently(&service, observations).await
        })
    };

    let readers: Vec<_> = (0..50)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    service
                        .query_catalog(CatalogKind::Venue, &FilterSpec::new(), Some(SortKey::Price))
                        .await
                        .map(|listing| listing.len())
                } else {
                    service
                        .propose_pairs(None)
                        .await
                        .map(|proposal| proposal.pairs.len())
                }
            })
        })
        .collect();

    for result in futures::future::join_all(readers).await {
        let count = result.unwrap().unwrap();
        assert_eq!(count, 4, "every listing has 4 venues and every proposal 4 pairs");
    }

    assert_eq!(writer.await.unwrap(), 200);

    let state = repository.load_rating_state("venue-d").await.unwrap();
    assert_eq!(state.count, 200);
    assert_eq!(state.mean(), 3.0);

    let stats = service.stats();
    assert_eq!(stats.catalog_queries, 25);
    assert_eq!(stats.pairing_runs, 25);
}
