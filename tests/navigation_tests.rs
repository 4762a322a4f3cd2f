//! Navigation hand-off tests: point list, batching and dispatch.

mod fixtures;

use std::time::Duration;

use stop_sequencer::model::{Coordinate, Located, StartingPoint};
use stop_sequencer::navigation::{NavPoint, NavigationConfig, batch, dispatch, navigation_points};

use fixtures::{CITIES, PRAGUE, PRAGUE_STOPS, RecordingLauncher, stops_from};

fn quick_config() -> NavigationConfig {
    NavigationConfig {
        batch_delay: Duration::ZERO,
        ..NavigationConfig::default()
    }
}

fn points(n: usize) -> Vec<NavPoint> {
    (0..n)
        .map(|k| {
            let location = &CITIES[k % CITIES.len()];
            let shift = (k / CITIES.len()) as f64 * 0.05;
            let coordinate = Coordinate::new(location.lat + shift, location.lng).unwrap();
            NavPoint::new(format!("p{}", k), coordinate)
        })
        .collect()
}

#[test]
fn twenty_five_points_make_three_batches() {
    let points = points(25);
    let batches = batch(&points, false, &NavigationConfig::default());

    assert_eq!(batches.len(), 3);
    for batch in &batches {
        assert!(batch.point_count() >= 2);
        assert!(batch.waypoints.len() <= 7);
    }
    assert_eq!(batches[0].origin, points[0]);
    assert_eq!(batches[2].destination, points[24]);
}

#[test]
fn batches_share_boundary_points() {
    let points = points(17);
    let batches = batch(&points, false, &NavigationConfig::default());

    assert_eq!(batches.len(), 2);
    for pair in batches.windows(2) {
        assert_eq!(pair[0].destination, pair[1].origin);
    }
    assert_eq!(batches.last().unwrap().destination, points[16]);
}

#[test]
fn short_route_is_one_batch() {
    let points = points(10);
    let batches = batch(&points, false, &NavigationConfig::default());

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].waypoints.len(), 8);
}

#[test]
fn single_point_has_no_batches() {
    assert!(batch(&points(1), false, &NavigationConfig::default()).is_empty());
    assert!(batch(&[], false, &NavigationConfig::default()).is_empty());
}

#[test]
fn twelve_stop_round_trip_closes_loop() {
    let stops = stops_from(PRAGUE_STOPS);
    let kladno = &CITIES[9];
    let start = StartingPoint::new("Depot", kladno.coordinate());
    let config = NavigationConfig::default();

    let route = navigation_points(&stops, Some(&start), true, &config);
    assert_eq!(route.len(), 14);
    assert_eq!(route.first().unwrap().coordinate, start.coordinate());
    assert_eq!(route.last().unwrap().coordinate, start.coordinate());

    let batches = batch(&route, true, &config);
    assert_eq!(batches.len(), 2);
    assert!(!batches[0].closes_loop);
    assert_eq!(batches[1].destination.label, "Depot");
}

#[test]
fn twelve_stops_one_way_make_two_joined_batches() {
    let stops = stops_from(PRAGUE_STOPS);
    let config = NavigationConfig::default();

    let route = navigation_points(&stops, None, false, &config);
    assert_eq!(route.len(), 12);

    let batches = batch(&route, false, &config);
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].destination, batches[1].origin);
    assert_eq!(batches[0].origin.label, PRAGUE_STOPS[0].name);
    assert_eq!(batches[1].destination.label, PRAGUE_STOPS[11].name);
    assert!(batches.iter().all(|batch| !batch.closes_loop));
}

#[test]
fn round_trip_with_one_stop_has_nothing_to_open() {
    let config = NavigationConfig::default();
    let one = stops_from(&[PRAGUE]);
    let start = StartingPoint::new("Depot", CITIES[9].coordinate());

    let alone = navigation_points(&one, None, true, &config);
    assert!(batch(&alone, true, &config).is_empty());

    let with_start = navigation_points(&[], Some(&start), true, &config);
    assert!(batch(&with_start, true, &config).is_empty());
}

#[test]
fn starting_point_on_a_stop_is_not_repeated() {
    let stops = stops_from(&[PRAGUE, CITIES[0].clone(), CITIES[1].clone()]);
    let start = StartingPoint::new("Depot", PRAGUE.coordinate());

    let route = navigation_points(&stops, Some(&start), false, &NavigationConfig::default());
    assert_eq!(route.len(), 3);
    assert_eq!(route[0].label, "Praha");
}

#[test]
fn dispatch_opens_batches_in_order() {
    let config = quick_config();
    let batches = batch(&points(25), false, &config);
    let launcher = RecordingLauncher::default();

    dispatch(&batches, &launcher, &config);

    let launched = launcher.launched.borrow();
    assert_eq!(launched.len(), 3);
    for (position, (index, url)) in launched.iter().enumerate() {
        assert_eq!(*index, position);
        assert!(url.starts_with("https://www.google.com/maps/dir/?api=1&origin="));
        assert!(url.ends_with("&travelmode=driving"));
    }
}
