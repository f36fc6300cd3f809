use super::*;
use crate::request::MockHttpClient;
use serde_json::json;

const NYC: Coordinates = Coordinates::new(-74.006, 40.7128);
const BASE: &str = "https://api.mapbox.com";

fn picker() -> LocationPicker {
    LocationPicker::new(MapViewport::new(NYC, 13.0, 600, 400))
}

fn feature(name: &str, lng: f64, lat: f64) -> GeoFeature {
    GeoFeature {
        id: format!("place.{name}"),
        place_name: name.to_string(),
        center: [lng, lat],
    }
}

// =========================================================
// 搜索
// =========================================================

#[test]
fn test_debouncer_only_last_generation_is_current() {
    let mut d = Debouncer::default();
    let first = d.arm();
    let second = d.arm();
    assert!(!d.is_current(first));
    assert!(d.is_current(second));
}

#[test]
fn test_short_query_clears_results() {
    let mut p = picker();
    let ticket = p.type_query("Brooklyn").unwrap();
    assert!(p.apply_results(ticket, vec![feature("Brooklyn, NY", -73.94, 40.67)]));
    assert_eq!(p.results().len(), 1);

    assert_eq!(p.type_query("Br"), None);
    assert!(p.results().is_empty());
    // 之前发出的搜索也失效
    assert_eq!(p.search_due(ticket), None);
}

#[test]
fn test_only_latest_keystroke_searches() {
    let mut p = picker();
    let t1 = p.type_query("Main").unwrap();
    let t2 = p.type_query("Main St").unwrap();

    assert_eq!(p.search_due(t1), None);
    assert_eq!(p.search_due(t2).as_deref(), Some("Main St"));

    assert!(!p.apply_results(t1, vec![feature("stale", 0.0, 0.0)]));
    assert!(p.results().is_empty());
}

#[test]
fn test_results_are_capped() {
    let mut p = picker();
    let ticket = p.type_query("Main Street").unwrap();
    let many = (0..8).map(|i| feature(&format!("{i} Main St"), -74.0, 40.7)).collect();
    p.apply_results(ticket, many);
    assert_eq!(p.results().len(), MAX_RESULTS);
}

#[test]
fn test_select_result_sets_address_and_coordinates_together() {
    let mut p = picker();
    let ticket = p.type_query("Times Sq").unwrap();
    let times_square = feature("Times Square, New York", -73.9855, 40.758);
    p.apply_results(ticket, vec![times_square.clone()]);

    let location = p.select_result(&times_square);
    assert_eq!(location.full_address, "Times Square, New York");
    assert_eq!(location.coordinates, Some(Coordinates::new(-73.9855, 40.758)));
    assert_eq!(p.location(), &location);
    assert_eq!(p.viewport().center, Coordinates::new(-73.9855, 40.758));
    assert!(p.results().is_empty());
}

// =========================================================
// 地图标记与反向地理编码
// =========================================================

#[test]
fn test_move_pin_applies_latest_reverse_only() {
    let mut p = picker();
    let a = Coordinates::new(-73.99, 40.73);
    let b = Coordinates::new(-73.98, 40.74);

    let first = p.move_pin(a);
    let second = p.move_pin(b);
    assert_eq!(p.marker(), Some(b));

    assert_eq!(p.apply_reverse(first, "Old place"), None);
    let location = p.apply_reverse(second, "New place").unwrap();
    assert_eq!(location.full_address, "New place");
    assert_eq!(location.coordinates, Some(b));
}

#[test]
fn test_selection_invalidates_pending_reverse() {
    let mut p = picker();
    let ticket = p.move_pin(Coordinates::new(-73.9, 40.8));
    let chosen = feature("Harlem, New York", -73.94, 40.81);
    p.select_result(&chosen);

    assert_eq!(p.apply_reverse(ticket, "Late reply"), None);
    assert_eq!(p.location().full_address, "Harlem, New York");
}

#[test]
fn test_reverse_failure_keeps_previous_location() {
    let mut p = picker();
    let chosen = feature("Chelsea, New York", -74.0, 40.746);
    p.select_result(&chosen);

    let ticket = p.move_pin(Coordinates::new(-73.5, 40.5));
    p.reverse_failed(ticket);
    assert_eq!(p.marker(), Some(Coordinates::new(-74.0, 40.746)));
    assert_eq!(p.location().full_address, "Chelsea, New York");
    assert_eq!(p.viewport().center, Coordinates::new(-74.0, 40.746));
}

#[test]
fn test_geolocation_requested_once() {
    let mut p = picker();
    assert!(p.begin_geolocation());
    assert!(!p.begin_geolocation());
}

#[test]
fn test_viewport_center_pixel_maps_to_center() {
    let v = MapViewport::new(NYC, 13.0, 600, 400);
    let c = v.pixel_to_coords(300.0, 200.0);
    assert!((c.lng - NYC.lng).abs() < 1e-9);
    assert!((c.lat - NYC.lat).abs() < 1e-9);

    // 右上方 => 经度更大、纬度更大
    let ne = v.pixel_to_coords(500.0, 50.0);
    assert!(ne.lng > NYC.lng);
    assert!(ne.lat > NYC.lat);

    let (x, y) = v.coords_to_pixel(ne);
    assert!((x - 500.0).abs() < 1e-3);
    assert!((y - 50.0).abs() < 1e-3);
}

#[test]
fn test_click_map_moves_pin() {
    let mut p = picker();
    let (coords, ticket) = p.click_map(400.0, 200.0);
    assert!(coords.lng > NYC.lng);
    assert_eq!(p.marker(), Some(coords));
    assert!(p.apply_reverse(ticket, "East side").is_some());
}

#[test]
fn test_static_image_url() {
    let v = MapViewport::new(NYC, 13.0, 600, 400);
    let url = v.static_image_url(BASE, "mapbox/streets-v12", "pk.test", Some(NYC));
    assert_eq!(
        url,
        "https://api.mapbox.com/styles/v1/mapbox/streets-v12/static/\
         pin-l+e11d48(-74.006000,40.712800)/-74.006000,40.712800,13.00/600x400?access_token=pk.test"
    );
}

// =========================================================
// Geocoder
// =========================================================

#[tokio::test]
async fn test_forward_geocoding() {
    let mock = MockHttpClient::new();
    mock.mock_response(
        HttpMethod::Get,
        "https://api.mapbox.com/geocoding/v5/mapbox.places/Main%20St.json?access_token=pk.test&limit=5",
        200,
        json!({
            "type": "FeatureCollection",
            "features": [
                {"id": "address.1", "place_name": "1 Main St, Springfield", "center": [-72.58, 42.1]},
                {"id": "address.2", "place_name": "2 Main St, Springfield", "center": [-72.59, 42.11]}
            ]
        }),
    );

    let geocoder = Geocoder::new(BASE, "pk.test", mock);
    let features = geocoder.forward(" Main St ").await.unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0].coordinates(), Coordinates::new(-72.58, 42.1));
}

#[tokio::test]
async fn test_reverse_geocoding_takes_first_feature() {
    let mock = MockHttpClient::new();
    mock.mock_response(
        HttpMethod::Get,
        "https://api.mapbox.com/geocoding/v5/mapbox.places/-74.006,40.7128.json?access_token=pk.test",
        200,
        json!({"features": [{"place_name": "City Hall, New York", "center": [-74.006, 40.7128]}]}),
    );

    let geocoder = Geocoder::new(BASE, "pk.test", mock);
    assert_eq!(
        geocoder.reverse(NYC).await.unwrap().as_deref(),
        Some("City Hall, New York")
    );
}

#[tokio::test]
async fn test_geocoding_failures_surface_as_errors() {
    let mock = MockHttpClient::new();
    mock.mock_response(
        HttpMethod::Get,
        "https://api.mapbox.com/geocoding/v5/mapbox.places/-74.006,40.7128.json?access_token=bad",
        401,
        json!({"message": "Not Authorized - Invalid Token"}),
    );
    let geocoder = Geocoder::new(BASE, "bad", mock);
    assert!(matches!(
        geocoder.reverse(NYC).await,
        Err(ClientError::Rejected { status: 401, .. })
    ));

    let offline = MockHttpClient::new();
    offline.mock_failure(
        HttpMethod::Get,
        "https://api.mapbox.com/geocoding/v5/mapbox.places/Main%20St.json?access_token=pk.test&limit=5",
        "offline",
    );
    let geocoder = Geocoder::new(BASE, "pk.test", offline);
    assert!(matches!(geocoder.forward("Main St").await, Err(ClientError::Network(_))));
}

// =========================================================
// 属性测试
// =========================================================

proptest::proptest! {
    #[test]
    fn prop_clicked_pixel_maps_back_onto_the_image(
        px in 0.0f64..600.0,
        py in 0.0f64..400.0,
        zoom in 3.0f64..18.0,
    ) {
        let viewport = MapViewport::new(NYC, zoom, 600, 400);
        let (x, y) = viewport.coords_to_pixel(viewport.pixel_to_coords(px, py));
        proptest::prop_assert!((x - px).abs() < 1e-3);
        proptest::prop_assert!((y - py).abs() < 1e-3);
    }

    #[test]
    fn prop_only_the_last_keystroke_is_due(queries in proptest::collection::vec("[a-z]{3,12}", 1..8)) {
        let mut p = picker();
        let tickets: Vec<u64> = queries.iter().filter_map(|q| p.type_query(q)).collect();
        let (last, stale) = tickets.split_last().unwrap();
        proptest::prop_assert_eq!(p.search_due(*last), Some(queries.last().unwrap().clone()));
        for ticket in stale {
            proptest::prop_assert_eq!(p.search_due(*ticket), None);
        }
    }
}
