//! Places adapter exercised against a stub HTTP server on a local socket.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pupfiesta::domain::ports::{GardensRepository, GardensSourceError};
use pupfiesta::outbound::places::GooglePlacesHttpSource;
use rstest::rstest;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use url::Url;

const API_KEY: &str = "test-key";

/// Serves one canned response to every request and records request targets.
struct StubPlaces {
    base_url: Url,
    targets: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl StubPlaces {
    async fn start(status_line: &'static str, body: Value) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub address");
        let targets = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&targets);
        let body = body.to_string();

        let task = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                respond(socket, status_line, &body, &seen).await;
            }
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}/maps/api/place/")).expect("stub url"),
            targets,
            task,
        }
    }

    fn source(&self) -> GooglePlacesHttpSource {
        GooglePlacesHttpSource::new(self.base_url.clone(), API_KEY, Duration::from_secs(5))
            .expect("client builds")
    }

    fn targets(&self) -> Vec<String> {
        self.targets.lock().expect("targets mutex").clone()
    }
}

impl Drop for StubPlaces {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(
    mut socket: TcpStream,
    status_line: &str,
    body: &str,
    seen: &Mutex<Vec<String>>,
) {
    let mut head = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(read) => head.extend_from_slice(chunk.get(..read).unwrap_or_default()),
        }
    }
    let request = String::from_utf8_lossy(&head);
    if let Some(target) = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
    {
        seen.lock().expect("targets mutex").push(target.to_owned());
    }

    let response = format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn place(place_id: &str, name: &str, lat: f64, lng: f64) -> Value {
    json!({
        "place_id": place_id,
        "name": name,
        "geometry": { "location": { "lat": lat, "lng": lng } },
    })
}

fn query_pairs(target: &str) -> Vec<(String, String)> {
    Url::parse(&format!("http://stub{target}"))
        .expect("target parses")
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

#[tokio::test]
async fn nearby_search_keeps_places_in_range_in_api_order() {
    let stub = StubPlaces::start(
        "200 OK",
        json!({
            "status": "OK",
            "results": [
                place("mid", "Meir Park dog run", 32.0731, 34.7748),
                place("beyond", "Yarkon far end", 32.1500, 34.8600),
                place("near", "Dizengoff dog garden", 32.0870, 34.7800),
                { "place_id": "no-geometry", "name": "Mystery park" },
            ],
        }),
    )
    .await;

    let gardens = stub
        .source()
        .search_dog_parks(32.0853, 34.7818, 5_000.0, "he")
        .await
        .expect("search succeeds");

    let ids: Vec<&str> = gardens.iter().map(|garden| garden.id.as_str()).collect();
    assert_eq!(ids, vec!["mid", "near"]);
    assert!(
        gardens
            .iter()
            .all(|garden| garden.map_url.contains("query_place_id="))
    );

    let targets = stub.targets();
    assert_eq!(targets.len(), 1);
    let target = targets.first().expect("one request");
    assert!(target.starts_with("/maps/api/place/nearbysearch/json?"));
    let pairs = query_pairs(target);
    let has = |key: &str, value: &str| pairs.iter().any(|(k, v)| k == key && v == value);
    assert!(has("rankby", "distance"));
    assert!(has("type", "park"));
    assert!(has("language", "he"));
    assert!(has("key", API_KEY));
    assert!(pairs.iter().all(|(key, _)| key != "radius"));
}

#[rstest]
#[case::quota("OVER_QUERY_LIMIT", "RateLimited")]
#[case::denied("REQUEST_DENIED", "InvalidRequest")]
#[tokio::test]
async fn api_status_failures_are_mapped(#[case] status: &str, #[case] expected: &str) {
    let stub = StubPlaces::start(
        "200 OK",
        json!({ "status": status, "error_message": "stubbed failure", "results": [] }),
    )
    .await;

    let error = stub
        .source()
        .search_dog_parks(32.0853, 34.7818, 5_000.0, "en")
        .await
        .expect_err("search fails");

    match expected {
        "RateLimited" => assert!(matches!(error, GardensSourceError::RateLimited { .. })),
        "InvalidRequest" => assert!(matches!(error, GardensSourceError::InvalidRequest { .. })),
        _ => panic!("unsupported test expectation: {expected}"),
    }
}

#[tokio::test]
async fn zero_results_is_an_empty_list() {
    let stub = StubPlaces::start("200 OK", json!({ "status": "ZERO_RESULTS", "results": [] })).await;

    let gardens = stub
        .source()
        .search_dog_parks(32.0853, 34.7818, 5_000.0, "en")
        .await
        .expect("search succeeds");

    assert!(gardens.is_empty());
}

#[tokio::test]
async fn server_errors_are_transport_failures() {
    let stub = StubPlaces::start("503 Service Unavailable", json!({ "error": "down" })).await;

    let error = stub
        .source()
        .search_dog_parks(32.0853, 34.7818, 5_000.0, "en")
        .await
        .expect_err("search fails");

    assert!(matches!(error, GardensSourceError::Transport { .. }));
}

#[tokio::test]
async fn place_photo_url_uses_the_first_photo() {
    let stub = StubPlaces::start(
        "200 OK",
        json!({
            "status": "OK",
            "result": { "photos": [{ "photo_reference": "ref-1" }, { "photo_reference": "ref-2" }] },
        }),
    )
    .await;

    let photo = stub
        .source()
        .get_place_photo_url("near", 400)
        .await
        .expect("details succeed")
        .expect("place has photos");

    let photo = Url::parse(&photo).expect("photo url parses");
    assert_eq!(photo.path(), "/maps/api/place/photo");
    let pairs: Vec<(String, String)> = photo
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    assert!(pairs.contains(&("photo_reference".to_owned(), "ref-1".to_owned())));
    assert!(pairs.contains(&("maxwidth".to_owned(), "400".to_owned())));
    let targets = stub.targets();
    assert!(
        targets
            .iter()
            .all(|target| target.starts_with("/maps/api/place/details/json?"))
    );
}
