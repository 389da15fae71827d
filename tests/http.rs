use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UrgeBody {
    id: String,
    name: String,
    total_count: u64,
    current_streak: u32,
    best_streak: u32,
    last_tap_date: Option<String>,
    daily_resisted: HashMap<String, u64>,
    daily_relapsed: HashMap<String, u64>,
    badges_earned: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsBody {
    urge_id: String,
    name: String,
    days: Vec<DayBody>,
    summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct DayBody {
    date: String,
    resisted: u64,
    relapsed: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryBody {
    total_days: usize,
    total_resisted: u64,
    total_relapsed: u64,
    longest_no_relapse_streak: usize,
}

struct TestServer {
    base_url: String,
    data_path: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("urge_button_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/urges")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_urge_button"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_path,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn create_urge(client: &Client, server: &TestServer, name: &str) -> UrgeBody {
    let response = client
        .post(format!("{}/api/urges", server.base_url))
        .json(&serde_json::json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn post_urge(client: &Client, server: &TestServer, id: &str, action: &str) -> UrgeBody {
    let response = client
        .post(format!("{}/api/urges/{id}/{action}", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_create_trims_and_zeroes() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let urge = create_urge(&client, &server, "  Smoking  ").await;
    assert_eq!(urge.name, "Smoking");
    assert_eq!(urge.total_count, 0);
    assert_eq!(urge.current_streak, 0);
    assert_eq!(urge.best_streak, 0);
    assert!(urge.last_tap_date.is_none());
    assert!(urge.daily_resisted.is_empty());
    assert!(urge.badges_earned.is_empty());
}

#[tokio::test]
async fn http_rejects_blank_name() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/urges", server.base_url))
        .json(&serde_json::json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_taps_same_day_keep_streak() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = create_urge(&client, &server, "Sugar").await;

    let first = post_urge(&client, &server, &created.id, "tap").await;
    assert_eq!(first.total_count, 1);
    assert_eq!(first.current_streak, 1);
    assert_eq!(first.best_streak, 1);
    let day = first.last_tap_date.clone().expect("tap date set");
    assert_eq!(first.daily_resisted.get(&day), Some(&1));

    let second = post_urge(&client, &server, &created.id, "tap").await;
    assert_eq!(second.total_count, 2);
    assert_eq!(second.current_streak, 1);
    assert_eq!(second.daily_resisted.get(&day), Some(&2));
}

#[tokio::test]
async fn http_reset_logs_relapse() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = create_urge(&client, &server, "Scrolling").await;
    let tapped = post_urge(&client, &server, &created.id, "tap").await;
    let day = tapped.last_tap_date.clone().unwrap();

    let reset = post_urge(&client, &server, &created.id, "reset").await;
    assert_eq!(reset.total_count, 0);
    assert_eq!(reset.current_streak, 0);
    assert_eq!(reset.best_streak, 1);
    assert!(reset.last_tap_date.is_none());
    assert_eq!(reset.daily_relapsed.get(&day), Some(&1));
    assert_eq!(reset.daily_resisted.get(&day), Some(&1));

    let stats: StatsBody = client
        .get(format!("{}/api/urges/{}/stats", server.base_url, created.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.urge_id, created.id);
    assert_eq!(stats.name, "Scrolling");
    assert_eq!(stats.days.len(), 1);
    assert_eq!(stats.days[0].date, day);
    assert_eq!(stats.days[0].resisted, 1);
    assert_eq!(stats.days[0].relapsed, 1);
    assert_eq!(stats.summary.total_days, 1);
    assert_eq!(stats.summary.total_resisted, 1);
    assert_eq!(stats.summary.total_relapsed, 1);
    assert_eq!(stats.summary.longest_no_relapse_streak, 0);
}

#[tokio::test]
async fn http_unknown_urge_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let missing = "00000000-0000-4000-8000-000000000000";

    for action in ["tap", "reset"] {
        let response = client
            .post(format!("{}/api/urges/{missing}/{action}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = client
        .get(format!("{}/api/urges/{missing}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_rename_and_delete() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = create_urge(&client, &server, "Gaming").await;
    let url = format!("{}/api/urges/{}", server.base_url, created.id);

    let renamed: UrgeBody = client
        .put(&url)
        .json(&serde_json::json!({ "name": " Video games " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed.name, "Video games");

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_mutations_are_persisted() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = create_urge(&client, &server, "Persisted").await;
    post_urge(&client, &server, &created.id, "tap").await;

    let raw = tokio::fs::read_to_string(&server.data_path).await.unwrap();
    let saved: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let urges = saved["savedUrges"].as_array().expect("savedUrges array");
    let entry = urges
        .iter()
        .find(|urge| urge["id"] == created.id.as_str())
        .expect("urge saved");
    assert_eq!(entry["totalCount"], 1);
    assert_eq!(entry["currentStreak"], 1);
}

#[tokio::test]
async fn http_form_add_redirects_to_track_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/urges", server.base_url))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("name=Late+night+snacks")
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(response.url().query().unwrap_or_default().starts_with("urge="));

    let html = response.text().await.unwrap();
    assert!(html.contains("I resisted Late night snacks"));

    let stats_page = client
        .get(format!("{}/stats", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(stats_page.status().is_success());
}

#[tokio::test]
async fn http_blank_or_stale_selection_still_renders() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    create_urge(&client, &server, "Selected later").await;
    let first: Vec<UrgeBody> = client
        .get(format!("{}/api/urges", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let first_id = &first[0].id;

    for (base, query) in [("/", "?urge="), ("/", "?urge=stale-garbage"), ("/stats", "?urge=garbage")] {
        let path = format!("{base}{query}");
        let response = client
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        let html = response.text().await.unwrap();
        let active_chip = format!(r#"<a class="chip active" href="{base}?urge={first_id}">"#);
        assert!(html.contains(&active_chip), "{path}");
    }

    let stats: StatsBody = client
        .get(format!("{}/api/stats?urge=", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(&stats.urge_id, first_id);
}
