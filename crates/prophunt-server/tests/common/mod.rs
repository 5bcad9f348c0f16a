use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{Value, json};
use uuid::Uuid;

use prophunt_core::test_helpers::ready_arena;
use prophunt_core::Arena;
use prophunt_server::build_app;
use prophunt_server::config::ServerConfig;

pub struct TestServer {
    pub addr: SocketAddr,
    client: reqwest::Client,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server serving one ready arena named `docks`.
    pub async fn new() -> Self {
        Self::with_arenas(vec![ready_arena("docks")]).await
    }

    pub async fn with_arenas(arenas: Vec<Arena>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app(ServerConfig::default(), arenas);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            client: reqwest::Client::new(),
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/api/v1{path}", self.addr)
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn post_empty(&self, path: &str) -> reqwest::Response {
        self.client.post(self.url(path)).send().await.unwrap()
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    /// Join a fresh player to `arena` and return their id.
    pub async fn join(&self, arena: &str, name: &str) -> Uuid {
        let player = Uuid::new_v4();
        let resp = self
            .post(
                &format!("/arenas/{arena}/join"),
                json!({ "player": player, "name": name }),
            )
            .await;
        assert_eq!(resp.status(), 201, "join failed for {name}");
        player
    }

    /// The team a player was assigned, read from the arena snapshot.
    pub async fn team_of(&self, arena: &str, player: Uuid) -> String {
        let (_, snapshot) = self.get_json(&format!("/arenas/{arena}")).await;
        snapshot["participants"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == json!(player))
            .map(|p| p["team"].as_str().unwrap().to_string())
            .unwrap()
    }
}
