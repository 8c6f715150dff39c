use actix_web::{
    App,
    HttpRequest,
    HttpResponse,
    HttpServer,
    dev::ServerHandle,
    web,
};
use serde_json::{
    Value,
    json,
};
use std::{
    net::TcpListener,
    sync::{
        Arc,
        Mutex,
    },
    thread::JoinHandle,
    time::Duration,
};
use web_board::config::BoardConfig;

/// What the fake scoreboard answers with. Tests mutate it between polls.
pub struct FakeState {
    pub game: Value,
    pub can_start: bool,
    pub can_start_reply: String,
    pub status_reply: String,
    pub control_reply: String,
    pub status_delay: Option<Duration>,
    pub requests: Vec<String>,
}

impl Default for FakeState {
    fn default() -> Self {
        FakeState {
            game: game_json("stopped", [0, 0, 0, 0], None),
            can_start: true,
            can_start_reply: "ok".to_string(),
            status_reply: "ok".to_string(),
            control_reply: "ok".to_string(),
            status_delay: None,
            requests: Vec::new(),
        }
    }
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeBoard {
    base_url: String,
    state: Shared,
    server_handle: ServerHandle,
    server_thread: Option<JoinHandle<()>>,
}

impl FakeBoard {
    pub fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let server_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(server_state.clone()))
                .default_service(web::to(handle_any))
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();

        let server_handle = server.handle();
        let server_thread = std::thread::spawn(move || {
            let sys = actix_web::rt::System::new();
            let _ = sys.block_on(server);
        });

        Self {
            base_url,
            state,
            server_handle,
            server_thread: Some(server_thread),
        }
    }

    pub fn config(&self) -> BoardConfig {
        BoardConfig {
            poll_interval: Duration::from_millis(200),
            request_timeout: Duration::from_millis(150),
            ..BoardConfig::new(self.base_url.clone())
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|p| p.as_str() == path).count()
    }

    /// Polls the request log until `path` shows up or the deadline passes.
    pub async fn wait_for(&self, path: &str) -> bool {
        for _ in 0..100 {
            if self.count(path) > 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

impl Drop for FakeBoard {
    fn drop(&mut self) {
        let _ = self.server_handle.stop(false);
        if let Some(thread) = self.server_thread.take() {
            let _ = thread.join();
        }
    }
}

async fn handle_any(req: HttpRequest, state: web::Data<Shared>) -> HttpResponse {
    let path = req.path().to_string();
    let (delay, body) = {
        let mut state = state.lock().unwrap();
        state.requests.push(path.clone());
        match path.as_str() {
            "/status/game" => {
                let mut body = state.game.clone();
                body["status"] = json!(state.status_reply);
                (state.status_delay, body)
            }
            "/status/can_start" => (
                None,
                json!({"status": state.can_start_reply, "can_start": state.can_start}),
            ),
            _ => (None, json!({"status": state.control_reply})),
        }
    };
    if let Some(delay) = delay {
        actix_web::rt::time::sleep(delay).await;
    }
    HttpResponse::Ok().json(body)
}

/// Status payload with four registered players.
pub fn game_json(game: &str, scores: [i32; 4], serving: Option<u8>) -> Value {
    json!({
        "status": "ok",
        "game": game,
        "players": {
            "0": {"registered": true, "web_txt": "Ann"},
            "1": {"registered": true, "web_txt": "Bob"},
            "2": {"registered": true, "web_txt": "Cid"},
            "3": {"registered": true, "web_txt": "Dee"}
        },
        "scores": {
            "0": scores[0], "1": scores[1], "2": scores[2], "3": scores[3],
            "status": "ok"
        },
        "serving": serving,
        "tournament": false,
        "tournament_str": "",
        "game_id": null,
        "remaining_time": 600,
        "game_seq": null
    })
}
