use std::io::{Cursor, Read as _};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How the stub answers cover image probes.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum ImageBehavior {
    Image,
    NotFound,
    Html,
    Slow(Duration),
}

#[derive(Debug, Clone)]
pub struct StubScript {
    pub catalog_status: u16,
    pub catalog_body: String,
    pub image: ImageBehavior,
    pub bot_body: String,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or("")
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is json")
    }
}

/// Catalog, image host and bot API on one local port.
pub struct HttpStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    script: Arc<Mutex<StubScript>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

type StubResponse = tiny_http::Response<Cursor<Vec<u8>>>;

impl HttpStub {
    pub fn spawn(script: StubScript) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start stub server");
        let base_url = format!("http://{}", server.server_addr());

        let requests = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(Mutex::new(script));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread_requests = Arc::clone(&requests);
        let thread_script = Arc::clone(&script);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);

                let recorded = Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string(), h.value.to_string()))
                        .collect(),
                    body,
                };

                let script = thread_script.lock().unwrap().clone();
                let response = respond(&script, &recorded);
                thread_requests.lock().unwrap().push(recorded);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            script,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path_suffix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path().ends_with(path_suffix))
            .collect()
    }

    #[allow(dead_code)]
    pub fn set_bot_body(&self, body: &str) {
        self.script.lock().unwrap().bot_body = body.to_string();
    }
}

impl Drop for HttpStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn header(name: &str, value: &str) -> tiny_http::Header {
    tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("valid header")
}

fn respond(script: &StubScript, request: &Recorded) -> StubResponse {
    let path = request.path();

    if path == "/catalog" && request.method == "GET" {
        return tiny_http::Response::from_data(script.catalog_body.clone().into_bytes())
            .with_status_code(script.catalog_status)
            .with_header(header("Content-Type", "application/json"));
    }

    if path.starts_with("/img/") && request.method == "HEAD" {
        return match script.image {
            ImageBehavior::Image => tiny_http::Response::from_data(Vec::new())
                .with_header(header("Content-Type", "image/jpeg")),
            ImageBehavior::NotFound => {
                tiny_http::Response::from_data(Vec::new()).with_status_code(404)
            }
            ImageBehavior::Html => tiny_http::Response::from_data(Vec::new())
                .with_header(header("Content-Type", "text/html; charset=utf-8")),
            ImageBehavior::Slow(delay) => {
                thread::sleep(delay);
                tiny_http::Response::from_data(Vec::new())
                    .with_header(header("Content-Type", "image/jpeg"))
            }
        };
    }

    if path.starts_with("/bot") && request.method == "POST" {
        return tiny_http::Response::from_data(script.bot_body.clone().into_bytes())
            .with_header(header("Content-Type", "application/json"));
    }

    tiny_http::Response::from_data(b"not found".to_vec()).with_status_code(404)
}
