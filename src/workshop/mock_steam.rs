//! Mock Steam endpoints for the blocking client tests.
//!
//! `wiremock` is async. The server lives on its own runtime and the blocking
//! `reqwest` calls run outside of it.

use tokio::runtime::Runtime;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub struct MockSteam {
    // Dropped before the runtime it runs on
    server: MockServer,
    runtime: Runtime,
}

impl MockSteam {
    pub fn start() -> Self {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// Answer `GET route` with `status` and `body`.
    pub fn get(&self, route: &str, status: u16, body: &str) {
        self.mount(
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(status).set_body_string(body)),
        );
    }

    /// Answer `POST route` with `status` and `body`.
    pub fn post(&self, route: &str, status: u16, body: &str) {
        self.mount(
            Mock::given(method("POST"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(status).set_body_string(body)),
        );
    }

    /// Answer `POST route` whose form body contains `needle`.
    pub fn post_matching(&self, route: &str, needle: &str, body: &str) {
        self.mount(
            Mock::given(method("POST"))
                .and(path(route))
                .and(body_string_contains(needle))
                .respond_with(ResponseTemplate::new(200).set_body_string(body)),
        );
    }

    pub fn requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }
}

/// Form body of a recorded request.
pub fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}
