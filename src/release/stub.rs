//! Stub HTTP server for unit tests
//!
//! wiremock is async; the code under test uses `reqwest::blocking`, which
//! must not run inside a tokio context. The stub owns its runtime and only
//! enters it to start the server, mount mocks and read recorded requests.

use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

pub(crate) struct StubServer {
  // Dropped before the runtime so expectation checks run first
  server: MockServer,
  runtime: Runtime,
}

impl StubServer {
  pub(crate) fn start() -> Self {
    let runtime = tokio::runtime::Builder::new_multi_thread()
      .worker_threads(1)
      .enable_all()
      .build()
      .expect("failed to build tokio runtime");
    let server = runtime.block_on(MockServer::start());
    Self { server, runtime }
  }

  pub(crate) fn uri(&self) -> String {
    self.server.uri()
  }

  pub(crate) fn mount(&self, mock: Mock) {
    self.runtime.block_on(mock.mount(&self.server));
  }

  pub(crate) fn requests(&self) -> Vec<Request> {
    self
      .runtime
      .block_on(self.server.received_requests())
      .unwrap_or_default()
  }
}
