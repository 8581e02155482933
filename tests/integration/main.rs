//! Integration tests with mock HTTP server

mod analyze;
mod export;
mod mock_server;
