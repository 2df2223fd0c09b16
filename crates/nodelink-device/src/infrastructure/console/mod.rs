//! The browser console: a small HTTP/1.1 server and its two pages.
//!
//! - **`server`** – Accept loop, request parsing, response encoding.
//! - **`routes`** – Maps paths to console commands and replies to responses.
//! - **`pages`**  – The provisioning page and the dashboard.

pub mod pages;
pub mod routes;
pub mod server;

pub use server::{serve, ConsoleError, HttpRequest, HttpResponse};
