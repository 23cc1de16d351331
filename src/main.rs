//! Smart Queue Console Entry Point

mod api;
mod app;
mod components;
mod config;
mod context;
mod error;
mod hooks;
mod logging;
mod mirror;
mod models;
mod notify;
mod queue;
mod session;
mod store;
mod timer;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    mount_to_body(App);
}
