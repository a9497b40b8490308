//! Medicare clinic web server and UI.
//!
//! This crate provides the Leptos-based interface for the clinic: session
//! handling, the route guard, table-backed pages, and the server functions
//! that proxy table access to the configured data source.

#![allow(non_snake_case)]

pub mod app;
pub mod components;
#[cfg(feature = "ssr")]
pub mod config;
pub mod data;
#[cfg(feature = "ssr")]
pub mod error;
pub mod hooks;
pub mod pages;
#[cfg(feature = "ssr")]
pub mod server_helpers;
pub mod session;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::App;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
