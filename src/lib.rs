//! Google Analytics (`gtag.js`) integration for Rust web frontends.
//!
//! A [`GaContextProvider`](analytics::GaContextProvider) owns the tracking id and hands
//! descendants a [`GaContext`](analytics::GaContext) with two callbacks: page views and custom
//! events. [`GaScripts`](analytics::GaScripts) emits the loader and bootstrap `<script>` tags.
//! Every call reaches the analytics library through a [`GtagDispatcher`](analytics::GtagDispatcher),
//! bound to `window.gtag` in the browser (feature `wasm-web`) and to a recorder in tests.
//!
//! ```
//! use std::sync::Arc;
//! use gtag_context::analytics::{use_ga_context, EventPayload, GaContextProvider, GaScripts, RecordingGtag};
//!
//! let gtag = Arc::new(RecordingGtag::new());
//! let provider = GaContextProvider::with_tracking_id(Some("G-ABC123"), gtag.clone());
//!
//! let head = provider.render(|scope| {
//!     let ga = use_ga_context(&scope).unwrap();
//!     ga.page_view("/pricing").unwrap();
//!     ga.event(&EventPayload::new("signup").unwrap().with_category("cta")).unwrap();
//!     GaScripts::new().render(&scope).unwrap().to_html()
//! });
//!
//! assert_eq!(gtag.calls().len(), 2);
//! assert!(head.contains("gtag/js?id=G-ABC123"));
//! ```

pub mod analytics;
#[cfg(all(feature = "yew", target_arch = "wasm32"))]
pub mod components;
pub mod logger;
