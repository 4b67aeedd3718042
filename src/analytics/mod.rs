mod api;
mod config;
mod constants;
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod dom;
pub mod error;
mod gtag;
mod scripts;

#[cfg(all(feature = "yew", target_arch = "wasm32"))]
pub(crate) use api::LOGGER;
pub use api::{
    use_ga_context, EventCallback, EventPayload, GaContext, GaContextProvider, PageViewCallback,
    Scope,
};
pub use config::GaSettings;
pub use constants::{DEFAULT_DATA_LAYER_NAME, GTAG_INIT_SCRIPT_ID, GTAG_SCRIPT_URL};
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use dom::inject_scripts;
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use gtag::WindowGtag;
pub use gtag::{GtagCall, GtagDispatcher, GtagOptions, RecordingGtag, SharedGtagDispatcher};
pub use scripts::{build_script_tags, GaScripts, ScriptTag, ScriptTags};
