//! The seam between the tracking callbacks and the host's global `gtag` function.
//!
//! Tracking code never touches `window.gtag` directly. It talks to a [`GtagDispatcher`], which
//! production wiring binds to the browser global ([`WindowGtag`], behind the `wasm-web` feature)
//! and tests bind to a [`RecordingGtag`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::analytics::error::GtagResult;

pub type GtagOptions = BTreeMap<String, String>;

/// Forwards a single `gtag(command, target, options)` call to the analytics library.
pub trait GtagDispatcher: Send + Sync {
    fn dispatch(
        &self,
        command: &str,
        target: &str,
        options: &GtagOptions,
    ) -> GtagResult<()>;
}

pub type SharedGtagDispatcher = Arc<dyn GtagDispatcher>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GtagCall {
    pub command: String,
    pub target: String,
    pub options: GtagOptions,
}

impl GtagCall {
    pub fn new(command: impl Into<String>, target: impl Into<String>, options: GtagOptions) -> Self {
        Self {
            command: command.into(),
            target: target.into(),
            options,
        }
    }
}

impl fmt::Display for GtagCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = serde_json::to_string(&self.options).map_err(|_| fmt::Error)?;
        write!(f, "gtag('{}', '{}', {options})", self.command, self.target)
    }
}

/// Dispatcher that keeps every call in memory instead of reaching the browser.
///
/// Useful for unit tests and for server-side rendering where no `window` exists.
#[derive(Debug, Default)]
pub struct RecordingGtag {
    calls: Mutex<Vec<GtagCall>>,
}

impl RecordingGtag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GtagCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take_calls(&self) -> Vec<GtagCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl GtagDispatcher for RecordingGtag {
    fn dispatch(
        &self,
        command: &str,
        target: &str,
        options: &GtagOptions,
    ) -> GtagResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(GtagCall::new(command, target, options.clone()));
        Ok(())
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use window::WindowGtag;

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod window {
    use wasm_bindgen::{JsCast, JsValue};

    use super::{GtagDispatcher, GtagOptions};
    use crate::analytics::constants::DEFAULT_GTAG_FUNCTION_NAME;
    use crate::analytics::error::{host_unavailable, GtagResult};

    /// Calls the global `gtag` function installed by the init script.
    ///
    /// The function is looked up on every dispatch, so a dispatcher created before the script
    /// runs still works once it has.
    #[derive(Clone, Debug)]
    pub struct WindowGtag {
        function_name: String,
    }

    impl Default for WindowGtag {
        fn default() -> Self {
            Self::new(DEFAULT_GTAG_FUNCTION_NAME)
        }
    }

    impl WindowGtag {
        pub fn new(function_name: impl Into<String>) -> Self {
            Self {
                function_name: function_name.into(),
            }
        }

        fn resolve(&self) -> GtagResult<js_sys::Function> {
            let global = js_sys::global();
            let value = js_sys::Reflect::get(&global, &JsValue::from_str(&self.function_name))
                .map_err(|err| host_unavailable(js_error_message(err)))?;
            value.dyn_into::<js_sys::Function>().map_err(|_| {
                host_unavailable(format!("`window.{}` is not a function", self.function_name))
            })
        }
    }

    impl GtagDispatcher for WindowGtag {
        fn dispatch(&self, command: &str, target: &str, options: &GtagOptions) -> GtagResult<()> {
            let function = self.resolve()?;
            let params = js_sys::Object::new();
            for (key, value) in options {
                js_sys::Reflect::set(&params, &JsValue::from_str(key), &JsValue::from_str(value))
                    .map_err(|err| host_unavailable(js_error_message(err)))?;
            }
            function
                .call3(
                    &JsValue::NULL,
                    &JsValue::from_str(command),
                    &JsValue::from_str(target),
                    &params,
                )
                .map_err(|err| host_unavailable(js_error_message(err)))?;
            Ok(())
        }
    }

    fn js_error_message(value: JsValue) -> String {
        if let Some(error) = value.dyn_ref::<js_sys::Error>() {
            String::from(error.message())
        } else if let Some(text) = value.as_string() {
            text
        } else {
            format!("{value:?}")
        }
    }
}
