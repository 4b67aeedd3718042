//! Yew bindings for the analytics context.
//!
//! ```ignore
//! use gtag_context::components::{GaContextProvider, GaScripts};
//! use yew::prelude::*;
//!
//! #[function_component(App)]
//! fn app() -> Html {
//!     html! {
//!         <GaContextProvider tracking_id={Some(AttrValue::from("G-ABC123"))}>
//!             <GaScripts />
//!             <Router />
//!         </GaContextProvider>
//!     }
//! }
//! ```

use std::sync::Arc;

use yew::prelude::*;

use crate::analytics::error::{context_unavailable, GtagResult};
use crate::analytics::{
    build_script_tags, inject_scripts, GaContext, GaSettings, ScriptTags, SharedGtagDispatcher,
    WindowGtag, LOGGER,
};

/// A dispatcher handed to [`GaContextProvider`] as a prop; compares by identity.
#[derive(Clone)]
pub struct GtagHandle(pub SharedGtagDispatcher);

impl PartialEq for GtagHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Properties, PartialEq)]
pub struct GaContextProviderProps {
    #[prop_or_default]
    pub tracking_id: Option<AttrValue>,
    /// Defaults to the page's global `gtag` function.
    #[prop_or_default]
    pub gtag: Option<GtagHandle>,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(GaContextProvider)]
pub fn ga_context_provider(props: &GaContextProviderProps) -> Html {
    let context = use_memo(
        (props.tracking_id.clone(), props.gtag.clone()),
        |(tracking_id, gtag)| {
            let gtag = gtag
                .as_ref()
                .map(|handle| Arc::clone(&handle.0))
                .unwrap_or_else(|| Arc::new(WindowGtag::default()) as SharedGtagDispatcher);
            GaContext::new(GaSettings::new(tracking_id.as_deref()), gtag)
        },
    );

    html! {
        <ContextProvider<GaContext> context={(*context).clone()}>
            { props.children.clone() }
        </ContextProvider<GaContext>>
    }
}

/// Reads the context published by the nearest [`GaContextProvider`].
#[hook]
pub fn use_ga_context() -> GtagResult<GaContext> {
    use_context::<GaContext>()
        .ok_or_else(|| context_unavailable("use_ga_context cannot be used outside of GaContextProvider"))
}

#[derive(Properties, PartialEq)]
pub struct GaScriptsProps {
    #[prop_or(true)]
    pub lazy_load: bool,
}

/// Injects the gtag.js loader and init scripts into `document.head` once mounted.
#[function_component(GaScripts)]
pub fn ga_scripts(props: &GaScriptsProps) -> Html {
    let context = use_ga_context();
    let tags = context.and_then(|context| match context.tracking_id() {
        Some(tracking_id) => build_script_tags(context.settings(), tracking_id, props.lazy_load),
        None => Ok(ScriptTags::default()),
    });

    use_effect_with(tags, |tags| {
        if let Err(err) = tags.as_ref().map_err(Clone::clone).and_then(inject_scripts) {
            LOGGER.error(format!("Failed to inject gtag scripts: {err}"));
        }
        || ()
    });

    Html::default()
}
