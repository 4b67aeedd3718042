#![cfg(all(target_arch = "wasm32", feature = "yew"))]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use gloo_timers::future::TimeoutFuture;
use gtag_context::analytics::error::{GtagErrorCode, GtagResult};
use gtag_context::analytics::{GaContext, RecordingGtag, SharedGtagDispatcher};
use gtag_context::components::{use_ga_context, GaContextProvider, GaScripts, GtagHandle};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use yew::prelude::*;

wasm_bindgen_test_configure!(run_in_browser);

/// Every value `use_ga_context` returned, one entry per render of [`Reader`].
#[derive(Clone, Default)]
struct Seen(Rc<RefCell<Vec<GtagResult<GaContext>>>>);

impl PartialEq for Seen {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Properties, PartialEq)]
struct ReaderProps {
    seen: Seen,
    #[prop_or_default]
    round: u32,
}

#[function_component(Reader)]
fn reader(props: &ReaderProps) -> Html {
    let context = use_ga_context();
    props.seen.0.borrow_mut().push(context);
    html! { <span>{ props.round }</span> }
}

#[derive(Properties, PartialEq)]
struct TrackedAppProps {
    seen: Seen,
    gtag: GtagHandle,
}

// Bumps `round` once after mounting so the provider renders again with new children.
#[function_component(TrackedApp)]
fn tracked_app(props: &TrackedAppProps) -> Html {
    let round = use_state(|| 0u32);
    {
        let round = round.clone();
        use_effect_with((), move |_| {
            round.set(1);
            || ()
        });
    }

    html! {
        <GaContextProvider tracking_id={Some(AttrValue::from("G-YEW1"))} gtag={Some(props.gtag.clone())}>
            <Reader seen={props.seen.clone()} round={*round} />
        </GaContextProvider>
    }
}

#[function_component(EagerScriptsApp)]
fn eager_scripts_app() -> Html {
    html! {
        <GaContextProvider tracking_id={Some(AttrValue::from("G-YEW2"))}>
            <GaScripts lazy_load={false} />
        </GaContextProvider>
    }
}

fn mount_root() -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let root = document.create_element("div").unwrap();
    document.body().unwrap().append_child(&root).unwrap();
    root
}

async fn settle() {
    TimeoutFuture::new(50).await;
}

#[wasm_bindgen_test]
async fn provider_keeps_callbacks_across_rerenders() {
    let seen = Seen::default();
    let recording = Arc::new(RecordingGtag::new());
    let gtag = GtagHandle(recording.clone() as SharedGtagDispatcher);

    yew::Renderer::<TrackedApp>::with_root_and_props(
        mount_root(),
        TrackedAppProps {
            seen: seen.clone(),
            gtag,
        },
    )
    .render();
    settle().await;

    let seen = seen.0.borrow();
    assert!(seen.len() >= 2, "reader rendered {} time(s)", seen.len());
    let first = seen[0].as_ref().unwrap();
    assert!(first.is_enabled());
    for context in seen.iter().skip(1) {
        let context = context.as_ref().unwrap();
        assert_eq!(context, first);
        assert!(Arc::ptr_eq(
            first.track_page_view().unwrap(),
            context.track_page_view().unwrap()
        ));
        assert!(Arc::ptr_eq(
            first.track_event().unwrap(),
            context.track_event().unwrap()
        ));
    }

    first.page_view("/yew").unwrap();
    let calls = recording.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].command, "config");
    assert_eq!(calls[0].target, "G-YEW1");
}

#[wasm_bindgen_test]
async fn hook_outside_provider_reports_context_unavailable() {
    let seen = Seen::default();

    yew::Renderer::<Reader>::with_root_and_props(
        mount_root(),
        ReaderProps {
            seen: seen.clone(),
            round: 0,
        },
    )
    .render();
    settle().await;

    let seen = seen.0.borrow();
    let err = seen[0].as_ref().unwrap_err();
    assert_eq!(err.code, GtagErrorCode::ContextUnavailable);
    assert_eq!(
        err.message(),
        "use_ga_context cannot be used outside of GaContextProvider"
    );
}

#[wasm_bindgen_test]
async fn eager_scripts_component_injects_blocking_loader_and_init() {
    yew::Renderer::<EagerScriptsApp>::with_root(mount_root()).render();
    settle().await;

    let document = web_sys::window().unwrap().document().unwrap();
    let loader = document
        .query_selector("script[src=\"https://www.googletagmanager.com/gtag/js?id=G-YEW2\"]")
        .unwrap()
        .expect("loader script injected")
        .dyn_into::<web_sys::HtmlScriptElement>()
        .unwrap();
    assert!(!loader.async_());

    let init = document.get_element_by_id("gtag-init").expect("init script injected");
    assert!(init.text_content().unwrap().contains("\"G-YEW2\""));
}
