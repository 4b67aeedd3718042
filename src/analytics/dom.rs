use wasm_bindgen::{JsCast, JsValue};

use crate::analytics::error::{host_unavailable, GtagResult};
use crate::analytics::scripts::{ScriptTag, ScriptTags};

/// Appends `tags` to `document.head` (or `body` when there is no head).
///
/// A loader whose `src` already exists is skipped, so calling this again after a re-render does
/// not load gtag.js twice. An inline tag is skipped only when the element with its `id` carries
/// the same body; a stale one (for example configured with a previous tracking id) is removed and
/// inserted again so the new `config` command runs.
pub fn inject_scripts(tags: &ScriptTags) -> GtagResult<()> {
    let window = web_sys::window().ok_or_else(|| host_unavailable("Window not available"))?;
    let document = window
        .document()
        .ok_or_else(|| host_unavailable("Document not available"))?;

    for tag in tags.tags() {
        if already_injected(&document, tag) {
            log::debug!("gtag script already present, skipping: {tag:?}");
            continue;
        }
        let script = create_script(&document, tag)?;
        if let Some(head) = document.head() {
            head.append_child(&script).map_err(|err| {
                host_unavailable(format!("Failed to append script to <head>: {err:?}"))
            })?;
        } else if let Some(body) = document.body() {
            body.append_child(&script).map_err(|err| {
                host_unavailable(format!("Failed to append script to <body>: {err:?}"))
            })?;
        } else {
            return Err(host_unavailable("No <head> or <body> element found"));
        }
    }
    Ok(())
}

fn already_injected(document: &web_sys::Document, tag: &ScriptTag) -> bool {
    if let Some(id) = &tag.id {
        if let Some(existing) = document.get_element_by_id(id) {
            if existing.text_content() == tag.inline {
                return true;
            }
            log::debug!("replacing stale gtag script #{id}");
            existing.remove();
            return false;
        }
    }
    match &tag.src {
        Some(src) => document
            .query_selector(&format!("script[src=\"{src}\"]"))
            .ok()
            .flatten()
            .is_some(),
        None => false,
    }
}

fn create_script(document: &web_sys::Document, tag: &ScriptTag) -> GtagResult<web_sys::HtmlScriptElement> {
    let script = document
        .create_element("script")
        .map_err(|err| host_unavailable(format!("Failed to create script: {err:?}")))?
        .dyn_into::<web_sys::HtmlScriptElement>()
        .map_err(|_| host_unavailable("Script element has wrong type"))?;

    // Inserted scripts are async unless told otherwise.
    script.set_async(tag.is_async);
    if let Some(id) = &tag.id {
        script.set_id(id);
    }
    if let Some(src) = &tag.src {
        script.set_src(src);
    }
    if let Some(body) = &tag.inline {
        script.set_text(body).map_err(|err: JsValue| {
            host_unavailable(format!("Failed to set script body: {err:?}"))
        })?;
    }
    Ok(script)
}
