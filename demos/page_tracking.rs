//! Server-side rendering of the gtag bootstrap plus a couple of tracked interactions.
//! Swap `RecordingGtag` for `WindowGtag` (feature `wasm-web`) to talk to the real `window.gtag`.

use std::sync::Arc;

use gtag_context::analytics::{
    use_ga_context, EventPayload, GaContextProvider, GaScripts, GaSettings, RecordingGtag,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings: GaSettings = serde_json::from_str(r#"{ "tracking_id": "G-1234567890" }"#)?;
    let gtag = Arc::new(RecordingGtag::new());
    let provider = GaContextProvider::new(settings, gtag.clone());

    let head = provider.render(|scope| -> Result<String, Box<dyn std::error::Error>> {
        let ga = use_ga_context(&scope)?;
        ga.page_view("/docs/getting-started")?;
        ga.event(
            &EventPayload::new("download")?
                .with_category("docs")
                .with_label("quickstart.pdf")
                .with_value("1"),
        )?;
        Ok(GaScripts::new().render(&scope)?.to_html())
    })?;

    println!("<head>{head}</head>");
    for call in gtag.calls() {
        println!("Dispatched: {call}");
    }

    Ok(())
}
