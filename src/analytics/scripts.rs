use std::fmt::{self, Write as _};

use crate::analytics::api::{use_ga_context, Scope};
use crate::analytics::config::GaSettings;
use crate::analytics::constants::GTAG_INIT_SCRIPT_ID;
use crate::analytics::error::{internal_error, GtagResult};

/// A single `<script>` element, either loading `src` or carrying an inline body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptTag {
    pub id: Option<String>,
    pub src: Option<String>,
    pub is_async: bool,
    pub inline: Option<String>,
}

impl fmt::Display for ScriptTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<script")?;
        if self.is_async {
            f.write_str(" async")?;
        }
        if let Some(id) = &self.id {
            write!(f, " id=\"{}\"", escape_attribute(id))?;
        }
        if let Some(src) = &self.src {
            write!(f, " src=\"{}\"", escape_attribute(src))?;
        }
        f.write_char('>')?;
        if let Some(body) = &self.inline {
            f.write_str(body)?;
        }
        f.write_str("</script>")
    }
}

/// The loader and init tags produced by [`GaScripts::render`]. Empty when tracking is disabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptTags {
    tags: Vec<ScriptTag>,
}

impl ScriptTags {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &[ScriptTag] {
        &self.tags
    }

    pub fn loader(&self) -> Option<&ScriptTag> {
        self.tags.first()
    }

    pub fn init(&self) -> Option<&ScriptTag> {
        self.tags.get(1)
    }

    /// Serializes the tags for server-side rendering into a document `<head>`.
    pub fn to_html(&self) -> String {
        self.tags.iter().map(ScriptTag::to_string).collect()
    }
}

impl IntoIterator for ScriptTags {
    type Item = ScriptTag;
    type IntoIter = std::vec::IntoIter<ScriptTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}

/// Emits the gtag.js loader and the inline snippet that boots the data layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GaScripts {
    lazy_load: bool,
}

impl Default for GaScripts {
    fn default() -> Self {
        Self { lazy_load: true }
    }
}

impl GaScripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `lazy_load` is false the loader tag blocks parsing instead of loading `async`.
    pub fn with_lazy_load(lazy_load: bool) -> Self {
        Self { lazy_load }
    }

    pub fn lazy_load(&self) -> bool {
        self.lazy_load
    }

    /// Builds the tags for the provider enclosing `scope`.
    pub fn render(&self, scope: &Scope<'_>) -> GtagResult<ScriptTags> {
        let context = use_ga_context(scope)?;
        match context.tracking_id() {
            Some(tracking_id) => build_script_tags(context.settings(), tracking_id, self.lazy_load),
            None => Ok(ScriptTags::default()),
        }
    }
}

pub fn build_script_tags(
    settings: &GaSettings,
    tracking_id: &str,
    lazy_load: bool,
) -> GtagResult<ScriptTags> {
    settings.validate()?;
    let loader = ScriptTag {
        id: None,
        src: Some(settings.loader_url(tracking_id)?.to_string()),
        is_async: lazy_load,
        inline: None,
    };
    let init = ScriptTag {
        id: Some(GTAG_INIT_SCRIPT_ID.to_string()),
        src: None,
        is_async: true,
        inline: Some(init_script(&settings.data_layer_name, tracking_id)?),
    };
    Ok(ScriptTags {
        tags: vec![loader, init],
    })
}

/// The inline bootstrap. `page_path` is read from `window.location` when the script runs.
pub(crate) fn init_script(data_layer_name: &str, tracking_id: &str) -> GtagResult<String> {
    let tracking_id = js_string_literal(tracking_id)?;
    Ok(format!(
        r#"
      window.{data_layer_name} = window.{data_layer_name} || [];
      function gtag(){{window.{data_layer_name}.push(arguments);}}
      gtag('js', new Date());

      gtag('config', {tracking_id}, {{
        page_path: window.location.pathname,
      }});
    "#
    ))
}

// `<` is escaped so the literal can never close the surrounding script element.
fn js_string_literal(value: &str) -> GtagResult<String> {
    let literal = serde_json::to_string(value)
        .map_err(|err| internal_error(format!("Failed to encode tracking id: {err}")))?;
    Ok(literal.replace('<', "\\u003c"))
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::api::GaContextProvider;
    use crate::analytics::error::GtagErrorCode;
    use crate::analytics::gtag::RecordingGtag;
    use crate::logger::tests::logger_test_guard;
    use std::sync::Arc;

    fn render(tracking_id: Option<&str>, scripts: GaScripts) -> ScriptTags {
        let provider =
            GaContextProvider::with_tracking_id(tracking_id, Arc::new(RecordingGtag::new()));
        provider.render(|scope| scripts.render(&scope)).unwrap()
    }

    #[test]
    fn lazy_load_defaults_to_async_loader() {
        let tags = render(Some("UA-123"), GaScripts::new());
        let loader = tags.loader().unwrap();
        assert!(loader.is_async);
        assert_eq!(
            loader.src.as_deref(),
            Some("https://www.googletagmanager.com/gtag/js?id=UA-123")
        );
        assert_eq!(
            loader.to_string(),
            r#"<script async src="https://www.googletagmanager.com/gtag/js?id=UA-123"></script>"#
        );
    }

    #[test]
    fn eager_loader_is_not_async() {
        let tags = render(Some("UA-123"), GaScripts::with_lazy_load(false));
        let loader = tags.loader().unwrap();
        assert!(!loader.is_async);
        assert!(!loader.to_string().contains("async"));
        assert!(tags.init().unwrap().is_async);
    }

    #[test]
    fn init_script_reads_path_when_executed() {
        let tags = render(Some("UA-123"), GaScripts::new());
        let init = tags.init().unwrap();
        assert_eq!(init.id.as_deref(), Some("gtag-init"));

        let body = init.inline.as_deref().unwrap();
        assert!(body.contains("window.dataLayer = window.dataLayer || [];"));
        assert!(body.contains("function gtag(){window.dataLayer.push(arguments);}"));
        assert!(body.contains("gtag('js', new Date());"));
        assert!(body.contains(r#"gtag('config', "UA-123", {"#));
        assert!(body.contains("page_path: window.location.pathname,"));
    }

    #[test]
    fn custom_data_layer_is_used() {
        let body = init_script("gaLayer", "G-1").unwrap();
        assert!(body.contains("window.gaLayer = window.gaLayer || [];"));
        assert!(!body.contains("dataLayer"));
    }

    #[test]
    fn tracking_id_cannot_escape_the_script() {
        let hostile = r#"x"</script><script>alert(1)//"#;
        let body = init_script("dataLayer", hostile).unwrap();
        assert!(!body.contains("</script>"));
        assert!(body.contains(r#""x\"\u003c/script>\u003cscript>alert(1)//""#));

        let tags = build_script_tags(&GaSettings::default(), hostile, true).unwrap();
        let html = tags.to_html();
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn to_html_emits_loader_then_init() {
        let html = render(Some("G-ABC"), GaScripts::new()).to_html();
        let loader_at = html.find("gtag/js?id=G-ABC").unwrap();
        let init_at = html.find(r#"id="gtag-init""#).unwrap();
        assert!(loader_at < init_at);
        assert!(html.starts_with("<script async src="));
    }

    #[test]
    fn disabled_provider_renders_no_tags() {
        let _guard = logger_test_guard();
        let tags = render(None, GaScripts::new());
        assert!(tags.is_empty());
        assert_eq!(tags.to_html(), "");
    }

    #[test]
    fn rendering_outside_provider_fails() {
        let err = GaScripts::new().render(&Scope::root()).unwrap_err();
        assert_eq!(err.code, GtagErrorCode::ContextUnavailable);
    }

    #[test]
    fn invalid_settings_are_reported() {
        let settings = GaSettings::new(Some("UA-1")).with_data_layer_name("1layer");
        let err = build_script_tags(&settings, "UA-1", true).unwrap_err();
        assert_eq!(err.code, GtagErrorCode::InvalidArgument);
    }
}
