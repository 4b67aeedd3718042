use serde::Deserialize;
use url::Url;

use crate::analytics::constants::{DEFAULT_DATA_LAYER_NAME, GTAG_SCRIPT_URL};
use crate::analytics::error::{invalid_argument, GtagResult};

/// Tracking configuration owned by a [`GaContextProvider`](crate::analytics::GaContextProvider).
///
/// An empty tracking id is treated the same as a missing one. The struct deserializes from the
/// host application's own configuration, e.g. a JSON or TOML file:
///
/// ```
/// use gtag_context::analytics::GaSettings;
///
/// let settings: GaSettings = serde_json::from_str(r#"{ "tracking_id": "G-ABC123" }"#).unwrap();
/// assert_eq!(settings.tracking_id(), Some("G-ABC123"));
/// assert_eq!(settings.data_layer_name, "dataLayer");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GaSettings {
    pub tracking_id: Option<String>,
    pub data_layer_name: String,
    pub script_url: String,
}

impl Default for GaSettings {
    fn default() -> Self {
        Self {
            tracking_id: None,
            data_layer_name: DEFAULT_DATA_LAYER_NAME.to_string(),
            script_url: GTAG_SCRIPT_URL.to_string(),
        }
    }
}

impl GaSettings {
    pub fn new(tracking_id: Option<impl Into<String>>) -> Self {
        Self {
            tracking_id: tracking_id.map(Into::into),
            ..Default::default()
        }
    }

    pub fn with_data_layer_name(mut self, name: impl Into<String>) -> Self {
        self.data_layer_name = name.into();
        self
    }

    pub fn with_script_url(mut self, url: impl Into<String>) -> Self {
        self.script_url = url.into();
        self
    }

    /// Returns the tracking id without surrounding whitespace, or `None` when it is unset or blank.
    pub fn tracking_id(&self) -> Option<&str> {
        self.tracking_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn validate(&self) -> GtagResult<()> {
        if !is_js_identifier(&self.data_layer_name) {
            return Err(invalid_argument(format!(
                "Data layer name `{}` is not a valid JavaScript identifier",
                self.data_layer_name
            )));
        }
        self.parse_script_url()?;
        Ok(())
    }

    /// Builds the gtag.js URL for `tracking_id`, percent-encoding it into the `id` query parameter.
    pub fn loader_url(&self, tracking_id: &str) -> GtagResult<Url> {
        let mut url = self.parse_script_url()?;
        url.query_pairs_mut().append_pair("id", tracking_id);
        Ok(url)
    }

    fn parse_script_url(&self) -> GtagResult<Url> {
        Url::parse(&self.script_url).map_err(|err| {
            invalid_argument(format!("Invalid gtag script URL `{}`: {err}", self.script_url))
        })
    }
}

fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
