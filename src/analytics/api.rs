use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::Deserialize;

use crate::analytics::config::GaSettings;
use crate::analytics::constants::{
    COMMAND_CONFIG, COMMAND_EVENT, PARAM_EVENT_CATEGORY, PARAM_EVENT_LABEL, PARAM_PAGE_PATH,
    PARAM_VALUE,
};
use crate::analytics::error::{context_unavailable, invalid_argument, GtagError, GtagResult};
use crate::analytics::gtag::{GtagOptions, SharedGtagDispatcher};
use crate::logger::Logger;

pub(crate) static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@gtag-context/analytics"));

pub type PageViewCallback = Arc<dyn Fn(&str) -> GtagResult<()> + Send + Sync>;
pub type EventCallback = Arc<dyn Fn(&EventPayload) -> GtagResult<()> + Send + Sync>;

/// A custom analytics event. `action` must be non-empty; absent fields are left out of the
/// forwarded options.
///
/// Every way of building a payload ([`EventPayload::new`], a string map, serde) goes through the
/// same check, so a payload with an empty action cannot exist.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>")]
pub struct EventPayload {
    action: String,
    category: Option<String>,
    label: Option<String>,
    value: Option<String>,
}

impl EventPayload {
    pub fn new(action: impl Into<String>) -> GtagResult<Self> {
        let action = action.into();
        if action.trim().is_empty() {
            return Err(invalid_argument("Event payload is missing `action`"));
        }
        Ok(Self {
            action,
            category: None,
            label: None,
            value: None,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Translates the payload into the parameter names the gtag event schema expects.
    pub fn to_gtag_options(&self) -> GtagOptions {
        [
            (PARAM_EVENT_CATEGORY, &self.category),
            (PARAM_EVENT_LABEL, &self.label),
            (PARAM_VALUE, &self.value),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|value| (key.to_string(), value.clone())))
        .collect()
    }
}

impl TryFrom<BTreeMap<String, String>> for EventPayload {
    type Error = GtagError;

    fn try_from(mut map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut payload = Self::new(map.remove("action").unwrap_or_default())?;
        payload.category = map.remove("category");
        payload.label = map.remove("label");
        payload.value = map.remove("value");
        Ok(payload)
    }
}

/// The value a [`GaContextProvider`] shares with its descendants.
///
/// Both callbacks are present exactly when a tracking id is configured. Cloning is cheap and
/// keeps the callbacks' identity.
#[derive(Clone)]
pub struct GaContext {
    settings: Arc<GaSettings>,
    track_page_view: Option<PageViewCallback>,
    track_event: Option<EventCallback>,
}

impl fmt::Debug for GaContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaContext")
            .field("tracking_id", &self.tracking_id())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl PartialEq for GaContext {
    fn eq(&self, other: &Self) -> bool {
        self.settings == other.settings
            && same_callback(&self.track_page_view, &other.track_page_view)
            && same_callback(&self.track_event, &other.track_event)
    }
}

fn same_callback<T: ?Sized>(left: &Option<Arc<T>>, right: &Option<Arc<T>>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => Arc::ptr_eq(left, right),
        (None, None) => true,
        _ => false,
    }
}

impl GaContext {
    /// Builds the context for `settings`, wiring both callbacks to `gtag`.
    ///
    /// Without a tracking id this warns once and returns a disabled context.
    pub fn new(settings: GaSettings, gtag: SharedGtagDispatcher) -> Self {
        let Some(tracking_id) = settings.tracking_id().map(str::to_owned) else {
            LOGGER.warn("GA tracking id is not provided");
            return Self::disabled(settings);
        };

        let page_view_gtag = Arc::clone(&gtag);
        let track_page_view: PageViewCallback = Arc::new(move |path: &str| {
            let options = GtagOptions::from([(PARAM_PAGE_PATH.to_string(), path.to_string())]);
            log::debug!("gtag page view for {tracking_id}: {path}");
            page_view_gtag.dispatch(COMMAND_CONFIG, &tracking_id, &options)
        });

        let track_event: EventCallback = Arc::new(move |payload: &EventPayload| {
            log::debug!("gtag event {}", payload.action());
            gtag.dispatch(COMMAND_EVENT, payload.action(), &payload.to_gtag_options())
        });

        Self {
            settings: Arc::new(settings),
            track_page_view: Some(track_page_view),
            track_event: Some(track_event),
        }
    }

    fn disabled(settings: GaSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            track_page_view: None,
            track_event: None,
        }
    }

    pub fn settings(&self) -> &GaSettings {
        &self.settings
    }

    pub fn tracking_id(&self) -> Option<&str> {
        self.settings.tracking_id()
    }

    pub fn is_enabled(&self) -> bool {
        self.track_page_view.is_some()
    }

    pub fn track_page_view(&self) -> Option<&PageViewCallback> {
        self.track_page_view.as_ref()
    }

    pub fn track_event(&self) -> Option<&EventCallback> {
        self.track_event.as_ref()
    }

    /// Reports a page view, doing nothing when tracking is disabled.
    pub fn page_view(&self, path: &str) -> GtagResult<()> {
        match &self.track_page_view {
            Some(callback) => callback(path),
            None => Ok(()),
        }
    }

    /// Reports a custom event, doing nothing when tracking is disabled.
    pub fn event(&self, payload: &EventPayload) -> GtagResult<()> {
        match &self.track_event {
            Some(callback) => callback(payload),
            None => Ok(()),
        }
    }
}

/// What a component sees of its surrounding providers.
///
/// [`Scope::root`] is the scope outside of any provider; [`GaContextProvider::render`] hands its
/// children a scope carrying the provider's context.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scope<'a> {
    ga: Option<&'a GaContext>,
}

impl<'a> Scope<'a> {
    pub fn root() -> Self {
        Self { ga: None }
    }

    pub fn ga_context(&self) -> Option<&'a GaContext> {
        self.ga
    }
}

/// Returns the tracking context of the nearest provider.
///
/// Fails with `gtag/context-unavailable` when `scope` is not inside a [`GaContextProvider`].
pub fn use_ga_context<'a>(scope: &Scope<'a>) -> GtagResult<&'a GaContext> {
    scope
        .ga_context()
        .ok_or_else(|| context_unavailable("use_ga_context cannot be used outside of GaContextProvider"))
}

/// Owns the tracking configuration for an application tree.
///
/// The context, and with it both tracking callbacks, is built once in [`GaContextProvider::new`]
/// and reused by every render.
#[derive(Clone, Debug)]
pub struct GaContextProvider {
    context: GaContext,
}

impl GaContextProvider {
    pub fn new(settings: GaSettings, gtag: SharedGtagDispatcher) -> Self {
        Self {
            context: GaContext::new(settings, gtag),
        }
    }

    pub fn with_tracking_id(tracking_id: Option<impl Into<String>>, gtag: SharedGtagDispatcher) -> Self {
        Self::new(GaSettings::new(tracking_id), gtag)
    }

    pub fn context(&self) -> &GaContext {
        &self.context
    }

    /// Renders `children` inside this provider and returns their output untouched.
    pub fn render<R>(&self, children: impl FnOnce(Scope<'_>) -> R) -> R {
        children(Scope {
            ga: Some(&self.context),
        })
    }
}
