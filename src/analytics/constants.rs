pub const GTAG_SCRIPT_URL: &str = "https://www.googletagmanager.com/gtag/js";
pub const DEFAULT_DATA_LAYER_NAME: &str = "dataLayer";
pub const DEFAULT_GTAG_FUNCTION_NAME: &str = "gtag";
pub const GTAG_INIT_SCRIPT_ID: &str = "gtag-init";

pub const COMMAND_CONFIG: &str = "config";
pub const COMMAND_EVENT: &str = "event";

pub const PARAM_PAGE_PATH: &str = "page_path";
pub const PARAM_EVENT_CATEGORY: &str = "event_category";
pub const PARAM_EVENT_LABEL: &str = "event_label";
pub const PARAM_VALUE: &str = "value";
