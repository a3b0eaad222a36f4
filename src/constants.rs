pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9090";
pub const DEFAULT_LOG_FILTER: &str = "info,actix_web=info";

/// Rows shown by the ranking pages when no `limit` is given.
pub const DEFAULT_TOP_LIMIT: u32 = 20;
/// Rows shown in the compact tables of the overview page.
pub const OVERVIEW_TOP_LIMIT: u32 = 5;
pub const MAX_TOP_LIMIT: u32 = 500;

/// Platforms offered by the genre × platform selector.
pub const SELECTOR_PLATFORMS: usize = 10;
/// Named slices before the rest is folded into "Others".
pub const SHARE_HEAD: usize = 5;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
