//! Internationalization (i18n) module.
//!
//! - `registry`: the fixed set of supported locales and the configured default
//! - `locale`: the validated `Locale` type and the lenient URL-segment resolver
//! - `metrics`: fallback and cache counters surfaced on `/health`
//!
//! # Example
//!
//! ```rust,ignore
//! use mlm_cms::i18n::{resolve_locale, Locale, LocaleRegistry};
//!
//! let registry = LocaleRegistry::builtin();
//! assert_eq!(resolve_locale(registry, "es"), Locale::SPANISH);
//! assert_eq!(resolve_locale(registry, "xx"), Locale::ENGLISH);
//! ```

mod locale;
mod metrics;
mod registry;

pub use locale::{resolve_locale, Locale};
pub use metrics::{ContentMetrics, MetricsReport};
pub use registry::{LocaleConfig, LocaleRegistry};
