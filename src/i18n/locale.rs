//! Locale type and the URL-segment locale resolver.

use crate::i18n::{ContentMetrics, LocaleConfig, LocaleRegistry};
use anyhow::{bail, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::warn;

/// A validated locale.
///
/// Only supported, enabled locales can be constructed, either strictly via
/// [`Locale::from_code`] or leniently via [`resolve_locale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    /// ISO 639-1 language code (e.g., "en", "es")
    code: &'static str,
}

impl Locale {
    pub const ENGLISH: Locale = Locale { code: "en" };
    pub const SPANISH: Locale = Locale { code: "es" };

    /// Create a Locale from a language code string.
    ///
    /// # Returns
    /// * `Ok(Locale)` if the code is valid and the locale is enabled
    /// * `Err` if the code is not found or the locale is disabled
    pub fn from_code(registry: &LocaleRegistry, code: &str) -> Result<Locale> {
        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Locale { code: config.code }),
            Some(_) => bail!("Locale '{}' is not enabled", code),
            None => bail!("Unknown locale code: '{}'", code),
        }
    }

    /// The canonical locale, source of truth for shared fields.
    pub fn canonical(registry: &LocaleRegistry) -> Locale {
        Locale {
            code: registry.canonical().code,
        }
    }

    /// The locale unsupported inputs fall back to.
    pub fn fallback(registry: &LocaleRegistry) -> Locale {
        Locale {
            code: registry.default_locale().code,
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full locale configuration.
    ///
    /// # Panics
    /// Panics if the code is missing from the static locale table, which
    /// cannot happen for a Locale built through this module.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::builtin()
            .get_by_code(self.code)
            .expect("Locale code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

/// Resolve a free-form locale tag (usually a URL path segment).
///
/// Returns the matching supported locale, or the registry's default when the
/// input is not supported. Never fails. Fallbacks are logged and counted so
/// broken links show up in `/health` instead of disappearing silently.
pub fn resolve_locale(registry: &LocaleRegistry, input: &str) -> Locale {
    let normalized = input.trim().to_ascii_lowercase();

    match registry.get_by_code(&normalized) {
        Some(config) if config.enabled => {
            ContentMetrics::global().record_resolution(false);
            Locale { code: config.code }
        }
        _ => {
            ContentMetrics::global().record_resolution(true);
            let fallback = Locale::fallback(registry);
            warn!(requested = %input, fallback = %fallback, "Unsupported locale, serving default");
            fallback
        }
    }
}
