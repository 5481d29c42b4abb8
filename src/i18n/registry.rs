//! Locale registry: Single source of truth for all supported site locales.
//!
//! The set of locales is fixed at build time. What varies per deployment is
//! the default locale that unsupported URL segments fall back to, so the
//! registry is an owned value built from configuration. A shared instance
//! with the canonical locale as default is available through
//! [`LocaleRegistry::builtin`].

use anyhow::{bail, Result};
use std::sync::OnceLock;

/// Configuration for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// ISO 639-1 language code (e.g., "en", "es")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Spanish")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Español")
    pub native_name: &'static str,

    /// Whether this is the canonical locale (only one should be true)
    pub is_canonical: bool,

    /// Whether this locale is served
    pub enabled: bool,
}

/// Every locale the site has copy for. English is the canonical locale:
/// its rows are the source of truth for shared, non-text fields.
pub(crate) static LOCALES: &[LocaleConfig] = &[
    LocaleConfig { code: "en", name: "English", native_name: "English", is_canonical: true, enabled: true },
    LocaleConfig { code: "es", name: "Spanish", native_name: "Español", is_canonical: false, enabled: true },
    LocaleConfig { code: "pt", name: "Portuguese", native_name: "Português", is_canonical: false, enabled: true },
    LocaleConfig { code: "fr", name: "French", native_name: "Français", is_canonical: false, enabled: true },
    LocaleConfig { code: "de", name: "German", native_name: "Deutsch", is_canonical: false, enabled: true },
    LocaleConfig { code: "it", name: "Italian", native_name: "Italiano", is_canonical: false, enabled: true },
    LocaleConfig { code: "ru", name: "Russian", native_name: "Русский", is_canonical: false, enabled: true },
    LocaleConfig { code: "tr", name: "Turkish", native_name: "Türkçe", is_canonical: false, enabled: true },
    LocaleConfig { code: "ar", name: "Arabic", native_name: "العربية", is_canonical: false, enabled: true },
    LocaleConfig { code: "hi", name: "Hindi", native_name: "हिन्दी", is_canonical: false, enabled: true },
    LocaleConfig { code: "id", name: "Indonesian", native_name: "Bahasa Indonesia", is_canonical: false, enabled: true },
    LocaleConfig { code: "zh", name: "Chinese", native_name: "中文", is_canonical: false, enabled: true },
];

/// Locale registry with a configured default locale.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: &'static [LocaleConfig],
    default_code: &'static str,
}

static BUILTIN: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Build a registry whose fallback is `default_code`.
    ///
    /// # Returns
    /// * `Ok(LocaleRegistry)` if `default_code` names an enabled locale
    /// * `Err` otherwise
    pub fn new(default_code: &str) -> Result<Self> {
        let config = match find(LOCALES, default_code) {
            Some(config) if config.enabled => config,
            Some(_) => bail!("Default locale '{}' is not enabled", default_code),
            None => bail!("Unknown default locale: '{}'", default_code),
        };

        Ok(Self {
            locales: LOCALES,
            default_code: config.code,
        })
    }

    /// Shared registry that falls back to the canonical locale.
    pub fn builtin() -> &'static LocaleRegistry {
        BUILTIN.get_or_init(|| LocaleRegistry {
            locales: LOCALES,
            default_code: canonical_of(LOCALES).code,
        })
    }

    /// Get a locale configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&'static LocaleConfig> {
        find(self.locales, code)
    }

    /// Get all enabled locales.
    pub fn list_enabled(&self) -> Vec<&'static LocaleConfig> {
        self.locales.iter().filter(|locale| locale.enabled).collect()
    }

    /// Get the canonical locale configuration.
    pub fn canonical(&self) -> &'static LocaleConfig {
        canonical_of(self.locales)
    }

    /// Get the configured default (fallback) locale configuration.
    pub fn default_locale(&self) -> &'static LocaleConfig {
        // Validated in `new`, and `builtin` uses the canonical entry.
        find(self.locales, self.default_code).unwrap_or_else(|| self.canonical())
    }

    /// Check if a locale code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|locale| locale.enabled)
            .unwrap_or(false)
    }
}

fn find(locales: &'static [LocaleConfig], code: &str) -> Option<&'static LocaleConfig> {
    locales.iter().find(|locale| locale.code == code)
}

/// # Panics
/// Panics if the static table does not define exactly one canonical locale.
fn canonical_of(locales: &'static [LocaleConfig]) -> &'static LocaleConfig {
    let canonical: Vec<_> = locales.iter().filter(|locale| locale.is_canonical).collect();

    match canonical.len() {
        0 => panic!("No canonical locale found in registry"),
        1 => canonical[0],
        _ => panic!("Multiple canonical locales found in registry"),
    }
}
