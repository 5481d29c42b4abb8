//! Privacy policy documents with a lazily filled per-locale cache.
//!
//! The documents are compiled into the binary and never change while the
//! process runs, so cached entries are never invalidated.

use super::Section;
use crate::i18n::{ContentMetrics, Locale};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyPolicy {
    /// Locale the text is actually written in
    pub locale: Locale,
    pub title: String,
    pub last_updated: NaiveDate,
    pub sections: Vec<Section>,
}

struct PolicyText {
    locale: &'static str,
    title: &'static str,
    sections: &'static [(&'static str, &'static str)],
}

const LAST_UPDATED: (i32, u32, u32) = (2024, 3, 1);

static POLICIES: &[PolicyText] = &[
    PolicyText {
        locale: "en",
        title: "Privacy Policy",
        sections: &[
            ("Information we collect", "We collect the contact details you submit through our forms, and usage data gathered by cookies when you browse the site."),
            ("How we use information", "We use your information to answer enquiries, schedule demos, send product updates you opted into and improve the site."),
            ("Sharing", "We do not sell personal data. We share it only with service providers that process it on our behalf under contract."),
            ("Your rights", "You may request access to, correction of or deletion of your personal data by contacting our support team."),
            ("Contact", "Questions about this policy can be sent to our privacy team through the contact page."),
        ],
    },
    PolicyText {
        locale: "es",
        title: "Política de privacidad",
        sections: &[
            ("Información que recopilamos", "Recopilamos los datos de contacto que envía a través de nuestros formularios y datos de uso obtenidos mediante cookies."),
            ("Cómo usamos la información", "Usamos su información para responder consultas, programar demostraciones, enviar novedades que haya aceptado y mejorar el sitio."),
            ("Compartir", "No vendemos datos personales. Solo los compartimos con proveedores que los tratan en nuestro nombre bajo contrato."),
            ("Sus derechos", "Puede solicitar el acceso, la corrección o la eliminación de sus datos personales contactando a nuestro equipo de soporte."),
            ("Contacto", "Las preguntas sobre esta política pueden enviarse a nuestro equipo de privacidad desde la página de contacto."),
        ],
    },
];

type PolicyCache = Mutex<HashMap<&'static str, Arc<PrivacyPolicy>>>;

static CACHE: OnceLock<PolicyCache> = OnceLock::new();

/// Privacy policy for `locale`, built on first request and cached.
///
/// Locales without a translated policy receive the canonical text.
pub fn privacy_policy(locale: Locale, canonical: Locale) -> Arc<PrivacyPolicy> {
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    // Entries are immutable, so a poisoned lock still holds valid data.
    let mut entries = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(policy) = entries.get(locale.code()) {
        ContentMetrics::global().record_cache_hit();
        return Arc::clone(policy);
    }

    ContentMetrics::global().record_cache_miss();
    debug!("Building privacy policy for locale {}", locale);

    let policy = Arc::new(build_policy(locale, canonical));
    entries.insert(locale.code(), Arc::clone(&policy));
    policy
}

fn build_policy(locale: Locale, canonical: Locale) -> PrivacyPolicy {
    let (text, written_in) = match POLICIES.iter().find(|p| p.locale == locale.code()) {
        Some(text) => (text, locale),
        None => (canonical_text(canonical), canonical),
    };

    let (year, month, day) = LAST_UPDATED;

    PrivacyPolicy {
        locale: written_in,
        title: text.title.to_string(),
        last_updated: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
        sections: text
            .sections
            .iter()
            .map(|(title, body)| Section {
                title: title.to_string(),
                body: body.to_string(),
            })
            .collect(),
    }
}

fn canonical_text(canonical: Locale) -> &'static PolicyText {
    POLICIES
        .iter()
        .find(|p| p.locale == canonical.code())
        .unwrap_or(&POLICIES[0])
}
