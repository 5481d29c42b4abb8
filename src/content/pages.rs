//! Built-in default copy for the marketing pages.
//!
//! Editors can override parts of these through the pages API; whatever they
//! do not override is served from here.

use super::{Hero, PageContent, Section};
use crate::i18n::Locale;

/// Slugs with built-in default content.
pub const PAGE_SLUGS: &[&str] = &["home", "pricing", "services", "industries", "payment-gateways"];

struct PageCopy {
    slug: &'static str,
    locale: &'static str,
    title: &'static str,
    description: &'static str,
    badge: Option<&'static str>,
    sections: &'static [(&'static str, &'static str)],
}

static PAGES: &[PageCopy] = &[
    PageCopy {
        slug: "home",
        locale: "en",
        title: "MLM Software for Every Compensation Plan",
        description: "Launch and grow your network marketing business with a platform built for binary, matrix, unilevel and hybrid plans.",
        badge: Some("Trusted by 1,000+ companies"),
        sections: &[
            ("Compensation plans", "Configure binary, matrix, unilevel, board and hybrid plans without custom code."),
            ("E-wallet and payouts", "Automate commissions, withdrawals and payout approvals."),
            ("Replicated websites", "Give every distributor a personalized site in their own language."),
        ],
    },
    PageCopy {
        slug: "home",
        locale: "es",
        title: "Software MLM para cada plan de compensación",
        description: "Lance y haga crecer su negocio de marketing multinivel con una plataforma creada para planes binarios, matriciales, uninivel e híbridos.",
        badge: Some("Más de 1.000 empresas confían en nosotros"),
        sections: &[
            ("Planes de compensación", "Configure planes binarios, matriciales, uninivel, de tablero e híbridos sin código a medida."),
            ("Billetera electrónica y pagos", "Automatice comisiones, retiros y aprobaciones de pagos."),
            ("Sitios replicados", "Ofrezca a cada distribuidor un sitio personalizado en su idioma."),
        ],
    },
    PageCopy {
        slug: "pricing",
        locale: "en",
        title: "Simple, Transparent Pricing",
        description: "Choose the edition that fits your business today and upgrade as your network grows.",
        badge: None,
        sections: &[
            ("Starter", "Core back office, one compensation plan and e-wallet."),
            ("Business", "Multiple plans, replicated websites and e-commerce."),
            ("Enterprise", "Dedicated infrastructure, custom modules and priority support."),
        ],
    },
    PageCopy {
        slug: "pricing",
        locale: "es",
        title: "Precios simples y transparentes",
        description: "Elija la edición que se adapta a su negocio hoy y actualice a medida que crece su red.",
        badge: None,
        sections: &[
            ("Starter", "Oficina virtual, un plan de compensación y billetera electrónica."),
            ("Business", "Varios planes, sitios replicados y comercio electrónico."),
            ("Enterprise", "Infraestructura dedicada, módulos a medida y soporte prioritario."),
        ],
    },
    PageCopy {
        slug: "services",
        locale: "en",
        title: "MLM Software Development Services",
        description: "From plan consulting to migration and custom modules, our team delivers end to end.",
        badge: None,
        sections: &[],
    },
    PageCopy {
        slug: "industries",
        locale: "en",
        title: "Built for Direct Selling Industries",
        description: "Wellness, cosmetics, travel, crypto and more: configured to the rules of your industry.",
        badge: None,
        sections: &[],
    },
    PageCopy {
        slug: "payment-gateways",
        locale: "en",
        title: "Integrated Payment Gateways",
        description: "Accept payments and pay commissions through the gateways your distributors already use.",
        badge: None,
        sections: &[
            ("Cards", "Stripe, Authorize.Net and Braintree."),
            ("Wallets", "PayPal and regional e-wallets."),
            ("Crypto", "Bitcoin and stablecoin payouts."),
        ],
    },
];

/// Default content for `slug` in `locale`, falling back to the canonical
/// copy when the locale has no translation. `None` for unknown slugs.
pub fn default_page(slug: &str, locale: Locale, canonical: Locale) -> Option<PageContent> {
    let copy = find(slug, locale.code()).or_else(|| find(slug, canonical.code()))?;

    Some(PageContent {
        hero: Hero {
            title: copy.title.to_string(),
            description: copy.description.to_string(),
            badge: copy.badge.map(str::to_string),
        },
        sections: copy
            .sections
            .iter()
            .map(|(title, body)| Section {
                title: title.to_string(),
                body: body.to_string(),
            })
            .collect(),
    })
}

pub fn is_known_slug(slug: &str) -> bool {
    PAGE_SLUGS.contains(&slug)
}

fn find(slug: &str, locale: &str) -> Option<&'static PageCopy> {
    PAGES.iter().find(|page| page.slug == slug && page.locale == locale)
}
