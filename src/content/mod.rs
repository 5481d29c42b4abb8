//! Page content: built-in defaults, editor overrides and the privacy policy.

mod merge;
pub mod pages;
pub mod privacy;

pub use merge::{merge_content, ContentOverride, Hero, HeroOverride, PageContent, Section};
pub use pages::{default_page, is_known_slug, PAGE_SLUGS};
pub use privacy::{privacy_policy, PrivacyPolicy};
