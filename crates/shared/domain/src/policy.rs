//! Per-category upload policy.
//!
//! [`Policies`] is the single source of truth for what each [`Category`] accepts. Defaults live
//! here; configuration files only need to list the fields they change.

use crate::category::Category;
use crate::constants::MIB;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::IntoEnumIterator;

/// Upload constraints for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    pub max_size_bytes: u64,
    /// Lowercase MIME types without parameters.
    pub allowed_mime_types: BTreeSet<String>,
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: BTreeSet<String>,
    /// Explicit base names may replace an existing file ("latest wins").
    pub overwrite_allowed: bool,
}

impl CategoryPolicy {
    /// Built-in policy for a category.
    #[must_use]
    pub fn defaults_for(category: Category) -> Self {
        const IMAGES: &[&str] = &["image/jpeg", "image/png", "image/webp"];
        const IMAGE_EXT: &[&str] = &["jpg", "jpeg", "png", "webp"];

        match category {
            Category::Purchases => Self::new(
                5 * MIB,
                &["image/jpeg", "image/png", "application/pdf"],
                &["jpg", "jpeg", "png", "pdf"],
                false,
            ),
            Category::Recruitment => Self::new(
                10 * MIB,
                &[
                    "application/pdf",
                    "application/msword",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                    "image/jpeg",
                    "image/png",
                ],
                &["pdf", "doc", "docx", "jpg", "jpeg", "png"],
                false,
            ),
            Category::PaymentQr => Self::new(5 * MIB, IMAGES, IMAGE_EXT, false),
            Category::ProjectImages => Self::new(
                5 * MIB,
                &["image/jpeg", "image/png", "image/webp", "image/gif"],
                &["jpg", "jpeg", "png", "webp", "gif"],
                false,
            ),
            Category::Logos => Self::new(
                2 * MIB,
                &["image/png", "image/jpeg", "image/webp", "image/svg+xml"],
                &["png", "jpg", "jpeg", "webp", "svg"],
                true,
            ),
            Category::ComponentAssets => Self::new(
                5 * MIB,
                &["image/jpeg", "image/png", "image/webp", "image/gif", "application/pdf"],
                &["jpg", "jpeg", "png", "webp", "gif", "pdf"],
                false,
            ),
        }
    }

    fn new(max_size_bytes: u64, mimes: &[&str], extensions: &[&str], overwrite: bool) -> Self {
        Self {
            max_size_bytes,
            allowed_mime_types: mimes.iter().map(|m| (*m).to_owned()).collect(),
            allowed_extensions: extensions.iter().map(|e| (*e).to_owned()).collect(),
            overwrite_allowed: overwrite,
        }
    }

    /// Case-insensitive MIME check; parameters such as `; charset=utf-8` are ignored.
    #[must_use]
    pub fn allows_mime(&self, mime: &str) -> bool {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        self.allowed_mime_types.contains(&essence)
    }

    /// Case-insensitive extension check (without the leading dot).
    #[must_use]
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.contains(&extension.to_ascii_lowercase())
    }

    fn apply(&mut self, patch: PolicyPatch) {
        if let Some(max) = patch.max_size_bytes {
            self.max_size_bytes = max;
        }
        if let Some(mimes) = patch.allowed_mime_types {
            self.allowed_mime_types = mimes.into_iter().map(|m| m.to_ascii_lowercase()).collect();
        }
        if let Some(extensions) = patch.allowed_extensions {
            self.allowed_extensions = extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect();
        }
        if let Some(overwrite) = patch.overwrite_allowed {
            self.overwrite_allowed = overwrite;
        }
    }
}

/// Partial policy as written in configuration files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyPatch {
    pub max_size_bytes: Option<u64>,
    pub allowed_mime_types: Option<Vec<String>>,
    pub allowed_extensions: Option<Vec<String>>,
    pub overwrite_allowed: Option<bool>,
}

/// Policies for every category, always complete.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<Category, PolicyPatch>")]
pub struct Policies {
    by_category: BTreeMap<Category, CategoryPolicy>,
}

impl Default for Policies {
    fn default() -> Self {
        Self::from(BTreeMap::new())
    }
}

impl From<BTreeMap<Category, PolicyPatch>> for Policies {
    fn from(mut patches: BTreeMap<Category, PolicyPatch>) -> Self {
        let by_category = Category::iter()
            .map(|category| {
                let mut policy = CategoryPolicy::defaults_for(category);
                if let Some(patch) = patches.remove(&category) {
                    policy.apply(patch);
                }
                (category, policy)
            })
            .collect();
        Self { by_category }
    }
}

impl Policies {
    /// Policy of a category.
    ///
    /// # Panics
    /// Never: the table is filled for every category on construction.
    #[must_use]
    pub fn get(&self, category: Category) -> &CategoryPolicy {
        &self.by_category[&category]
    }

    /// The largest size ceiling across all categories.
    #[must_use]
    pub fn max_ceiling(&self) -> u64 {
        self.by_category.values().map(|p| p.max_size_bytes).max().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, &CategoryPolicy)> {
        self.by_category.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_logos_allow_overwrite_by_default() {
        let policies = Policies::default();
        for (category, policy) in policies.iter() {
            assert_eq!(policy.overwrite_allowed, *category == Category::Logos, "{category}");
        }
    }

    #[test]
    fn mime_and_extension_checks_ignore_case_and_parameters() {
        let policy = CategoryPolicy::defaults_for(Category::PaymentQr);
        assert!(policy.allows_mime("IMAGE/JPEG; charset=binary"));
        assert!(policy.allows_extension("JPG"));
        assert!(!policy.allows_mime("application/pdf"));
        assert!(!policy.allows_extension("exe"));
    }

    #[test]
    fn patch_overrides_only_listed_fields() {
        let mut patches = BTreeMap::new();
        patches.insert(
            Category::PaymentQr,
            PolicyPatch {
                max_size_bytes: Some(MIB),
                allowed_extensions: Some(vec![".PNG".to_owned()]),
                ..PolicyPatch::default()
            },
        );
        let policies = Policies::from(patches);
        let qr = policies.get(Category::PaymentQr);
        assert_eq!(qr.max_size_bytes, MIB);
        assert!(qr.allows_extension("png"));
        assert!(!qr.allows_extension("jpg"));
        assert!(qr.allows_mime("image/jpeg"));
        assert_eq!(policies.get(Category::Logos), &CategoryPolicy::defaults_for(Category::Logos));
    }
}
