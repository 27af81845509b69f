use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Top-level storage partition, one per feature area.
///
/// The kebab-case name is both the directory under the storage root and the path segment of the
/// upload endpoint (`/api/uploads/payment-qr`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Category {
    /// Purchase receipts, grouped by `userId/orderId`.
    Purchases,
    /// Recruitment form attachments, grouped by `fieldId`.
    Recruitment,
    /// Payment QR codes, grouped by payment method.
    #[serde(alias = "payment_qr")]
    PaymentQr,
    /// Project gallery images, grouped by `projectId`.
    #[serde(alias = "project_images")]
    ProjectImages,
    /// Site logos; stored under fixed names and replaced in place.
    Logos,
    /// Page component assets, grouped by `componentId`.
    #[serde(alias = "component_assets")]
    ComponentAssets,
}

impl Category {
    /// Returns the directory name of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
