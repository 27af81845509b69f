use depot_domain::category::Category;

/// Where and under which name a category stores its uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Form fields whose values become sub-category segments, in order.
    pub sub_category_fields: &'static [&'static str],
    /// Prefix of generated names.
    pub prefix: &'static str,
    /// Base name used when the caller supplies none; the category then never generates names.
    pub fixed_name: Option<&'static str>,
}

impl Layout {
    #[must_use]
    pub const fn of(category: Category) -> Self {
        match category {
            Category::Purchases => Self::generated(&["userId", "orderId"], "receipt"),
            Category::Recruitment => Self::generated(&["fieldId"], "attachment"),
            Category::PaymentQr => Self::generated(&["paymentMethod"], "qr_code"),
            Category::ProjectImages => Self::generated(&["projectId"], "project"),
            Category::Logos => {
                Self { sub_category_fields: &[], prefix: "logo", fixed_name: Some("logo") }
            },
            Category::ComponentAssets => Self::generated(&["componentId"], "asset"),
        }
    }

    const fn generated(fields: &'static [&'static str], prefix: &'static str) -> Self {
        Self { sub_category_fields: fields, prefix, fixed_name: None }
    }
}

/// Form field carrying an explicit base name.
pub const NAME_FIELD: &str = "name";

/// Form field carrying the file bytes.
pub const FILE_FIELD: &str = "file";
