use serde::{Deserialize, Serialize};

use crate::utils::validation::{require_email, FieldErrors};

pub const CONTACT_CATEGORIES: &[&str] = &[
    "general",
    "support",
    "billing",
    "partnership",
    "press",
    "bug",
    "feature",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub category: String,
    pub message: String,
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Name is required");
        require_email(&mut errors, "email", &self.email);
        errors.require("subject", &self.subject, "Subject is required");
        if !CONTACT_CATEGORIES.contains(&self.category.as_str()) {
            errors.add("category", "Please select a category");
        }
        errors.require("message", &self.message, "Message is required");
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactReceipt {
    pub reference: String,
    pub category: String,
}
