use tracing::info;
use uuid::Uuid;

use crate::models::contact::{ContactMessage, ContactReceipt};
use crate::utils::validation::FieldErrors;

/// Validates a contact form submission and hands back a reference for it.
pub fn submit(message: &ContactMessage) -> Result<ContactReceipt, FieldErrors> {
    message.validate()?;

    let id = Uuid::new_v4().simple().to_string();
    let reference = format!("MSG-{}", id[..8].to_uppercase());
    info!(
        reference = %reference,
        category = %message.category,
        "Contact message received"
    );

    Ok(ContactReceipt {
        reference,
        category: message.category.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_returns_reference() {
        let message = ContactMessage {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            subject: "Group tickets".into(),
            category: "general".into(),
            message: "Do you offer group discounts?".into(),
        };
        let receipt = submit(&message).unwrap();
        assert!(receipt.reference.starts_with("MSG-"));
        assert_eq!(receipt.reference.len(), 12);
        assert_eq!(receipt.category, "general");
    }

    #[test]
    fn test_submit_rejects_bad_email() {
        let message = ContactMessage {
            name: "Grace".into(),
            email: "grace@".into(),
            subject: "Hi".into(),
            category: "press".into(),
            message: "Hello".into(),
        };
        let errors = submit(&message).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
    }
}
