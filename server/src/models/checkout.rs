//! Typed request bodies for the checkout forms.

use serde::{Deserialize, Serialize};

use crate::models::ticket::TicketSelection;
use crate::utils::validation::{require_email, FieldErrors};

#[derive(Debug, Clone, Deserialize)]
pub struct OpenCheckoutRequest {
    pub event_id: String,
    pub tickets: TicketSelection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("first_name", &self.first_name, "First name is required");
        errors.require("last_name", &self.last_name, "Last name is required");
        require_email(&mut errors, "email", &self.email);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentForm {
    pub card_number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvv: String,
    pub name_on_card: String,
    #[serde(default)]
    pub billing_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub agree_to_terms: bool,
}

fn default_country() -> String {
    "US".to_string()
}

impl PaymentForm {
    /// Field checks only. The terms flag is a separate gate.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        errors.require("name_on_card", &self.name_on_card, "Name on card is required");
        errors.require(
            "billing_address",
            self.billing_address.as_deref().unwrap_or_default(),
            "Billing address is required",
        );
        errors.require("city", self.city.as_deref().unwrap_or_default(), "City is required");
        errors.require(
            "zip_code",
            self.zip_code.as_deref().unwrap_or_default(),
            "ZIP code is required",
        );

        let digits: String = self.card_number.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.is_empty() {
            errors.add("card_number", "Card number is required");
        } else if !(12..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit())
        {
            errors.add("card_number", "Card number must be 12 to 19 digits");
        }

        if !is_expiry(&self.expiry) {
            errors.add("expiry", "Expiry must be in MM/YY format");
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.add("cvv", "CVV must be 3 or 4 digits");
        }

        errors.into_result()
    }

    /// Last four digits of the card, for receipts.
    pub fn card_last4(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(char::is_ascii_digit).collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }
}

fn is_expiry(value: &str) -> bool {
    let Some((month, year)) = value.trim().split_once('/') else {
        return false;
    };
    let month_ok = month.len() == 2 && matches!(month.parse::<u8>(), Ok(1..=12));
    let year_ok = year.len() == 2 && year.chars().all(|c| c.is_ascii_digit());
    month_ok && year_ok
}
