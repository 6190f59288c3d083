//! Donation form validation.
//!
//! All rules a donation must satisfy before the payment collaborator is
//! contacted live here, so the form gets immediate field-level feedback
//! without a round trip. The donation store re-checks the same rules through
//! [`DonationValidator::check_command`].

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use shared::{
    Amount, AmountParseError, DonationConfig, DonationDraft, DonationField, DonationStatus, FieldErrors, PaymentMethod,
};

use crate::domain::commands::donations::SubmitDonationCommand;
use crate::domain::models::donation::Donation;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Basic `local@domain.tld` shape check
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

/// Form values that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDonation {
    pub amount: Amount,
    pub donor_name: String,
    pub donor_email: String,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub payment_method: PaymentMethod,
    pub payment_token: String,
}

#[derive(Debug, Clone)]
pub struct DonationValidator {
    config: DonationConfig,
    min_amount: Amount,
    max_amount: Amount,
}

impl DonationValidator {
    pub fn new(config: DonationConfig) -> Self {
        let min_amount = Amount::from_major(config.min_amount);
        let max_amount = Amount::from_major(config.max_amount);
        Self {
            config,
            min_amount,
            max_amount,
        }
    }

    /// Validate the donation form. Returns one message per invalid field.
    pub fn validate(&self, draft: &DonationDraft) -> Result<ValidatedDonation, FieldErrors> {
        let mut errors = FieldErrors::new();

        let amount = match self.parse_amount(&draft.amount_input) {
            Ok(amount) => match self.check_amount_range(amount) {
                Ok(()) => Some(amount),
                Err(message) => {
                    errors.insert(DonationField::Amount, message);
                    None
                }
            },
            Err(message) => {
                errors.insert(DonationField::Amount, message);
                None
            }
        };

        let donor_name = draft.donor_name.trim().to_string();
        let donor_email = draft.donor_email.trim().to_string();
        if !draft.is_anonymous {
            if donor_name.is_empty() {
                errors.insert(DonationField::DonorName, "Please enter your name".to_string());
            }
            if donor_email.is_empty() {
                errors.insert(DonationField::DonorEmail, "Please enter your email".to_string());
            } else if !is_valid_email(&donor_email) {
                errors.insert(DonationField::DonorEmail, "Please enter a valid email address".to_string());
            }
        }

        let payment_token = draft.payment_token.trim().to_string();
        let payment_method = match draft.payment_method {
            None => {
                errors.insert(DonationField::Payment, "Please choose a payment method".to_string());
                None
            }
            Some(_) if payment_token.is_empty() => {
                errors.insert(DonationField::Payment, "Please enter your payment details".to_string());
                None
            }
            Some(method) => Some(method),
        };

        match (amount, payment_method) {
            (Some(amount), Some(payment_method)) if errors.is_empty() => Ok(ValidatedDonation {
                amount,
                donor_name,
                donor_email,
                message: self.clean_message(&draft.message),
                is_anonymous: draft.is_anonymous,
                payment_method,
                payment_token,
            }),
            _ => {
                debug!("Donation form has {} invalid field(s)", errors.len());
                Err(errors)
            }
        }
    }

    /// Re-check the store preconditions on an already-built command
    pub fn check_command(&self, command: &SubmitDonationCommand) -> Result<(), String> {
        self.check_record(command.amount, &command.donor_name, &command.donor_email, command.is_anonymous)
    }

    /// Same preconditions for a donation loaded from elsewhere
    pub fn check_donation(&self, donation: &Donation) -> Result<(), String> {
        if donation.status != DonationStatus::Completed {
            return Err(format!("Donation {} is not completed", donation.id));
        }
        self.check_record(donation.amount, &donation.donor_name, &donation.donor_email, donation.is_anonymous)
            .map_err(|message| format!("Donation {}: {}", donation.id, message))
    }

    fn check_record(
        &self,
        amount: Amount,
        donor_name: &str,
        donor_email: &str,
        is_anonymous: bool,
    ) -> Result<(), String> {
        self.check_amount_range(amount)?;
        if !is_anonymous {
            if donor_name.trim().is_empty() {
                return Err("Donor name is required".to_string());
            }
            if !is_valid_email(donor_email) {
                return Err("Donor email is not valid".to_string());
            }
        }
        Ok(())
    }

    /// Clean and parse amount input string
    pub fn parse_amount(&self, amount_input: &str) -> Result<Amount, String> {
        if amount_input.trim().is_empty() {
            return Err("Please enter an amount".to_string());
        }

        // Remove currency symbol, thousands separators and spaces
        let cleaned = amount_input
            .trim()
            .replace(&self.config.currency_symbol, "")
            .replace(',', "")
            .replace(' ', "");

        Amount::parse_decimal(&cleaned).map_err(|e| match e {
            AmountParseError::TooManyDecimals => {
                "Amount has too many decimal places. Use at most 2 decimal places.".to_string()
            }
            _ => "Please enter a valid amount (like 25 or 25.00)".to_string(),
        })
    }

    fn check_amount_range(&self, amount: Amount) -> Result<(), String> {
        if amount < self.min_amount {
            Err(format!("Minimum donation is {}", self.format_amount(self.min_amount)))
        } else if amount > self.max_amount {
            Err(format!("Maximum donation is {}", self.format_amount(self.max_amount)))
        } else {
            Ok(())
        }
    }

    /// Messages are optional; blank means none. Overlong messages are cut to
    /// `max_message_length` characters.
    fn clean_message(&self, message: &str) -> Option<String> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.chars().take(self.config.max_message_length).collect())
    }

    /// Validate amount in real-time (for form feedback while typing)
    pub fn validate_amount_realtime(&self, amount_input: &str) -> Result<Amount, String> {
        let amount = self.parse_amount(amount_input)?;
        self.check_amount_range(amount)?;
        Ok(amount)
    }

    /// Format amount for display
    pub fn format_amount(&self, amount: Amount) -> String {
        format!("{}{}", self.config.currency_symbol, amount)
    }

    /// Generate the confirmation message shown after a successful donation
    pub fn success_message(&self, amount: Amount) -> String {
        format!("Thank you! {} donation received", self.format_amount(amount))
    }

    /// Preset amounts offered as quick-pick buttons
    pub fn suggested_amounts(&self) -> Vec<Amount> {
        self.config
            .suggested_amounts
            .iter()
            .map(|value| Amount::from_major(*value))
            .filter(|amount| *amount >= self.min_amount && *amount <= self.max_amount)
            .collect()
    }

}

impl Default for DonationValidator {
    fn default() -> Self {
        Self::new(DonationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::AuthorizationRef;

    fn valid_draft() -> DonationDraft {
        DonationDraft {
            amount_input: "25.00".to_string(),
            donor_name: "Ruth Miller".to_string(),
            donor_email: "ruth@example.org".to_string(),
            message: "For the youth choir".to_string(),
            is_anonymous: false,
            payment_method: Some(PaymentMethod::Card),
            payment_token: "tok_visa".to_string(),
        }
    }

    #[test]
    fn test_validate_success() {
        let validator = DonationValidator::default();

        let validated = validator.validate(&valid_draft()).unwrap();

        assert_eq!(validated.amount, Amount::from_cents(2500));
        assert_eq!(validated.donor_name, "Ruth Miller");
        assert_eq!(validated.message.as_deref(), Some("For the youth choir"));
        assert_eq!(validated.payment_method, PaymentMethod::Card);
    }

    #[test]
    fn test_amount_below_minimum() {
        let validator = DonationValidator::default();
        let draft = DonationDraft {
            amount_input: "0.99".to_string(),
            ..valid_draft()
        };

        let errors = validator.validate(&draft).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&DonationField::Amount], "Minimum donation is $1.00");
    }

    #[test]
    fn test_amount_exactly_minimum_is_accepted() {
        let validator = DonationValidator::default();
        let draft = DonationDraft {
            amount_input: "1.00".to_string(),
            ..valid_draft()
        };

        assert_eq!(validator.validate(&draft).unwrap().amount, Amount::from_cents(100));
    }

    #[test]
    fn test_amount_format_errors() {
        let validator = DonationValidator::default();

        for input in ["", "abc", "12.345", "$1,000.001"] {
            let draft = DonationDraft {
                amount_input: input.to_string(),
                ..valid_draft()
            };
            let errors = validator.validate(&draft).unwrap_err();
            assert!(errors.contains_key(&DonationField::Amount), "input {:?}", input);
        }
    }

    #[test]
    fn test_parse_amount_cleans_input() {
        let validator = DonationValidator::default();

        assert_eq!(validator.parse_amount(" $1,234.56 ").unwrap(), Amount::from_cents(123456));
        assert_eq!(validator.parse_amount("50").unwrap(), Amount::from_cents(5000));
        assert!(validator.parse_amount("fifty").is_err());
    }

    #[test]
    fn test_amount_above_maximum() {
        let validator = DonationValidator::default();
        let draft = DonationDraft {
            amount_input: "10000.01".to_string(),
            ..valid_draft()
        };

        let errors = validator.validate(&draft).unwrap_err();
        assert_eq!(errors[&DonationField::Amount], "Maximum donation is $10000.00");
    }

    #[test]
    fn test_identity_required_unless_anonymous() {
        let validator = DonationValidator::default();
        let draft = DonationDraft {
            donor_name: "   ".to_string(),
            donor_email: "not-an-email".to_string(),
            ..valid_draft()
        };

        let errors = validator.validate(&draft).unwrap_err();
        assert_eq!(errors[&DonationField::DonorName], "Please enter your name");
        assert_eq!(errors[&DonationField::DonorEmail], "Please enter a valid email address");

        let anonymous = DonationDraft {
            is_anonymous: true,
            donor_name: String::new(),
            donor_email: String::new(),
            ..valid_draft()
        };
        assert!(validator.validate(&anonymous).is_ok());
    }

    #[test]
    fn test_one_message_per_invalid_field() {
        let validator = DonationValidator::default();
        let draft = DonationDraft {
            amount_input: "0".to_string(),
            donor_name: String::new(),
            donor_email: String::new(),
            payment_method: None,
            ..valid_draft()
        };

        let errors = validator.validate(&draft).unwrap_err();
        let fields: Vec<DonationField> = errors.keys().copied().collect();
        assert_eq!(
            fields,
            vec![
                DonationField::Amount,
                DonationField::DonorName,
                DonationField::DonorEmail,
                DonationField::Payment
            ]
        );
    }

    #[test]
    fn test_payment_details_required() {
        let validator = DonationValidator::default();
        let draft = DonationDraft {
            payment_token: " ".to_string(),
            ..valid_draft()
        };

        let errors = validator.validate(&draft).unwrap_err();
        assert_eq!(errors[&DonationField::Payment], "Please enter your payment details");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("pastor@church.org"));
        assert!(is_valid_email(" a.b+c@d.co "));
        assert!(!is_valid_email("pastor@church"));
        assert!(!is_valid_email("@church.org"));
        assert!(!is_valid_email("pastor church@org.com"));
    }

    #[test]
    fn test_message_cleanup() {
        let config = DonationConfig {
            max_message_length: 5,
            ..DonationConfig::default()
        };
        let validator = DonationValidator::new(config);

        let blank = DonationDraft {
            message: "   ".to_string(),
            ..valid_draft()
        };
        assert_eq!(validator.validate(&blank).unwrap().message, None);

        let long = DonationDraft {
            message: "Blessings to all".to_string(),
            ..valid_draft()
        };
        assert_eq!(validator.validate(&long).unwrap().message.as_deref(), Some("Bless"));
    }

    #[test]
    fn test_check_command() {
        let validator = DonationValidator::default();
        let mut command = SubmitDonationCommand {
            amount: Amount::from_cents(500),
            donor_name: "Ruth".to_string(),
            donor_email: "ruth@example.org".to_string(),
            message: None,
            is_anonymous: false,
            payment_method: PaymentMethod::Card,
            authorization: AuthorizationRef::new("auth_1"),
        };
        assert!(validator.check_command(&command).is_ok());

        command.amount = Amount::from_cents(99);
        assert!(validator.check_command(&command).is_err());

        command.amount = Amount::from_cents(500);
        command.donor_email = "ruth".to_string();
        assert!(validator.check_command(&command).is_err());

        command.is_anonymous = true;
        assert!(validator.check_command(&command).is_ok());
    }

    #[test]
    fn test_display_helpers() {
        let validator = DonationValidator::default();

        assert_eq!(validator.format_amount(Amount::from_cents(2550)), "$25.50");
        assert_eq!(
            validator.success_message(Amount::from_cents(2500)),
            "Thank you! $25.00 donation received"
        );
        assert!(validator.validate_amount_realtime("5").is_ok());
        assert!(validator.validate_amount_realtime("0.50").is_err());
    }

    #[test]
    fn test_suggested_amounts_respect_limits() {
        let config = DonationConfig {
            suggested_amounts: vec![0.5, 10.0, 25.0, 20_000.0],
            ..DonationConfig::default()
        };
        let validator = DonationValidator::new(config);

        assert_eq!(
            validator.suggested_amounts(),
            vec![Amount::from_cents(1000), Amount::from_cents(2500)]
        );
    }
}
