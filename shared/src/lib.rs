use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Currency amount stored as integer minor units (cents).
///
/// All arithmetic on donations goes through this type so that running totals
/// stay exact no matter how many small donations are summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Convert a major-unit float (e.g. a config value like `1.00`) to the
    /// nearest cent.
    pub fn from_major(value: f64) -> Self {
        Amount((value * 100.0).round() as i64)
    }

    /// Value in major units, for display and percentage math only.
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// `None` when the sum does not fit
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Parse a plain decimal string such as `"25"`, `"25.5"` or `"25.50"`.
    ///
    /// Parsing is exact: at most two fractional digits are accepted.
    pub fn parse_decimal(input: &str) -> Result<Self, AmountParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AmountParseError::Empty);
        }

        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountParseError::InvalidFormat(input.to_string()));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(AmountParseError::InvalidFormat(input.to_string()));
        }
        if fraction.len() > 2 {
            return Err(AmountParseError::TooManyDecimals);
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountParseError::InvalidFormat(input.to_string()))?
        };
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse::<i64>().unwrap_or(0),
        };

        let cents = whole_value
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_value))
            .ok_or_else(|| AmountParseError::InvalidFormat(input.to_string()))?;

        Ok(Amount(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Errors produced while parsing a decimal amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    Empty,
    InvalidFormat(String),
    TooManyDecimals,
}

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountParseError::Empty => write!(f, "Amount is empty"),
            AmountParseError::InvalidFormat(input) => write!(f, "Invalid number format: {}", input),
            AmountParseError::TooManyDecimals => write!(f, "At most 2 decimal places are allowed"),
        }
    }
}

impl std::error::Error for AmountParseError {}

/// Supported currencies. A single code is in use today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
        }
    }
}

/// How the donor chose to pay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Paypal,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::Paypal => "PayPal",
        }
    }
}

/// Lifecycle status of a stored donation. Failed attempts are never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    #[default]
    Completed,
}

/// A completed donation as exposed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub id: String,
    pub amount: Amount,
    pub currency: Currency,
    pub donor_name: String,
    pub donor_email: String,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub payment_method: PaymentMethod,
    pub status: DonationStatus,
    /// RFC 3339 timestamp of acceptance
    pub created_at: String,
    /// Simulated gateway reference, distinct from `id`
    pub transaction_id: String,
}

/// Read-only projection used by the "recent donations" list.
/// Identity is already redacted for anonymous donors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentDonation {
    pub id: String,
    pub donor_name: String,
    pub amount: Amount,
    pub currency: Currency,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub created_at: String,
}

/// Aggregate figures derived from the completed donations
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationStats {
    pub total_raised: Amount,
    pub donor_count: u64,
    /// Major units; 0.0 when there are no donations
    pub average_donation: f64,
}

impl DonationStats {
    /// Build stats from exact totals. Average is post-update total over
    /// post-update count.
    pub fn from_totals(total_raised: Amount, donor_count: u64) -> Self {
        let average_donation = if donor_count == 0 {
            0.0
        } else {
            total_raised.cents() as f64 / donor_count as f64 / 100.0
        };
        Self {
            total_raised,
            donor_count,
            average_donation,
        }
    }
}

/// Progress toward the monthly fundraising goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProgress {
    pub current: Amount,
    pub goal: Amount,
    /// Clamped to 0.0..=100.0
    pub percentage: f64,
}

/// Everything the dashboard donation widget shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationSummary {
    pub stats: DonationStats,
    pub monthly_progress: MonthlyProgress,
    pub recent: Vec<RecentDonation>,
}

/// Raw donation form values as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationDraft {
    pub amount_input: String,
    pub donor_name: String,
    pub donor_email: String,
    pub message: String,
    pub is_anonymous: bool,
    pub payment_method: Option<PaymentMethod>,
    /// Opaque payment details handed to the payment collaborator
    /// (e.g. a card token or a PayPal account handle)
    pub payment_token: String,
}

/// Form fields that can carry a validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DonationField {
    Amount,
    DonorName,
    DonorEmail,
    Payment,
}

impl DonationField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationField::Amount => "amount",
            DonationField::DonorName => "donorName",
            DonationField::DonorEmail => "donorEmail",
            DonationField::Payment => "payment",
        }
    }
}

/// One message per invalid field
pub type FieldErrors = BTreeMap<DonationField, String>;

/// Configuration for the donation form and dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DonationConfig {
    pub currency: Currency,
    pub currency_symbol: String,
    pub min_amount: f64,
    pub max_amount: f64,
    pub max_message_length: usize,
    pub monthly_goal: f64,
    pub recent_limit: usize,
    pub suggested_amounts: Vec<f64>,
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self {
            currency: Currency::Usd,
            currency_symbol: "$".to_string(),
            min_amount: 1.0,
            max_amount: 10_000.0,
            max_message_length: 500,
            monthly_goal: 5_000.0,
            recent_limit: 5,
            suggested_amounts: vec![10.0, 25.0, 50.0, 100.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Amount::parse_decimal("25").unwrap(), Amount::from_cents(2500));
        assert_eq!(Amount::parse_decimal("25.5").unwrap(), Amount::from_cents(2550));
        assert_eq!(Amount::parse_decimal(" 0.99 ").unwrap(), Amount::from_cents(99));
        assert_eq!(Amount::parse_decimal(".75").unwrap(), Amount::from_cents(75));
        assert_eq!(Amount::parse_decimal("-3.10").unwrap(), Amount::from_cents(-310));
    }

    #[test]
    fn test_parse_decimal_errors() {
        assert_eq!(Amount::parse_decimal(""), Err(AmountParseError::Empty));
        assert_eq!(Amount::parse_decimal("1.234"), Err(AmountParseError::TooManyDecimals));
        assert!(matches!(Amount::parse_decimal("abc"), Err(AmountParseError::InvalidFormat(_))));
        assert!(matches!(Amount::parse_decimal("."), Err(AmountParseError::InvalidFormat(_))));
        assert!(matches!(Amount::parse_decimal("1.2.3"), Err(AmountParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_cents(2500).to_string(), "25.00");
        assert_eq!(Amount::from_cents(7).to_string(), "0.07");
        assert_eq!(Amount::from_cents(-150).to_string(), "-1.50");
    }

    #[test]
    fn test_from_major_rounds_to_cent() {
        assert_eq!(Amount::from_major(1.0), Amount::from_cents(100));
        assert_eq!(Amount::from_major(0.1 + 0.2), Amount::from_cents(30));
    }

    #[test]
    fn test_checked_add() {
        assert_eq!(
            Amount::from_cents(150).checked_add(Amount::from_cents(250)),
            Some(Amount::from_cents(400))
        );
        assert_eq!(Amount::from_cents(i64::MAX).checked_add(Amount::from_cents(1)), None);
    }

    #[test]
    fn test_stats_average_guards_empty() {
        let empty = DonationStats::from_totals(Amount::ZERO, 0);
        assert_eq!(empty.average_donation, 0.0);

        let stats = DonationStats::from_totals(Amount::from_cents(7500), 3);
        assert_eq!(stats.average_donation, 25.0);
    }

    #[test]
    fn test_serde_shapes() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Paypal).unwrap(), "\"paypal\"");
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"USD\"");
        assert_eq!(serde_json::to_string(&DonationField::DonorEmail).unwrap(), "\"donorEmail\"");
        assert_eq!(serde_json::to_string(&Amount::from_cents(1234)).unwrap(), "1234");
    }
}
