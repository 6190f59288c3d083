use crate::domain::models::donation::Donation as DomainDonation;
use shared::{DonationRecord, RecentDonation};

pub struct DonationMapper;

impl DonationMapper {
    pub fn to_dto(domain: &DomainDonation) -> DonationRecord {
        DonationRecord {
            id: domain.id.clone(),
            amount: domain.amount,
            currency: domain.currency,
            donor_name: domain.donor_name.clone(),
            donor_email: domain.donor_email.clone(),
            message: domain.message.clone(),
            is_anonymous: domain.is_anonymous,
            payment_method: domain.payment_method,
            status: domain.status,
            created_at: domain.created_at.to_rfc3339(),
            transaction_id: domain.transaction_id.clone(),
        }
    }

    /// Public projection: anonymous donors lose name and email
    pub fn to_recent(domain: &DomainDonation) -> RecentDonation {
        RecentDonation {
            id: domain.id.clone(),
            donor_name: domain.display_name().to_string(),
            amount: domain.amount,
            currency: domain.currency,
            message: domain.message.clone(),
            is_anonymous: domain.is_anonymous,
            created_at: domain.created_at.to_rfc3339(),
        }
    }
}
