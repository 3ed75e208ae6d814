//! The email campaigns and which contacts each one addresses.

use std::fmt;
use std::str::FromStr;

use crate::contact::Contact;
use crate::error::CampaignError;

/// An email campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Campaign {
    /// Contacts who attended a previous event.
    ReturningCustomer,
    /// Contacts with no previous event on record.
    NewCustomer,
}

impl Campaign {
    /// Every campaign, in display order.
    pub fn all() -> &'static [Campaign] {
        &[Campaign::ReturningCustomer, Campaign::NewCustomer]
    }

    /// The display name, also the key into the system prompt catalog.
    pub fn name(self) -> &'static str {
        match self {
            Campaign::ReturningCustomer => "Returning Customer",
            Campaign::NewCustomer => "New Customer",
        }
    }

    /// Look a campaign up by its display name.
    pub fn from_name(name: &str) -> Result<Self, CampaignError> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.name() == name)
            .ok_or_else(|| CampaignError::UnknownCampaign(name.to_string()))
    }

    /// Whether this campaign addresses `contact`.
    pub fn includes(self, contact: &Contact) -> bool {
        match self {
            Campaign::ReturningCustomer => contact.has_previous_event(),
            Campaign::NewCustomer => !contact.has_previous_event(),
        }
    }

    /// The contacts this campaign addresses, in input order.
    pub fn select<'a>(self, contacts: &'a [Contact]) -> impl Iterator<Item = &'a Contact> + 'a {
        contacts.iter().filter(move |c| self.includes(c))
    }
}

impl fmt::Display for Campaign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Campaign {
    type Err = CampaignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn contact(uid: u64, previous_event: Option<&str>) -> Contact {
        Contact {
            uid,
            company_name: format!("Company {uid}"),
            contact_name: "Jo".into(),
            contact_email: "jo@example.com".into(),
            industry: "Retail".into(),
            previous_event: previous_event.map(String::from),
            previous_event_date: previous_event.map(|_| NaiveDate::from_ymd_opt(2022, 12, 1).unwrap()),
            notes: String::new(),
        }
    }

    #[test]
    fn names_round_trip() {
        for campaign in Campaign::all() {
            assert_eq!(Campaign::from_name(campaign.name()).unwrap(), *campaign);
        }
        assert_eq!("New Customer".parse::<Campaign>().unwrap(), Campaign::NewCustomer);
        assert_eq!(Campaign::ReturningCustomer.to_string(), "Returning Customer");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = Campaign::from_name("returning customer").unwrap_err();
        assert!(matches!(err, CampaignError::UnknownCampaign(ref n) if n == "returning customer"));
    }

    #[test]
    fn empty_previous_event_counts_as_new_customer() {
        let blank = contact(9, Some(""));
        assert!(Campaign::NewCustomer.includes(&blank));
        assert!(!Campaign::ReturningCustomer.includes(&blank));
    }

    #[test]
    fn returning_and_new_partition_contacts() {
        let contacts = vec![
            contact(1, Some("Trade fair")),
            contact(2, None),
            contact(3, Some("Workshop")),
            contact(4, Some("")),
        ];

        let returning: Vec<u64> = Campaign::ReturningCustomer.select(&contacts).map(|c| c.uid).collect();
        let new: Vec<u64> = Campaign::NewCustomer.select(&contacts).map(|c| c.uid).collect();

        assert_eq!(returning, vec![1, 3]);
        assert_eq!(new, vec![2, 4]);
    }
}
