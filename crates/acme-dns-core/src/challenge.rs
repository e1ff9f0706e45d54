//! Challenge data model
//!
//! An [`Order`] is the batch of DNS-01 challenges the ACME driver hands to a
//! [`DnsZone`](crate::DnsZone). Each [`DnsChallenge`] starts out with an
//! identifier and TXT value; the record name is filled in by the zone.

use serde::{Deserialize, Serialize};

/// One DNS-01 challenge record to create or remove
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsChallenge {
    /// Domain being validated (e.g., "www.example.com")
    pub identifier: String,

    /// Validation token content supplied by the ACME server
    pub txt_value: String,

    /// TXT record name relative to the zone, once computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    record_name: Option<String>,
}

impl DnsChallenge {
    /// Create a new challenge without a computed record name
    pub fn new(identifier: impl Into<String>, txt_value: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            txt_value: txt_value.into(),
            record_name: None,
        }
    }

    /// The computed record name, if name computation has run
    pub fn record_name(&self) -> Option<&str> {
        self.record_name.as_deref()
    }

    /// The TXT record to mutate
    ///
    /// Equal to [`record_name`](Self::record_name) once it is set.
    pub fn txt_record(&self) -> Option<&str> {
        self.record_name()
    }

    /// Set the computed record name
    pub fn set_record_name(&mut self, record_name: impl Into<String>) {
        self.record_name = Some(record_name.into());
    }
}

/// A batch of challenges reconciled together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Challenges in insertion order
    pub challenges: Vec<DnsChallenge>,
}

impl Order {
    /// Create an empty order
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a challenge
    pub fn with_challenge(
        mut self,
        identifier: impl Into<String>,
        txt_value: impl Into<String>,
    ) -> Self {
        self.challenges.push(DnsChallenge::new(identifier, txt_value));
        self
    }

    /// Number of challenges
    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    /// Whether the order has no challenges
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    /// Computed TXT record names, in challenge order
    pub fn txt_records(&self) -> impl Iterator<Item = &str> {
        self.challenges.iter().filter_map(DnsChallenge::txt_record)
    }
}

impl FromIterator<DnsChallenge> for Order {
    fn from_iter<I: IntoIterator<Item = DnsChallenge>>(iter: I) -> Self {
        Self {
            challenges: iter.into_iter().collect(),
        }
    }
}
