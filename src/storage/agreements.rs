//! Agreement repository
//!
//! Manages loading and saving agreements to agreements.json

use std::cmp::Ordering;

use crate::error::ConvenioError;
use crate::models::{Agreement, AgreementId};

use super::repository::{Record, Repository};

impl Record for Agreement {
    type Id = AgreementId;
    const ENTITY: &'static str = "Agreement";

    fn id(&self) -> AgreementId {
        self.id
    }

    /// Soonest validity end first, then agency
    fn default_order(&self, other: &Self) -> Ordering {
        self.validity_end
            .cmp(&other.validity_end)
            .then_with(|| self.agency.cmp(&other.agency))
    }
}

pub type AgreementRepository = Repository<Agreement>;

impl Repository<Agreement> {
    /// Agreements filtered by the received-transfer flag
    pub fn get_by_transfer_received(&self, received: bool) -> Result<Vec<Agreement>, ConvenioError> {
        self.filter(|a| a.transfer_received == received)
    }
}
