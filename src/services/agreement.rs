//! Agreement service
//!
//! Agreements are the root of the data model: deleting one removes its
//! contracts and, through them, every amendment and payment.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{ConvenioError, ConvenioResult};
use crate::models::money::decimal;
use crate::models::{
    Agreement, AgreementId, AgreementStatus, AgreementType, AlertBucket, ContractFinancials,
    ContractId, Money, MoneyOverflow,
};
use crate::storage::Storage;

use super::clean;
use super::contract::{ContractService, ContractSummary};

/// Editable fields of an agreement, used for both create and update
#[derive(Debug, Clone, Deserialize)]
pub struct AgreementInput {
    #[serde(rename = "type")]
    pub agreement_type: AgreementType,
    #[serde(default)]
    pub indication_number: Option<String>,
    #[serde(default)]
    pub proposal_number: Option<String>,
    #[serde(default)]
    pub instrument_number: Option<String>,
    #[serde(default)]
    pub legislator_name: Option<String>,
    pub agency: String,
    pub object: String,
    #[serde(default, with = "decimal")]
    pub transfer_amount: Money,
    #[serde(default, with = "decimal")]
    pub counterpart_amount: Money,
    #[serde(default)]
    pub validity_start: Option<NaiveDate>,
    pub validity_end: NaiveDate,
    #[serde(default)]
    pub transfer_received: bool,
    #[serde(default)]
    pub bid_held: bool,
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub bidding_process_number: Option<String>,
    #[serde(default)]
    pub status: AgreementStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AgreementInput {
    /// Minimal input; optional fields take their defaults
    pub fn new(
        agreement_type: AgreementType,
        agency: impl Into<String>,
        object: impl Into<String>,
        validity_end: NaiveDate,
    ) -> Self {
        Self {
            agreement_type,
            indication_number: None,
            proposal_number: None,
            instrument_number: None,
            legislator_name: None,
            agency: agency.into(),
            object: object.into(),
            transfer_amount: Money::zero(),
            counterpart_amount: Money::zero(),
            validity_start: None,
            validity_end,
            transfer_received: false,
            bid_held: false,
            modality: None,
            bidding_process_number: None,
            status: AgreementStatus::default(),
            notes: None,
        }
    }

    /// Copy every editable field onto `agreement`
    fn apply_to(self, agreement: &mut Agreement) {
        agreement.agreement_type = self.agreement_type;
        agreement.indication_number = clean(self.indication_number);
        agreement.proposal_number = clean(self.proposal_number);
        agreement.instrument_number = clean(self.instrument_number);
        agreement.legislator_name = clean(self.legislator_name);
        agreement.agency = self.agency.trim().to_string();
        agreement.object = self.object.trim().to_string();
        agreement.transfer_amount = self.transfer_amount;
        agreement.counterpart_amount = self.counterpart_amount;
        agreement.validity_start = self.validity_start;
        agreement.validity_end = self.validity_end;
        agreement.transfer_received = self.transfer_received;
        agreement.bid_held = self.bid_held;
        agreement.modality = clean(self.modality);
        agreement.bidding_process_number = clean(self.bidding_process_number);
        agreement.status = self.status;
        agreement.notes = clean(self.notes);
    }
}

/// Current editable fields, as a base for partial edits
impl From<&Agreement> for AgreementInput {
    fn from(a: &Agreement) -> Self {
        Self {
            agreement_type: a.agreement_type,
            indication_number: a.indication_number.clone(),
            proposal_number: a.proposal_number.clone(),
            instrument_number: a.instrument_number.clone(),
            legislator_name: a.legislator_name.clone(),
            agency: a.agency.clone(),
            object: a.object.clone(),
            transfer_amount: a.transfer_amount,
            counterpart_amount: a.counterpart_amount,
            validity_start: a.validity_start,
            validity_end: a.validity_end,
            transfer_received: a.transfer_received,
            bid_held: a.bid_held,
            modality: a.modality.clone(),
            bidding_process_number: a.bidding_process_number.clone(),
            status: a.status,
            notes: a.notes.clone(),
        }
    }
}

/// An agreement with its derived totals and alert state
#[derive(Debug, Clone)]
pub struct AgreementSummary {
    pub agreement: Agreement,
    pub total_value: Money,
    pub total_paid: Money,
    pub balance: Money,
    /// Sum of the adjusted values of its contracts
    pub contracted_total: Money,
    pub days_to_expire: i64,
    pub alert: AlertBucket,
    pub alert_badge: String,
    pub contract_count: usize,
}

/// API rendition of a stored agreement. Storage keeps cents, clients get
/// decimal reais.
#[derive(Serialize)]
struct AgreementWire<'a> {
    id: AgreementId,
    #[serde(rename = "type")]
    agreement_type: AgreementType,
    indication_number: &'a Option<String>,
    proposal_number: &'a Option<String>,
    instrument_number: &'a Option<String>,
    legislator_name: &'a Option<String>,
    agency: &'a str,
    object: &'a str,
    #[serde(with = "decimal")]
    transfer_amount: Money,
    #[serde(with = "decimal")]
    counterpart_amount: Money,
    validity_start: Option<NaiveDate>,
    validity_end: NaiveDate,
    transfer_received: bool,
    bid_held: bool,
    modality: &'a Option<String>,
    bidding_process_number: &'a Option<String>,
    status: AgreementStatus,
    notes: &'a Option<String>,
    created_by: &'a Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(with = "decimal")]
    total_value: Money,
    #[serde(with = "decimal")]
    total_paid: Money,
    #[serde(with = "decimal")]
    balance: Money,
    #[serde(with = "decimal")]
    contracted_total: Money,
    days_to_expire: i64,
    alert: AlertBucket,
    alert_badge: &'a str,
    contract_count: usize,
}

impl Serialize for AgreementSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let a = &self.agreement;
        AgreementWire {
            id: a.id,
            agreement_type: a.agreement_type,
            indication_number: &a.indication_number,
            proposal_number: &a.proposal_number,
            instrument_number: &a.instrument_number,
            legislator_name: &a.legislator_name,
            agency: &a.agency,
            object: &a.object,
            transfer_amount: a.transfer_amount,
            counterpart_amount: a.counterpart_amount,
            validity_start: a.validity_start,
            validity_end: a.validity_end,
            transfer_received: a.transfer_received,
            bid_held: a.bid_held,
            modality: &a.modality,
            bidding_process_number: &a.bidding_process_number,
            status: a.status,
            notes: &a.notes,
            created_by: &a.created_by,
            created_at: a.created_at,
            updated_at: a.updated_at,
            total_value: self.total_value,
            total_paid: self.total_paid,
            balance: self.balance,
            contracted_total: self.contracted_total,
            days_to_expire: self.days_to_expire,
            alert: self.alert,
            alert_badge: &self.alert_badge,
            contract_count: self.contract_count,
        }
        .serialize(serializer)
    }
}

/// Summary plus the agreement's contracts
#[derive(Debug, Clone, Serialize)]
pub struct AgreementDetail {
    #[serde(flatten)]
    pub summary: AgreementSummary,
    pub contracts: Vec<ContractSummary>,
}

pub struct AgreementService<'a> {
    storage: &'a Storage,
}

impl<'a> AgreementService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(
        &self,
        input: AgreementInput,
        created_by: Option<String>,
    ) -> ConvenioResult<Agreement> {
        let mut agreement = Agreement::new(
            input.agreement_type,
            String::new(),
            String::new(),
            input.validity_end,
        );
        input.apply_to(&mut agreement);
        agreement.created_by = clean(created_by);
        agreement
            .validate()
            .map_err(|e| ConvenioError::Validation(e.to_string()))?;

        self.storage.agreements.upsert(agreement.clone())?;
        self.storage.agreements.save()?;

        self.storage.log(
            AuditEntry::create(
                EntityType::Agreement,
                agreement.id.to_string(),
                Some(agreement.to_string()),
                &agreement,
            )
            .with_actor(agreement.created_by.clone()),
        )?;
        tracing::info!(
            agreement = %agreement.id,
            agency = %agreement.agency,
            total = %agreement.total_value(),
            "agreement created"
        );

        Ok(agreement)
    }

    pub fn get(&self, id: AgreementId) -> ConvenioResult<Option<Agreement>> {
        self.storage.agreements.get(id)
    }

    /// Find by full UUID or short id (`cnv-1a2b3c4d`)
    pub fn find(&self, identifier: &str) -> ConvenioResult<Option<Agreement>> {
        if let Ok(id) = AgreementId::parse(identifier.trim()) {
            return self.storage.agreements.get(id);
        }
        self.storage
            .agreements
            .find(|a| a.id.matches_short(identifier))
    }

    pub fn resolve(&self, identifier: &str) -> ConvenioResult<Agreement> {
        self.find(identifier)?
            .ok_or_else(|| ConvenioError::agreement_not_found(identifier))
    }

    /// Newest first, optionally restricted by the received-transfer flag
    pub fn list(&self, transfer_received: Option<bool>) -> ConvenioResult<Vec<Agreement>> {
        let mut agreements = match transfer_received {
            Some(flag) => self.storage.agreements.get_by_transfer_received(flag)?,
            None => self.storage.agreements.get_all()?,
        };
        agreements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(agreements)
    }

    /// Replace every editable field
    pub fn update(&self, id: AgreementId, input: AgreementInput) -> ConvenioResult<Agreement> {
        let before = self
            .storage
            .agreements
            .get(id)?
            .ok_or_else(|| ConvenioError::agreement_not_found(id.to_string()))?;

        let mut agreement = before.clone();
        input.apply_to(&mut agreement);
        agreement.updated_at = Utc::now();
        agreement
            .validate()
            .map_err(|e| ConvenioError::Validation(e.to_string()))?;

        self.storage.agreements.upsert(agreement.clone())?;
        self.storage.agreements.save()?;

        self.storage.log_update(
            EntityType::Agreement,
            agreement.id.to_string(),
            Some(agreement.to_string()),
            &before,
            &agreement,
            None,
        )?;
        tracing::info!(agreement = %agreement.id, "agreement updated");

        Ok(agreement)
    }

    /// Delete one agreement and everything under it
    pub fn delete(&self, id: AgreementId) -> ConvenioResult<Agreement> {
        let agreement = self
            .storage
            .agreements
            .get(id)?
            .ok_or_else(|| ConvenioError::agreement_not_found(id.to_string()))?;

        self.remove(&HashSet::from([id]))?;
        Ok(agreement)
    }

    /// Delete every listed agreement that exists; unknown ids are skipped.
    /// Returns how many agreements were removed.
    pub fn delete_many(&self, ids: &[AgreementId]) -> ConvenioResult<usize> {
        let ids: HashSet<AgreementId> = ids.iter().copied().collect();
        self.remove(&ids)
    }

    fn remove(&self, ids: &HashSet<AgreementId>) -> ConvenioResult<usize> {
        let mut entries =
            ContractService::new(self.storage).remove_for_agreements(ids)?;

        let removed = self.storage.agreements.delete_where(|a| ids.contains(&a.id))?;
        if removed.is_empty() {
            return Ok(0);
        }
        self.storage.agreements.save()?;

        entries.extend(removed.iter().map(|a| {
            AuditEntry::delete(EntityType::Agreement, a.id.to_string(), Some(a.to_string()), a)
        }));
        self.storage.log_entries(&entries)?;
        tracing::info!(
            agreements = removed.len(),
            cascaded = entries.len() - removed.len(),
            "agreements deleted"
        );

        Ok(removed.len())
    }

    /// Summaries for a set of agreements, reading children once
    pub fn summarize(
        &self,
        agreements: Vec<Agreement>,
        today: NaiveDate,
    ) -> ConvenioResult<Vec<AgreementSummary>> {
        let ids: HashSet<AgreementId> = agreements.iter().map(|a| a.id).collect();
        let contracts = self
            .storage
            .contracts
            .filter(|c| ids.contains(&c.agreement_id))?;
        let contract_ids: HashSet<ContractId> = contracts.iter().map(|c| c.id).collect();
        let amendments = self
            .storage
            .amendments
            .filter(|a| contract_ids.contains(&a.contract_id))?;
        let payments = self
            .storage
            .payments
            .filter(|p| contract_ids.contains(&p.contract_id))?;

        // (contracted total, total paid, contract count) per agreement
        let mut totals: HashMap<AgreementId, (Money, Money, usize)> = HashMap::new();
        for contract in &contracts {
            let financials = ContractFinancials::compute(contract, &amendments, &payments)?;
            let entry = totals
                .entry(contract.agreement_id)
                .or_insert((Money::zero(), Money::zero(), 0));
            entry.0 = entry.0.checked_add(financials.adjusted_value).ok_or(MoneyOverflow)?;
            entry.1 = entry.1.checked_add(financials.total_paid).ok_or(MoneyOverflow)?;
            entry.2 += 1;
        }

        Ok(agreements
            .into_iter()
            .map(|agreement| {
                let (contracted_total, total_paid, contract_count) = totals
                    .get(&agreement.id)
                    .copied()
                    .unwrap_or((Money::zero(), Money::zero(), 0));
                let days_to_expire = agreement.days_to_expire(today);
                let alert = AlertBucket::classify(days_to_expire);
                AgreementSummary {
                    total_value: agreement.total_value(),
                    total_paid,
                    balance: agreement.balance(total_paid),
                    contracted_total,
                    days_to_expire,
                    alert,
                    alert_badge: alert.badge(days_to_expire),
                    contract_count,
                    agreement,
                }
            })
            .collect())
    }

    pub fn summary(&self, agreement: Agreement, today: NaiveDate) -> ConvenioResult<AgreementSummary> {
        self.summarize(vec![agreement], today)?
            .pop()
            .ok_or_else(|| ConvenioError::Storage("agreement summary missing".into()))
    }

    pub fn detail(&self, id: AgreementId, today: NaiveDate) -> ConvenioResult<AgreementDetail> {
        let agreement = self
            .storage
            .agreements
            .get(id)?
            .ok_or_else(|| ConvenioError::agreement_not_found(id.to_string()))?;

        let contract_service = ContractService::new(self.storage);
        let contracts = contract_service.summarize(contract_service.list_by_agreement(id)?)?;
        let summary = self.summary(agreement, today)?;

        Ok(AgreementDetail { summary, contracts })
    }
}
