//! Core data models
//!
//! This module contains the data structures of the domain: companies,
//! agreements, contracts, amendments, payments, money and ids.

pub mod agreement;
pub mod alert;
pub mod amendment;
pub mod company;
pub mod contract;
pub mod ids;
pub mod money;
pub mod payment;

pub use agreement::{Agreement, AgreementStatus, AgreementType};
pub use alert::AlertBucket;
pub use amendment::{Amendment, AmendmentType};
pub use company::Company;
pub use contract::{Contract, ContractFinancials, ContractStatus};
pub use ids::{AgreementId, AmendmentId, CompanyId, ContractId, PaymentId};
pub use money::{Money, MoneyOverflow};
pub use payment::Payment;
