//! Report filters
//!
//! Built from request parameters (`data_ini`, `data_fim`, `status`, `orgao`,
//! `tipo`, `modalidade`, `parlamentar`, `repasse_recebido`). Every supplied
//! criterion must hold; blank or malformed values are ignored.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use crate::models::alert::RED_THRESHOLD_DAYS;
use crate::models::Agreement;

/// The `status` criterion: either a pseudo-status derived from the
/// validity end or a persisted status code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    /// `validity_end < today`
    Expired,
    /// `today <= validity_end <= today + 30`
    Expiring,
    /// `validity_end > today + 30`
    Ok,
    /// Persisted status code, compared case-insensitively
    Code(String),
}

impl StatusFilter {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some(match value.to_uppercase().as_str() {
            "VENCIDOS" | "EXPIRED" => Self::Expired,
            "VENCENDO" | "EXPIRING" => Self::Expiring,
            "OK" => Self::Ok,
            _ => Self::Code(value.to_string()),
        })
    }

    pub fn matches(&self, agreement: &Agreement, today: NaiveDate) -> bool {
        let horizon = today + Duration::days(RED_THRESHOLD_DAYS);
        let end = agreement.validity_end;
        match self {
            Self::Expired => end < today,
            Self::Expiring => today <= end && end <= horizon,
            Self::Ok => end > horizon,
            Self::Code(code) => agreement.status.code().eq_ignore_ascii_case(code),
        }
    }

    /// Value as it would appear in a request
    pub fn as_param(&self) -> &str {
        match self {
            Self::Expired => "VENCIDOS",
            Self::Expiring => "VENCENDO",
            Self::Ok => "OK",
            Self::Code(code) => code,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgreementFilter {
    /// Validity starts on or after this date; agreements without a start pass
    pub start_from: Option<NaiveDate>,
    /// Validity ends on or before this date
    pub end_until: Option<NaiveDate>,
    pub status: Option<StatusFilter>,
    /// Agency name contains (case-insensitive)
    pub agency: Option<String>,
    /// Type code contains (case-insensitive)
    pub agreement_type: Option<String>,
    pub modality: Option<String>,
    pub legislator: Option<String>,
    pub transfer_received: Option<bool>,
}

fn text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

impl AgreementFilter {
    /// Build from query parameters. Unknown keys are ignored; when a key
    /// repeats, the last value wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "data_ini" => filter.start_from = date(value),
                "data_fim" => filter.end_until = date(value),
                "status" => filter.status = StatusFilter::parse(value),
                "orgao" => filter.agency = text(value),
                "tipo" => filter.agreement_type = text(value),
                "modalidade" => filter.modality = text(value),
                "parlamentar" => filter.legislator = text(value),
                "repasse_recebido" => {
                    filter.transfer_received = match value.trim() {
                        "1" => Some(true),
                        "0" => Some(false),
                        _ => None,
                    }
                }
                _ => {}
            }
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, agreement: &Agreement, today: NaiveDate) -> bool {
        if let Some(from) = self.start_from {
            if matches!(agreement.validity_start, Some(start) if start < from) {
                return false;
            }
        }
        if let Some(until) = self.end_until {
            if agreement.validity_end > until {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if !status.matches(agreement, today) {
                return false;
            }
        }
        if let Some(agency) = &self.agency {
            if !contains(Some(&agreement.agency), agency) {
                return false;
            }
        }
        if let Some(code) = &self.agreement_type {
            if !contains(Some(agreement.agreement_type.code()), code) {
                return false;
            }
        }
        if let Some(modality) = &self.modality {
            if !contains(agreement.modality.as_deref(), modality) {
                return false;
            }
        }
        if let Some(legislator) = &self.legislator {
            if !contains(agreement.legislator_name.as_deref(), legislator) {
                return false;
            }
        }
        if let Some(received) = self.transfer_received {
            if agreement.transfer_received != received {
                return false;
            }
        }
        true
    }

    /// Keep the matching agreements, each at most once, in input order
    pub fn apply(&self, agreements: Vec<Agreement>, today: NaiveDate) -> Vec<Agreement> {
        let mut seen = HashSet::new();
        agreements
            .into_iter()
            .filter(|a| self.matches(a, today) && seen.insert(a.id))
            .collect()
    }

    /// The criteria in effect, as request parameters
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(d) = self.start_from {
            params.push(("data_ini", d.format("%Y-%m-%d").to_string()));
        }
        if let Some(d) = self.end_until {
            params.push(("data_fim", d.format("%Y-%m-%d").to_string()));
        }
        if let Some(status) = &self.status {
            params.push(("status", status.as_param().to_string()));
        }
        let texts = [
            ("orgao", &self.agency),
            ("tipo", &self.agreement_type),
            ("modalidade", &self.modality),
            ("parlamentar", &self.legislator),
        ];
        for (name, value) in texts {
            if let Some(value) = value {
                params.push((name, value.clone()));
            }
        }
        if let Some(received) = self.transfer_received {
            params.push(("repasse_recebido", if received { "1" } else { "0" }.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgreementStatus, AgreementType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 1)
    }

    fn agreement(agency: &str, end: NaiveDate) -> Agreement {
        Agreement::new(AgreementType::Federal, agency, "Objeto", end)
    }

    fn filter(pairs: &[(&str, &str)]) -> AgreementFilter {
        AgreementFilter::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_blank_and_malformed_values_are_absent() {
        let f = filter(&[
            ("data_ini", "01/02/2025"),
            ("data_fim", ""),
            ("orgao", "   "),
            ("repasse_recebido", "sim"),
            ("pagina", "2"),
        ]);
        assert!(f.is_empty());
    }

    #[test]
    fn test_date_bounds() {
        let mut with_start = agreement("A", date(2025, 12, 31));
        with_start.validity_start = Some(date(2025, 1, 10));
        let without_start = agreement("B", date(2025, 12, 31));

        let f = filter(&[("data_ini", "2025-02-01")]);
        assert!(!f.matches(&with_start, today()));
        assert!(f.matches(&without_start, today()));

        let f = filter(&[("data_fim", "2025-12-31")]);
        assert!(f.matches(&with_start, today()));
        let f = filter(&[("data_fim", "2025-12-30")]);
        assert!(!f.matches(&with_start, today()));
    }

    #[test]
    fn test_pseudo_statuses() {
        let expired = agreement("A", date(2025, 5, 31));
        let due_today = agreement("B", today());
        let due_in_30 = agreement("C", date(2025, 7, 1));
        let due_in_31 = agreement("D", date(2025, 7, 2));

        let f = filter(&[("status", "VENCIDOS")]);
        assert!(f.matches(&expired, today()));
        assert!(!f.matches(&due_today, today()));

        let f = filter(&[("status", "vencendo")]);
        assert!(f.matches(&due_today, today()));
        assert!(f.matches(&due_in_30, today()));
        assert!(!f.matches(&due_in_31, today()));
        assert!(!f.matches(&expired, today()));

        let f = filter(&[("status", "ok")]);
        assert!(f.matches(&due_in_31, today()));
        assert!(!f.matches(&due_in_30, today()));

        assert_eq!(StatusFilter::parse("expiring"), Some(StatusFilter::Expiring));
    }

    #[test]
    fn test_literal_status_code() {
        let mut a = agreement("A", date(2026, 1, 1));
        a.status = AgreementStatus::InExecution;

        assert!(filter(&[("status", "execucao")]).matches(&a, today()));
        assert!(!filter(&[("status", "PROPOSTA")]).matches(&a, today()));
        assert!(!filter(&[("status", "QUALQUER")]).matches(&a, today()));
    }

    #[test]
    fn test_substring_criteria() {
        let mut a = agreement("Ministério da Saúde", date(2026, 1, 1));
        a.agreement_type = AgreementType::HealthEarmark;
        a.legislator_name = Some("Dep. Fulano".into());
        let bare = agreement("Ministério da Saúde", date(2026, 1, 1));

        assert!(filter(&[("orgao", "SAÚDE")]).matches(&a, today()));
        assert!(filter(&[("tipo", "emenda")]).matches(&a, today()));
        assert!(!filter(&[("tipo", "federal")]).matches(&a, today()));
        assert!(filter(&[("parlamentar", "fulano")]).matches(&a, today()));
        assert!(!filter(&[("parlamentar", "fulano")]).matches(&bare, today()));
        assert!(!filter(&[("modalidade", "pregão")]).matches(&bare, today()));
    }

    #[test]
    fn test_transfer_received() {
        let mut yes = agreement("A", date(2026, 1, 1));
        yes.transfer_received = true;
        let no = agreement("B", date(2026, 1, 1));
        let all = vec![yes.clone(), no.clone()];

        let only_yes = filter(&[("repasse_recebido", "1")]).apply(all.clone(), today());
        assert_eq!(only_yes.len(), 1);
        assert!(only_yes[0].transfer_received);

        let only_no = filter(&[("repasse_recebido", "0")]).apply(all.clone(), today());
        assert_eq!(only_no.len(), 1);
        assert!(!only_no[0].transfer_received);

        assert_eq!(filter(&[]).apply(all, today()).len(), 2);
    }

    #[test]
    fn test_order_independent_and_deduplicated() {
        let mut a = agreement("Secretaria", date(2025, 6, 20));
        a.transfer_received = true;
        let b = agreement("Secretaria", date(2025, 6, 20));
        let input = vec![a.clone(), b, a.clone()];

        let f1 = filter(&[("orgao", "secr"), ("status", "VENCENDO"), ("repasse_recebido", "1")]);
        let f2 = filter(&[("repasse_recebido", "1"), ("orgao", "secr"), ("status", "VENCENDO")]);
        assert_eq!(f1, f2);

        let result = f1.apply(input, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, a.id);
    }

    #[test]
    fn test_params_round_trip_through_pairs() {
        let f = filter(&[("status", "vencidos"), ("orgao", "MS"), ("repasse_recebido", "0")]);
        let rebuilt = AgreementFilter::from_pairs(f.params());
        assert_eq!(rebuilt, f);
    }
}
