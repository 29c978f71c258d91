//! CSV export
//!
//! Spreadsheet-friendly dumps of the filtered agreement report and of
//! contracts with their derived figures.

use std::io::Write;

use crate::error::{ConvenioError, ConvenioResult};
use crate::reports::AgreementReport;
use crate::services::ContractService;
use crate::storage::Storage;

fn export_err(e: impl std::fmt::Display) -> ConvenioError {
    ConvenioError::Export(e.to_string())
}

fn decimal(value: crate::models::Money) -> String {
    format!("{:.2}", value.to_f64())
}

/// Every agreement of the report (not capped by the listing limit)
pub fn export_report_csv<W: Write>(report: &AgreementReport, writer: W) -> ConvenioResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "id",
        "numero_convenio",
        "numero_proposta",
        "numero_indicacao",
        "orgao_concedente",
        "parlamentar_nome",
        "tipo",
        "status",
        "repasse_recebido",
        "valor_repasse",
        "valor_contrapartida",
        "valor_total",
        "vigencia_inicio",
        "vigencia_fim",
    ])
    .map_err(export_err)?;

    for a in &report.agreements {
        csv.write_record([
            a.id.as_uuid().to_string(),
            a.instrument_number.clone().unwrap_or_default(),
            a.proposal_number.clone().unwrap_or_default(),
            a.indication_number.clone().unwrap_or_default(),
            a.agency.clone(),
            a.legislator_name.clone().unwrap_or_default(),
            a.agreement_type.code().to_string(),
            a.status.code().to_string(),
            if a.transfer_received { "1" } else { "0" }.to_string(),
            decimal(a.transfer_amount),
            decimal(a.counterpart_amount),
            decimal(a.total_value()),
            a.validity_start.map(|d| d.to_string()).unwrap_or_default(),
            a.validity_end.to_string(),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(export_err)?;
    Ok(())
}

/// All contracts with adjusted value, paid total and balance
pub fn export_contracts_csv<W: Write>(storage: &Storage, writer: W) -> ConvenioResult<()> {
    let service = ContractService::new(storage);
    let summaries = service.summarize(service.list()?)?;

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "id",
        "agreement_id",
        "number",
        "company",
        "status",
        "start_date",
        "contracted_value",
        "increases",
        "decreases",
        "adjusted_value",
        "total_paid",
        "balance",
    ])
    .map_err(export_err)?;

    for s in &summaries {
        let f = &s.financials;
        csv.write_record([
            s.contract.id.as_uuid().to_string(),
            s.contract.agreement_id.as_uuid().to_string(),
            s.contract.number.clone(),
            s.company_name.clone(),
            s.contract.status.code().to_string(),
            s.contract.start_date.to_string(),
            decimal(f.contracted_value),
            decimal(f.increases),
            decimal(f.decreases),
            decimal(f.adjusted_value),
            decimal(f.total_paid),
            decimal(f.balance),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(export_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Agreement, AgreementType, Company, Contract, Money, Payment};
    use crate::reports::AgreementFilter;
    use crate::services::test_support::create_test_storage;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn test_report_csv_quotes_and_totals() {
        let mut agreement = Agreement::new(
            AgreementType::Federal,
            "Ministério da Saúde, DF",
            "Objeto",
            date(12, 31),
        );
        agreement.transfer_amount = Money::from_cents(100_000);
        agreement.counterpart_amount = Money::from_cents(50_000);
        agreement.transfer_received = true;

        let report = AgreementReport::from_matches(AgreementFilter::default(), vec![agreement], 200).unwrap();
        let mut out = Vec::new();
        export_report_csv(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,numero_convenio"));
        assert!(lines[1].contains("\"Ministério da Saúde, DF\""));
        assert!(lines[1].contains(",FEDERAL,PROPOSTA,1,1000.00,500.00,1500.00,,2025-12-31"));
    }

    #[test]
    fn test_contracts_csv_balance() {
        let (_temp_dir, storage) = create_test_storage();
        let company = Company::new("1", "Alfa");
        let agreement = Agreement::new(AgreementType::Federal, "Org", "Obj", date(12, 31));
        let contract = Contract::new(
            agreement.id,
            company.id,
            "CT-9",
            "Obj",
            Money::from_cents(100_000),
            date(1, 1),
        );
        storage.companies.upsert(company).unwrap();
        storage.agreements.upsert(agreement).unwrap();
        storage.contracts.upsert(contract.clone()).unwrap();
        storage
            .payments
            .upsert(Payment::new(contract.id, date(2, 1), Money::from_cents(30_000)))
            .unwrap();

        let mut out = Vec::new();
        export_contracts_csv(&storage, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("CT-9,Alfa,"));
        assert!(text.trim_end().ends_with("1000.00,0.00,0.00,1000.00,300.00,700.00"));
    }
}
