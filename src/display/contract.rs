//! Contract, amendment and payment display formatting

use tabled::Tabled;

use crate::models::{Amendment, Payment};
use crate::services::ContractSummary;

use super::{opt, table};

#[derive(Tabled)]
struct ContractRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Número")]
    number: String,
    #[tabled(rename = "Empresa")]
    company: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Contratado")]
    contracted: String,
    #[tabled(rename = "Ajustado")]
    adjusted: String,
    #[tabled(rename = "Pago")]
    paid: String,
    #[tabled(rename = "Saldo")]
    balance: String,
}

pub fn format_contract_list(summaries: &[ContractSummary]) -> String {
    let rows = summaries
        .iter()
        .map(|s| ContractRow {
            id: s.contract.id.to_string(),
            number: s.contract.number.clone(),
            company: s.company_name.clone(),
            status: s.contract.status.to_string(),
            contracted: s.financials.contracted_value.to_string(),
            adjusted: s.financials.adjusted_value.to_string(),
            paid: s.financials.total_paid.to_string(),
            balance: s.financials.balance.to_string(),
        })
        .collect();
    table(rows, "Nenhum contrato.")
}

#[derive(Tabled)]
struct AmendmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Número")]
    number: String,
    #[tabled(rename = "Tipo")]
    kind: String,
    #[tabled(rename = "Data")]
    date: String,
    #[tabled(rename = "Acréscimo")]
    increase: String,
    #[tabled(rename = "Supressão")]
    decrease: String,
    #[tabled(rename = "Prorrogação")]
    extension: String,
}

pub fn format_amendment_list(amendments: &[Amendment], date_format: &str) -> String {
    let rows = amendments
        .iter()
        .map(|a| AmendmentRow {
            id: a.id.to_string(),
            number: a.number.clone(),
            kind: a.amendment_type.to_string(),
            date: a.date.format(date_format).to_string(),
            increase: a.increase.to_string(),
            decrease: a.decrease.to_string(),
            extension: if a.extension_days > 0 {
                format!("{} dias", a.extension_days)
            } else {
                "-".to_string()
            },
        })
        .collect();
    table(rows, "Nenhum aditivo.")
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Data")]
    date: String,
    #[tabled(rename = "Valor")]
    amount: String,
    #[tabled(rename = "Empenho")]
    commitment: String,
    #[tabled(rename = "OB")]
    bank_order: String,
    #[tabled(rename = "NF")]
    invoice: String,
}

pub fn format_payment_list(payments: &[Payment], date_format: &str) -> String {
    let rows = payments
        .iter()
        .map(|p| PaymentRow {
            id: p.id.to_string(),
            date: p.date.format(date_format).to_string(),
            amount: p.amount.to_string(),
            commitment: opt(&p.commitment_number),
            bank_order: opt(&p.bank_order_number),
            invoice: opt(&p.invoice_number),
        })
        .collect();
    table(rows, "Nenhum pagamento.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmendmentType, ContractId, Money};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn test_amendment_list() {
        let mut amendment = Amendment::new(ContractId::new(), AmendmentType::Value, "1º TA", date());
        amendment.increase = Money::from_cents(12_345);
        let text = format_amendment_list(&[amendment], "%d/%m/%Y");
        assert!(text.contains("1º TA"));
        assert!(text.contains("04/03/2025"));
        assert!(text.contains("R$ 123,45"));
    }

    #[test]
    fn test_payment_list() {
        let mut payment = Payment::new(ContractId::new(), date(), Money::from_cents(50_000));
        payment.invoice_number = Some("NF-10".into());
        let text = format_payment_list(&[payment], "%Y-%m-%d");
        assert!(text.contains("2025-03-04"));
        assert!(text.contains("NF-10"));
        assert!(text.contains("R$ 500,00"));
        assert_eq!(format_payment_list(&[], "%Y"), "Nenhum pagamento.");
    }
}
