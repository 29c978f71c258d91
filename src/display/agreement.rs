//! Agreement display formatting

use tabled::Tabled;

use crate::services::{AgreementDetail, AgreementSummary};

use super::{opt, table};

#[derive(Tabled)]
struct AgreementRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Número")]
    reference: String,
    #[tabled(rename = "Tipo")]
    agreement_type: String,
    #[tabled(rename = "Órgão")]
    agency: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Fim")]
    validity_end: String,
    #[tabled(rename = "Prazo")]
    badge: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Saldo")]
    balance: String,
    #[tabled(rename = "Repasse")]
    received: &'static str,
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

/// Table of agreement summaries
pub fn format_agreement_list(summaries: &[AgreementSummary], date_format: &str) -> String {
    let rows = summaries
        .iter()
        .map(|s| {
            let a = &s.agreement;
            AgreementRow {
                id: a.id.to_string(),
                reference: a.reference().to_string(),
                agreement_type: a.agreement_type.label().to_string(),
                agency: truncate(&a.agency, 30),
                status: a.status.label().to_string(),
                validity_end: a.validity_end.format(date_format).to_string(),
                badge: s.alert_badge.clone(),
                total: s.total_value.to_string(),
                balance: s.balance.to_string(),
                received: if a.transfer_received { "recebido" } else { "pendente" },
            }
        })
        .collect();
    table(rows, "Nenhum convênio encontrado.")
}

/// Full view of one agreement with its contracts
pub fn format_agreement_detail(detail: &AgreementDetail, date_format: &str) -> String {
    let s = &detail.summary;
    let a = &s.agreement;
    let date = |d: chrono::NaiveDate| d.format(date_format).to_string();

    let mut output = String::new();
    output.push_str(&format!("Convênio {} ({})\n", a.reference(), a.id));
    output.push_str(&format!("  Tipo:            {}\n", a.agreement_type));
    output.push_str(&format!("  Status:          {}\n", a.status));
    output.push_str(&format!("  Órgão:           {}\n", a.agency));
    output.push_str(&format!("  Objeto:          {}\n", a.object));
    output.push_str(&format!("  Parlamentar:     {}\n", opt(&a.legislator_name)));
    output.push_str(&format!("  Indicação:       {}\n", opt(&a.indication_number)));
    output.push_str(&format!("  Proposta:        {}\n", opt(&a.proposal_number)));
    output.push_str(&format!("  Instrumento:     {}\n", opt(&a.instrument_number)));
    output.push_str(&format!(
        "  Vigência:        {} a {}\n",
        a.validity_start.map(date).unwrap_or_else(|| "-".into()),
        date(a.validity_end)
    ));
    output.push_str(&format!("  Prazo:           {} ({})\n", s.alert_badge, s.alert));
    output.push_str(&format!(
        "  Licitação:       {}{}\n",
        if a.bid_held { "realizada" } else { "não realizada" },
        a.modality
            .as_deref()
            .map(|m| format!(" ({})", m))
            .unwrap_or_default()
    ));
    output.push_str(&format!(
        "  Repasse:         {}\n",
        if a.transfer_received { "recebido" } else { "pendente" }
    ));
    if let Some(by) = &a.created_by {
        output.push_str(&format!("  Cadastrado por:  {}\n", by));
    }
    output.push('\n');

    output.push_str(&format!("  Valor repasse:       {:>18}\n", a.transfer_amount));
    output.push_str(&format!("  Valor contrapartida: {:>18}\n", a.counterpart_amount));
    output.push_str(&format!("  Valor total:         {:>18}\n", s.total_value));
    output.push_str(&format!("  Contratado:          {:>18}\n", s.contracted_total));
    output.push_str(&format!("  Pago:                {:>18}\n", s.total_paid));
    output.push_str(&format!("  Saldo:               {:>18}\n", s.balance));

    if let Some(notes) = &a.notes {
        output.push_str(&format!("\n  Observações: {}\n", notes));
    }

    output.push_str(&format!("\nContratos ({})\n", detail.contracts.len()));
    output.push_str(&super::contract::format_contract_list(&detail.contracts));
    output.push('\n');
    output
}
