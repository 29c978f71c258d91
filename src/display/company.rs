//! Company display formatting

use tabled::Tabled;

use crate::models::Company;

use super::{opt, table};

#[derive(Tabled)]
struct CompanyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CNPJ")]
    tax_id: String,
    #[tabled(rename = "Razão social")]
    legal_name: String,
    #[tabled(rename = "Nome fantasia")]
    trade_name: String,
}

pub fn format_company_list(companies: &[Company]) -> String {
    let rows = companies
        .iter()
        .map(|c| CompanyRow {
            id: c.id.to_string(),
            tax_id: c.tax_id.clone(),
            legal_name: c.legal_name.clone(),
            trade_name: opt(&c.trade_name),
        })
        .collect();
    table(rows, "Nenhuma empresa cadastrada.")
}

pub fn format_company_details(company: &Company, contract_count: usize) -> String {
    let mut output = String::new();
    output.push_str(&format!("Empresa: {}\n", company.display_name()));
    output.push_str(&format!("  ID:            {}\n", company.id));
    output.push_str(&format!("  CNPJ:          {}\n", company.tax_id));
    output.push_str(&format!("  Razão social:  {}\n", company.legal_name));
    output.push_str(&format!("  Nome fantasia: {}\n", opt(&company.trade_name)));
    output.push_str(&format!("  Contratos:     {}\n", contract_count));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_list() {
        let mut company = Company::new("12.345.678/0001-90", "Alfa Engenharia Ltda");
        company.trade_name = Some("Alfa".into());
        let text = format_company_list(&[company]);
        assert!(text.contains("CNPJ"));
        assert!(text.contains("12.345.678/0001-90"));
        assert!(text.contains("Alfa Engenharia Ltda"));
        assert_eq!(format_company_list(&[]), "Nenhuma empresa cadastrada.");
    }

    #[test]
    fn test_company_details_fallback() {
        let company = Company::new("1", "Beta SA");
        let text = format_company_details(&company, 2);
        assert!(text.starts_with("Empresa: Beta SA"));
        assert!(text.contains("Nome fantasia: -"));
        assert!(text.contains("Contratos:     2"));
    }
}
