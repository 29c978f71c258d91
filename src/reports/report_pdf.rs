//! PDF rendition of an [`AgreementReport`]
//!
//! A4 landscape: header with filters and totals, the full (uncapped) listing
//! paginated with a repeated table header, then one page of charts.

use chrono::NaiveDateTime;

use crate::models::{Agreement, Money};

use super::agreements::AgreementReport;
use super::chart::{bar_chart, line_chart, pie_chart, Chart, GRID};
use super::pdf::{fit_text, text_width, Font, PdfDocument, PdfPage, A4_LANDSCAPE};

pub const REPORT_TITLE: &str = "Relatório Geral de Convênios";
pub const REPORT_FILENAME: &str = "relatorio_convenios.pdf";

const MARGIN: f64 = 36.0;
const ROW_HEIGHT: f64 = 12.0;
const TABLE_FONT: f64 = 7.0;
const HEADER_FILL: [u8; 3] = [230, 233, 238];

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Column {
    title: &'static str,
    width: f64,
    align: Align,
}

const COLUMNS: [Column; 11] = [
    Column { title: "Número", width: 64.0, align: Align::Left },
    Column { title: "Órgão", width: 140.0, align: Align::Left },
    Column { title: "Parlamentar", width: 90.0, align: Align::Left },
    Column { title: "Tipo", width: 60.0, align: Align::Left },
    Column { title: "Status", width: 66.0, align: Align::Left },
    Column { title: "Recebido", width: 40.0, align: Align::Left },
    Column { title: "Início", width: 46.0, align: Align::Left },
    Column { title: "Fim", width: 46.0, align: Align::Left },
    Column { title: "Repasse", width: 74.0, align: Align::Right },
    Column { title: "Contrapartida", width: 74.0, align: Align::Right },
    Column { title: "Total", width: 70.0, align: Align::Right },
];

fn cells(agreement: &Agreement) -> [String; 11] {
    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default()
    };
    [
        agreement.reference().to_string(),
        agreement.agency.clone(),
        agreement.legislator_name.clone().unwrap_or_default(),
        agreement.agreement_type.label().to_string(),
        agreement.status.label().to_string(),
        if agreement.transfer_received { "Sim" } else { "Não" }.to_string(),
        date(agreement.validity_start),
        date(Some(agreement.validity_end)),
        agreement.transfer_amount.format_plain(),
        agreement.counterpart_amount.format_plain(),
        agreement.total_value().format_plain(),
    ]
}

fn filter_line(report: &AgreementReport) -> String {
    let params = report.filter.params();
    if params.is_empty() {
        return "Filtros: nenhum".to_string();
    }
    let parts: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("Filtros: {}", parts.join(", "))
}

fn draw_table_header(page: &mut PdfPage, y: f64) {
    let width: f64 = COLUMNS.iter().map(|c| c.width).sum();
    page.fill_rect(MARGIN, y - 3.0, width, ROW_HEIGHT, HEADER_FILL);
    let mut x = MARGIN;
    for column in &COLUMNS {
        match column.align {
            Align::Left => page.text(x + 2.0, y, TABLE_FONT, Font::Bold, column.title),
            Align::Right => {
                page.text_right(x + column.width - 2.0, y, TABLE_FONT, Font::Bold, column.title)
            }
        }
        x += column.width;
    }
}

fn draw_row(page: &mut PdfPage, y: f64, values: &[String; 11]) {
    let mut x = MARGIN;
    for (column, value) in COLUMNS.iter().zip(values) {
        let text = fit_text(value, TABLE_FONT, column.width - 4.0);
        match column.align {
            Align::Left => page.text(x + 2.0, y, TABLE_FONT, Font::Regular, &text),
            Align::Right => page.text_right(x + column.width - 2.0, y, TABLE_FONT, Font::Regular, &text),
        }
        x += column.width;
    }
}

fn draw_header(page: &mut PdfPage, top: f64, report: &AgreementReport, generated_at: NaiveDateTime) -> f64 {
    page.text(MARGIN, top, 16.0, Font::Bold, REPORT_TITLE);
    page.text(
        MARGIN,
        top - 16.0,
        9.0,
        Font::Regular,
        &format!("Gerado em {}", generated_at.format("%d/%m/%Y %H:%M")),
    );
    page.text(MARGIN, top - 28.0, 9.0, Font::Regular, &filter_line(report));
    page.text(
        MARGIN,
        top - 44.0,
        10.0,
        Font::Bold,
        &format!(
            "Convênios: {}    Repasse: {}    Contrapartida: {}    Total geral: {}",
            report.total_count,
            report.total_transfer,
            report.total_counterpart,
            report.grand_total
        ),
    );
    top - 66.0
}

fn draw_chart(page: &mut PdfPage, chart: &Chart, x: f64, y: f64, w: f64) {
    let h = w * chart.image.height() as f64 / chart.image.width() as f64;

    page.text(x, y + h + 6.0, 10.0, Font::Bold, &chart.title);
    page.image(&chart.image, x, y, w, h);
    page.line((x, y), (x + w, y), 0.3, GRID);

    if let Some(note) = &chart.note {
        page.text_right(x + w, y + h + 6.0, 7.0, Font::Regular, note);
    }
    if let Some(placeholder) = chart.placeholder {
        page.text_centered(x + w / 2.0, y + h / 2.0, 10.0, Font::Regular, placeholder);
    }

    // Thin out axis labels that would overlap
    if !chart.axis_labels.is_empty() {
        let widest = chart
            .axis_labels
            .iter()
            .map(|l| text_width(&l.text, 6.0))
            .fold(0.0, f64::max)
            + 4.0;
        let per_label = w / chart.axis_labels.len() as f64;
        let step = (widest / per_label).ceil().max(1.0) as usize;
        for label in chart.axis_labels.iter().step_by(step) {
            let text = fit_text(&label.text, 6.0, per_label * step as f64);
            page.text_centered(x + label.position * w, y - 9.0, 6.0, Font::Regular, &text);
        }
    }

    // Legend sits on the right side of the image, beside the pie
    let mut legend_y = y + h - 14.0;
    for entry in &chart.legend {
        let lx = x + w * 0.45;
        page.fill_rect(lx, legend_y, 7.0, 7.0, entry.color);
        page.text(lx + 10.0, legend_y + 0.5, 7.0, Font::Regular, &entry.text);
        legend_y -= 11.0;
    }
}

fn build_charts(report: &AgreementReport) -> (Chart, Chart, Chart) {
    let (type_labels, type_values): (Vec<String>, Vec<u64>) = report
        .by_type
        .iter()
        .map(|t| (t.type_code.clone(), t.count as u64))
        .unzip();
    let (status_labels, status_values): (Vec<String>, Vec<u64>) = report
        .by_status
        .iter()
        .map(|s| (s.status_code.clone(), s.count as u64))
        .unzip();
    let (month_labels, month_values): (Vec<String>, Vec<f64>) = report
        .transfer_by_month
        .iter()
        .map(|m| (m.month.clone(), m.amount.to_f64()))
        .unzip();
    let peak = report
        .transfer_by_month
        .iter()
        .map(|m| m.amount)
        .max()
        .unwrap_or_else(Money::zero);

    (
        bar_chart("Convênios por Tipo", &type_labels, &type_values),
        pie_chart("Convênios por Status", &status_labels, &status_values),
        line_chart(
            "Repasse por mês",
            &month_labels,
            &month_values,
            Some(format!("Máx: {}", peak)),
        ),
    )
}

/// Render the report as PDF bytes
pub fn render(report: &AgreementReport, generated_at: NaiveDateTime) -> Vec<u8> {
    let mut doc = PdfDocument::new(A4_LANDSCAPE);
    let top = doc.height() - MARGIN - 10.0;

    let mut page = doc.add_page();
    let mut y = draw_header(page, top, report, generated_at);

    if report.agreements.is_empty() {
        page.text(MARGIN, y, 9.0, Font::Regular, "Nenhum convênio encontrado.");
    } else {
        draw_table_header(page, y);
        y -= ROW_HEIGHT;
        for agreement in &report.agreements {
            if y < MARGIN {
                page = doc.add_page();
                y = top;
                draw_table_header(page, y);
                y -= ROW_HEIGHT;
            }
            draw_row(page, y, &cells(agreement));
            y -= ROW_HEIGHT;
        }
    }

    let (by_type, by_status, by_month) = build_charts(report);
    let page = doc.add_page();
    page.text(MARGIN, top, 14.0, Font::Bold, "Gráficos");
    draw_chart(page, &by_type, MARGIN, 380.0, 360.0);
    draw_chart(page, &by_status, 446.0, 380.0, 360.0);
    draw_chart(page, &by_month, MARGIN, 60.0, 600.0);

    tracing::debug!(pages = doc.page_count(), rows = report.agreements.len(), "report pdf rendered");
    doc.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgreementType;
    use crate::reports::filter::AgreementFilter;
    use chrono::NaiveDate;

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn agreement(agency: &str, cents: i64) -> Agreement {
        let mut a = Agreement::new(
            AgreementType::Federal,
            agency,
            "Objeto",
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        );
        a.validity_start = NaiveDate::from_ymd_opt(2025, 1, 15);
        a.transfer_amount = Money::from_cents(cents);
        a
    }

    #[test]
    fn test_empty_report() {
        let report = AgreementReport::from_matches(AgreementFilter::default(), Vec::new(), 200).unwrap();
        let bytes = render(&report, generated_at());

        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert!(count(&bytes, b"Relat\xf3rio Geral de Conv\xeanios") >= 1);
        assert!(count(&bytes, b"(Sem dados)") >= 1);
        assert!(count(&bytes, b"Filtros: nenhum") == 1);
        assert!(count(&bytes, b"/Count 2") == 1);
        assert_eq!(count(&bytes, b"/Subtype /Image"), 3);
    }

    #[test]
    fn test_listing_paginates_and_is_uncapped() {
        let agreements: Vec<Agreement> = (0..120)
            .map(|i| agreement(&format!("Orgao {:03}", i), 100_00))
            .collect();
        // Listing cap does not limit the PDF
        let report = AgreementReport::from_matches(AgreementFilter::default(), agreements, 10).unwrap();
        let bytes = render(&report, generated_at());

        assert_eq!(count(&bytes, b"(Orgao "), 120);
        // Table header repeats on every table page
        let table_pages = count(&bytes, b"(Contrapartida) Tj");
        assert!(table_pages >= 3);
        let expected = format!("/Count {}", table_pages + 1);
        assert_eq!(count(&bytes, expected.as_bytes()), 1);
    }

    #[test]
    fn test_filters_and_totals_printed() {
        let filter = AgreementFilter::from_pairs([("orgao", "Saude")]);
        let report = AgreementReport::from_matches(filter, vec![agreement("Saude", 150_000)], 200).unwrap();
        let bytes = render(&report, generated_at());

        assert_eq!(count(&bytes, b"Filtros: orgao=Saude"), 1);
        assert_eq!(count(&bytes, b"Gerado em 10/03/2025 14:05"), 1);
        assert!(count(&bytes, b"Repasse: R$ 1.500,00") == 1);
        assert_eq!(count(&bytes, b"(Sem dados)"), 0);
    }
}
