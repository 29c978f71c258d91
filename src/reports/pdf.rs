//! Minimal PDF 1.4 writer
//!
//! Supports what the report needs: the two standard Helvetica faces with
//! WinAnsi encoding, filled rectangles, stroked lines and uncompressed RGB
//! images. Coordinates are PDF points with the origin at the bottom left.

use std::fmt::Write as _;

use super::chart::{Canvas, Rgb};

/// A4 landscape
pub const A4_LANDSCAPE: (f64, f64) = (842.0, 595.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Approximate Helvetica advance width of `text` at `size` points
pub fn text_width(text: &str, size: f64) -> f64 {
    let em: f64 = text
        .chars()
        .map(|c| match c {
            ' ' | 'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.278,
            'f' | 't' | 'r' | '(' | ')' | '/' | '-' => 0.333,
            'm' | 'M' | 'W' => 0.833,
            'w' => 0.722,
            c if c.is_ascii_digit() => 0.556,
            c if c.is_uppercase() => 0.667,
            _ => 0.52,
        })
        .sum();
    em * size
}

/// Cut `text` with an ellipsis so it fits in `max_width` points
pub fn fit_text(text: &str, size: f64, max_width: f64) -> String {
    if text_width(text, size) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        out.push(c);
        if text_width(&out, size) + text_width("...", size) > max_width {
            out.pop();
            break;
        }
    }
    out.push_str("...");
    out
}

/// Encode as a WinAnsi PDF string literal body, escaping delimiters
pub fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            ' '..='~' => out.push(c as u8),
            '\u{a0}'..='\u{ff}' => out.push(c as u32 as u8),
            '€' => out.push(0x80),
            '…' => out.push(0x85),
            '•' => out.push(0x95),
            '–' => out.push(0x96),
            '—' => out.push(0x97),
            '‘' => out.push(0x91),
            '’' => out.push(0x92),
            '“' => out.push(0x93),
            '”' => out.push(0x94),
            '≤' => out.extend_from_slice(b"<="),
            '≥' => out.extend_from_slice(b">="),
            c if c.is_control() => out.push(b' '),
            _ => out.push(b'?'),
        }
    }
    out
}

fn num(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn color(c: Rgb) -> String {
    format!(
        "{} {} {}",
        num(c[0] as f64 / 255.0),
        num(c[1] as f64 / 255.0),
        num(c[2] as f64 / 255.0)
    )
}

/// Drawing operations of one page
#[derive(Debug, Default)]
pub struct PdfPage {
    content: Vec<u8>,
    images: Vec<Canvas>,
}

impl PdfPage {
    fn op(&mut self, op: &str) {
        self.content.extend_from_slice(op.as_bytes());
        self.content.push(b'\n');
    }

    pub fn text(&mut self, x: f64, y: f64, size: f64, font: Font, text: &str) {
        self.text_colored(x, y, size, font, [0, 0, 0], text);
    }

    pub fn text_colored(&mut self, x: f64, y: f64, size: f64, font: Font, fill: Rgb, text: &str) {
        let mut op = String::new();
        let _ = write!(
            op,
            "q {} rg BT /{} {} Tf {} {} Td (",
            color(fill),
            font.resource(),
            num(size),
            num(x),
            num(y)
        );
        self.content.extend_from_slice(op.as_bytes());
        self.content.extend_from_slice(&encode_text(text));
        self.op(") Tj ET Q");
    }

    /// Right-aligned at `right`
    pub fn text_right(&mut self, right: f64, y: f64, size: f64, font: Font, text: &str) {
        self.text(right - text_width(text, size), y, size, font, text);
    }

    /// Centered on `center`
    pub fn text_centered(&mut self, center: f64, y: f64, size: f64, font: Font, text: &str) {
        self.text(center - text_width(text, size) / 2.0, y, size, font, text);
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Rgb) {
        self.op(&format!(
            "q {} rg {} {} {} {} re f Q",
            color(fill),
            num(x),
            num(y),
            num(w),
            num(h)
        ));
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, stroke: Rgb) {
        self.op(&format!(
            "q {} RG {} w {} {} m {} {} l S Q",
            color(stroke),
            num(width),
            num(from.0),
            num(from.1),
            num(to.0),
            num(to.1)
        ));
    }

    /// Draw `canvas` scaled into the box with lower-left corner (x, y)
    pub fn image(&mut self, canvas: &Canvas, x: f64, y: f64, w: f64, h: f64) {
        let name = format!("Im{}", self.images.len());
        self.images.push(canvas.clone());
        self.op(&format!(
            "q {} 0 0 {} {} {} cm /{} Do Q",
            num(w),
            num(h),
            num(x),
            num(y),
            name
        ));
    }
}

/// A multi-page document with uniform page size
#[derive(Debug)]
pub struct PdfDocument {
    width: f64,
    height: f64,
    pages: Vec<PdfPage>,
}

impl PdfDocument {
    pub fn new((width, height): (f64, f64)) -> Self {
        Self {
            width,
            height,
            pages: Vec::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn add_page(&mut self) -> &mut PdfPage {
        self.pages.push(PdfPage::default());
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Serialize the document
    pub fn to_bytes(&self) -> Vec<u8> {
        // Object numbers: 1 catalog, 2 page tree, 3-4 fonts, then per page:
        // page, content stream, images
        let mut objects: Vec<Vec<u8>> = vec![Vec::new(); 4];
        let mut page_refs = Vec::with_capacity(self.pages.len());

        for page in &self.pages {
            let page_no = objects.len() + 1;
            let content_no = page_no + 1;
            let first_image_no = content_no + 1;
            page_refs.push(format!("{} 0 R", page_no));

            let xobjects: String = (0..page.images.len())
                .map(|i| format!("/Im{} {} 0 R ", i, first_image_no + i))
                .collect();
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> /XObject << {}>> >> \
                     /Contents {} 0 R >>",
                    num(self.width),
                    num(self.height),
                    xobjects,
                    content_no
                )
                .into_bytes(),
            );
            objects.push(stream(String::new(), &page.content));
            for canvas in &page.images {
                objects.push(stream(
                    format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceRGB /BitsPerComponent 8",
                        canvas.width(),
                        canvas.height()
                    ),
                    canvas.pixels(),
                ));
            }
        }

        objects[0] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        objects[1] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            page_refs.join(" "),
            self.pages.len()
        )
        .into_bytes();
        objects[2] = font_object("Helvetica");
        objects[3] = font_object("Helvetica-Bold");

        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

fn font_object(base: &str) -> Vec<u8> {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        base
    )
    .into_bytes()
}

fn stream(dict_entries: String, data: &[u8]) -> Vec<u8> {
    let mut out = format!("<< {} /Length {} >>\nstream\n", dict_entries, data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream");
    out
}
