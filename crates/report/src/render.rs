//! printpdf backend for the sign-in sheet layout. A4 portrait, paginated on a
//! running cursor; the attendee table header repeats after a page break.

use std::fs;
use std::path::Path;

use eyre::Result;
use log::warn;
use printpdf::image_crate;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};

use crate::{fit_box, Header, Row, Section, SheetLayout};

const PAGE_W: f64 = 210.0;
const PAGE_H: f64 = 297.0;
const MARGIN: f64 = 12.0;
const BOTTOM: f64 = 16.0;
const ROW_H: f64 = 12.0;
const TABLE_HEADER_H: f64 = 8.0;
const BANNER_H: f64 = 26.0;
const INFO_LINE_H: f64 = 6.5;
const IMAGE_DPI: f64 = 300.0;

const COLUMNS: [(&str, f64); 8] = [
    ("#", 8.0),
    ("Tipo", 14.0),
    ("Documento", 24.0),
    ("Nombres y Apellidos", 46.0),
    ("Cargo", 26.0),
    ("Ciudad", 20.0),
    ("Firma", 28.0),
    ("Ruta", 20.0),
];

pub fn render(sheet: &SheetLayout) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Registro de Asistencia {}", sheet.date.format("%Y-%m-%d")),
        Mm(PAGE_W as f32),
        Mm(PAGE_H as f32),
        "content",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| eyre::eyre!("failed to load font: {}", err))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| eyre::eyre!("failed to load font: {}", err))?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut pager = Pager {
        doc,
        layer,
        regular,
        bold,
        y: PAGE_H - MARGIN,
    };

    for (index, section) in sheet.sections.iter().enumerate() {
        if index > 0 {
            pager.y -= 8.0;
        }
        draw_section(&mut pager, section);
    }

    if let Some(total) = sheet.grand_total {
        pager.ensure(10.0);
        pager.y -= 7.0;
        pager.text(
            &format!("Total general de asistentes: {total}"),
            11.0,
            MARGIN,
            pager.y,
            true,
        );
    }

    pager
        .doc
        .save_to_bytes()
        .map_err(|err| eyre::eyre!("failed to serialize pdf: {}", err))
}

struct Pager {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f64,
}

impl Pager {
    /// Breaks the page when fewer than `needed` millimeters remain. Returns
    /// true when a new page was started.
    fn ensure(&mut self, needed: f64) -> bool {
        if self.y - needed >= BOTTOM {
            return false;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_W as f32), Mm(PAGE_H as f32), "content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN;
        true
    }

    fn text(&self, text: &str, size: f64, x: f64, y: f64, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size as f32, Mm(x as f32), Mm(y as f32), font);
    }

    fn rect(&self, x: f64, y: f64, w: f64, h: f64) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.layer.set_outline_thickness(0.4);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x as f32), Mm(y as f32)), false),
                (Point::new(Mm((x + w) as f32), Mm(y as f32)), false),
                (Point::new(Mm((x + w) as f32), Mm((y + h) as f32)), false),
                (Point::new(Mm(x as f32), Mm((y + h) as f32)), false),
            ],
            is_closed: true,
        });
    }

    /// Draws an image file fitted into the given box. Missing or unreadable
    /// files leave the cell blank.
    fn image(&self, path: &Path, x: f64, y: f64, max_w: f64, max_h: f64) {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("skipping image {}: {}", path.display(), err);
                return;
            }
        };
        let decoded = match image_crate::load_from_memory(&bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!("skipping image {}: {}", path.display(), err);
                return;
            }
        };

        let native_w = decoded.width() as f64 * 25.4 / IMAGE_DPI;
        let native_h = decoded.height() as f64 * 25.4 / IMAGE_DPI;
        let (w, h) = fit_box(native_w, native_h, max_w, max_h);
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        Image::from_dynamic_image(&decoded).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x as f32)),
                translate_y: Some(Mm(y as f32)),
                scale_x: Some((w / native_w) as f32),
                scale_y: Some((h / native_h) as f32),
                dpi: Some(IMAGE_DPI as f32),
                ..Default::default()
            },
        );
    }
}

fn draw_section(pager: &mut Pager, section: &Section) {
    // Keep the banner, the info block and at least one table row together.
    pager.ensure(BANNER_H + 4.0 * INFO_LINE_H + TABLE_HEADER_H + ROW_H + 12.0);
    draw_banner(pager, &section.header);
    draw_info(pager, &section.header);

    if section.rows.is_empty() {
        pager.y -= 8.0;
        pager.text(
            "No hay asistentes registrados para esta fecha.",
            10.0,
            MARGIN,
            pager.y,
            false,
        );
        pager.y -= 4.0;
    } else {
        draw_table_header(pager);
        for row in &section.rows {
            if pager.ensure(ROW_H + 4.0) {
                draw_table_header(pager);
            }
            draw_row(pager, row);
        }
    }

    pager.ensure(10.0);
    pager.y -= 7.0;
    pager.text(
        &format!("Total de asistentes: {}", section.subtotal),
        10.0,
        MARGIN,
        pager.y,
        true,
    );
    pager.y -= 2.0;
}

fn draw_banner(pager: &mut Pager, header: &Header) {
    let top = pager.y;
    let bottom = top - BANNER_H;
    let logo_w = 30.0;
    let right_w = 52.0;
    let width = PAGE_W - 2.0 * MARGIN;

    pager.rect(MARGIN, bottom, width, BANNER_H);
    pager.rect(MARGIN, bottom, logo_w, BANNER_H);
    pager.rect(MARGIN + width - right_w, bottom, right_w, BANNER_H);

    match &header.company.logo {
        Some(logo) => pager.image(logo, MARGIN + 2.0, bottom + 2.0, logo_w - 4.0, BANNER_H - 4.0),
        None => pager.text("SIN LOGO", 8.0, MARGIN + 6.0, bottom + BANNER_H / 2.0, false),
    }

    let center_x = MARGIN + logo_w + 8.0;
    pager.text(&header.company.name, 9.0, center_x, top - 7.0, false);
    pager.text("Gestión de Talento Humano", 10.0, center_x, top - 14.0, true);
    pager.text("Registro de Asistencia", 14.0, center_x, top - 22.0, true);

    let info_x = MARGIN + width - right_w + 2.0;
    pager.text("Código: FR-TH-01", 7.0, info_x, top - 7.0, false);
    pager.text("Versión: 03", 7.0, info_x, top - 13.0, false);
    pager.text("Actualización: 11-10-2024", 7.0, info_x, top - 19.0, false);

    pager.y = bottom - 3.0;
}

fn draw_info(pager: &mut Pager, header: &Header) {
    let lines = [
        format!("Tema: {}", header.topic),
        format!(
            "Ciudad: {}    Fecha: {}    Modalidad: {}",
            header.city,
            header.date.format("%d/%m/%Y"),
            header.modality
        ),
        format!(
            "Horario: {} a {}    Asesor Externo: {}",
            header.start.format("%H:%M"),
            header.end.format("%H:%M"),
            header.advisor
        ),
        format!(
            "Capacitador: {}",
            header.trainer_name.as_deref().unwrap_or("")
        ),
    ];

    let height = lines.len() as f64 * INFO_LINE_H + 2.0;
    let bottom = pager.y - height;
    pager.rect(MARGIN, bottom, PAGE_W - 2.0 * MARGIN, height);

    let mut line_y = pager.y - 5.0;
    for line in &lines {
        pager.text(line, 9.0, MARGIN + 2.0, line_y, false);
        line_y -= INFO_LINE_H;
    }

    if let Some(signature) = &header.trainer_signature {
        // Next to the trainer line, bottom-right of the block.
        pager.image(signature, PAGE_W - MARGIN - 46.0, bottom + 1.0, 42.0, height - 2.0);
    }

    pager.y = bottom - 4.0;
}

fn draw_table_header(pager: &mut Pager) {
    let bottom = pager.y - TABLE_HEADER_H;
    let mut x = MARGIN;
    for (title, width) in COLUMNS {
        pager.rect(x, bottom, width, TABLE_HEADER_H);
        pager.text(title, 8.0, x + 1.5, bottom + 2.5, true);
        x += width;
    }
    pager.y = bottom;
}

fn draw_row(pager: &mut Pager, row: &Row) {
    let bottom = pager.y - ROW_H;
    let text_y = bottom + ROW_H / 2.0 - 1.5;
    let cells = [
        row.seq.to_string(),
        row.document_type.clone(),
        row.document_number.clone(),
        row.full_name.clone(),
        row.job_title.clone(),
        row.city.clone(),
        String::new(),
        row.route.clone(),
    ];

    let mut x = MARGIN;
    for (index, (_, width)) in COLUMNS.iter().enumerate() {
        pager.rect(x, bottom, *width, ROW_H);
        if index == 6 {
            if let Some(signature) = &row.signature {
                pager.image(signature, x + 1.5, bottom + 1.0, width - 3.0, ROW_H - 2.0);
            }
        } else {
            pager.text(&cells[index], 8.0, x + 1.5, text_y, false);
        }
        x += width;
    }
    pager.y = bottom;
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use crate::{CompanyBlock, RowInput};

    use super::*;

    #[test]
    fn renders_a_parseable_pdf() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let header = Header {
            topic: "Trabajo en alturas".to_string(),
            city: "Bogotá".to_string(),
            modality: "Presencial".to_string(),
            date,
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            advisor: "Asesora SAS".to_string(),
            trainer_name: Some("Juan Pérez".to_string()),
            trainer_signature: None,
            company: CompanyBlock {
                name: "Mi Empresa".to_string(),
                address: "Calle Principal #123".to_string(),
                phone: "+57 300 123 4567".to_string(),
                logo: None,
            },
        };
        let rows: Vec<RowInput> = (0..40)
            .map(|i| RowInput {
                document_type: "CC".to_string(),
                document_number: format!("10{i}"),
                full_name: format!("Asistente {i}"),
                job_title: "Operario".to_string(),
                city: "Bogotá".to_string(),
                route: "R1".to_string(),
                signature: Some(Path::new("/nonexistent/signature.png").to_path_buf()),
            })
            .collect();

        let sheet = SheetLayout::assemble(date, vec![(header.clone(), rows), (header, vec![])]);
        let bytes = render(&sheet).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
