//! Sign-in sheet assembly. The layout is a plain tree of sections, rows and
//! totals, built independently of any rendering backend so the counting and
//! ordering invariants are testable without producing a document.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};

mod render;

pub use render::render;

/// The whole sheet for one date: one section per training event.
#[derive(Debug, Clone)]
pub struct SheetLayout {
    pub date: NaiveDate,
    pub sections: Vec<Section>,
    /// Present only when more than one event is included.
    pub grand_total: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub header: Header,
    pub rows: Vec<Row>,
    pub subtotal: usize,
}

/// The per-event header block: banner identity plus event metadata.
#[derive(Debug, Clone)]
pub struct Header {
    pub topic: String,
    pub city: String,
    pub modality: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub advisor: String,
    pub trainer_name: Option<String>,
    pub trainer_signature: Option<PathBuf>,
    pub company: CompanyBlock,
}

#[derive(Debug, Clone)]
pub struct CompanyBlock {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub logo: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Row {
    pub seq: usize,
    pub document_type: String,
    pub document_number: String,
    pub full_name: String,
    pub job_title: String,
    pub city: String,
    pub route: String,
    pub signature: Option<PathBuf>,
}

/// A row before sequence numbers are assigned. Callers supply rows already
/// ordered by arrival time.
#[derive(Debug, Clone)]
pub struct RowInput {
    pub document_type: String,
    pub document_number: String,
    pub full_name: String,
    pub job_title: String,
    pub city: String,
    pub route: String,
    pub signature: Option<PathBuf>,
}

impl SheetLayout {
    pub fn assemble(date: NaiveDate, sections: Vec<(Header, Vec<RowInput>)>) -> SheetLayout {
        let sections: Vec<Section> = sections
            .into_iter()
            .map(|(header, rows)| {
                let rows: Vec<Row> = rows
                    .into_iter()
                    .enumerate()
                    .map(|(index, row)| Row {
                        seq: index + 1,
                        document_type: row.document_type,
                        document_number: row.document_number,
                        full_name: row.full_name,
                        job_title: row.job_title,
                        city: row.city,
                        route: row.route,
                        signature: row.signature,
                    })
                    .collect();
                Section {
                    subtotal: rows.len(),
                    header,
                    rows,
                }
            })
            .collect();

        let grand_total = if sections.len() > 1 {
            Some(sections.iter().map(|s| s.subtotal).sum())
        } else {
            None
        };
        SheetLayout {
            date,
            sections,
            grand_total,
        }
    }

    pub fn total(&self) -> usize {
        self.sections.iter().map(|s| s.subtotal).sum()
    }
}

/// Shrinks `(width, height)` to fit a bounding box, preserving aspect ratio.
/// Sources smaller than the box are left alone; nothing is ever upscaled.
pub fn fit_box(width: f64, height: f64, max_width: f64, max_height: f64) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = (max_width / width).min(max_height / height).min(1.0);
    (width * scale, height * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(topic: &str) -> Header {
        Header {
            topic: topic.to_string(),
            city: "Cali".to_string(),
            modality: "Presencial".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
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
        }
    }

    fn row(name: &str) -> RowInput {
        RowInput {
            document_type: "CC".to_string(),
            document_number: name.len().to_string(),
            full_name: name.to_string(),
            job_title: "Operario".to_string(),
            city: "Cali".to_string(),
            route: "R1".to_string(),
            signature: None,
        }
    }

    #[test]
    fn subtotals_add_up_to_the_grand_total() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let sheet = SheetLayout::assemble(
            date,
            vec![
                (header("Alturas"), vec![row("a"), row("b"), row("c")]),
                (header("Primeros auxilios"), vec![row("d"), row("e")]),
            ],
        );

        assert_eq!(sheet.sections[0].subtotal, 3);
        assert_eq!(sheet.sections[1].subtotal, 2);
        assert_eq!(sheet.grand_total, Some(5));
        assert_eq!(sheet.total(), 5);
    }

    #[test]
    fn single_section_has_no_grand_total() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let sheet = SheetLayout::assemble(date, vec![(header("Alturas"), vec![row("a")])]);
        assert_eq!(sheet.grand_total, None);
        assert_eq!(sheet.total(), 1);
    }

    #[test]
    fn rows_keep_their_order_and_get_sequence_numbers() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let sheet = SheetLayout::assemble(
            date,
            vec![(header("Alturas"), vec![row("first"), row("second"), row("third")])],
        );
        let seqs: Vec<usize> = sheet.sections[0].rows.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(sheet.sections[0].rows[0].full_name, "first");
        assert_eq!(sheet.sections[0].rows[2].full_name, "third");
    }

    #[test]
    fn empty_section_is_valid() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let sheet = SheetLayout::assemble(date, vec![(header("Alturas"), vec![])]);
        assert_eq!(sheet.sections[0].subtotal, 0);
        assert_eq!(sheet.total(), 0);
    }

    #[test]
    fn fit_box_downscales_preserving_aspect() {
        let (w, h) = fit_box(80.0, 40.0, 24.0, 10.0);
        assert!((w - 20.0).abs() < 1e-9);
        assert!((h - 10.0).abs() < 1e-9);
    }

    #[test]
    fn fit_box_never_upscales() {
        assert_eq!(fit_box(10.0, 5.0, 24.0, 10.0), (10.0, 5.0));
    }

    #[test]
    fn fit_box_handles_degenerate_input() {
        assert_eq!(fit_box(0.0, 5.0, 24.0, 10.0), (0.0, 0.0));
    }
}
