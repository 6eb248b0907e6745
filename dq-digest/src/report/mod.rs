//! The validation report document.
//!
//! Building a report happens in two steps. [`Report::layout`] places every
//! piece of text and every table cell on A4 pages, in millimetres measured
//! from the top-left corner; [`pdf::render`] then draws those pages. Keeping
//! the placement separate from the drawing lets the table be read back from
//! the laid-out pages with [`Report::from_layout`].

pub mod pdf;

use crate::normalizer::EvaluationRecord;
use crate::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Title printed at the top of the first page.
pub const REPORT_TITLE: &str = "Validation Report";
pub const SALES_SECTION_TITLE: &str = "Sales Validation Results";
pub const CUSTOMER_SECTION_TITLE: &str = "Customer Validation Results";

/// Table header labels, in column order.
pub const TABLE_HEADERS: [&str; 4] = ["Column Name", "Expectation Type", "Success", "Observed Value"];
pub const COLUMN_WIDTHS_MM: [f32; 4] = [50.0, 80.0, 30.0, 40.0];
pub const ROW_HEIGHT_MM: f32 = 10.0;
/// Fill colour of the header row.
pub const HEADER_FILL_RGB: (u8, u8, u8) = (200, 220, 255);

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 10.0;

pub const TITLE_FONT_SIZE: f32 = 16.0;
pub const SUBTITLE_FONT_SIZE: f32 = 14.0;
pub const TABLE_FONT_SIZE: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// What a placed piece of text is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Title,
    SectionTitle,
    HeaderCell,
    BodyCell,
}

/// A piece of text placed in a box on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub role: Role,
    pub text: String,
    /// Left edge, from the left of the page.
    pub x: f32,
    /// Top edge, from the top of the page.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placed {
    pub fn font_size(&self) -> f32 {
        match self.role {
            Role::Title => TITLE_FONT_SIZE,
            Role::SectionTitle => SUBTITLE_FONT_SIZE,
            Role::HeaderCell | Role::BodyCell => TABLE_FONT_SIZE,
        }
    }

    pub fn weight(&self) -> FontWeight {
        match self.role {
            Role::BodyCell => FontWeight::Regular,
            _ => FontWeight::Bold,
        }
    }

    pub fn align(&self) -> Align {
        match self.role {
            Role::Title | Role::HeaderCell => Align::Center,
            Role::SectionTitle | Role::BodyCell => Align::Left,
        }
    }

    /// Table cells get a border; header cells are also filled.
    pub fn is_cell(&self) -> bool {
        matches!(self.role, Role::HeaderCell | Role::BodyCell)
    }
}

/// Everything placed on one page, in drawing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub elements: Vec<Placed>,
}

/// One titled table of records.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub records: Vec<EvaluationRecord>,
}

impl ReportSection {
    pub fn new(title: impl Into<String>, records: Vec<EvaluationRecord>) -> Self {
        Self {
            title: title.into(),
            records,
        }
    }
}

/// The whole document: a title and its sections in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub sections: Vec<ReportSection>,
}

impl Report {
    /// The standard two-section report.
    pub fn new(sales: &[EvaluationRecord], customers: &[EvaluationRecord]) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            sections: vec![
                ReportSection::new(SALES_SECTION_TITLE, sales.to_vec()),
                ReportSection::new(CUSTOMER_SECTION_TITLE, customers.to_vec()),
            ],
        }
    }

    /// Places the report on pages.
    ///
    /// Every section starts on a fresh page. A row that would cross the
    /// bottom margin moves to a new page, which repeats the header row.
    pub fn layout(&self) -> Vec<PageLayout> {
        let mut cursor = Cursor::default();
        let full_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

        for (index, section) in self.sections.iter().enumerate() {
            cursor.new_page();
            if index == 0 {
                cursor.place_line(Role::Title, &self.title, full_width);
            }
            cursor.place_line(Role::SectionTitle, &section.title, full_width);
            cursor.place_row(Role::HeaderCell, TABLE_HEADERS.map(String::from));

            for record in &section.records {
                if cursor.row_would_overflow() {
                    cursor.new_page();
                    cursor.place_row(Role::HeaderCell, TABLE_HEADERS.map(String::from));
                }
                cursor.place_row(Role::BodyCell, record.to_cells());
            }
        }
        cursor.pages
    }

    /// Reads a report back from laid-out pages.
    pub fn from_layout(pages: &[PageLayout]) -> Result<Self> {
        let mut title = String::new();
        let mut sections: Vec<ReportSection> = Vec::new();
        let mut row: Vec<String> = Vec::with_capacity(TABLE_HEADERS.len());

        for element in pages.iter().flat_map(|p| &p.elements) {
            match element.role {
                Role::Title => title = element.text.clone(),
                Role::SectionTitle => sections.push(ReportSection::new(&element.text, Vec::new())),
                Role::HeaderCell => {}
                Role::BodyCell => {
                    row.push(element.text.clone());
                    if row.len() == TABLE_HEADERS.len() {
                        let section = sections.last_mut().ok_or_else(|| {
                            DigestError::Internal("table row outside any section".to_string())
                        })?;
                        section.records.push(EvaluationRecord::from_cells(&row)?);
                        row.clear();
                    }
                }
            }
        }

        if !row.is_empty() {
            return Err(DigestError::Internal(format!(
                "incomplete table row with {} cells",
                row.len()
            )));
        }
        Ok(Self { title, sections })
    }
}

#[derive(Default)]
struct Cursor {
    pages: Vec<PageLayout>,
    y: f32,
}

impl Cursor {
    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.y = MARGIN_MM;
    }

    fn push(&mut self, placed: Placed) {
        if self.pages.is_empty() {
            self.new_page();
        }
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(placed);
        }
    }

    fn place_line(&mut self, role: Role, text: &str, width: f32) {
        let y = self.y;
        self.push(Placed {
            role,
            text: text.to_string(),
            x: MARGIN_MM,
            y,
            width,
            height: ROW_HEIGHT_MM,
        });
        self.y += ROW_HEIGHT_MM;
    }

    fn place_row(&mut self, role: Role, cells: [String; 4]) {
        let mut x = MARGIN_MM;
        let y = self.y;
        for (text, width) in cells.into_iter().zip(COLUMN_WIDTHS_MM) {
            self.push(Placed {
                role,
                text,
                x,
                y,
                width,
                height: ROW_HEIGHT_MM,
            });
            x += width;
        }
        self.y += ROW_HEIGHT_MM;
    }

    fn row_would_overflow(&self) -> bool {
        self.y + ROW_HEIGHT_MM > PAGE_HEIGHT_MM - MARGIN_MM
    }
}

/// Renders the report and writes it to a fixed path.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    output_path: PathBuf,
}

impl ReportBuilder {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Builds the two-section report and writes it as PDF.
    ///
    /// The parent directory must already exist. Returns the written path.
    #[instrument(skip(self, sales, customers), fields(
        report.path = %self.output_path.display(),
        sales.records = sales.len(),
        customers.records = customers.len()
    ))]
    pub async fn build(
        &self,
        sales: &[EvaluationRecord],
        customers: &[EvaluationRecord],
    ) -> Result<PathBuf> {
        let report = Report::new(sales, customers);
        let bytes = pdf::render(&report)?;

        tokio::fs::write(&self.output_path, &bytes)
            .await
            .map_err(|e| {
                DigestError::render(
                    format!("cannot write report to {}", self.output_path.display()),
                    e,
                )
            })?;

        info!(bytes = bytes.len(), "Report written");
        Ok(self.output_path.clone())
    }
}
