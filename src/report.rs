//! Attendance report: stored attendance snapshots → paginated A4 PDF.
//!
//! Layout and serialization are separate steps. `layout_report` places every
//! text run on a page and is pure; `render_pdf` turns the layout into bytes.

use crate::error::ActionError;
use crate::model::{AttendanceReportEntry, AttendanceStatus, ReportClassroom, ReportLine};
use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const TOP_MARGIN: f32 = 50.0;
pub const BOTTOM_MARGIN: f32 = 50.0;
pub const LEFT_MARGIN: f32 = 50.0;
pub const ROW_HEIGHT: f32 = 18.0;

pub const DEFAULT_TITLE: &str = "Attendance Report";
pub const STUDENT_NOT_FOUND: &str = "Student not found";
pub const NO_REASON: &str = "No reason specified";
pub const COLUMN_HEADERS: [&str; 3] = ["STUDENT", "STATUS", "REASON"];

const STUDENT_X: f32 = LEFT_MARGIN;
const STATUS_X: f32 = 290.0;
const REASON_X: f32 = 380.0;
const NAME_MAX_CHARS: usize = 42;
const REASON_MAX_CHARS: usize = 34;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
pub const GREEN: Rgb = Rgb(0.13, 0.55, 0.13);
pub const RED: Rgb = Rgb(0.80, 0.10, 0.10);
pub const AMBER: Rgb = Rgb(0.95, 0.60, 0.00);
pub const GRAY: Rgb = Rgb(0.50, 0.50, 0.50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub font: Font,
    pub color: Rgb,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPage {
    pub items: Vec<TextItem>,
}

impl ReportPage {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.text.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<ReportPage>,
}

impl ReportLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Status as shown in the STATUS column. Anything the backend sends that is
/// not a known status is "not marked".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Marked(AttendanceStatus),
    Unmarked,
}

impl ReportStatus {
    pub fn classify(raw: &str) -> Self {
        AttendanceStatus::parse(raw).map_or(Self::Unmarked, Self::Marked)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Marked(AttendanceStatus::Present) => "Present",
            Self::Marked(AttendanceStatus::Absent) => "Absent",
            Self::Marked(AttendanceStatus::Late) => "Late",
            Self::Unmarked => "Not marked",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Self::Marked(AttendanceStatus::Present) => GREEN,
            Self::Marked(AttendanceStatus::Absent) => RED,
            Self::Marked(AttendanceStatus::Late) => AMBER,
            Self::Unmarked => GRAY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub total: usize,
}

pub fn count_statuses(lines: &[ReportLine]) -> StatusCounts {
    let count = |wanted: AttendanceStatus| {
        lines
            .iter()
            .filter(|l| ReportStatus::classify(&l.status) == ReportStatus::Marked(wanted))
            .count()
    };
    StatusCounts {
        present: count(AttendanceStatus::Present),
        absent: count(AttendanceStatus::Absent),
        late: count(AttendanceStatus::Late),
        total: lines.len(),
    }
}

pub fn summary_line(entry: &AttendanceReportEntry) -> String {
    let c = count_statuses(&entry.attendance);
    format!(
        "{} Present, {} Absent, {} Late (Total: {})",
        c.present, c.absent, c.late, c.total
    )
}

pub fn classroom_label(classroom: &ReportClassroom) -> String {
    let mut parts = Vec::new();
    if !classroom.name.trim().is_empty() {
        parts.push(classroom.name.trim().to_string());
    }
    if classroom.grade_level > 0 {
        parts.push(format!("Grade {}", classroom.grade_level));
    }
    if !classroom.section.trim().is_empty() {
        parts.push(format!("Section {}", classroom.section.trim()));
    }
    if !classroom.shift.trim().is_empty() {
        parts.push(classroom.shift.trim().to_string());
    }
    if parts.is_empty() {
        return "Classroom".to_string();
    }
    parts.join(" - ")
}

pub fn student_label(line: &ReportLine) -> String {
    line.student
        .as_ref()
        .map(|s| format!("{} {}", s.first_name.trim(), s.last_name.trim()))
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| STUDENT_NOT_FOUND.to_string())
}

pub fn reason_label(line: &ReportLine) -> String {
    let reason = line
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    match ReportStatus::classify(&line.status) {
        ReportStatus::Marked(AttendanceStatus::Present) => String::new(),
        ReportStatus::Marked(_) => reason.unwrap_or(NO_REASON).to_string(),
        ReportStatus::Unmarked => reason.unwrap_or_default().to_string(),
    }
}

pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn report_file_name(date: NaiveDate) -> String {
    format!("attendance-{}.pdf", date.format("%Y-%m-%d"))
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[derive(Debug, Clone)]
pub struct ReportHeading {
    pub title: String,
    pub date: NaiveDate,
    pub subject: Option<String>,
}

impl ReportHeading {
    pub fn new(date: NaiveDate, subject: Option<&str>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            date,
            subject: subject
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        if !title.trim().is_empty() {
            self.title = title.trim().to_string();
        }
        self
    }
}

struct Cursor {
    pages: Vec<ReportPage>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![ReportPage::default()],
            y: PAGE_HEIGHT - TOP_MARGIN,
        }
    }

    fn text(&mut self, x: f32, size: f32, font: Font, color: Rgb, text: impl Into<String>) {
        let y = self.y;
        if let Some(page) = self.pages.last_mut() {
            page.items.push(TextItem {
                x,
                y,
                size,
                font,
                color,
                text: text.into(),
            });
        }
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }

    fn new_page(&mut self) {
        self.pages.push(ReportPage::default());
        self.y = PAGE_HEIGHT - TOP_MARGIN;
    }

    /// Starts a new page when `height` more would cross the bottom margin.
    fn ensure(&mut self, height: f32) -> bool {
        if self.y - height < BOTTOM_MARGIN {
            self.new_page();
            return true;
        }
        false
    }

    fn column_headers(&mut self) {
        let xs = [STUDENT_X, STATUS_X, REASON_X];
        for (x, label) in xs.into_iter().zip(COLUMN_HEADERS) {
            self.text(x, 11.0, Font::Bold, BLACK, label);
        }
        self.advance(ROW_HEIGHT);
    }
}

pub fn layout_report(records: &[AttendanceReportEntry], heading: &ReportHeading) -> ReportLayout {
    let mut cur = Cursor::new();

    cur.text(LEFT_MARGIN, 18.0, Font::Bold, BLACK, heading.title.as_str());
    cur.advance(26.0);
    cur.text(LEFT_MARGIN, 12.0, Font::Regular, BLACK, long_date(heading.date));
    cur.advance(18.0);
    if let Some(subject) = &heading.subject {
        cur.text(
            LEFT_MARGIN,
            12.0,
            Font::Regular,
            BLACK,
            format!("Subject: {subject}"),
        );
        cur.advance(18.0);
    }
    cur.advance(10.0);

    for entry in records {
        // Keep a classroom's header block together with its first row.
        cur.ensure(18.0 + 16.0 + ROW_HEIGHT * 2.0);
        cur.text(
            LEFT_MARGIN,
            14.0,
            Font::Bold,
            BLACK,
            classroom_label(&entry.classroom),
        );
        cur.advance(18.0);
        cur.text(LEFT_MARGIN, 11.0, Font::Regular, BLACK, summary_line(entry));
        cur.advance(16.0);
        cur.column_headers();

        if entry.attendance.is_empty() {
            cur.text(STUDENT_X, 10.0, Font::Regular, GRAY, "No students recorded");
            cur.advance(ROW_HEIGHT);
        }
        for line in &entry.attendance {
            if cur.ensure(ROW_HEIGHT) {
                cur.column_headers();
            }
            let status = ReportStatus::classify(&line.status);
            cur.text(
                STUDENT_X,
                10.0,
                Font::Regular,
                BLACK,
                clip(&student_label(line), NAME_MAX_CHARS),
            );
            cur.text(STATUS_X, 10.0, Font::Bold, status.color(), status.label());
            let reason = reason_label(line);
            if !reason.is_empty() {
                cur.text(
                    REASON_X,
                    10.0,
                    Font::Regular,
                    BLACK,
                    clip(&reason, REASON_MAX_CHARS),
                );
            }
            cur.advance(ROW_HEIGHT);
        }
        cur.advance(14.0);
    }

    ReportLayout { pages: cur.pages }
}

/// Encodes text for the standard Type1 fonts (WinAnsiEncoding). Characters
/// outside it become '?'.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '–' => 0x96,
            '—' => 0x97,
            c if c.is_whitespace() => b' ',
            _ => b'?',
        })
        .collect()
}

pub fn render_pdf(layout: &ReportLayout, title: &str) -> Result<Vec<u8>, ActionError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource_name() => regular_id,
            Font::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for (idx, page) in layout.pages.iter().enumerate() {
        let mut operations = Vec::with_capacity(page.items.len() * 6);
        for item in &page.items {
            let Rgb(r, g, b) = item.color;
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
            operations.push(Operation::new(
                "Tf",
                vec![item.font.resource_name().into(), item.size.into()],
            ));
            operations.push(Operation::new("Td", vec![item.x.into(), item.y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(win_ansi(&item.text), StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        let encoded = Content { operations }
            .encode()
            .map_err(|e| ActionError::format(format!("page {}: {e}", idx + 1)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("schoold ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| ActionError::format(format!("failed to write document: {e}")))?;
    Ok(out)
}

/// Layout plus serialization. Any failure aborts the whole document.
pub fn build_report(
    records: &[AttendanceReportEntry],
    heading: &ReportHeading,
) -> Result<(ReportLayout, Vec<u8>), ActionError> {
    let layout = layout_report(records, heading);
    let bytes = render_pdf(&layout, &heading.title)?;
    Ok((layout, bytes))
}
