use chrono::NaiveDate;
use schoold::model::{AttendanceReportEntry, ReportClassroom, ReportLine, ReportStudent};
use schoold::report::{
    build_report, layout_report, reason_label, student_label, summary_line, ReportHeading,
    BOTTOM_MARGIN, NO_REASON, STUDENT_NOT_FOUND,
};

fn line(first: &str, status: &str, reason: Option<&str>) -> ReportLine {
    ReportLine {
        student: Some(ReportStudent {
            first_name: first.to_string(),
            last_name: "García".to_string(),
            id_number: None,
        }),
        status: status.to_string(),
        reason: reason.map(str::to_string),
    }
}

fn room(name: &str, attendance: Vec<ReportLine>) -> AttendanceReportEntry {
    AttendanceReportEntry {
        classroom: ReportClassroom {
            name: name.to_string(),
            grade_level: 1,
            section: "A".to_string(),
            shift: "Morning".to_string(),
        },
        attendance,
    }
}

fn march_11() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 11).expect("date")
}

#[test]
fn summary_counts_each_status() {
    let entry = room(
        "1° A",
        vec![
            line("Ana", "present", None),
            line("Bea", "present", None),
            line("Caro", "present", None),
            line("Dani", "absent", Some("Flu")),
            line("Eva", "absent", None),
            line("Fer", "late", Some("Bus")),
        ],
    );

    assert_eq!(summary_line(&entry), "3 Present, 2 Absent, 1 Late (Total: 6)");
}

#[test]
fn long_classroom_spills_onto_pages_with_repeated_headers() {
    let rows = (0..80)
        .map(|i| line(&format!("Student{i:02}"), "present", None))
        .collect();
    let records = vec![room("1° A", rows)];
    let heading = ReportHeading::new(march_11(), Some("MA-1"));

    let layout = layout_report(&records, &heading);

    assert!(layout.page_count() >= 2, "pages: {}", layout.page_count());
    for page in &layout.pages[1..] {
        assert!(
            page.texts().any(|t| t == "STUDENT"),
            "continuation page lacks column headers"
        );
        for item in &page.items {
            assert!(item.y >= BOTTOM_MARGIN, "text below bottom margin");
        }
    }
    let rows_drawn: usize = layout
        .pages
        .iter()
        .map(|p| p.texts().filter(|t| t.starts_with("Student")).count())
        .sum();
    assert_eq!(rows_drawn, 80);
}

#[test]
fn rendered_pdf_reloads_with_the_same_page_count() {
    let rows = (0..60)
        .map(|i| line(&format!("Student{i:02}"), "late", Some("Traffic")))
        .collect();
    let records = vec![room("1° A", rows), room("2° B", vec![line("Ana", "absent", None)])];
    let heading = ReportHeading::new(march_11(), None).with_title("Daily Attendance");

    let (layout, bytes) = build_report(&records, &heading).expect("build report");

    assert!(bytes.starts_with(b"%PDF-"));
    let doc = lopdf::Document::load_mem(&bytes).expect("reload pdf");
    assert_eq!(doc.get_pages().len(), layout.page_count());
    assert!(layout.page_count() >= 2);
}

#[test]
fn heading_carries_title_date_and_subject() {
    let records = vec![room("1° A", vec![line("Ana", "present", None)])];

    let with_subject = layout_report(&records, &ReportHeading::new(march_11(), Some("MA-1")));
    let first: Vec<&str> = with_subject.pages[0].texts().collect();
    assert_eq!(first[0], "Attendance Report");
    assert!(first.contains(&"Monday, March 11, 2024"));
    assert!(first.contains(&"Subject: MA-1"));
    assert!(first.contains(&"1° A - Grade 1 - Section A - Morning"));

    let without = layout_report(&records, &ReportHeading::new(march_11(), Some("  ")));
    assert!(!without.pages[0].texts().any(|t| t.starts_with("Subject:")));
}

#[test]
fn fallbacks_for_missing_student_and_reason() {
    let orphan = ReportLine {
        student: None,
        status: "absent".to_string(),
        reason: Some("  ".to_string()),
    };
    assert_eq!(student_label(&orphan), STUDENT_NOT_FOUND);
    assert_eq!(reason_label(&orphan), NO_REASON);

    let unmarked = ReportLine {
        student: None,
        status: "excused".to_string(),
        reason: None,
    };
    let layout = layout_report(
        &[room("1° A", vec![orphan, unmarked])],
        &ReportHeading::new(march_11(), None),
    );
    let texts: Vec<&str> = layout.pages[0].texts().collect();
    assert!(texts.contains(&"Not marked"));
    assert!(texts.contains(&"Absent"));
    assert!(texts.contains(&NO_REASON));
}

#[test]
fn classroom_without_rows_still_gets_a_section() {
    let layout = layout_report(&[room("3° C", Vec::new())], &ReportHeading::new(march_11(), None));
    let texts: Vec<&str> = layout.pages[0].texts().collect();

    assert!(texts.contains(&"0 Present, 0 Absent, 0 Late (Total: 0)"));
    assert!(texts.contains(&"No students recorded"));
}
