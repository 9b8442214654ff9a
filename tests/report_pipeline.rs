//! End-to-end tests of the reporting pipeline: project → summary → markup → artifact.

use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use kanban_report::calendar::CalendarDate;
use kanban_report::error::ReportError;
use kanban_report::fields::{Priority, State};
use kanban_report::project::{Project, User};
use kanban_report::report::summary::{SUMMARY_TABLE, TASKS_TABLE};
use kanban_report::report::{
    build_summary, generate_artifact, render_html, DateWindow, ExternalConverter, Kpis, MarkupConverter,
    ReportDocument,
};
use kanban_report::task::Task;

fn date(y: i32, m: u32, d: u32) -> CalendarDate {
    CalendarDate::new(d, m, y).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
}

fn metric(doc: &ReportDocument, label: &str) -> String {
    doc.table(SUMMARY_TABLE)
        .and_then(|t| t.rows().iter().find(|r| r[0] == label))
        .map(|r| r[1].clone())
        .unwrap()
}

#[test]
fn test_january_window_counts_only_january_tasks() {
    let mut p = Project::new(1, "Website", "");
    let mut done = Task::new(1, "Logo", Priority::Important, at(2024, 1, 5));
    done.set_state(State::Completed, at(2024, 1, 25));
    p.add_task(done);
    let mut doing = Task::new(2, "Copy", Priority::Medium, at(2024, 1, 10));
    doing.set_state(State::InProgress, at(2024, 1, 11));
    p.add_task(doing);
    p.add_task(Task::new(3, "Launch", Priority::Urgent, at(2024, 2, 1)));

    let doc = build_summary(&p, &[], date(2024, 1, 1), date(2024, 1, 31));
    let rows: Vec<(String, String)> = doc
        .table(SUMMARY_TABLE)
        .unwrap()
        .rows()
        .iter()
        .map(|r| (r[0].clone(), r[1].clone()))
        .collect();
    let expected = [
        ("Tasks created", "2"),
        ("Tasks completed", "1"),
        ("In progress", "1"),
        ("Pending", "0"),
        ("Overdue", "0"),
        ("Progress %", "75"),
    ];
    assert_eq!(rows.len(), expected.len());
    for ((label, value), (want_label, want_value)) in rows.iter().zip(expected) {
        assert_eq!(label, want_label);
        assert_eq!(value, want_value);
    }
    assert_eq!(doc.table(TASKS_TABLE).unwrap().rows().len(), 3);
}

#[test]
fn test_empty_project_still_renders_task_header() {
    let p = Project::new(7, "Quiet", "");
    let doc = build_summary(&p, &[], date(2024, 1, 1), date(2024, 1, 31));
    assert_eq!(metric(&doc, "Progress %"), "0");
    assert_eq!(metric(&doc, "Tasks created"), "0");

    let html = render_html(&doc);
    assert!(html.contains("<h2>Tasks</h2>"));
    assert!(html.contains("<th scope=\"col\">Labels</th>"));
    let tasks_section = &html[html.find("<h2>Tasks</h2>").unwrap()..];
    assert!(!tasks_section.contains("<td>"));
}

#[test]
fn test_task_due_on_period_end_is_overdue_until_completed() {
    let mut p = Project::new(1, "Ops", "");
    let mut t = Task::new(1, "Rotate keys", Priority::Urgent, at(2024, 6, 3));
    t.due = Some(date(2024, 6, 30));
    p.add_task(t);

    let doc = build_summary(&p, &[], date(2024, 6, 1), date(2024, 6, 30));
    assert_eq!(metric(&doc, "Overdue"), "1");

    p.task_mut(1).unwrap().set_state(State::Completed, at(2024, 6, 29));
    let doc = build_summary(&p, &[], date(2024, 6, 1), date(2024, 6, 30));
    assert_eq!(metric(&doc, "Overdue"), "0");
    assert_eq!(metric(&doc, "Tasks completed"), "1");
}

#[test]
fn test_missing_converter_fails_without_leaving_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("reports").join("website.pdf");
    let p = Project::new(1, "Website", "");
    let doc = build_summary(&p, &[], date(2024, 1, 1), date(2024, 1, 31));

    let converter = ExternalConverter::new("kt-missing-html-to-pdf");
    let err = generate_artifact(&doc, &converter, &dest).unwrap_err();
    assert!(matches!(err, ReportError::ConverterUnavailable { .. }));
    assert_eq!(err.to_string(), "document converter 'kt-missing-html-to-pdf' is not available");
    assert!(!dest.exists());
    assert!(!dir.path().join("reports").join("website.pdf.part").exists());
}

#[test]
fn test_hostile_task_text_is_escaped_in_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("report.html");
    let mut p = Project::new(1, "Web <dev> & \"ops\"", "");
    p.add_task(Task::new(1, "<script>&\"'</script>", Priority::Low, at(2024, 1, 2)));
    let users = [User { id: 1, name: "O'Brien".into(), email: String::new() }];
    p.task_mut(1).unwrap().assignee = Some(1);

    let doc = build_summary(&p, &users, date(2024, 1, 1), date(2024, 1, 31));
    generate_artifact(&doc, &MarkupConverter, &dest).unwrap();
    let html = fs::read_to_string(&dest).unwrap();

    assert!(html.contains("<td>&lt;script&gt;&amp;&quot;&#39;&lt;/script&gt;</td>"));
    assert!(html.contains("<td>O&#39;Brien</td>"));
    assert!(html.contains("<h1>Project summary: Web &lt;dev&gt; &amp; &quot;ops&quot;</h1>"));
    assert!(!html.contains("<script>"));
    assert!(!html.contains("<dev>"));
}

#[test]
fn test_rendering_the_same_document_twice_is_identical() {
    let mut p = Project::new(3, "Docs", "");
    p.add_task(Task::new(1, "Guide", Priority::Medium, at(2024, 3, 3)));
    let doc = build_summary(&p, &[], date(2024, 3, 1), date(2024, 3, 31));
    assert_eq!(render_html(&doc), render_html(&doc));
}

fn task_strategy() -> impl Strategy<Value = (u32, u8, Option<u32>, Option<u32>)> {
    (
        // creation day offset within 2024
        0u32..366,
        // 0 pending, 1 in progress, 2 completed
        0u8..3,
        // due day offset
        proptest::option::of(0u32..366),
        // close delay in days
        proptest::option::of(0u32..30),
    )
}

fn project_from(specs: &[(u32, u8, Option<u32>, Option<u32>)]) -> Project {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut p = Project::new(1, "Prop", "");
    for (i, (created, state, due, close_delay)) in specs.iter().enumerate() {
        let created_at = (base + chrono::Duration::days(i64::from(*created)))
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let mut t = Task::new(i as u64 + 1, format!("t{i}"), Priority::Medium, created_at);
        t.due = due.and_then(|d| CalendarDate::try_from(base + chrono::Duration::days(i64::from(d))).ok());
        let later = created_at + chrono::Duration::days(i64::from(close_delay.unwrap_or(1)));
        match state {
            1 => {
                t.set_state(State::InProgress, later);
            }
            2 => {
                t.set_state(State::Completed, later);
            }
            _ => {}
        }
        p.add_task(t);
    }
    p
}

proptest! {
    #[test]
    fn test_created_partitions_the_task_set(
        specs in prop::collection::vec(task_strategy(), 0..40),
        from in 0u32..366,
        len in 0u32..120,
    ) {
        let p = project_from(&specs);
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let from_d = CalendarDate::try_from(base + chrono::Duration::days(i64::from(from))).unwrap();
        let to_d = CalendarDate::try_from(from_d.naive() + chrono::Duration::days(i64::from(len))).unwrap();
        let window = DateWindow::new(from_d, to_d);

        let kpis = Kpis::compute(p.tasks(), &window);
        let outside = p.tasks().iter().filter(|t| !window.contains(t.created_at())).count();

        prop_assert_eq!(kpis.created + outside, p.tasks().len());
        prop_assert!(kpis.in_progress + kpis.pending <= kpis.created);
        prop_assert!(kpis.overdue <= kpis.created);
        prop_assert!(kpis.progress_percent <= 100);
        if kpis.created == 0 {
            prop_assert_eq!(kpis.progress_percent, 0);
        }

        let doc = build_summary(&p, &[], from_d, to_d);
        prop_assert_eq!(doc.table(TASKS_TABLE).unwrap().rows().len(), p.tasks().len());
    }

    #[test]
    fn test_reversed_window_is_all_zero(
        specs in prop::collection::vec(task_strategy(), 0..20),
        gap in 1u32..60,
    ) {
        let p = project_from(&specs);
        let to_d = date(2024, 3, 1);
        let from_d = CalendarDate::try_from(to_d.naive() + chrono::Duration::days(i64::from(gap))).unwrap();
        let kpis = Kpis::compute(p.tasks(), &DateWindow::new(from_d, to_d));
        prop_assert_eq!(kpis, Kpis::default());
    }
}
