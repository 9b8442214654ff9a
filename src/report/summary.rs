//! Period summary of a project.
//!
//! `build_summary` turns a project and an inclusive `[from, to]` date range
//! into a `ReportDocument` with two tables: the KPI summary and the full task
//! listing.
//!
//! Window semantics differ per KPI:
//! - `created`, `in_progress`, `pending`, `overdue` and `progress_percent`
//!   only look at tasks created inside the window.
//! - `completed` counts tasks closed inside the window, wherever they were created.
//! - `overdue` is relative to the end of the period, not to the current date.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::calendar::CalendarDate;
use crate::fields::State;
use crate::project::{Project, User};
use crate::report::document::{ReportDocument, ReportTable};
use crate::task::Task;

pub const SUMMARY_TABLE: &str = "Summary";
pub const TASKS_TABLE: &str = "Tasks";

pub const TASK_COLUMNS: [&str; 9] = [
    "Id", "Title", "Assignee", "Priority", "State", "Created", "Closed", "Due", "Labels",
];

/// Inclusive instant range covering whole days from `from` 00:00:00 to the
/// last nanosecond of `to`. Empty when `from` is after `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: CalendarDate,
    pub to: CalendarDate,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DateWindow {
    pub fn new(from: CalendarDate, to: CalendarDate) -> Self {
        let start = from.naive().and_time(NaiveTime::MIN);
        let end = to.naive().and_time(NaiveTime::MIN) + Duration::days(1) - Duration::nanoseconds(1);
        DateWindow { from, to, start, end }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Key figures for one window, all taken from the same task slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Kpis {
    pub created: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub overdue: usize,
    pub progress_percent: u32,
}

impl Kpis {
    pub fn compute(tasks: &[Task], window: &DateWindow) -> Self {
        let mut kpis = Kpis::default();
        let mut progress_sum: u64 = 0;

        for task in tasks {
            if task.closed_at().is_some_and(|at| window.contains(at)) {
                kpis.completed += 1;
            }
            if !window.contains(task.created_at()) {
                continue;
            }
            kpis.created += 1;
            progress_sum += u64::from(task.progress());
            match task.state() {
                State::InProgress => kpis.in_progress += 1,
                State::Pending => kpis.pending += 1,
                State::Completed => {}
            }
            if task.state() != State::Completed && task.due.is_some_and(|due| due <= window.to) {
                kpis.overdue += 1;
            }
        }

        kpis.progress_percent = mean_half_up(progress_sum, kpis.created as u64);
        kpis
    }

    /// Rows of the summary table, in their fixed order.
    pub fn rows(&self) -> [(&'static str, String); 6] {
        [
            ("Tasks created", self.created.to_string()),
            ("Tasks completed", self.completed.to_string()),
            ("In progress", self.in_progress.to_string()),
            ("Pending", self.pending.to_string()),
            ("Overdue", self.overdue.to_string()),
            ("Progress %", self.progress_percent.to_string()),
        ]
    }
}

/// Integer mean rounded half up; 0 for an empty set.
fn mean_half_up(sum: u64, count: u64) -> u32 {
    if count == 0 {
        return 0;
    }
    ((2 * sum + count) / (2 * count)) as u32
}

/// Build the period summary for `project`. `users` resolves assignee names.
///
/// A reversed range (`from` after `to`) is not an error: the window is empty,
/// every KPI is zero and the task listing is still complete.
pub fn build_summary(project: &Project, users: &[User], from: CalendarDate, to: CalendarDate) -> ReportDocument {
    let window = DateWindow::new(from, to);
    if window.is_empty() {
        tracing::warn!(
            project = project.id,
            %from,
            %to,
            "report period is reversed, summary metrics will be zero"
        );
    }

    // One borrow of the task list serves every figure below.
    let tasks = project.tasks();
    let kpis = Kpis::compute(tasks, &window);
    tracing::debug!(project = project.id, tasks = tasks.len(), ?kpis, "summary computed");

    let mut doc = ReportDocument::new(format!("Project summary: {}", project.name));
    doc.insert_metadata("project_id", project.id.to_string());
    doc.insert_metadata("project_name", project.name.as_str());
    doc.insert_metadata("period_from", from.to_string());
    doc.insert_metadata("period_to", to.to_string());

    let mut summary = ReportTable::new(SUMMARY_TABLE, ["Metric", "Value"]);
    for (label, value) in kpis.rows() {
        summary.add_row([label.to_string(), value]);
    }
    doc.add_table(summary);

    let mut listing = ReportTable::new(TASKS_TABLE, TASK_COLUMNS);
    for (position, task) in tasks.iter().enumerate() {
        listing.add_row(task_row(position + 1, task, users));
    }
    doc.add_table(listing);

    doc
}

fn task_row(seq: usize, task: &Task, users: &[User]) -> [String; 9] {
    let assignee = task
        .assignee
        .and_then(|id| users.iter().find(|u| u.id == id))
        .map(|u| u.name.clone())
        .unwrap_or_default();
    [
        seq.to_string(),
        task.title.clone(),
        assignee,
        task.priority.name().to_string(),
        task.state().name().to_string(),
        task.created_at().date().to_string(),
        task.closed_at().map(|at| at.date().to_string()).unwrap_or_default(),
        task.due.map(|d| d.to_string()).unwrap_or_default(),
        task.label_names(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use crate::task::Label;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::new(d, m, y).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
    }

    fn summary_value(doc: &ReportDocument, metric: &str) -> String {
        let table = doc.table(SUMMARY_TABLE).unwrap();
        table
            .rows()
            .iter()
            .find(|row| row[0] == metric)
            .map(|row| row[1].clone())
            .unwrap()
    }

    fn january_project() -> Project {
        let mut p = Project::new(42, "Website", "");
        let mut done = Task::new(1, "Landing page", Priority::Urgent, at(2024, 1, 5, 9, 0, 0));
        done.set_state(State::InProgress, at(2024, 1, 6, 9, 0, 0));
        done.set_state(State::Completed, at(2024, 1, 20, 17, 0, 0));
        p.add_task(done);
        let mut doing = Task::new(2, "Pricing", Priority::Medium, at(2024, 1, 10, 9, 0, 0));
        doing.set_state(State::InProgress, at(2024, 1, 11, 9, 0, 0));
        p.add_task(doing);
        p.add_task(Task::new(3, "Blog", Priority::Low, at(2024, 2, 1, 9, 0, 0)));
        p
    }

    #[test]
    fn test_window_is_inclusive_on_whole_days() {
        let w = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31));
        assert!(w.contains(at(2024, 1, 1, 0, 0, 0)));
        assert!(w.contains(at(2024, 1, 31, 23, 59, 59)));
        assert!(!w.contains(at(2024, 2, 1, 0, 0, 0)));
        assert!(!w.contains(at(2023, 12, 31, 23, 59, 59)));
        assert!(!w.is_empty());

        let single = DateWindow::new(date(2024, 1, 15), date(2024, 1, 15));
        assert!(single.contains(at(2024, 1, 15, 12, 0, 0)));
    }

    #[test]
    fn test_period_created_and_progress() {
        let doc = build_summary(&january_project(), &[], date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(summary_value(&doc, "Tasks created"), "2");
        assert_eq!(summary_value(&doc, "Tasks completed"), "1");
        assert_eq!(summary_value(&doc, "In progress"), "1");
        assert_eq!(summary_value(&doc, "Pending"), "0");
        assert_eq!(summary_value(&doc, "Progress %"), "75");
    }

    #[test]
    fn test_completed_ignores_creation_window() {
        let p = january_project();
        // February: the landing page was created and closed in January, so nothing completes here.
        let feb = Kpis::compute(p.tasks(), &DateWindow::new(date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(feb.created, 1);
        assert_eq!(feb.completed, 0);

        // A window covering only the close date counts the completion but not the creation.
        let close_week = Kpis::compute(p.tasks(), &DateWindow::new(date(2024, 1, 15), date(2024, 1, 21)));
        assert_eq!(close_week.completed, 1);
        assert_eq!(close_week.created, 0);
        assert_eq!(close_week.progress_percent, 0);
    }

    #[test]
    fn test_empty_project_yields_zeroes_and_headers() {
        let p = Project::new(1, "Empty", "");
        let doc = build_summary(&p, &[], date(2024, 1, 1), date(2024, 12, 31));
        for row in doc.table(SUMMARY_TABLE).unwrap().rows() {
            assert_eq!(row[1], "0");
        }
        let tasks = doc.table(TASKS_TABLE).unwrap();
        assert!(tasks.rows().is_empty());
        assert_eq!(tasks.columns().len(), TASK_COLUMNS.len());
    }

    #[test]
    fn test_overdue_is_relative_to_period_end() {
        let mut p = Project::new(1, "Ops", "");
        let mut t = Task::new(1, "Renew cert", Priority::Important, at(2024, 3, 1, 8, 0, 0));
        t.due = Some(date(2024, 3, 31));
        p.add_task(t);

        let window = DateWindow::new(date(2024, 3, 1), date(2024, 3, 31));
        assert_eq!(Kpis::compute(p.tasks(), &window).overdue, 1);

        // Due after the period end is not overdue.
        let earlier = DateWindow::new(date(2024, 3, 1), date(2024, 3, 30));
        assert_eq!(Kpis::compute(p.tasks(), &earlier).overdue, 0);

        p.task_mut(1).unwrap().set_state(State::Completed, at(2024, 4, 2, 8, 0, 0));
        assert_eq!(Kpis::compute(p.tasks(), &window).overdue, 0);
    }

    #[test]
    fn test_reversed_period_zeroes_metrics_but_lists_tasks() {
        let p = january_project();
        let doc = build_summary(&p, &[], date(2024, 1, 31), date(2024, 1, 1));
        assert!(DateWindow::new(date(2024, 1, 31), date(2024, 1, 1)).is_empty());
        for row in doc.table(SUMMARY_TABLE).unwrap().rows() {
            assert_eq!(row[1], "0", "{} should be zero", row[0]);
        }
        assert_eq!(doc.table(TASKS_TABLE).unwrap().rows().len(), 3);
    }

    #[test]
    fn test_progress_rounds_half_up() {
        assert_eq!(mean_half_up(0, 0), 0);
        assert_eq!(mean_half_up(150, 2), 75);
        // 50 / 3 = 16.67
        assert_eq!(mean_half_up(50, 3), 17);
        // 100 / 8 = 12.5
        assert_eq!(mean_half_up(100, 8), 13);
        assert_eq!(mean_half_up(200, 3), 67);
    }

    #[test]
    fn test_metadata_and_task_rows() {
        let mut p = january_project();
        let users = vec![User { id: 9, name: "Ana".into(), email: String::new() }];
        {
            let t = p.task_mut(2).unwrap();
            t.assignee = Some(9);
            t.due = Some(date(2024, 2, 15));
            t.add_label(Label::new("web", None));
            t.add_label(Label::new("copy", Some("green".into())));
        }
        p.task_mut(3).unwrap().assignee = Some(99);

        let doc = build_summary(&p, &users, date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(doc.title(), "Project summary: Website");
        let keys: Vec<_> = doc.metadata().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["project_id", "project_name", "period_from", "period_to"]);
        assert_eq!(doc.metadata_value("project_id"), Some("42"));
        assert_eq!(doc.metadata_value("period_to"), Some("2024-01-31"));

        let names: Vec<_> = doc.tables().iter().map(|t| t.name()).collect();
        assert_eq!(names, [SUMMARY_TABLE, TASKS_TABLE]);

        let rows = doc.table(TASKS_TABLE).unwrap().rows();
        assert_eq!(
            rows[0],
            ["1", "Landing page", "", "URGENT", "COMPLETED", "2024-01-05", "2024-01-20", "", ""]
        );
        assert_eq!(
            rows[1],
            ["2", "Pricing", "Ana", "MEDIUM", "IN_PROGRESS", "2024-01-10", "", "2024-02-15", "web;copy"]
        );
        // Unknown assignee renders empty.
        assert_eq!(rows[2][2], "");
        assert_eq!(rows[2][0], "3");
    }
}
