//! Command implementations for the CLI interface.
//!
//! Each handler receives the store explicitly, mutates it when needed and
//! saves it back. Errors bubble up to `main`, which prints a single line.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use kanban_report::calendar::{parse_date_input, CalendarDate, InvalidDateError};
use kanban_report::config::Config;
use kanban_report::db::Database;
use kanban_report::error::{ReportError, StoreError};
use kanban_report::fields::*;
use kanban_report::report::{
    build_summary, generate_artifact, Converter, DateWindow, ExternalConverter, Kpis, MarkupConverter,
};
use kanban_report::task::{Label, Task};

use crate::cli::Cli;

#[derive(Debug, thiserror::Error)]
pub enum CmdError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Date(#[from] InvalidDateError),

    #[error("{0}")]
    Invalid(String),
}

/// Date argument: YYYY-MM-DD, "today", "tomorrow", "yesterday" or "in Nd"/"in Nw".
fn date_arg(s: &str) -> Result<CalendarDate, InvalidDateError> {
    parse_date_input(s, Local::now().date_naive())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage users.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage projects and their members.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Add a task to a project.
    Add {
        /// Project id or name.
        project: String,
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: urgent | important | medium | low.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Due date: YYYY-MM-DD, "today", "tomorrow" or "in Nd".
        #[arg(long, value_parser = date_arg)]
        due: Option<CalendarDate>,
        /// Assignee user id (must be a project member).
        #[arg(long)]
        assignee: Option<u64>,
        /// Label as name or name:color. May be repeated.
        #[arg(long = "label")]
        labels: Vec<String>,
    },

    /// Move a task to another state.
    Move {
        /// Project id or name.
        project: String,
        /// Task id.
        id: u64,
        /// New state: pending | in-progress | completed.
        #[arg(value_enum)]
        state: State,
    },

    /// Add or remove a label on a task.
    Label {
        /// Project id or name.
        project: String,
        /// Task id.
        id: u64,
        /// Label name.
        name: String,
        /// Label colour.
        #[arg(long)]
        color: Option<String>,
        /// Remove the label instead of adding it.
        #[arg(long)]
        remove: bool,
    },

    /// List the tasks of a project.
    List {
        /// Project id or name.
        project: String,
    },

    /// Generate a period summary report for a project.
    Report {
        /// Project id or name.
        project: String,
        /// First day of the period (inclusive).
        #[arg(long, value_parser = date_arg)]
        from: CalendarDate,
        /// Last day of the period (inclusive).
        #[arg(long, value_parser = date_arg)]
        to: CalendarDate,
        /// Output file. Defaults to <report-dir>/<project>_<from>_<to>.<ext>.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = ReportFormat::Pdf)]
        format: ReportFormat,
        /// Directory for default output files.
        #[arg(long, env = "KT_REPORT_DIR")]
        report_dir: Option<PathBuf>,
        /// HTML-to-PDF program reading markup on stdin and writing PDF to stdout.
        #[arg(long, env = "KT_CONVERTER")]
        converter: Option<String>,
        /// Print the summary figures instead of writing a file.
        #[arg(long)]
        print: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a user.
    Add {
        name: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// List users.
    List,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project.
    Add {
        name: String,
        /// Project description.
        #[arg(long, default_value = "")]
        desc: String,
        /// User id of the project lead, added as admin member.
        #[arg(long)]
        lead: Option<u64>,
    },
    /// List projects.
    List {
        /// Only projects this user id is a member of.
        #[arg(long)]
        member: Option<u64>,
    },
    /// Add a member to a project, or change an existing member's role.
    Member {
        /// Project id or name.
        project: String,
        /// User id.
        user: u64,
        #[arg(long, value_enum, default_value_t = Role::Editor)]
        role: Role,
    },
}

pub fn cmd_user(db: &mut Database, db_path: &Path, action: UserAction) -> Result<(), CmdError> {
    match action {
        UserAction::Add { name, email } => {
            let user = db.add_user(&name, &email)?;
            println!("Added user #{}: {}", user.id, user.name);
            db.save(db_path)?;
        }
        UserAction::List => {
            println!("{:<5} {:<24} {}", "ID", "Name", "Email");
            for u in &db.users {
                println!("{:<5} {:<24} {}", u.id, truncate(&u.name, 24), u.email);
            }
        }
    }
    Ok(())
}

pub fn cmd_project(db: &mut Database, db_path: &Path, action: ProjectAction) -> Result<(), CmdError> {
    match action {
        ProjectAction::Add { name, desc, lead } => {
            if let Some(uid) = lead {
                require_user(db, uid)?;
            }
            let project = db.add_project(&name, &desc)?;
            if let Some(uid) = lead {
                project.add_member(uid, Role::Admin);
            }
            println!("Created project #{}: {}", project.id, project.name);
            db.save(db_path)?;
        }
        ProjectAction::List { member } => {
            if let Some(uid) = member {
                require_user(db, uid)?;
            }
            println!("{:<5} {:<24} {:<7} {}", "ID", "Name", "Tasks", "Members");
            for p in db.projects_for(member) {
                let members = p
                    .members()
                    .iter()
                    .map(|m| {
                        let name = db.user(m.user_id).map(|u| u.name.as_str()).unwrap_or("?");
                        format!("{name} ({})", m.role.label())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{:<5} {:<24} {:<7} {}", p.id, truncate(&p.name, 24), p.tasks().len(), members);
            }
        }
        ProjectAction::Member { project, user, role } => {
            let name = require_user(db, user)?.name.clone();
            let p = db.project_mut(&project)?;
            if p.add_member(user, role) {
                println!("Added {} to {} as {}", name, p.name, role.label());
            } else {
                println!("{} is now {} in {}", name, role.label(), p.name);
            }
            db.save(db_path)?;
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    db: &mut Database,
    db_path: &Path,
    project: String,
    title: String,
    desc: Option<String>,
    priority: Priority,
    due: Option<CalendarDate>,
    assignee: Option<u64>,
    labels: Vec<String>,
) -> Result<(), CmdError> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(CmdError::Invalid("task title cannot be empty".into()));
    }
    let p = db.project(&project)?;
    if let Some(uid) = assignee {
        if !p.is_member(uid) {
            return Err(CmdError::Invalid(format!(
                "user #{uid} is not a member of project '{}'",
                p.name
            )));
        }
    }

    let p = db.project_mut(&project)?;
    let mut task = Task::new(p.next_task_id(), title, priority, now());
    task.description = desc.unwrap_or_default();
    task.due = due;
    task.assignee = assignee;
    for raw in labels.iter().flat_map(|l| l.split(',')) {
        if !task.add_label(Label::parse(raw)) && !raw.trim().is_empty() {
            tracing::debug!(label = raw, "duplicate label ignored");
        }
    }
    let id = p.add_task(task);
    println!("Added task #{} to {}", id, p.name);
    db.save(db_path)?;
    Ok(())
}

pub fn cmd_move(db: &mut Database, db_path: &Path, project: String, id: u64, state: State) -> Result<(), CmdError> {
    let p = db.project_mut(&project)?;
    let task = p.task_mut(id).ok_or_else(|| StoreError::NotFound {
        entity: "task",
        key: id.to_string(),
    })?;
    if task.set_state(state, now()) {
        println!("Task #{} is now {}", id, state.label());
        db.save(db_path)?;
    } else {
        println!("Task #{} is already {}", id, state.label());
    }
    Ok(())
}

pub fn cmd_label(
    db: &mut Database,
    db_path: &Path,
    project: String,
    id: u64,
    name: String,
    color: Option<String>,
    remove: bool,
) -> Result<(), CmdError> {
    let p = db.project_mut(&project)?;
    let task = p.task_mut(id).ok_or_else(|| StoreError::NotFound {
        entity: "task",
        key: id.to_string(),
    })?;
    let changed = if remove {
        task.remove_label(&name)
    } else {
        let label = Label::new(name.as_str(), color);
        if label.name.is_empty() {
            return Err(CmdError::Invalid("label name cannot be empty".into()));
        }
        task.add_label(label)
    };
    if changed {
        println!("Task #{} labels: {}", id, task.label_names());
        db.save(db_path)?;
    } else if remove {
        println!("Task #{} has no label '{}'", id, name);
    } else {
        println!("Task #{} already has label '{}'", id, name);
    }
    Ok(())
}

pub fn cmd_list(db: &Database, project: String) -> Result<(), CmdError> {
    let p = db.project(&project)?;
    let today = Local::now().date_naive();
    println!(
        "{:<5} {:<12} {:<10} {:<11} {:<16} {}",
        "ID", "State", "Priority", "Due", "Assignee", "Title [labels]"
    );
    for t in p.tasks() {
        let due = match t.due {
            Some(d) if d.is_before(today) && t.state() != State::Completed => format!("{d}!"),
            Some(d) => d.to_string(),
            None => "-".into(),
        };
        let assignee = t
            .assignee
            .and_then(|id| db.user(id))
            .map(|u| u.name.as_str())
            .unwrap_or("-");
        let labels = if t.labels().is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.label_names())
        };
        println!(
            "{:<5} {:<12} {:<10} {:<11} {:<16} {}{}",
            t.id,
            t.state().label(),
            t.priority.label(),
            due,
            truncate(assignee, 16),
            t.title,
            labels
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_report(
    db: &Database,
    config: &Config,
    project: String,
    from: CalendarDate,
    to: CalendarDate,
    out: Option<PathBuf>,
    format: ReportFormat,
    print: bool,
) -> Result<(), CmdError> {
    let p = db.project(&project)?;

    if print {
        let kpis = Kpis::compute(p.tasks(), &DateWindow::new(from, to));
        println!("Project summary: {} ({} to {})", p.name, from, to);
        for (label, value) in kpis.rows() {
            println!("  {:<16} {}", label, value);
        }
        return Ok(());
    }

    let doc = build_summary(p, &db.users, from, to);
    let destination = out.unwrap_or_else(|| config.report_path(&p.name, from, to, format));
    let external;
    let converter: &dyn Converter = match format {
        ReportFormat::Html => &MarkupConverter,
        ReportFormat::Pdf => {
            external = ExternalConverter::new(config.converter.as_str());
            &external
        }
    };

    tracing::info!(project = p.id, %from, %to, path = %destination.display(), "generating report");
    let written = generate_artifact(&doc, converter, &destination)?;
    println!("Report written to {}", written.display());
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

fn require_user(db: &Database, id: u64) -> Result<&kanban_report::project::User, CmdError> {
    db.user(id).ok_or_else(|| {
        StoreError::NotFound {
            entity: "user",
            key: id.to_string(),
        }
        .into()
    })
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
