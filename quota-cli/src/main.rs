use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quota_core::{
    Clock, SystemClock, Task, TaskFilter, TaskStatus, Visibility, build_today_plan, calendar,
    day_hit, summarize_analytics,
};
use quota_store::{SnapshotStore, StartOutcome, TaskStore, ToggleOutcome};

mod config;
mod watch;

#[derive(Parser, Debug)]
#[command(name = "quota", version, about = "Daily time-quota scheduler and progress tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a task with a daily minute quota
    Add {
        title: String,

        #[arg(long, default_value = "personal")]
        category: String,

        /// Minutes owed on each active day
        #[arg(long, default_value_t = 60)]
        daily: u32,

        /// First day of the window, YYYY-MM-DD (default: today)
        #[arg(long)]
        start: Option<String>,

        /// Last day of the window, YYYY-MM-DD (default: a week out)
        #[arg(long)]
        due: Option<String>,

        /// Earliest plan slot start, HH:mm
        #[arg(long, default_value = "22:00")]
        earliest: String,

        /// Active weekdays, e.g. "1,3,5" (Mon=1..Sun=7; default: all)
        #[arg(long)]
        days: Option<String>,

        /// Total-effort cap in minutes; gates marking the task done
        #[arg(long)]
        estimate: Option<u32>,

        /// private | friends | public
        #[arg(long, default_value = "private")]
        visibility: String,
    },

    /// List tasks, optionally filtered
    List {
        /// Match against the title, case-insensitive
        #[arg(long)]
        query: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// todo | in_progress | done
        #[arg(long)]
        status: Option<String>,
    },

    /// Remove a task
    Remove { id: String },

    /// Edit a task (only while still todo)
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        daily: Option<u32>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        earliest: Option<String>,
    },

    /// Start the live timer on a task
    Start { id: String },

    /// Stop the live timer, saving elapsed minutes into today
    Stop { id: String },

    /// Log minutes against a day without using the timer
    Log {
        id: String,
        minutes: u32,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        day: Option<String>,
    },

    /// Toggle a task between done and todo
    Done { id: String },

    /// Show today's plan
    Plan,

    /// Show adherence, streak, deficits and catch-up suggestions
    Stats {
        /// Override the configured window
        #[arg(long)]
        window: Option<u32>,
    },

    /// Run the background day-boundary and quota watcher
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let clock = SystemClock;
    let cfg = config::load_config()?;

    let tasks = TaskStore::open(quota_store::tasks_path()?, clock.today())?;
    let snapshots = SnapshotStore::open(quota_store::snapshots_path()?)?;

    match cli.command {
        Command::Add {
            title,
            category,
            daily,
            start,
            due,
            earliest,
            days,
            estimate,
            visibility,
        } => {
            let today = clock.today();
            let start = parse_day_arg(start.as_deref(), today);
            let due = parse_day_arg(due.as_deref(), start + chrono::Duration::days(7));
            let id = format!("t-{:x}", clock.now().timestamp_millis());

            let mut task = Task::new(&id, &title, today)
                .with_daily_minutes(daily)
                .with_window(start, due)
                .with_earliest(earliest)
                .with_visibility(parse_visibility(&visibility)?);
            task.category = category;
            if let Some(days) = days {
                task = task.with_days_of_week(&parse_weekdays(&days)?);
            }
            if let Some(estimate) = estimate {
                task = task.with_estimate_total(estimate);
            }
            if !task.has_valid_window() {
                println!("Note: start is after due; this task will be ignored by plans and stats.");
            }
            tasks.add(task)?;
            println!("Added {id}: \"{title}\" ({} / active day)", calendar::fmt_min_human(daily));
        }

        Command::List {
            query,
            category,
            status,
        } => {
            let filter = TaskFilter {
                query,
                category,
                status: status.as_deref().map(parse_status).transpose()?,
            };
            let all: Vec<_> = tasks
                .list()
                .into_iter()
                .filter(|t| filter.matches(t))
                .collect();
            if all.is_empty() {
                println!("No matching tasks.");
                return Ok(());
            }
            let today = clock.today();
            let now = clock.now();
            for t in &all {
                let done = quota_core::done_today(t, today, now);
                println!(
                    "{} {}  {}  [{}] {} / {} today  {} -> {}",
                    status_mark(t),
                    t.id,
                    t.title,
                    t.category,
                    calendar::fmt_min_human(done),
                    calendar::fmt_min_human(quota_core::required_on_day(t, today)),
                    t.start_date,
                    t.due_date,
                );
            }
        }

        Command::Remove { id } => {
            if tasks.remove(&id)? {
                println!("Removed {id}.");
            } else {
                println!("No task {id}.");
            }
        }

        Command::Edit {
            id,
            title,
            daily,
            start,
            due,
            earliest,
        } => {
            let today = clock.today();
            let applied = tasks.update(&id, |t| {
                if let Some(title) = title {
                    t.title = title;
                }
                if let Some(daily) = daily {
                    t.daily_minutes = daily;
                }
                if let Some(start) = start {
                    t.start_date = calendar::parse_day_or(&start, today);
                }
                if let Some(due) = due {
                    t.due_date = calendar::parse_day_or(&due, today);
                }
                if let Some(earliest) = earliest {
                    t.rule.earliest_hhmm = earliest;
                }
            })?;
            if applied {
                println!("Updated {id}.");
            } else {
                println!("Not updated: {id} is missing or no longer todo.");
            }
        }

        Command::Start { id } => match tasks.start_timer(&id, clock.now())? {
            StartOutcome::Started => println!("Timer started on {id}."),
            StartOutcome::AlreadyRunning => println!("{id} is already running."),
            StartOutcome::Rejected { running_id } => {
                println!("Rejected: {running_id} is running. Stop it first.");
            }
            StartOutcome::NotFound => println!("No task {id}."),
        },

        Command::Stop { id } => match tasks.stop_timer(&id, clock.today(), clock.now())? {
            Some(delta) => println!("Stopped {id}: saved {}.", calendar::fmt_min_human(delta)),
            None => println!("No timer running on {id}."),
        },

        Command::Log { id, minutes, day } => {
            let day = parse_day_arg(day.as_deref(), clock.today());
            if tasks.log_progress(&id, day, minutes)? {
                println!(
                    "Logged {} on {} for {id}.",
                    calendar::fmt_min_human(minutes),
                    calendar::to_iso(day)
                );
            } else {
                println!("No task {id}.");
            }
        }

        Command::Done { id } => match tasks.toggle_status(&id, clock.today(), clock.now())? {
            ToggleOutcome::Done => {
                let on_time = tasks
                    .get(&id)
                    .map(|t| clock.today() <= t.due_date)
                    .unwrap_or(true);
                if on_time {
                    println!("Done. Finished on time.");
                } else {
                    println!("Done, but after the deadline. Try to be earlier next time.");
                }
            }
            ToggleOutcome::Reopened => println!("Reopened {id}."),
            ToggleOutcome::Blocked => {
                println!("Not yet: stop the timer and meet today's quota (and any total estimate) first.");
            }
            ToggleOutcome::NotFound => println!("No task {id}."),
        },

        Command::Plan => {
            let all = tasks.list();
            let plan = build_today_plan(&all, clock.today(), clock.now());
            if plan.is_empty() {
                println!("Nothing owed today.");
                return Ok(());
            }
            for slot in &plan {
                println!(
                    "{}-{}  {}  need {}  due in {}d  pressure {:.0}%",
                    slot.start.format("%H:%M"),
                    slot.end.format("%H:%M"),
                    slot.title,
                    calendar::fmt_min_human(slot.need_min),
                    slot.due_in_days,
                    slot.pressure_ratio * 100.0,
                );
            }
        }

        Command::Stats { window } => {
            let all = tasks.list();
            let today = clock.today();
            let now = clock.now();
            let window = window.unwrap_or(cfg.analytics.window_days);
            let summary = summarize_analytics(&all, today, window, now);

            println!(
                "Adherence {}%  streak {}  deficit {}  pressure {:.0}%",
                summary.adherence,
                summary.streak,
                calendar::fmt_min_human(summary.deficit_total),
                summary.pressure * 100.0,
            );
            for d in &summary.per_day {
                let star = if day_hit(d.day, today, now, &all, snapshots.get(d.day).as_ref()) {
                    " *"
                } else {
                    ""
                };
                println!(
                    "  {}  {} / {}{}",
                    calendar::to_iso(d.day),
                    calendar::fmt_min_human(d.done),
                    calendar::fmt_min_human(d.required),
                    star,
                );
            }
            if !summary.suggestions.is_empty() {
                println!("Catch-up:");
                for s in &summary.suggestions {
                    println!(
                        "  {}  +{}/day over {} day(s) (behind by {})",
                        s.title,
                        calendar::fmt_min_human(s.add_per_day),
                        s.days_left,
                        calendar::fmt_min_human(s.deficit),
                    );
                }
            }
        }

        Command::Watch => {
            watch::run(&tasks, &snapshots, &cfg.watch).await?;
        }
    }

    Ok(())
}

fn status_mark(t: &Task) -> &'static str {
    match t.status {
        TaskStatus::Todo => "[ ]",
        TaskStatus::InProgress => "[>]",
        TaskStatus::Done => "[x]",
    }
}

fn parse_day_arg(arg: Option<&str>, fallback: NaiveDate) -> NaiveDate {
    arg.map(|s| calendar::parse_day_or(s, fallback))
        .unwrap_or(fallback)
}

fn parse_status(s: &str) -> Result<TaskStatus> {
    match s {
        "todo" => Ok(TaskStatus::Todo),
        "in_progress" => Ok(TaskStatus::InProgress),
        "done" => Ok(TaskStatus::Done),
        other => anyhow::bail!("unknown status: {other} (todo|in_progress|done)"),
    }
}

fn parse_visibility(s: &str) -> Result<Visibility> {
    match s {
        "private" => Ok(Visibility::Private),
        "friends" => Ok(Visibility::Friends),
        "public" => Ok(Visibility::Public),
        other => anyhow::bail!("unknown visibility: {other} (private|friends|public)"),
    }
}

fn parse_weekdays(s: &str) -> Result<Vec<u32>> {
    s.split(',')
        .map(|p| {
            let n: u32 = p.trim().parse().with_context(|| format!("bad weekday: {p}"))?;
            anyhow::ensure!((1..=7).contains(&n), "weekday out of range: {n} (1=Mon..7=Sun)");
            Ok(n)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_parsing() {
        assert_eq!(parse_weekdays("1,3,5").unwrap(), vec![1, 3, 5]);
        assert_eq!(parse_weekdays(" 7 ").unwrap(), vec![7]);
        assert!(parse_weekdays("0").is_err());
        assert!(parse_weekdays("8").is_err());
        assert!(parse_weekdays("mon").is_err());
    }

    #[test]
    fn visibility_parsing() {
        assert_eq!(parse_visibility("friends").unwrap(), Visibility::Friends);
        assert!(parse_visibility("everyone").is_err());
    }

    #[test]
    fn status_parsing() {
        assert_eq!(parse_status("in_progress").unwrap(), TaskStatus::InProgress);
        assert!(parse_status("doing").is_err());
    }
}
