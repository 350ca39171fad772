use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::Settings;
use crate::error::DeleteError;
use crate::indexer::DEFAULT_ACTIVE_WINDOW_MINUTES;
use crate::manager::SessionManager;
use crate::models::{ArtifactKind, DeletionPlan, RankedSession};
use crate::parsers::transcript;
use crate::utils::environment::CLAUDE_DIR_ENV;
use crate::utils::terminal::{one_line, strip_ansi_codes};
use crate::utils::{format_path_with_tilde, format_relative, format_size, format_timestamp};

const TITLE_WIDTH: usize = 60;

#[derive(Parser, Debug)]
#[command(name = "claude-session-manager")]
#[command(version)]
#[command(about = "Inventory and prune Claude Code session data", long_about = None)]
pub struct Cli {
    /// Claude data directory (defaults to ~/.claude)
    #[arg(long, global = true, env = CLAUDE_DIR_ENV, value_name = "DIR")]
    pub claude_dir: Option<PathBuf>,

    /// Sessions touched within this many minutes are live and cannot be deleted
    #[arg(
        long,
        global = true,
        env = "CLAUDE_ACTIVE_WINDOW",
        value_name = "MINUTES",
        default_value_t = DEFAULT_ACTIVE_WINDOW_MINUTES
    )]
    pub active_window: u64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List sessions, real conversations first
    List {
        /// Only sessions whose id, display text or project contains this (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,
        /// Show at most this many sessions
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a session's artifacts and transcript
    Show {
        session_id: String,
    },
    /// Delete sessions and every artifact they own
    Delete {
        #[arg(required = true)]
        session_ids: Vec<String>,
        /// Actually delete; without this only the preview is printed
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove artifacts that no history entry refers to
    Clean {
        /// Actually delete; without this only the preview is printed
        #[arg(short, long)]
        yes: bool,
    },
    /// Show storage statistics
    Stats,
}

/// Run a parsed command line. Returns the process exit code.
pub fn run(cli: Cli) -> Result<u8> {
    let settings = Settings::resolve(cli.claude_dir, cli.active_window)?;
    let mut manager = SessionManager::open(&settings)
        .with_context(|| format!("Failed to load {}", settings.claude_dir.display()))?;

    match cli.command {
        Some(Commands::List { filter, limit, json }) => {
            list_sessions(&manager, filter.as_deref(), limit, json)
        }
        Some(Commands::Show { session_id }) => show_session(&manager, &session_id),
        Some(Commands::Delete { session_ids, yes }) => {
            delete_sessions(&mut manager, &session_ids, yes)
        }
        Some(Commands::Clean { yes }) => clean_orphans(&manager, yes),
        Some(Commands::Stats) => show_stats(&manager),
        None => {
            println!("Use --help for usage information");
            Ok(0)
        }
    }
}

#[derive(Serialize)]
struct ListedSession<'a> {
    #[serde(flatten)]
    session: &'a RankedSession,
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

fn list_sessions(
    manager: &SessionManager,
    filter: Option<&str>,
    limit: Option<usize>,
    json: bool,
) -> Result<u8> {
    let sessions: Vec<RankedSession> = manager
        .unique_sessions()
        .into_iter()
        .filter(|session| filter.is_none_or(|needle| session.matches(needle)))
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    let listed: Vec<ListedSession> = sessions
        .iter()
        .map(|session| ListedSession {
            session,
            active: manager.is_active(session.session_id()),
            title: title_for(manager, session),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(0);
    }

    println!("Claude directory: {}", format_path_with_tilde(manager.layout().root()));
    println!(
        "{} sessions, {} live  (* live, F conversation file, / local command)",
        listed.len(),
        listed.iter().filter(|s| s.active).count()
    );
    println!();

    for entry in &listed {
        let session = entry.session;
        let flags = format!(
            "{}{}{}",
            if entry.active { '*' } else { ' ' },
            if session.has_file { 'F' } else { ' ' },
            if session.is_local_command { '/' } else { ' ' },
        );
        let title = entry.title.as_deref().unwrap_or(&session.record.display);
        println!(
            "{flags} {:<36}  {:>12}  {:>9}  {}",
            one_line(session.session_id(), 36),
            format_relative(session.record.timestamp),
            if session.has_file { format_size(session.conversation_size) } else { "-".to_string() },
            one_line(title, TITLE_WIDTH),
        );
    }

    Ok(0)
}

/// History custom title, then the conversation's own title.
fn title_for(manager: &SessionManager, session: &RankedSession) -> Option<String> {
    if let Some(title) = &session.record.custom_title {
        return Some(title.clone());
    }
    match (session.has_file, session.project()) {
        (true, Some(project)) => manager.session_title(session.session_id(), project),
        _ => None,
    }
}

fn show_session(manager: &SessionManager, session_id: &str) -> Result<u8> {
    let Some(record) = manager.find_session(session_id) else {
        eprintln!("Session {} not found in history", strip_ansi_codes(session_id));
        return Ok(1);
    };
    let project = record.project.as_deref();

    println!("Session:  {}", strip_ansi_codes(session_id));
    println!("Project:  {}", strip_ansi_codes(project.unwrap_or("-")));
    println!("Display:  {}", one_line(&record.display, TITLE_WIDTH));
    println!("Time:     {}", format_timestamp(record.timestamp));
    println!("Status:   {}", if manager.is_active(session_id) { "live" } else { "idle" });
    println!();

    print_plan(&manager.preview_deletion(session_id, project));

    let Some(project) = project else {
        return Ok(0);
    };
    let messages = manager.load_conversation(session_id, project)?;
    if messages.is_empty() {
        return Ok(0);
    }

    println!();
    println!("Transcript ({} messages)", messages.len());
    println!("================================");
    for line in transcript(&messages) {
        println!("{}:", line.speaker.label());
        for text_line in strip_ansi_codes(&line.text).lines() {
            println!("  {text_line}");
        }
        println!();
    }

    Ok(0)
}

fn print_plan(plan: &DeletionPlan) {
    println!("Artifacts:");
    for kind in ArtifactKind::ALL {
        let count = plan.count_of(kind);
        if count == 0 {
            continue;
        }
        if kind == ArtifactKind::Todo {
            println!("  {:<14} {:>9}  ({} files)", kind.label(), format_size(plan.size_of(kind)), count);
        } else {
            println!("  {:<14} {:>9}", kind.label(), format_size(plan.size_of(kind)));
        }
    }
    if plan.is_empty() {
        println!("  (none on disk)");
    }
    println!("  {:<14} {:>9}", "total", format_size(plan.total_size()));
}

fn delete_sessions(manager: &mut SessionManager, session_ids: &[String], yes: bool) -> Result<u8> {
    for session_id in session_ids {
        println!("Session {}", strip_ansi_codes(session_id));
        let Some(record) = manager.find_session(session_id) else {
            println!("  not in history, will be skipped");
            println!();
            continue;
        };
        if manager.is_active(session_id) {
            println!("  live, will be skipped");
        }
        print_plan(&manager.preview_deletion(session_id, record.project.as_deref()));
        println!();
    }

    if !yes {
        println!("Dry run. Pass --yes to delete.");
        return Ok(0);
    }

    let mut exit_code = 0;
    for (session_id, outcome) in manager.delete_sessions(session_ids) {
        let session_id = strip_ansi_codes(&session_id);
        match outcome {
            Ok(result) if result.success() => {
                println!(
                    "Deleted {session_id}: freed {}, {} history entries",
                    format_size(result.freed_bytes),
                    result.history_entries
                );
            }
            Ok(result) => {
                exit_code = 1;
                println!(
                    "Partially deleted {session_id}: freed {}",
                    format_size(result.freed_bytes)
                );
                for error in &result.errors {
                    eprintln!("  error: {error}");
                }
            }
            Err(e @ (DeleteError::SessionLive { .. } | DeleteError::UnknownSession { .. })) => {
                exit_code = 1;
                eprintln!("Refused: {e}");
            }
            Err(e) => {
                exit_code = 1;
                eprintln!("Cannot delete {session_id}: {e}");
            }
        }
    }

    Ok(exit_code)
}

fn clean_orphans(manager: &SessionManager, yes: bool) -> Result<u8> {
    let plan = manager.preview_orphans();
    for error in &plan.scan_errors {
        eprintln!("warning: {error}");
    }

    let scan_code = if plan.scan_errors.is_empty() { 0 } else { 1 };

    if plan.is_empty() {
        println!("No orphaned files.");
        return Ok(scan_code);
    }

    println!("Orphaned files:");
    for kind in ArtifactKind::ALL {
        let count = plan.count_of(kind);
        if count > 0 {
            println!("  {:<14} {count}", kind.label());
        }
    }
    if !plan.empty_project_dirs.is_empty() {
        println!("  {:<14} {}", "empty projects", plan.empty_project_dirs.len());
    }
    println!("  {:<14} {}", "total", format_size(plan.total_size()));

    if !yes {
        println!();
        println!("Dry run. Pass --yes to delete.");
        return Ok(scan_code);
    }

    let result = manager.cleanup_orphaned_files();
    println!();
    for detail in &result.details {
        println!("  {}", strip_ansi_codes(detail));
    }
    println!(
        "Removed {} files and directories ({} empty projects), freed {}",
        result.removed(),
        result.empty_project_dirs,
        format_size(result.total_size_freed)
    );
    for failure in &result.failures {
        eprintln!("  failed: {failure}");
    }
    if let Some(error) = &result.error {
        eprintln!("error: {error}");
    }

    Ok(if result.failures.is_empty() && result.error.is_none() { 0 } else { 1 })
}

fn show_stats(manager: &SessionManager) -> Result<u8> {
    let stats = manager.stats();

    println!("Claude Code Session Statistics");
    println!("================================");
    println!("History records:    {}", stats.history_records);
    println!("Unique sessions:    {}", stats.unique_sessions);
    println!("Live sessions:      {}", manager.active_sessions().len());
    println!(
        "Conversation files: {} ({})",
        stats.conversation_files,
        format_size(stats.conversation_bytes)
    );
    println!("Debug logs:         {} ({})", stats.debug_files, format_size(stats.debug_bytes));
    println!("History file:       {}", format_size(stats.history_bytes));
    println!("Total:              {}", format_size(stats.total_bytes()));
    println!();
    println!("Claude directory: {}", format_path_with_tilde(manager.layout().root()));

    Ok(0)
}
