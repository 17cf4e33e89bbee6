use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::core::EntryId;
use crate::features::board::Board;
use crate::features::sync::{DeadLetter, DeadLetterKind, EntryStatus, Mutation, QueueEntry, QueueStats};

/// Format queue entries as a pretty table
pub fn format_entries_pretty(entries: &[QueueEntry]) -> String {
    if entries.is_empty() {
        return "Sync Queue (0 entries)\n  Nothing waiting to sync".to_string();
    }

    let mut output = format!("Sync Queue ({} entries)\n", entries.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for entry in entries {
        let status_icon = match entry.status {
            EntryStatus::Pending => "[ ]".white(),
            EntryStatus::InFlight => "[>]".cyan(),
            EntryStatus::Failed => "[!]".red(),
        };

        let mut line = format!(
            "{} {} {}",
            status_icon,
            entry.payload.display_name().bold(),
            entry.payload.summary()
        );
        line.push_str(&format!("  {}", short_id(&entry.id).dimmed()));

        if entry.attempts > 0 {
            line.push_str(&format!("  {}", format!("{} attempts", entry.attempts).yellow()));
        }

        output.push_str(&line);
        output.push('\n');

        if let Some(error) = &entry.last_error {
            output.push_str(&format!("    {}\n", truncate(error, 70).red()));
        }
    }

    output
}

/// Format dead letters as pretty output
pub fn format_dead_letters_pretty(letters: &[DeadLetter]) -> String {
    if letters.is_empty() {
        return "Dead Letters (0)\n  No failed mutations".to_string();
    }

    let mut output = format!("Dead Letters ({})\n", letters.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for letter in letters {
        let kind = match letter.kind {
            DeadLetterKind::Rejected => "rejected".red(),
            DeadLetterKind::Exhausted => "exhausted".yellow(),
        };

        output.push_str(&format!(
            "{} {} {}\n",
            letter.payload.display_name().bold(),
            letter.payload.summary(),
            kind
        ));
        output.push_str(&format!("  {}: {}\n", "ID".dimmed(), letter.id));

        let reason = match letter.status_code {
            Some(code) => format!("{code} {}", letter.reason),
            None => letter.reason.clone(),
        };
        output.push_str(&format!("  {}: {}\n", "Reason".dimmed(), truncate(&reason, 70)));
        output.push_str(&format!(
            "  {}: {}\n",
            "Failed".dimmed(),
            letter.failed_at.format("%Y-%m-%d %H:%M")
        ));
    }

    output
}

/// Format queue statistics as pretty output
pub fn format_status_pretty(stats: &QueueStats) -> String {
    let mut lines = Vec::new();

    lines.push("Sync Queue Status".bold().to_string());
    lines.push("─".repeat(40));

    lines.push(format!(
        "  Pending:      {} {}",
        stats.pending,
        if stats.pending > 0 {
            "waiting to sync".dimmed()
        } else {
            "".dimmed()
        }
    ));

    if stats.in_flight > 0 {
        lines.push(format!("  In flight:    {}", stats.in_flight));
    }

    lines.push(format!(
        "  Failed:       {} {}",
        stats.failed,
        if stats.failed > 0 {
            "will retry".yellow()
        } else {
            "".normal()
        }
    ));

    lines.push(format!(
        "  Dead letters: {} {}",
        stats.dead_letters,
        if stats.dead_letters > 0 {
            "need attention".red()
        } else {
            "".normal()
        }
    ));

    if let Some(oldest) = stats.oldest_pending {
        lines.push(format!("  Oldest:       {}", age(oldest, Utc::now()).dimmed()));
    }

    if stats.unresolved() > 0 {
        lines.push(String::new());
        lines.push(
            "Run 'boardsync sync run' to deliver pending mutations"
                .dimmed()
                .to_string(),
        );
    }

    lines.join("\n")
}

/// Confirmation for a queued mutation
pub fn format_queued_pretty(id: &EntryId, mutation: &Mutation, pending: usize) -> String {
    format!(
        "{} Queued {} {} ({})\n  {} pending",
        "✓".green(),
        mutation.display_name(),
        mutation.summary(),
        short_id(id).dimmed(),
        pending
    )
}

/// Format a board as columns of cards
pub fn format_board_pretty(board: &Board) -> String {
    let mut output = format!("Project {} board\n", board.project_id());
    output.push_str(&"─".repeat(40));
    output.push('\n');

    if board.is_empty() {
        output.push_str("  No columns");
        return output;
    }

    for column in board.columns() {
        output.push_str(&format!(
            "{} {}\n",
            column.title.bold(),
            format!("({}, {} cards)", column.id, column.items.len()).dimmed()
        ));
        for (position, item) in column.items.iter().enumerate() {
            output.push_str(&format!("  {position}. {item}\n"));
        }
    }

    output
}

fn short_id(id: &EntryId) -> String {
    id.as_str().chars().take(8).collect()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max - 3).collect::<String>())
    } else {
        s.to_string()
    }
}

fn age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(since);
    if age.num_days() > 0 {
        format!("{} days ago", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{} hours ago", age.num_hours())
    } else if age.num_minutes() > 0 {
        format!("{} minutes ago", age.num_minutes())
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnId, ItemId};
    use chrono::Duration;

    #[test]
    fn test_empty_entries() {
        assert!(format_entries_pretty(&[]).contains("0 entries"));
    }

    #[test]
    fn test_entries_show_errors() {
        let entry = QueueEntry {
            id: EntryId::parse("0123456789abcdef").unwrap(),
            payload: Mutation::DeleteProject { project_id: 9 },
            created_at: Utc::now(),
            attempts: 1,
            status: EntryStatus::Failed,
            last_attempt: None,
            last_error: Some("could not connect".to_string()),
        };

        let output = format_entries_pretty(&[entry]);
        assert!(output.contains("Delete Project"));
        assert!(output.contains("01234567"));
        assert!(!output.contains("0123456789abcdef"));
        assert!(output.contains("could not connect"));
    }

    #[test]
    fn test_board() {
        let mut board = Board::new(3);
        let todo = ColumnId::parse("todo").unwrap();
        board.add_column(todo.clone(), "To Do").unwrap();
        board.add_item(&todo, ItemId::parse("t1").unwrap(), None).unwrap();

        let output = format_board_pretty(&board);
        assert!(output.contains("Project 3 board"));
        assert!(output.contains("To Do"));
        assert!(output.contains("0. t1"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_age() {
        let now = Utc::now();
        assert_eq!(age(now, now), "just now");
        assert_eq!(age(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(age(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(age(now - Duration::days(2), now), "2 days ago");
    }
}
