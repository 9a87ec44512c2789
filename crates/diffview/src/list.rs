use colored::Colorize;

use diffview_core::{DisplayKind, MaterializedChange, Snapshot};

/// Print the change set as a table on stdout.
pub fn print_changes(snapshot: &Snapshot) {
    if snapshot.is_empty() {
        println!("{}", "No changes found.".dimmed());
        return;
    }

    println!(
        "{:<6} {:<8} {}",
        "INDEX".dimmed(),
        "KIND".dimmed(),
        "PATH".dimmed(),
    );

    for change in snapshot.iter() {
        println!("{}", format_row(change));
    }
}

fn format_row(change: &MaterializedChange) -> String {
    let kind = change.display_kind.to_string();
    let kind_colored = match change.display_kind {
        DisplayKind::Add => kind.bright_green().to_string(),
        DisplayKind::Delete => kind.bright_red().to_string(),
        DisplayKind::Move => kind.bright_cyan().to_string(),
        DisplayKind::Change => kind.bright_yellow().to_string(),
    };

    let path = match (change.record.path_before(), change.record.path_after()) {
        (Some(before), Some(after)) if before != after => format!("{} -> {}", before, after),
        _ => change.record.path().to_string(),
    };

    let mut flags = Vec::new();
    if change.is_image {
        flags.push("image");
    }
    if change.no_changes {
        flags.push("no changes");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", ")).dimmed().to_string()
    };

    // Pad before coloring so ANSI codes do not skew the column
    format!(
        "{:<6} {}{} {}{}",
        change.index,
        kind_colored,
        " ".repeat(8usize.saturating_sub(kind.len())),
        path,
        flags
    )
}
