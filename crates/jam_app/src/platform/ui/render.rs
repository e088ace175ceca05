use std::fmt::Write as _;

use jam_core::{AppViewModel, Notice, NoticeLevel, TaskGroups, TaskRow};

pub fn print(view: &AppViewModel) {
    println!("{}", render(view));
}

pub fn print_tasks(tasks: &TaskGroups) {
    println!("{}", render_tasks(tasks));
}

pub fn print_notice(notice: &Notice) {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    };
    println!("[{tag}] {}", notice.text);
}

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Collections");
    for (index, row) in view.collections.iter().enumerate() {
        let marker = if row.viewed { '>' } else { ' ' };
        let target = if row.target { " (target)" } else { "" };
        let _ = writeln!(out, "{marker} {}. {}{target}", index + 1, row.name);
    }

    let page = view.offset / view.page_size.max(1) + 1;
    let _ = write!(out, "== Page {page} (size {})", view.page_size);
    if let Some(total) = view.total {
        let _ = write!(out, ", {total} companies");
    }
    let _ = writeln!(out, ", {} selected", view.selection_count);
    for row in &view.rows {
        let check = if row.selected { "[x]" } else { "[ ]" };
        let liked = if row.liked { " *" } else { "" };
        let _ = writeln!(out, "{check} {:>6}  {}{liked}", row.id, row.name);
    }

    let actions = &view.actions;
    let offered: Vec<&str> = [
        (actions.deselect_all, "deselect"),
        (actions.add_to_target, "add"),
        (actions.remove_from_target, "remove"),
        (actions.add_all_to_target, "add-all"),
        (actions.clear_collection, "clear"),
    ]
    .into_iter()
    .filter_map(|(enabled, name)| enabled.then_some(name))
    .collect();
    let _ = writeln!(out, "== Actions: {}", offered.join(", "));

    if view.polling {
        out.push_str(&render_tasks(&view.tasks));
    }
    out
}

pub fn render_tasks(tasks: &TaskGroups) -> String {
    let mut out = String::new();
    for (title, rows) in [
        ("In Progress", &tasks.in_progress),
        ("Completed", &tasks.completed),
        ("Failed", &tasks.failed),
    ] {
        let _ = writeln!(out, "== {title} ({})", rows.len());
        for row in rows {
            let _ = writeln!(out, "  {}", task_line(row));
        }
    }
    out
}

fn task_line(row: &TaskRow) -> String {
    let mut line = format!("{} {}", row.short_id, row.state);
    if let Some(progress) = &row.progress {
        let _ = write!(line, " {progress}");
    }
    if let Some(detail) = &row.detail {
        let _ = write!(line, " - {detail}");
    }
    line
}

#[cfg(test)]
mod tests {
    use jam_core::{TaskGroups, TaskId, TaskRow};

    use super::render_tasks;

    #[test]
    fn task_board_lists_each_bucket() {
        let tasks = TaskGroups {
            in_progress: vec![TaskRow {
                task_id: TaskId::new("ab-cd-ef"),
                short_id: "ab-cd".to_string(),
                state: "PROGRESS".to_string(),
                progress: Some("25.00%".to_string()),
                detail: Some("In progress".to_string()),
            }],
            completed: Vec::new(),
            failed: Vec::new(),
        };
        let text = render_tasks(&tasks);
        assert!(text.contains("== In Progress (1)"));
        assert!(text.contains("ab-cd PROGRESS 25.00% - In progress"));
        assert!(text.contains("== Failed (0)"));
    }
}
