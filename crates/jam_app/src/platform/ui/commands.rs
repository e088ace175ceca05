//! Line commands typed into the terminal, standing in for toolbar clicks
//! and table checkbox events.

use jam_core::{AppState, Msg, RecordId, TaskId};

pub const HELP: &str = "\
commands:
  collections            reload the collection list
  open <n>               view the n-th collection
  page <n> [size]        go to page n (1-based), optionally changing page size
  check <id..>           tick rows on the visible page
  uncheck <id..>         untick rows on the visible page
  deselect               clear the whole selection
  add | remove           add/remove the selection to/from the target collection
  add-all                add the whole viewed collection to the target collection
  clear                  remove every company from the viewed collection
  tasks                  show the task board
  dismiss <task>         remove a task from the board (full or short id)
  dismiss-finished       remove every finished task from the board
  show                   redraw the dashboard
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Collections,
    Open(usize),
    Page { page: u64, size: Option<u64> },
    Check(Vec<RecordId>),
    Uncheck(Vec<RecordId>),
    Deselect,
    Add,
    Remove,
    AddAll,
    Clear,
    Tasks,
    Dismiss(String),
    DismissFinished,
    Show,
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<&str> = words.collect();

    let command = match head {
        "collections" => Command::Collections,
        "open" => {
            let n = single_number(&rest)?;
            Command::Open(usize::try_from(n).map_err(|_| format!("{n} is out of range"))?)
        }
        "page" => match rest.as_slice() {
            [page] => Command::Page {
                page: number(page)?,
                size: None,
            },
            [page, size] => Command::Page {
                page: number(page)?,
                size: Some(number(size)?),
            },
            _ => return Err("usage: page <n> [size]".to_string()),
        },
        "check" => Command::Check(numbers(&rest)?),
        "uncheck" => Command::Uncheck(numbers(&rest)?),
        "deselect" => Command::Deselect,
        "add" => Command::Add,
        "remove" => Command::Remove,
        "add-all" => Command::AddAll,
        "clear" => Command::Clear,
        "tasks" => Command::Tasks,
        "dismiss" => match rest.as_slice() {
            [task] => Command::Dismiss(task.to_string()),
            _ => return Err("usage: dismiss <task>".to_string()),
        },
        "dismiss-finished" => Command::DismissFinished,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command {other:?}, try help")),
    };
    Ok(command)
}

/// Turns a command into a core message. Checkbox commands are expanded into
/// the full visible-row report a table widget would send.
pub fn to_msg(command: &Command, state: &AppState) -> Option<Msg> {
    let window = state.window();
    match command {
        Command::Collections => Some(Msg::CollectionsRequested),
        Command::Open(n) => {
            let view = state.view();
            let index = n.checked_sub(1)?;
            view.collections
                .get(index)
                .map(|row| Msg::CollectionSelected(row.id.clone()))
        }
        Command::Page { page, size } => {
            let page_size = size.unwrap_or(window.page_size);
            let offset = page.saturating_sub(1).saturating_mul(page_size);
            Some(Msg::PageChanged { offset, page_size })
        }
        Command::Check(ids) => {
            let mut visible = state.selection().in_window(window);
            visible.extend(ids.iter().copied().filter(|id| window.contains(*id)));
            Some(Msg::PageSelectionChanged(visible))
        }
        Command::Uncheck(ids) => {
            let visible = state
                .selection()
                .in_window(window)
                .into_iter()
                .filter(|id| !ids.contains(id))
                .collect();
            Some(Msg::PageSelectionChanged(visible))
        }
        Command::Deselect => Some(Msg::DeselectAllClicked),
        Command::Add => Some(Msg::ModifyClicked(jam_core::MutationAction::Add)),
        Command::Remove => Some(Msg::ModifyClicked(jam_core::MutationAction::Remove)),
        Command::AddAll => Some(Msg::SelectAllClicked),
        Command::Clear => Some(Msg::ClearCollectionClicked),
        Command::Dismiss(needle) => find_task(state, needle).map(Msg::TaskDismissed),
        Command::DismissFinished => Some(Msg::DismissFinishedClicked),
        Command::Quit => Some(Msg::Shutdown),
        Command::Tasks | Command::Show | Command::Help => None,
    }
}

fn find_task(state: &AppState, needle: &str) -> Option<TaskId> {
    state
        .tracker()
        .task_ids()
        .iter()
        .find(|id| id.as_str() == needle || id.short() == needle)
        .cloned()
}

fn number(word: &str) -> Result<u64, String> {
    word.parse()
        .map_err(|_| format!("{word:?} is not a non-negative number"))
}

fn numbers(words: &[&str]) -> Result<Vec<u64>, String> {
    if words.is_empty() {
        return Err("expected at least one id".to_string());
    }
    words.iter().map(|word| number(word)).collect()
}

fn single_number(words: &[&str]) -> Result<u64, String> {
    match words {
        [word] => number(word),
        _ => Err("expected exactly one number".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use jam_core::{update, AppState, CollectionId, CollectionMeta, Msg};

    use super::{parse, to_msg, Command};

    fn viewing_list() -> AppState {
        let (state, _) = update(
            AppState::new(),
            Msg::CollectionsLoaded(vec![
                CollectionMeta {
                    id: CollectionId::new("all"),
                    name: "My List".to_string(),
                },
                CollectionMeta {
                    id: CollectionId::new("liked"),
                    name: "Liked Companies".to_string(),
                },
            ]),
        );
        state
    }

    #[test]
    fn parses_page_with_optional_size() {
        assert_eq!(
            parse("page 3").unwrap(),
            Command::Page {
                page: 3,
                size: None
            }
        );
        assert_eq!(
            parse("  page 2 50 ").unwrap(),
            Command::Page {
                page: 2,
                size: Some(50)
            }
        );
        assert!(parse("page").is_err());
        assert!(parse("page x").is_err());
    }

    #[test]
    fn rejects_unknown_and_empty_input() {
        assert!(parse("").is_err());
        assert!(parse("frobnicate").is_err());
        assert!(parse("check").is_err());
        assert!(parse("open").is_err());
        assert!(parse("open -1").is_err());
    }

    #[test]
    fn parses_collection_position() {
        assert_eq!(parse("open 2").unwrap(), Command::Open(2));
    }

    #[test]
    fn page_numbers_are_one_based() {
        let state = viewing_list();
        assert_eq!(
            to_msg(
                &Command::Page {
                    page: 2,
                    size: None
                },
                &state
            ),
            Some(Msg::PageChanged {
                offset: 25,
                page_size: 25
            })
        );
    }

    #[test]
    fn check_reports_whole_visible_selection() {
        let state = viewing_list();
        let (state, _) = update(state, Msg::PageSelectionChanged(vec![2]));
        assert_eq!(
            to_msg(&Command::Check(vec![5, 99]), &state),
            Some(Msg::PageSelectionChanged(vec![2, 5]))
        );
        assert_eq!(
            to_msg(&Command::Uncheck(vec![2]), &state),
            Some(Msg::PageSelectionChanged(Vec::new()))
        );
    }

    #[test]
    fn open_picks_collection_by_position() {
        let state = viewing_list();
        assert_eq!(
            to_msg(&Command::Open(2), &state),
            Some(Msg::CollectionSelected(CollectionId::new("liked")))
        );
        assert_eq!(to_msg(&Command::Open(0), &state), None);
        assert_eq!(to_msg(&Command::Open(9), &state), None);
    }
}
