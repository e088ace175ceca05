use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

use jam_core::{update, AppState, Msg};
use jam_logging::{jam_info, jam_warn};

use super::config;
use super::effects::EffectRunner;
use super::logging;
use super::ui;
use super::ui::commands::Command;

/// Everything the main loop reacts to: core messages from the engine and
/// parsed lines from the terminal.
pub enum AppEvent {
    Msg(Msg),
    Input(Command),
}

pub fn run_app() -> anyhow::Result<()> {
    let config = config::load()?;
    logging::initialize(config.log_destination, config.log_level_filter()?);
    jam_info!(
        "Starting dashboard base_url={} poll_interval_secs={}",
        config.base_url,
        config.poll_interval_secs
    );

    let (tx, rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(&config, tx.clone())?;
    spawn_stdin_reader(tx)?;

    println!("{}", ui::commands::HELP);
    let mut app = App {
        state: AppState::with_settings(config.core_settings()),
        runner,
    };
    app.dispatch(Msg::CollectionsRequested);

    while let Ok(event) = rx.recv() {
        match event {
            AppEvent::Msg(msg) => app.dispatch(msg),
            AppEvent::Input(Command::Quit) => {
                app.dispatch(Msg::Shutdown);
                break;
            }
            AppEvent::Input(command) => app.handle_command(&command),
        }
    }

    jam_info!("Shutting down");
    app.runner.shutdown();
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
        if was_dirty {
            ui::render::print(&self.state.view());
        }
    }

    fn handle_command(&mut self, command: &Command) {
        match command {
            Command::Help => println!("{}", ui::commands::HELP),
            Command::Show => ui::render::print(&self.state.view()),
            Command::Tasks => ui::render::print_tasks(&self.state.tracker().groups()),
            _ => match ui::commands::to_msg(command, &self.state) {
                Some(msg) => self.dispatch(msg),
                None => println!("nothing to do for {command:?}"),
            },
        }
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("jam-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match ui::commands::parse(&line) {
                    Ok(command) => {
                        if tx.send(AppEvent::Input(command)).is_err() {
                            return;
                        }
                    }
                    Err(message) => {
                        jam_warn!("Rejected input {:?}: {}", line, message);
                        println!("{message}");
                    }
                }
            }
            let _ = tx.send(AppEvent::Input(Command::Quit));
        })?;
    Ok(())
}
