use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use chrono::Utc;
use feed_core::{update, AppState, Effect, Msg, Operation};
use feed_engine::EngineHandle;
use feed_logging::{feed_debug, feed_info};

use super::console::{self, Command, HELP};
use super::effects::EffectRunner;
use super::logging;
use super::persistence::SettingsStore;

/// Everything the main loop reacts to.
pub enum Input {
    Console(Command),
    Engine(Msg),
    ConsoleClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let dir = std::env::current_dir().context("cannot determine working directory")?;
    logging::initialize(logging::destination_from_env(), &dir);

    let store = SettingsStore::in_dir(&dir);
    let settings = store.load();
    let engine = EngineHandle::new(settings.engine_config())
        .with_context(|| format!("cannot reach instance '{}'", settings.instance_url))?;
    feed_info!("Reader started against {}", settings.instance_url);

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let mut app = ConsoleApp {
        state: AppState::with_config(settings.feed),
        runner: EffectRunner::start(engine, store, settings, input_tx.clone()),
    };
    spawn_console_reader(input_tx);

    println!("{HELP}");
    println!("{}", console::render_status(&app.state.view()));
    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Console(Command::Quit) | Input::ConsoleClosed => break,
            Input::Console(Command::Help) => println!("{HELP}"),
            Input::Console(Command::Show) => {
                println!("{}", console::render_status(&app.state.view()))
            }
            Input::Console(Command::Feed(msg)) | Input::Engine(msg) => app.dispatch(msg),
        }
    }

    app.runner.shutdown();
    feed_info!("Reader stopped");
    Ok(())
}

/// Sole owner of [`AppState`]; every message goes through here.
struct ConsoleApp {
    state: AppState,
    runner: EffectRunner,
}

impl ConsoleApp {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        feed_logging::set_store_generation(self.state.view().generation);

        for effect in self.runner.run(effects) {
            self.present(effect);
        }

        if self.state.consume_dirty() {
            feed_debug!("{}", console::render_status(&self.state.view()));
        }
    }

    fn present(&mut self, effect: Effect) {
        match effect {
            Effect::PostsReady => {
                let ids = self.state.consume_last_added_posts();
                let now = Utc::now();
                for row in self.state.post_rows(&ids) {
                    println!("{}", console::render_post_row(&row, now));
                }
            }
            Effect::OperationFinished { operation, result } => {
                if let Some(line) = console::render_outcome(operation, &result) {
                    println!("{line}");
                    return;
                }
                if let Operation::Comments { post_id } = operation {
                    match self.state.comments(post_id) {
                        Some(forest) if !forest.is_empty() => {
                            print!("{}", console::render_forest(forest))
                        }
                        _ => println!("post {post_id} has no comments"),
                    }
                }
            }
            _ => {}
        }
    }
}

fn spawn_console_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match console::parse_command(&line) {
                Ok(Some(command)) => {
                    let quit = command == Command::Quit;
                    if input_tx.send(Input::Console(command)).is_err() || quit {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => eprintln!("{err}"),
            }
        }
        let _ = input_tx.send(Input::ConsoleClosed);
    });
}
