use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use codewall_core::{update, AppState, Msg};
use codewall_engine::display::Display;
use codewall_engine::{ensure_output_dir, AtomicFileWriter, EngineEvent, EngineHandle};
use engine_logging::{engine_error, engine_info};

use super::effects::EffectRunner;
use super::page::{render_page, PAGE_FILE};
use super::ui::commands::{bootstrap_messages, parse_line, Command, HELP};
use super::ui::render::status_lines;
use super::{animation, config, logging};

/// Everything the main loop reacts to, funneled through one channel.
pub enum Inbound {
    Line(String),
    InputClosed,
    Engine(EngineEvent),
    Msg(Msg),
}

pub fn run_app() -> anyhow::Result<()> {
    let config = config::load()?;
    logging::initialize(config.log);
    engine_info!("codewall starting with {:?}", config);

    ensure_output_dir(&config.output_dir)
        .with_context(|| format!("cannot use output dir {}", config.output_dir.display()))?;
    let writer = AtomicFileWriter::new(config.output_dir.clone());

    let (inbound_tx, inbound_rx) = mpsc::channel::<Inbound>();

    let engine = EngineHandle::new(config.engine_config());
    if !engine.display_available() {
        println!("Display unavailable; content will be shown as markup only.");
    }
    let display = Display::shared(config.viewport());
    let runner = EffectRunner::new(engine, display.clone(), inbound_tx.clone());
    animation::spawn(display, writer.clone(), config.frame_interval());

    spawn_stdin_reader(inbound_tx.clone());

    // Background tick to throttle page writes and status output.
    let tick_tx = inbound_tx;
    thread::spawn(move || {
        let interval = Duration::from_millis(75);
        while tick_tx.send(Inbound::Msg(Msg::Tick)).is_ok() {
            thread::sleep(interval);
        }
    });

    let state = AppState::new()
        .with_permalink_base(config.permalink_base.clone())
        .with_viewport(config.viewport());
    let mut app = App {
        state,
        runner,
        writer,
        needs_publish: true,
    };

    println!("codewall: writing {} to {}", PAGE_FILE, config.output_dir.display());
    println!("Type `help` for commands.");

    if let Some(arg) = std::env::args().nth(1) {
        for msg in bootstrap_messages(&arg) {
            app.dispatch(msg);
        }
    }

    while let Ok(inbound) = inbound_rx.recv() {
        match inbound {
            Inbound::Line(line) => match parse_line(&line) {
                Ok(Some(Command::Dispatch(msgs))) => {
                    for msg in msgs {
                        app.dispatch(msg);
                    }
                }
                Ok(Some(Command::Permalink)) => match app.state.view().permalink {
                    Some(link) => println!("{link}"),
                    None => println!("No permalink yet; open a URL first."),
                },
                Ok(Some(Command::Help)) => println!("{HELP}"),
                Ok(Some(Command::Quit)) => break,
                Ok(None) => {}
                Err(err) => println!("{err}"),
            },
            Inbound::InputClosed => {
                // Keep serving the display until interrupted.
                engine_info!("Console input closed");
            }
            Inbound::Engine(event) => {
                let msg = app.runner.handle_event(event);
                app.dispatch(msg);
            }
            Inbound::Msg(Msg::Tick) => app.publish_if_needed(),
            Inbound::Msg(msg) => app.dispatch(msg),
        }
    }

    app.publish_if_needed();
    engine_info!("codewall exiting");
    Ok(())
}

fn spawn_stdin_reader(tx: mpsc::Sender<Inbound>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(Inbound::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Inbound::InputClosed);
    });
}

struct App {
    state: AppState,
    runner: EffectRunner,
    writer: AtomicFileWriter,
    needs_publish: bool,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.needs_publish = true;
        }
        self.state = state;
        self.runner.run(effects);
    }

    /// Writes the page snapshot and prints the status once per batch of changes.
    fn publish_if_needed(&mut self) {
        if !std::mem::take(&mut self.needs_publish) {
            return;
        }
        let view = self.state.view();
        for line in status_lines(&view) {
            println!("{line}");
        }

        let generated_at = Local::now().to_rfc3339();
        let html = render_page(&view, self.runner.content(), &generated_at);
        if let Err(err) = self.writer.write(PAGE_FILE, html.as_bytes()) {
            engine_error!("Failed to write {}: {}", PAGE_FILE, err);
        }
    }
}
