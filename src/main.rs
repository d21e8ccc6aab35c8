//! Seqtimer - count down a sequence of terminal timers
//! 
//! This is the main entry point for the seqtimer application.

use std::sync::Arc;
use anyhow::{bail, Context};
use crossterm::style::Stylize;
use tracing::{info, warn};

use seqtimer::{
    config::{Config, Mode},
    display::LiveTable,
    parser::parse_sequence,
    services::{substitute, templates::listing, AlarmPlayer, TemplateStore},
    state::{ControlState, StatusBoard},
    tasks::{await_acknowledgement, run_sequence, KeyboardListener},
    utils::interrupt_on_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("seqtimer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    let store = TemplateStore::new(config.template_path());

    match config.mode() {
        Mode::ListTemplates => list_templates(&store),
        Mode::SaveTemplate { name, raw } => save_template(&store, &name, &raw),
        Mode::Run { input } => run_timers(&config, &store, &input).await,
    }
}

fn list_templates(store: &TemplateStore) -> anyhow::Result<()> {
    let templates = store.load()?;
    if templates.is_empty() {
        println!("{}", "No templates found.".yellow());
        return Ok(());
    }

    println!("{}", "Available templates:".bold().underlined());
    for line in listing(&templates) {
        println!("{}", line);
    }
    Ok(())
}

fn save_template(store: &TemplateStore, name: &str, raw: &str) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        bail!("Template name is missing after --save-template");
    }

    store.save_one(name, raw)?;
    println!("{}", format!("Template {{{}}} saved.", name).green());
    Ok(())
}

async fn run_timers(config: &Config, store: &TemplateStore, input: &str) -> anyhow::Result<()> {
    if input.trim().is_empty() {
        bail!("Usage: seqtimer <time1>;<time2>;...  (see --help)");
    }

    let templates = store.load()?;
    let expanded = substitute(input, &templates);
    let specs = parse_sequence(&expanded).context("Error parsing timers")?;
    info!("Parsed {} timers", specs.len());

    let control = Arc::new(ControlState::new());
    let mut board = StatusBoard::new(&specs);

    let signal_task = tokio::spawn(interrupt_on_signal(Arc::clone(&control)));

    let keyboard = if config.no_keyboard {
        None
    } else {
        match KeyboardListener::spawn(Arc::clone(&control)) {
            Ok(listener) => Some(listener),
            Err(e) => {
                warn!("Keyboard controls unavailable: {}", e);
                None
            }
        }
    };

    let player = AlarmPlayer::new(config.ringtone_dir(), Arc::clone(&control));
    let mut table = LiveTable::stdout();

    run_sequence(&specs, &mut board, &control, &mut table, &player).await;
    await_acknowledgement(&board, &control, &mut table).await;

    if let Some(listener) = keyboard {
        listener.shutdown();
    }
    signal_task.abort();

    for notice in control.notices() {
        eprintln!("{}", notice.dark_yellow());
    }

    if control.is_interrupted() {
        println!("\n{}", "Interrupted".red().bold());
    } else if control.is_force_quit() {
        println!("{}", "Force quit.".red().bold());
    } else if control.is_alarm_stopped() {
        println!("{}", "Looping alarm stopped".red());
    }

    info!("Timer run complete");
    Ok(())
}
