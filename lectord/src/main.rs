//! # Lector Daemon
//!
//! Main entry point for the reader.

use clap::Parser;
use lectord::{ExitReason, LectorRuntime, RuntimeError};
use services_bindings::{load_config, KeyBindingTable};
use services_screen::ScreenDriver;
use services_settings::ReaderSettings;
use services_speech::{SynthEvent, Synthesizer};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(name = "lectord", version, about = "Speech command daemon for console screen reading")]
struct Args {
    /// Key bindings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Event script for the simulated console
    #[arg(long, required_unless_present = "check")]
    script: Option<PathBuf>,

    /// Compile the bindings file, print diagnostics and bound keys, and exit
    #[arg(long)]
    check: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let settings = load_settings(&args).unwrap_or_else(|e| {
        log::error!("{}", e);
        process::exit(1);
    });

    if args.check {
        check_bindings(&settings);
        return;
    }

    if let Err(e) = run(&args, settings) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn load_settings(args: &Args) -> Result<ReaderSettings, RuntimeError> {
    let mut settings = match &args.settings {
        Some(path) => ReaderSettings::load(path)?,
        None => ReaderSettings::default(),
    };
    if let Some(config) = &args.config {
        settings.config_path = config.clone();
    }
    Ok(settings)
}

fn check_bindings(settings: &ReaderSettings) {
    let mut table = KeyBindingTable::new();
    let diagnostics = load_config(&settings.config_path, &mut table);
    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic);
    }

    let report = serde_json::json!({
        "config": settings.config_path.display().to_string(),
        "errors": diagnostics.len(),
        "bindings": table.entries(),
    });
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("cannot render bindings: {}", e),
    }
}

/// Runs startup; each diagnostic was already logged by the loader
fn start<D: ScreenDriver, S: Synthesizer>(runtime: &mut LectorRuntime<D, S>) {
    let diagnostics = runtime.startup();
    if !diagnostics.is_empty() {
        log::info!("bindings loaded with {} errors", diagnostics.len());
    }
}

fn run(args: &Args, settings: ReaderSettings) -> Result<(), RuntimeError> {
    let Some(script_path) = &args.script else {
        return Ok(());
    };
    let script = fs::read_to_string(script_path)?;

    let restart_delay = settings.restart_delay();
    let mut runtime = LectorRuntime::from_script(settings, &script)?;
    start(&mut runtime);

    while runtime.run() == ExitReason::Restart {
        std::thread::sleep(restart_delay);
        runtime = runtime.restarted();
        start(&mut runtime);
    }

    log::info!("event script finished after {} steps", runtime.step_count());
    for event in runtime.reader().synth().events() {
        match event {
            SynthEvent::Say(text) => println!("say   {}", text),
            SynthEvent::Tone(tone) => println!("tone  {:?}", tone),
            SynthEvent::Shutup => println!("shutup"),
        }
    }
    Ok(())
}
