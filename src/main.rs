mod app;
mod config;
mod picker;
mod pump;
mod ui;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use anyhow::Context as _;
use clap::Parser;
use ratatui::DefaultTerminal;

use crate::app::TimerApp;
use crate::config::AppConfig;
use crate::pump::{input_thread, pump_thread, AppOp, Pump, Ticktimer};

/// Countdown timer with an animated wave fill.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Config file [default: <config dir>/wavetimer/config.toml]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log file [default: <cache dir>/wavetimer/wavetimer.log]
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Frames per second while the wave is on screen
    #[arg(long)]
    fps: Option<u32>,

    /// Preset the selector starts on, in seconds
    #[arg(long, value_name = "SECONDS")]
    preset: Option<u32>,
}

/// Log to a file so output never lands on the terminal. No file, no logs.
fn init_logging(path: Option<&Path>) {
    let Some(path) = path.map(Path::to_path_buf).or_else(config::default_log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .write_style(env_logger::WriteStyle::Never)
        .init();
    log::info!("logging to {}", path.display());
}

fn run(
    terminal: &mut DefaultTerminal,
    app: &mut TimerApp,
    rx: &Receiver<AppOp>,
    tt: &Ticktimer,
) -> anyhow::Result<()> {
    terminal.draw(|f| ui::draw(f, app, tt.elapsed_ms()))?;

    while !app.should_quit {
        let Ok(first) = rx.recv() else {
            log::warn!("message channel closed");
            break;
        };

        // Drain whatever queued up behind it so a slow frame never builds a backlog
        let mut redraw = false;
        for msg in std::iter::once(first).chain(rx.try_iter()) {
            let now = tt.elapsed_ms();
            match msg {
                AppOp::Pump => {
                    app.handle_pump(now);
                    redraw = true;
                }
                AppOp::Key(key) => {
                    app.handle_key(key, now);
                    redraw = true;
                }
                AppOp::Redraw => redraw = true,
                AppOp::Quit => app.should_quit = true,
            }
        }

        if redraw && !app.should_quit {
            let now = tt.elapsed_ms();
            terminal.draw(|f| ui::draw(f, app, now))?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref());
    log::info!("wavetimer {} starting", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load_or_default(args.config.as_deref());
    config
        .apply_overrides(args.fps, args.preset)
        .context("invalid command line")?;
    log::debug!("config: {:?}", config);

    let (main_conn, rx) = mpsc::channel();
    let (pump_conn, pump_rx) = mpsc::channel();

    let pump_main = main_conn.clone();
    let pump_join = thread::spawn(move || pump_thread(pump_rx, pump_main));

    let stop = Arc::new(AtomicBool::new(false));
    let input_join = {
        let stop = stop.clone();
        thread::spawn(move || input_thread(stop, main_conn))
    };

    let tt = Ticktimer::new();
    let interval_ms = config.frame_interval_ms();
    let mut app = TimerApp::new(config, Pump::new(pump_conn, interval_ms), tt.elapsed_ms());

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut app, &rx, &tt);
    ratatui::restore();

    // Clean up
    app.shutdown();
    stop.store(true, Ordering::Release);
    drop(rx);
    if pump_join.join().is_err() {
        log::error!("pump thread panicked");
    }
    if input_join.join().is_err() {
        log::error!("input thread panicked");
    }

    if let Err(e) = &result {
        log::error!("exiting with error: {:#}", e);
    } else {
        log::info!("wavetimer exiting");
    }
    result
}
