#![warn(clippy::all, clippy::pedantic)]

use std::fs::OpenOptions;
use std::io;
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, error, info, warn};
use ratatui::{Terminal, prelude::*};

use twin_arcade::Time;
use twin_arcade::app::{App, AppResult};
use twin_arcade::config::Config;
use twin_arcade::driving::FRAME_DURATION;
use twin_arcade::ui;

const LOG_PATH: &str = "twin-arcade.log";

// Screen refresh, ~30 FPS
const RENDER_RATE: Duration = Duration::from_millis(33);
// Configuration and other housekeeping
const HOUSEKEEPING_RATE: Duration = Duration::from_millis(500);

fn init_logging() -> AppResult<()> {
    // The terminal owns stdout and stderr while the game runs, so log to a file
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(LOG_PATH)?;

    let stderr_fd = io::stderr().as_raw_fd();
    let log_file_fd = log_file.as_raw_fd();

    // Safety: both descriptors are open; dup2 makes stderr refer to the log file
    let result = unsafe { libc::dup2(log_file_fd, stderr_fd) };
    if result < 0 {
        return Err(io::Error::last_os_error().into());
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    Ok(())
}

fn main() -> AppResult<()> {
    init_logging()?;
    info!("Starting twin-arcade");

    let config = Config::init();

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(&config);
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Game error: {err:?}");
        return Err(err);
    }

    info!("Exiting");
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> AppResult<()> {
    let mut time = Time::new();
    let mut last_render = Instant::now()
        .checked_sub(RENDER_RATE)
        .unwrap_or_else(Instant::now);
    let mut last_housekeeping = Instant::now();
    let mut audio_warned = false;

    // Drop anything typed before the game started
    while event::poll(Duration::ZERO)? {
        let _ = event::read()?;
    }

    debug!("Entering main loop");

    loop {
        if app.should_quit {
            return Ok(());
        }

        if last_render.elapsed() >= RENDER_RATE {
            terminal.draw(|f| ui::render(f, &mut app))?;
            last_render = Instant::now();
        }

        let elapsed = time.update();
        app.update(elapsed);

        if last_housekeeping.elapsed() >= HOUSEKEEPING_RATE {
            last_housekeeping = Instant::now();
            app.on_tick();

            if !app.audio.is_audio_available() && !audio_warned {
                warn!("Audio device is unavailable. Continuing without sound.");
                audio_warned = true;
            }
        }

        // Wait for input at most until the next simulation frame is due
        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }
}
