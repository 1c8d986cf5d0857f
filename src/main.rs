//! ucap main entry point
//!
//! The event loop watches two sources:
//! 1. stdin (keystrokes, terminal in raw mode) - fed to the key handlers
//! 2. the engine event channel - utterance completion and failure signals
//!
//! Engine events arrive from callback and reaper threads, but they are
//! only applied here, between keystrokes, so all session state stays
//! single-threaded.

use log::{debug, error, info, warn};
use mio::{Events, Interest, Poll, Token};
use nix::libc;
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};
use std::process;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;
use ucap::input::{create_default_keymap, DefaultKeyHandler, HandlerAction};
use ucap::speech::{create_engine, is_wsl, BackendChoice, EngineEvent, EventSender};
use ucap::state::config::Config;
use ucap::state::State;
use ucap::terminal::{restore_termios, set_raw_mode};
use ucap::{ui, Result};

/// Token for stdin in mio poll
const STDIN: Token = Token(0);

/// One poll tick; engine events are drained at least this often.
const TICK: Duration = Duration::from_millis(100);

/// Parsed command line
struct CliArgs {
    debug: bool,
    backend: Option<String>,
    list_voices: bool,
}

fn main() {
    let args = parse_args();

    // Initialize logger
    if args.debug {
        // Debug mode: write to ucap.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("ucap.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open ucap.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "ucap version {} starting (debug mode, logging to ucap.log)",
            ucap::VERSION
        );
    } else {
        // Normal mode: minimal logging to stderr, only errors
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    if let Err(e) = run(args) {
        error!("Fatal error: {}", e);
        process::exit(1);
    }
}

fn parse_args() -> CliArgs {
    let mut parsed = CliArgs {
        debug: false,
        backend: None,
        list_voices: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" | "-d" => parsed.debug = true,
            "--backend" => parsed.backend = args.next(),
            "--list-voices" => parsed.list_voices = true,
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("unknown option: {}", other);
                print_usage();
                process::exit(1);
            }
        }
    }
    parsed
}

fn print_usage() {
    println!("ucap {} - terminal speech scratchpad", ucap::VERSION);
    println!();
    println!("Usage: ucap [options]");
    println!("  --backend <auto|native|espeak>   speech backend (default from config)");
    println!("  --list-voices                    print the voice table and exit");
    println!("  --debug, -d                      verbose logging to ucap.log");
    println!("  --help, -h                       this message");
}

fn run(args: CliArgs) -> Result<()> {
    debug!("Initializing ucap");

    let config = Config::load()?;

    // CLI beats the config file for the backend choice
    let choice = match args.backend.as_deref() {
        Some(value) => BackendChoice::parse(value),
        None => BackendChoice::parse(&config.backend()),
    };

    let (events_tx, events_rx) = mpsc::channel();

    if args.list_voices {
        return list_voices(choice, &config, events_tx);
    }

    // The scratchpad needs an interactive terminal
    let stdin_fd = io::stdin().as_raw_fd();
    if unsafe { libc::isatty(stdin_fd) } == 0 {
        eprintln!("Error: ucap needs an interactive terminal (stdin is not a TTY)");
        eprintln!("Run it directly in a terminal, not through pipes or redirects");
        process::exit(1);
    }

    // A missing engine is not fatal; the scratchpad opens anyway and
    // speech keys surface a notice instead
    let engine = match create_engine(events_tx, choice) {
        Ok(engine) => Some(engine),
        Err(e) => {
            error!("no speech engine: {}", e);
            None
        }
    };

    // Raw mode lets the key handlers see every keystroke including Esc
    // and Ctrl+C; the guard restores the terminal on every exit path
    let original_termios = set_raw_mode(stdin_fd)?;
    let _guard = TermiosGuard {
        fd: stdin_fd,
        termios: original_termios,
    };

    let mut state = State::new(config, engine);
    if let Err(e) = state.controller.refresh_voices() {
        warn!("could not read the voice list: {}", e);
    }

    let keymap = create_default_keymap();
    info!("Key handler initialized with {} bindings", keymap.len());
    let mut default_handler = DefaultKeyHandler::new(keymap);

    // WSL doesn't support epoll on TTY file descriptors, so use select()
    let use_select = is_wsl();

    let mut mio_poll = if !use_select {
        debug!("Using mio::Poll for event loop");
        let poll = Poll::new()?;

        let mut stdin_source = mio::unix::SourceFd(&stdin_fd);
        poll.registry()
            .register(&mut stdin_source, STDIN, Interest::READABLE)?;

        Some((poll, Events::with_capacity(128)))
    } else {
        debug!("Using select() for event loop (WSL mode)");
        None
    };

    info!("ucap ready - entering event loop");

    ui::print_line(&format!("ucap {} - terminal speech scratchpad", ucap::VERSION));
    match state.controller.engine_name() {
        Some(name) => {
            ui::print_line(&format!(
                "engine {}; {} voices",
                name,
                state.controller.catalog().len()
            ));
            if let Some(voice) = state.controller.catalog().selected() {
                ui::print_line(&format!("voice: {}", voice.label()));
            }
        }
        None => ui::print_line(ui::UNSUPPORTED_NOTICE),
    }
    ui::print_line("type, then press enter to hear it. alt+/ lists the keys.");
    state.redraw_prompt();

    // Main event loop: keystrokes move session state, engine events
    // settle it back to idle when an utterance ends
    loop {
        if use_select {
            // WSL mode: select() for I/O monitoring
            use nix::sys::select::{select, FdSet};
            use nix::sys::time::{TimeVal, TimeValLike};
            use std::os::unix::io::BorrowedFd;

            // Rebuild the FdSet each iteration (select() modifies it)
            let stdin_borrowed = unsafe { BorrowedFd::borrow_raw(stdin_fd) };
            let mut read_fds = FdSet::new();
            read_fds.insert(stdin_borrowed);

            let mut timeout = TimeVal::milliseconds(TICK.as_millis() as i64);

            match select(None, Some(&mut read_fds), None, None, Some(&mut timeout)) {
                Ok(_n) => {
                    if read_fds.contains(stdin_borrowed) {
                        if let Err(e) = handle_stdin(&mut state, &mut default_handler) {
                            error!("stdin error: {}", e);
                            state.request_quit();
                        }
                    }
                }
                Err(nix::errno::Errno::EINTR) => {
                    debug!("select() interrupted by signal");
                }
                Err(e) => {
                    error!("select() error: {:?}", e);
                    return Err(io::Error::from_raw_os_error(e as i32).into());
                }
            }
        } else if let Some((ref mut poll, ref mut events)) = mio_poll {
            poll.poll(events, Some(TICK))?;

            for event in events.iter() {
                if event.token() == STDIN {
                    if let Err(e) = handle_stdin(&mut state, &mut default_handler) {
                        error!("stdin error: {}", e);
                        state.request_quit();
                    }
                }
            }
        }

        drain_engine_events(&events_rx, &mut state);

        if state.quit {
            break;
        }
    }

    info!("ucap exiting");
    if let Err(e) = state.controller.stop() {
        warn!("stop on exit failed: {}", e);
    }
    ui::print_line("bye");
    Ok(())
}

/// Apply every engine signal waiting on the channel.
fn drain_engine_events(events_rx: &Receiver<EngineEvent>, state: &mut State) {
    while let Ok(event) = events_rx.try_recv() {
        if let Err(e) = state.apply_engine_event(event) {
            error!("engine event error: {}", e);
        }
    }
}

/// Handle user input from stdin
///
/// Keys go to the active modal handler if one is on the stack, else to
/// the default scratchpad bindings.
fn handle_stdin(state: &mut State, default_handler: &mut DefaultKeyHandler) -> Result<()> {
    let mut buf = [0u8; 4096];

    let n = io::stdin().read(&mut buf)?;
    if n == 0 {
        return Ok(());
    }

    let input = &buf[..n];

    if !state.handlers.is_empty() {
        // Temporarily pop the handler to avoid borrow checker issues;
        // it goes back unless it asked to be removed
        if let Some(mut handler) = state.handlers.pop() {
            let action = handler.process(input, state)?;

            match action {
                HandlerAction::Passthrough => {
                    state.handlers.push(handler);
                    default_handler.process_key(input, state)?;
                }
                HandlerAction::Remove => {}
                HandlerAction::Handled => {
                    state.handlers.push(handler);
                }
            }
        }
        return Ok(());
    }

    default_handler.process_key(input, state)?;
    Ok(())
}

/// Print the voice table for --list-voices and exit.
///
/// Runs before the terminal goes raw, so plain println is fine here.
fn list_voices(choice: BackendChoice, config: &Config, events_tx: EventSender) -> Result<()> {
    let mut engine = create_engine(events_tx, choice)?;
    let voices = engine.voices()?;
    if voices.is_empty() {
        println!("no voices reported by {}", engine.name());
        return Ok(());
    }

    let preferred = config.preferred_lang();
    println!(
        "voices from {} (* matches preferred language '{}'):",
        engine.name(),
        preferred
    );
    for (i, voice) in voices.iter().enumerate() {
        let marker = if voice.lang.starts_with(&preferred) {
            '*'
        } else {
            ' '
        };
        match ui::language_name(&voice.lang) {
            Some(name) => println!("{}{:>3}. {} ({})", marker, i + 1, voice.label(), name),
            None => println!("{}{:>3}. {}", marker, i + 1, voice.label()),
        }
    }
    Ok(())
}

/// RAII guard to restore the terminal on exit
///
/// The terminal returns to cooked mode even when run() errors out
struct TermiosGuard {
    fd: RawFd,
    termios: libc::termios,
}

impl Drop for TermiosGuard {
    fn drop(&mut self) {
        restore_termios(self.fd, &self.termios);
        debug!("Terminal attributes restored");
    }
}
