mod cli;
mod command;
mod config;
mod input;
mod ui;

use anyhow::Result;
use clap::Parser;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use cli::Cli;
use config::Config;
use ui::{MenuCallback, TrayApp};

/// Menu callback implementation: selections go to standard output, which is
/// the whole point of the program.
struct StdoutCallback;

impl MenuCallback for StdoutCallback {
    fn on_item_selected(&self, id: &str) {
        // Protocol output, never routed through the logger.
        println!("{}", id);
    }

    fn on_quit(&self) {
        log::info!("Quit menu item selected, exiting");
        #[cfg(target_os = "linux")]
        {
            gtk::main_quit();
        }
        #[cfg(not(target_os = "linux"))]
        {
            std::process::exit(0);
        }
    }
}

/// Parse and apply one protocol line, reporting failures without stopping.
fn apply_line(tray_app: &mut TrayApp, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    match command::parse(line) {
        Ok(cmd) => {
            if let Err(e) = tray_app.apply(cmd) {
                log::error!("{:#}", e);
            }
        }
        Err(e) => log::error!("{:#}", e),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting tray-control");

    // Initialize GTK on Linux (required by tray-icon)
    #[cfg(target_os = "linux")]
    {
        if let Err(e) = gtk::init() {
            anyhow::bail!("Failed to initialize GTK: {}", e);
        }
        log::info!("GTK initialized successfully");
    }

    // Load configuration
    let config = Config::load()?;

    // Create async runtime for the standard input reader
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    // Commands cross from the reader task to this thread, which owns the tray
    let (command_tx, command_rx) = mpsc::channel();
    if !cli.no_stdin {
        runtime.spawn(input::read_commands(command_tx));
    }

    // Create the tray and apply startup commands: configuration defaults
    // first, then the command line
    let callback = Arc::new(StdoutCallback);
    let mut tray_app = TrayApp::new(callback)?;

    for line in config.startup_commands().iter().chain(cli.commands.iter()) {
        apply_line(&mut tray_app, line);
    }

    log::info!("System tray started");

    // Event loop processing queued commands and menu events
    #[cfg(target_os = "linux")]
    {
        // On Linux the tray icon only works from GTK's main loop
        use std::cell::RefCell;
        use std::rc::Rc;

        let tray_app = Rc::new(RefCell::new(tray_app));
        let tray_app_tick = Rc::clone(&tray_app);

        glib::timeout_add_local(Duration::from_millis(100), move || {
            let mut app = tray_app_tick.borrow_mut();
            while let Ok(cmd) = command_rx.try_recv() {
                if let Err(e) = app.apply(cmd) {
                    log::error!("{:#}", e);
                }
            }
            app.process_events();
            glib::ControlFlow::Continue
        });

        log::info!("Starting GTK main loop");
        gtk::main();

        // The reader may be parked in a blocking read of stdin; don't wait
        // for it on shutdown.
        runtime.shutdown_background();
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    {
        // On other platforms, use simple polling loop
        loop {
            while let Ok(cmd) = command_rx.try_recv() {
                if let Err(e) = tray_app.apply(cmd) {
                    log::error!("{:#}", e);
                }
            }
            tray_app.process_events();

            std::thread::sleep(Duration::from_millis(100));
        }
    }
}
