use clap::{Parser, Subcommand};
use relm4::prelude::*;
use rota::config;
use rota::events::AppEvent;
use rota::gui::app::AppModel;
use rota::gui::painter::PixbufLoader;
use rota::gui::wheel::WheelState;
use rota::sys::{SOCKET_PATH, runtime};
use rota_core::history::{FileStore, KeyValueStore, MemoryStore};
use std::io::Write;
use std::os::unix::net::UnixStream;

#[derive(Parser, Debug)]
#[command(name = "rota", version, about = "A spinning wheel picker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Spin the wheel of the running instance
    Spin,
    /// Forget all past outcomes
    ClearHistory,
    /// Re-read the config file
    Reload,
    /// Write the default config if missing and print its path
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Spin) => send_command(AppEvent::Spin),
        Some(Commands::ClearHistory) => send_command(AppEvent::ClearHistory),
        Some(Commands::Reload) => send_command(AppEvent::ConfigReload),
        Some(Commands::InitConfig) => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
        None => {
            run_gui();
            Ok(())
        }
    }
}

fn run_gui() {
    let config = config::load_or_setup();

    let store: Box<dyn KeyValueStore> = match FileStore::in_data_dir() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("History will not be persisted: {}", e);
            Box::new(MemoryStore::default())
        }
    };
    let state = WheelState::new(&config, store);
    let loader = PixbufLoader::new(config::get_config_dir().unwrap_or_default());

    let (tx, rx) = async_channel::bounded(32);

    runtime::start_background_services(tx);

    let app = RelmApp::new("org.rota.rota");

    app.run::<AppModel>((state, loader, rx));
}

fn send_command(event: AppEvent) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to rota at {}: {}. Is rota running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", event.as_command())?;
    Ok(())
}
