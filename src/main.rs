use clap::Parser;

use winhotkeys::HotkeySpec;

/// Register global hotkeys and log every press.
#[derive(Parser)]
#[command(name = "winhotkeys", version)]
struct Args {
    /// Hotkeys to register, e.g. "ctrl+alt+k" or "win+norepeat+f5"
    #[arg(value_name = "HOTKEY")]
    hotkeys: Vec<HotkeySpec>,

    /// List visible top-level window titles and exit
    #[arg(long)]
    list_windows: bool,
}

fn main() {
    // Load .env file if present (for development convenience)
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_os = "windows")]
fn run(args: Args) -> Result<(), String> {
    use std::sync::Arc;

    use winhotkeys::platform::{self, WindowsBackend};
    use winhotkeys::HotkeyRegistry;

    if args.list_windows {
        for title in platform::list_window_titles()? {
            println!("{}", title);
        }
        return Ok(());
    }

    if args.hotkeys.is_empty() {
        return Err("no hotkeys given, try: winhotkeys ctrl+alt+k".to_string());
    }

    let registry = HotkeyRegistry::new(Arc::new(WindowsBackend));
    for spec in &args.hotkeys {
        let label = spec.to_string();
        registry
            .register(spec.key, spec.modifiers, move |event| {
                log::info!(
                    "{} pressed at ({}, {}), t={}ms",
                    label,
                    event.cursor_x,
                    event.cursor_y,
                    event.time_ms
                );
            })
            .map_err(|e| e.to_string())?;
    }

    log::info!("{} hotkey(s) registered, pumping messages", args.hotkeys.len());
    platform::run_message_pump(&registry)?;
    registry.unregister_all().map_err(|e| e.to_string())
}

#[cfg(not(target_os = "windows"))]
fn run(_args: Args) -> Result<(), String> {
    Err("global hotkeys are only supported on Windows".to_string())
}
