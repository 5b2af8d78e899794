#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use std::path::PathBuf;

    use anyhow::Context;
    use clap::Parser;
    use icicle_core::{ViewerConfig, load_forest};
    use icicle_ui::{IcicleApp, Launch};

    /// Interactive icicle graph of a sampled call-tree profile.
    #[derive(Parser)]
    #[command(name = "icicle-gui", version)]
    struct Cli {
        /// Profile to open: a JSON forest or collapsed stacks.
        profile: Option<PathBuf>,
        /// Viewer settings (TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Selection to show first instead of the first one in the file.
        #[arg(long)]
        selection: Option<String>,
        /// Caption of the selection dropdown.
        #[arg(long)]
        label: Option<String>,
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    let forest = cli
        .profile
        .as_ref()
        .map(|path| load_forest(path).with_context(|| format!("opening {}", path.display())))
        .transpose()?;
    let title = cli
        .profile
        .as_ref()
        .and_then(|p| p.file_name())
        .map_or_else(|| "icicle".to_string(), |n| format!("icicle: {}", n.to_string_lossy()));

    let launch = Launch {
        config,
        forest,
        selection: cli.selection,
        label: cli.label,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size([1200.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        &title,
        options,
        Box::new(|cc| Ok(Box::new(IcicleApp::new(cc, launch)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {}
