//! Demo binary: opens the Voronoi viewer, optionally with a TOML options file.

use std::path::PathBuf;

use voro::options::Options;
use voro::Viewer;

fn load_options() -> Result<Options, voro::VoroError> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            log::info!("loading options from {}", path.display());
            Options::load(&path)
        }
        None => Ok(Options::default()),
    }
}

fn main() {
    env_logger::init();

    let options = match load_options() {
        Ok(options) => options,
        Err(e) => {
            log::error!("{e}");
            log::error!("Usage: voro [options.toml]");
            std::process::exit(1);
        }
    };

    if let Err(e) = Viewer::builder()
        .with_title("Voro")
        .with_options(options)
        .build()
        .run()
    {
        log::error!("{e}");
        std::process::exit(1);
    }
}
