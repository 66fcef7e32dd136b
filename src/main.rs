mod cli;

use anyhow::{Context, Result};
use log::{error, info};
use treedoc::install::{Branch, Orchestrator, runners};
use treedoc::{InstallerConfig, Locator};

fn main() {
    env_logger::Builder::new()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args = cli::parse();
    let branch = match args.platform.parse::<Branch>() {
        Ok(branch) => branch,
        Err(e) => {
            eprintln!("error: {e}\n\n{}", cli::usage());
            std::process::exit(1);
        }
    };

    match real_main(branch) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn real_main(branch: Branch) -> Result<i32> {
    let locator = Locator::discover().context("cannot determine the project root")?;
    let config = InstallerConfig::from_env();
    info!("Project root: {}", locator.root().display());
    info!("Installer config: {config:?}");

    // Steps never overlap, so one thread is enough.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let summary = rt.block_on(runners::run_install(Orchestrator::system(locator, config), branch));
    Ok(summary.exit_code())
}
