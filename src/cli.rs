use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "treedoc-install",
    version,
    about = "Install the TreeDoc editor's runtime dependencies",
    after_help = "Environment:\n  \
        TREEDOC_ROOT               project root (default: parent of the installer's directory)\n  \
        TREEDOC_RUNTIME_TIMEOUT    runtime installer budget in seconds (900)\n  \
        TREEDOC_INSTALL_TIMEOUT    budget for other installers in seconds (300)\n  \
        TREEDOC_QUERY_TIMEOUT      version query budget in seconds (15)\n  \
        TREEDOC_VERIFY_ATTEMPTS    presence checks after an install (10)\n  \
        TREEDOC_VERIFY_DELAY_MS    delay between presence checks (1000)\n  \
        RUST_LOG                   log filter (default: warn)"
)]
pub struct Args {
    /// Platform branch to run: `windows` (bundled, offline) or `linux` (package manager)
    pub platform: String,
}

/// Parse the command line; any usage error exits with status 1.
pub fn parse() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            error.exit()
        }
        Err(error) => {
            let _ = error.print();
            std::process::exit(1);
        }
    }
}

/// One-line usage for error messages.
pub fn usage() -> String {
    Args::command().render_usage().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn platform_is_required() {
        assert!(Args::try_parse_from(["treedoc-install"]).is_err());
        let args = Args::try_parse_from(["treedoc-install", "linux"]).expect("parse");
        assert_eq!(args.platform, "linux");
    }

    #[test]
    fn usage_names_the_platform() {
        assert!(usage().contains("<PLATFORM>"));
    }
}
