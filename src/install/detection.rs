//! Presence probes
//!
//! Decides whether a dependency is already usable. Probes are read-only: they
//! may launch the runtime or `pkg-config` to ask for versions, but never change
//! anything on disk. Any error while probing counts as "absent".

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::process;
use super::spec::{ProbeKind, RuntimeLookup};

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)").expect("version pattern is valid"));

/// Imports the bindings and prints the toolkit version they load.
const BINDINGS_SNIPPET: &str = "import gi; gi.require_version('Gtk', '3.0'); \
    from gi.repository import Gtk; \
    print(Gtk.get_major_version(), Gtk.get_minor_version())";

/// Run one probe. Returns `true` only if the dependency is usable right now.
pub async fn present(probe: &ProbeKind, query_timeout: Duration) -> bool {
    match probe {
        ProbeKind::Runtime(lookup) => locate_runtime(lookup, query_timeout).await.is_some(),
        ProbeKind::VendorLibrary { dir, library } => {
            let found = dir.join(library).is_file();
            log::debug!("{} present: {found}", dir.join(library).display());
            found
        }
        ProbeKind::PkgConfig { module } => pkg_config_version(module, query_timeout)
            .await
            .is_some(),
        ProbeKind::Bindings {
            runtime,
            toolkit_major,
            library_dirs,
        } => match bindings_toolkit_version(runtime, library_dirs, query_timeout).await {
            Some((major, minor)) => {
                log::debug!("Bindings load toolkit {major}.{minor}");
                major == *toolkit_major
            }
            None => false,
        },
        ProbeKind::Executable { names, extra_dirs } => find_executable(names, extra_dirs).is_some(),
    }
}

/// Find the first runtime executable reporting an acceptable version.
///
/// Order: project-local copies, well-known system locations, then the
/// executable search path.
pub async fn locate_runtime(lookup: &RuntimeLookup, query_timeout: Duration) -> Option<PathBuf> {
    let searched = lookup
        .names
        .iter()
        .filter_map(|name| which::which(name).ok());
    let candidates = lookup
        .local
        .iter()
        .chain(&lookup.system)
        .filter(|path| path.is_file())
        .cloned()
        .chain(searched);

    for candidate in candidates {
        match runtime_version(&candidate, query_timeout).await {
            Some(version) if lookup.requirement.accepts(version) => {
                log::debug!(
                    "Runtime {}.{} at {} satisfies {}",
                    version.0,
                    version.1,
                    candidate.display(),
                    lookup.requirement
                );
                return Some(candidate);
            }
            Some(version) => log::debug!(
                "Skipping runtime {}.{} at {} (need {})",
                version.0,
                version.1,
                candidate.display(),
                lookup.requirement
            ),
            None => log::debug!("No usable version from {}", candidate.display()),
        }
    }
    None
}

/// First `major.minor` pair in `text`.
pub fn parse_version(text: &str) -> Option<(u32, u32)> {
    let captures = VERSION.captures(text)?;
    let major = captures.get(1)?.as_str().parse().ok()?;
    let minor = captures.get(2)?.as_str().parse().ok()?;
    Some((major, minor))
}

/// Locate one of `names` in `extra_dirs` or on the executable search path.
pub fn find_executable(names: &[&str], extra_dirs: &[PathBuf]) -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let local = extra_dirs.iter().filter(|dir| dir.is_dir()).find_map(|dir| {
        names
            .iter()
            .find_map(|name| which::which_in(name, Some(dir.as_os_str()), &cwd).ok())
    });

    let found = local.or_else(|| names.iter().find_map(|name| which::which(name).ok()));
    log::debug!("Executable {names:?}: {found:?}");
    found
}

async fn runtime_version(executable: &Path, query_timeout: Duration) -> Option<(u32, u32)> {
    let mut command = process::command(executable);
    command.arg("--version");

    let output = process::run(command, &process::program_name(executable), query_timeout)
        .await
        .ok()?;
    if !output.success() {
        return None;
    }
    // Old interpreters report on stderr.
    parse_version(&output.stdout).or_else(|| parse_version(&output.stderr))
}

async fn pkg_config_version(module: &str, query_timeout: Duration) -> Option<String> {
    let mut command = process::command("pkg-config");
    command.args(["--modversion", module]);

    let output = process::run(command, "pkg-config", query_timeout).await.ok()?;
    let version = output.stdout.trim();
    if !output.success() || version.is_empty() {
        log::debug!("pkg-config does not know {module}");
        return None;
    }
    log::debug!("pkg-config: {module} {version}");
    Some(version.to_string())
}

async fn bindings_toolkit_version(
    runtime: &RuntimeLookup,
    library_dirs: &[PathBuf],
    query_timeout: Duration,
) -> Option<(u32, u32)> {
    let interpreter = locate_runtime(runtime, query_timeout).await?;

    let mut command = process::command(&interpreter);
    command.args(["-c", BINDINGS_SNIPPET]);
    process::prepend_path(&mut command, library_dirs);

    let output = process::run(command, &process::program_name(&interpreter), query_timeout)
        .await
        .ok()?;
    if !output.success() {
        log::debug!("Bindings import failed: {}", output.stderr.trim());
        return None;
    }

    let mut parts = output.stdout.split_whitespace();
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
