//! Canonical registry of bundled artifacts
//!
//! The offline branch never downloads anything: every third-party installer
//! ships under `data/packages` with one of the fixed names below. When an
//! artifact version changes, update ONLY this file.

/// Unattended runtime installer.
pub const RUNTIME_INSTALLER: &str = "python-3.11.9-amd64.exe";

/// NSIS installer for the GTK 3 runtime.
pub const TOOLKIT_INSTALLER: &str = "gtk-runtime-3.8.1-i686.exe";

/// Zip archive of the image converter.
pub const CONVERTER_ARCHIVE: &str = "NConvert-win64.zip";

/// Offline wheel of the GTK language bindings.
pub const BINDINGS_WHEEL: &str = "PyGObject-3.11-win64.whl";

/// Shared library whose presence marks a usable vendored GTK runtime,
/// relative to the toolkit directory.
pub const TOOLKIT_LIBRARY: &str = "bin/libgtk-3-0.dll";

/// Every artifact the offline branch may consume.
pub const BUNDLED: &[&str] = &[
    RUNTIME_INSTALLER,
    TOOLKIT_INSTALLER,
    CONVERTER_ARCHIVE,
    BINDINGS_WHEEL,
];
