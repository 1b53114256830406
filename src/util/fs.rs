//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::Path;

/// Create the output directory and any missing parents.
///
/// On Unix new directories get mode `0755`. Succeeds if the directory
/// already exists; fails if the path (or a parent) is an existing file.
pub fn create_output_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder.create(path)?;
    tracing::debug!("output directory ready: {}", path.display());
    Ok(())
}

/// Name of the last component of `dir`, used as the default package name.
pub fn dir_name(dir: &Path) -> Option<String> {
    dir.file_name().map(|n| n.to_string_lossy().into_owned())
}
