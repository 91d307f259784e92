use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use tracing::debug;

use crate::error::{Error, Result};

/// Substring identifying the lines pear owns in a hook script.
pub const MARKER: &str = "pear";

/// The line pear adds to `prepare-commit-msg`. Git passes the message file,
/// the message source and the commit SHA as `$1 $2 $3`.
pub const HOOK_LINE: &str = "pear --augment-commit-message $1 $2 $3";

const SHEBANG: &str = "#!/bin/sh\n";

/// File name of the hook pear manages.
pub const HOOK_NAME: &str = "prepare-commit-msg";

/// Removes every line containing [`MARKER`], together with its line
/// terminator. All other lines are kept byte for byte.
pub fn strip_tool_lines(contents: &str) -> String {
    contents
        .split_inclusive('\n')
        .filter(|line| !line.contains(MARKER))
        .collect()
}

/// `contents` with pear's lines replaced by a single [`HOOK_LINE`] at the
/// end. An empty script gets a `#!/bin/sh` line first.
pub fn with_hook_line(contents: &str) -> String {
    let mut script = strip_tool_lines(contents);
    if script.is_empty() {
        script.push_str(SHEBANG);
    } else if !script.ends_with('\n') {
        script.push('\n');
    }
    script.push_str(HOOK_LINE);
    script.push('\n');
    script
}

/// Adds pear's line to the hook at `path`, replacing any earlier one.
pub fn install(path: &Path) -> Result<()> {
    let contents = read_hook(path)?.unwrap_or_default();
    write_hook(path, &with_hook_line(&contents))?;
    debug!(path = %path.display(), "installed prepare-commit-msg hook");
    Ok(())
}

/// Takes pear's line out of the hook at `path`, leaving the rest intact.
/// A missing hook stays missing.
pub fn remove(path: &Path) -> Result<()> {
    let Some(contents) = read_hook(path)? else {
        return Ok(());
    };
    write_hook(path, &strip_tool_lines(&contents))?;
    debug!(path = %path.display(), "removed pear from prepare-commit-msg hook");
    Ok(())
}

fn read_hook(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn write_hook(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| Error::io(path, e))?;

    #[cfg(unix)]
    {
        let perms = fs::Permissions::from_mode(0o755);
        fs::set_permissions(path, perms).map_err(|e| Error::io(path, e))?;
    }

    Ok(())
}
