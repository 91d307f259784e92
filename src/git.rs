use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::config::Dev;
use crate::error::{Error, Result};
use crate::hook::HOOK_NAME;
use crate::pair;

/// Git config key holding the comma-joined keys of the current pair.
pub const DEVS_KEY: &str = "pear.devs";

/// Git config key switching co-author trailers on or off.
pub const INTEGRATION_KEY: &str = "pear.githubIntegration";

/// `git config` exits with status 5 when asked to unset a key that is not set.
const EXIT_KEY_NOT_SET: i32 = 5;

/// Which git configuration file pear writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigScope {
    /// The repository's `.git/config`.
    #[default]
    Local,
    /// The user's `~/.gitconfig`.
    Global,
}

impl ConfigScope {
    fn flag(self) -> &'static str {
        match self {
            ConfigScope::Local => "--local",
            ConfigScope::Global => "--global",
        }
    }
}

/// Failure of a git invocation, keeping the exit code so callers can
/// tolerate specific statuses.
struct Failure {
    code: Option<i32>,
    message: String,
}

/// Runs a command and returns its trimmed standard output on success, or
/// its exit code and trimmed standard error on failure.
///
/// If the process fails to spawn, the I/O error message is returned with no
/// exit code.
fn run_output(mut cmd: Command) -> std::result::Result<String, Failure> {
    match cmd.output() {
        Ok(out) => {
            if out.status.success() {
                Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
            } else {
                Err(Failure {
                    code: out.status.code(),
                    message: String::from_utf8_lossy(&out.stderr).trim().to_string(),
                })
            }
        }
        Err(e) => Err(Failure {
            code: None,
            message: format!("{}", e),
        }),
    }
}

/// Handle on the `git` binary for one repository.
///
/// All repository state pear touches outside the hook file goes through
/// here: `rev-parse` lookups and `git config` reads and writes.
#[derive(Debug, Clone, Default)]
pub struct Git {
    scope: ConfigScope,
    cwd: Option<PathBuf>,
}

impl Git {
    /// Creates a handle that runs `git` in the process's working directory.
    ///
    /// # Parameters
    /// - `scope`: The config file that writes and unsets go to.
    pub fn new(scope: ConfigScope) -> Self {
        Git { scope, cwd: None }
    }

    /// Run every git command as if started in `dir`.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    fn run(&self, args: &[&str]) -> std::result::Result<String, Failure> {
        debug!(args = ?args, "running git");
        run_output(self.command(args))
    }

    fn run_checked(&self, args: &[&str]) -> Result<String> {
        self.run(args).map_err(|f| Error::Git {
            args: args.join(" "),
            message: f.message,
        })
    }

    /// Fails with `Error::GitNotFound` unless a `git` binary is on `PATH`.
    pub fn ensure_installed() -> Result<()> {
        which::which("git").map(|_| ()).map_err(|_| Error::GitNotFound)
    }

    /// Whether the working directory is inside a git work tree.
    pub fn in_work_tree(&self) -> bool {
        matches!(
            self.run(&["rev-parse", "--is-inside-work-tree"]).as_deref(),
            Ok("true")
        )
    }

    /// Resolves `$GIT_DIR/<path>` the way git itself does, so linked
    /// worktrees and `core.hooksPath` are honoured.
    ///
    /// # Returns
    /// The path from `git rev-parse --git-path`, joined onto this handle's
    /// directory when git reports it relative.
    pub fn git_path(&self, path: &str) -> Result<PathBuf> {
        let resolved = PathBuf::from(self.run_checked(&["rev-parse", "--git-path", path])?);
        match &self.cwd {
            Some(dir) if resolved.is_relative() => Ok(dir.join(resolved)),
            _ => Ok(resolved),
        }
    }

    /// Path of the `prepare-commit-msg` hook git will run for this
    /// repository.
    pub fn hook_path(&self) -> Result<PathBuf> {
        self.git_path(&format!("hooks/{}", HOOK_NAME))
    }

    /// `git config --get <key>`, reading the effective value across all
    /// scopes. A key that is not set yields `Ok(None)`.
    pub fn config_get(&self, key: &str) -> Result<Option<String>> {
        match self.run(&["config", "--get", key]) {
            Ok(value) => Ok(Some(value)),
            Err(Failure { code: Some(1), .. }) => Ok(None),
            Err(f) => Err(Error::Git {
                args: format!("config --get {}", key),
                message: f.message,
            }),
        }
    }

    /// Sets `key` in this handle's scope.
    pub fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.run_checked(&["config", self.scope.flag(), key, value])?;
        Ok(())
    }

    /// Unsets `key` in this handle's scope.
    ///
    /// # Returns
    /// `Ok(false)` when the key was not set to begin with.
    pub fn config_unset(&self, key: &str) -> Result<bool> {
        match self.run(&["config", self.scope.flag(), "--unset", key]) {
            Ok(_) => Ok(true),
            Err(Failure {
                code: Some(EXIT_KEY_NOT_SET),
                ..
            }) => Ok(false),
            Err(f) => Err(Error::Git {
                args: format!("config {} --unset {}", self.scope.flag(), key),
                message: f.message,
            }),
        }
    }

    /// The current `user.name`.
    ///
    /// # Errors
    /// `Error::NoUser` when no name is configured.
    pub fn user_name(&self) -> Result<String> {
        self.config_get("user.name")?.ok_or(Error::NoUser)
    }

    /// The current `user.email`, if any.
    ///
    /// # Returns
    /// `Ok(None)` when no email is configured.
    pub fn user_email(&self) -> Result<Option<String>> {
        self.config_get("user.email")
    }

    /// Records the pair: `pear.devs` gets the keys, `user.name` the joined
    /// names and `user.email` the combined address.
    pub fn set_pair(&self, email: &str, devs: &[Dev], keys: &[String]) -> Result<()> {
        self.config_set(DEVS_KEY, &keys.join(","))?;
        self.config_set("user.name", &pair::combined_name(devs))?;
        self.config_set("user.email", email)?;
        Ok(())
    }

    /// The comma-joined keys written by [`Git::set_pair`].
    pub fn pair_keys(&self) -> Result<Option<String>> {
        self.config_get(DEVS_KEY)
    }

    /// Forgets the pair. Keys that were never set are not an error.
    pub fn unset_pair(&self) -> Result<()> {
        for key in ["user.name", "user.email", DEVS_KEY] {
            if !self.config_unset(key)? {
                debug!(%key, "was not set");
            }
        }
        Ok(())
    }

    /// Co-author integration is on unless explicitly set to `false`.
    pub fn integration_enabled(&self) -> Result<bool> {
        let value = self.config_get(INTEGRATION_KEY)?;
        Ok(value.as_deref().map(str::trim) != Some("false"))
    }

    /// Writes `pear.githubIntegration` in this handle's scope.
    ///
    /// # Parameters
    /// - `enabled`: Stored as `true` or `false`.
    pub fn set_integration(&self, enabled: bool) -> Result<()> {
        self.config_set(INTEGRATION_KEY, if enabled { "true" } else { "false" })
    }
}
