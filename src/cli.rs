use crate::{
    augment,
    config::ConfigStore,
    error::{Error, Result},
    git::{ConfigScope, Git},
    hook, pair,
    prompt::{DialoguerPrompter, Prompter},
};

use clap::{Parser, ValueEnum};
use console::style;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "PEAR_LOG";

/// Record a pair of developers as the git author of upcoming commits.
///
/// With no arguments, prints the current `user.name`.
#[derive(Parser, Debug)]
#[command(name = "pear", disable_version_flag = true)]
pub struct Cli {
    /// Developer keys to pair. With --augment-commit-message: the message
    /// file, message source and commit SHA passed by git.
    pub devs: Vec<String>,

    /// Unset local pear information
    #[arg(short, long)]
    pub unset: bool,

    /// Print version string
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Used within the git hook to write Co-authors to commit message
    #[arg(short = 'a', long = "augment-commit-message")]
    pub augment: bool,

    /// Turn github co-author integration on or off
    #[arg(short = 'i', long = "github-integration", value_enum)]
    pub integration: Option<Toggle>,

    /// Write the pair to the global git config instead of the repository's
    #[arg(long)]
    pub global: bool,

    /// Read and write the developer registry at this path instead of ~/.pearrc
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Value of `--github-integration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    /// Ask for developer emails and add co-author trailers.
    On,
    /// Stop adding trailers and take pear out of the hook.
    Off,
}

impl Cli {
    fn scope(&self) -> ConfigScope {
        if self.global {
            ConfigScope::Global
        } else {
            ConfigScope::Local
        }
    }

    fn config_store(&self) -> Result<ConfigStore> {
        match &self.config {
            Some(path) => Ok(ConfigStore::with_path(path.clone())),
            None => ConfigStore::new(),
        }
    }

    /// True when no developers and no action flag were given.
    fn is_bare(&self) -> bool {
        self.devs.is_empty() && !self.unset && !self.augment && self.integration.is_none()
    }
}

/// The identity written by a successful pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    /// Value written to `user.name`.
    pub name: String,
    /// Value written to `user.email`.
    pub email: String,
    /// Whether the `prepare-commit-msg` hook was refreshed.
    pub hook_installed: bool,
}

/// Installs a stderr `tracing` subscriber filtered by `PEAR_LOG`, or at
/// debug level when `debug` is set.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

/// Pairs the developers named by `keys`.
///
/// Keys are normalized, missing names (and emails, when co-author
/// integration is on) are collected through `prompter`, the combined
/// identity is written to git, the hook is refreshed when integration is on,
/// and finally the registry is saved.
pub fn pair_devs<P: Prompter>(
    git: &Git,
    store: &ConfigStore,
    mut keys: Vec<String>,
    prompter: &mut P,
) -> Result<Pairing> {
    pair::normalize_keys(&mut keys);
    let mut config = store.load()?;
    let integration = git.integration_enabled()?;

    let devs = pair::reconcile(&keys, &mut config, prompter, integration)?;
    let base = pair::base_email(&mut config, prompter)?;
    let email = pair::format_email(&base, &keys)?;

    git.set_pair(&email, &devs, &keys)?;
    if integration {
        hook::install(&git.hook_path()?)?;
    }
    store.save(&config)?;

    Ok(Pairing {
        name: pair::combined_name(&devs),
        email,
        hook_installed: integration,
    })
}

/// Handles the hook invocation `pear -a <file> [source] [sha]`.
///
/// # Returns
/// `true` if trailers were written to the message file.
pub fn augment_message(git: &Git, store: &ConfigStore, args: &[String]) -> Result<bool> {
    let file = args.first().ok_or(Error::MissingMessageFile)?;
    let source = args.get(1).map(String::as_str).unwrap_or("");
    let revision = args.get(2).map(String::as_str).unwrap_or("");

    if !augment::should_augment(source, revision) {
        debug!(%source, %revision, "commit kind is not augmented");
        return Ok(false);
    }

    let Some(keys) = git.pair_keys()? else {
        debug!("no pair recorded");
        return Ok(false);
    };
    let config = store.load()?;
    let devs = augment::resolve_pair(&keys, &config)?;

    augment::augment(Path::new(file), source, revision, &devs)
}

/// Turns co-author integration on (installing the hook) or off (removing
/// it).
pub fn set_integration(git: &Git, toggle: Toggle) -> Result<()> {
    let hook_path = git.hook_path()?;
    match toggle {
        Toggle::On => hook::install(&hook_path)?,
        Toggle::Off => hook::remove(&hook_path)?,
    }
    git.set_integration(toggle == Toggle::On)
}

/// Forgets the current pair and takes pear out of the hook.
pub fn unset(git: &Git) -> Result<()> {
    git.unset_pair()?;
    hook::remove(&git.hook_path()?)
}

/// Main CLI entry point for `pear`.
///
/// This function:
/// 1. Parses the command line and sets up logging.
/// 2. Handles `--version`.
/// 3. Verifies that `git` is installed and that the current directory is a
///    git work tree.
/// 4. Dispatches to the integration toggle, unset, current-pair display,
///    hook augmentation or pairing.
///
/// # Exit Codes
///
/// * `0` – Successful execution.
/// * Errors are returned to the caller, which exits non-zero.
pub fn entry() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if cli.version {
        println!("Pear version {}", env!("CARGO_PKG_VERSION"));
        return Ok(0);
    }

    Git::ensure_installed()?;
    let git = Git::new(cli.scope());
    if !git.in_work_tree() {
        return Err(Error::NotARepository);
    }

    if let Some(toggle) = cli.integration {
        set_integration(&git, toggle)?;
        let state = match toggle {
            Toggle::On => "on",
            Toggle::Off => "off",
        };
        println!(
            "{}",
            style(format!("Co-author integration turned {}.", state)).green()
        );
        return Ok(0);
    }

    if cli.unset {
        unset(&git)?;
        println!("{}", style("Pair unset.").yellow().bold());
        return Ok(0);
    }

    if cli.is_bare() {
        println!("{}", git.user_name()?);
        return Ok(0);
    }

    let store = cli.config_store()?;

    if cli.augment {
        augment_message(&git, &store, &cli.devs)?;
        return Ok(0);
    }

    let mut prompter = DialoguerPrompter;
    let pairing = pair_devs(&git, &store, cli.devs, &mut prompter)?;
    println!(
        "{}",
        style(format!("Pairing as {} <{}>", pairing.name, pairing.email))
            .green()
            .bold()
    );
    if pairing.hook_installed {
        println!(
            "{}",
            style("Co-authored-by trailers will be added to new commits.").green()
        );
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pear").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn positional_devs_are_collected() {
        let cli = parse(&["DevB", "DevA"]);
        assert_eq!(cli.devs, vec!["DevB", "DevA"]);
        assert!(!cli.is_bare());
        assert_eq!(cli.scope(), ConfigScope::Local);
    }

    #[test]
    fn no_arguments_is_bare() {
        assert!(parse(&[]).is_bare());
        assert!(parse(&["--debug"]).is_bare());
    }

    #[test]
    fn hook_invocation_keeps_message_arguments() {
        let cli = parse(&["--augment-commit-message", ".git/COMMIT_EDITMSG", "commit"]);
        assert!(cli.augment);
        assert_eq!(cli.devs, vec![".git/COMMIT_EDITMSG", "commit"]);
    }

    #[test]
    fn short_flags() {
        let cli = parse(&["-u"]);
        assert!(cli.unset);
        let cli = parse(&["-v"]);
        assert!(cli.version);
        let cli = parse(&["-i", "off"]);
        assert_eq!(cli.integration, Some(Toggle::Off));
    }

    #[test]
    fn integration_rejects_other_values() {
        let result = Cli::try_parse_from(["pear", "--github-integration", "maybe"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_and_config_overrides() {
        let cli = parse(&["--global", "--config", "/tmp/pearrc", "dev1"]);
        assert_eq!(cli.scope(), ConfigScope::Global);
        let store = cli.config_store().expect("store");
        assert_eq!(store.path(), Path::new("/tmp/pearrc"));
    }

    #[test]
    fn augment_requires_message_file() {
        let git = Git::default();
        let store = ConfigStore::with_path(PathBuf::from("/nonexistent/.pearrc"));
        let result = augment_message(&git, &store, &[]);
        assert!(matches!(result, Err(Error::MissingMessageFile)));
    }

    #[test]
    fn augment_skips_merge_without_touching_git() {
        let git = Git::default();
        let store = ConfigStore::with_path(PathBuf::from("/nonexistent/.pearrc"));
        let args = vec!["MERGE_MSG".to_string(), "merge".to_string()];
        assert!(!augment_message(&git, &store, &args).expect("skip"));
    }
}
