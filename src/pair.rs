//! Resolving a pair selection into developer identities.

use tracing::debug;

use crate::config::{Config, Dev};
use crate::error::{Error, Result};
use crate::prompt::{self, Prompter};

/// Lower-cases, sorts and deduplicates the developer keys given on the
/// command line.
///
/// The resulting order is the order names appear in `user.name` and keys in
/// the combined email, so `["DevB", "DevA"]` always pairs as `deva`, `devb`.
pub fn normalize_keys(keys: &mut Vec<String>) {
    for key in keys.iter_mut() {
        *key = key.to_lowercase();
    }
    keys.sort();
    keys.dedup();
}

/// Makes sure every key in `keys` has a full name, and an email when
/// `ask_emails` is set, prompting for whatever is missing.
///
/// Updated entries are written back into `config.devs`; saving the config
/// is left to the caller.
///
/// # Returns
/// The identities in the same order as `keys`.
pub fn reconcile<P: Prompter>(
    keys: &[String],
    config: &mut Config,
    prompter: &mut P,
    ask_emails: bool,
) -> Result<Vec<Dev>> {
    let mut devs = Vec::with_capacity(keys.len());

    for key in keys {
        let mut dev = config.devs.get(key).cloned().unwrap_or_default();

        if dev.name.trim().is_empty() {
            debug!(%key, "no full name recorded");
            dev.name = prompt::ask_full_name(prompter, key)?;
        }

        if dev.email.is_empty() && ask_emails {
            debug!(%key, "no email recorded");
            dev.email = prompt::ask_dev_email(prompter, key)?;
        }

        config.devs.insert(key.clone(), dev.clone());
        devs.push(dev);
    }

    Ok(devs)
}

/// Returns the configured base email, asking for (and caching) one if the
/// config has none yet.
pub fn base_email<P: Prompter>(config: &mut Config, prompter: &mut P) -> Result<String> {
    if config.email.is_empty() {
        config.email = prompt::ask_base_email(prompter)?;
    }
    Ok(config.email.clone())
}

/// Builds `local+key1+...+keyN@domain` from `base`.
///
/// # Errors
/// `Error::InvalidEmail` unless `base` contains exactly one `@` with text
/// on both sides.
pub fn format_email<S: AsRef<str>>(base: &str, keys: &[S]) -> Result<String> {
    if !prompt::is_valid_base_email(base) {
        return Err(Error::InvalidEmail(base.to_string()));
    }
    let (local, domain) = base
        .split_once('@')
        .ok_or_else(|| Error::InvalidEmail(base.to_string()))?;

    let mut email = String::from(local);
    for key in keys {
        email.push('+');
        email.push_str(key.as_ref());
    }
    email.push('@');
    email.push_str(domain);
    Ok(email)
}

/// The `user.name` value for a pair: every name joined with `" and "`.
pub fn combined_name(devs: &[Dev]) -> String {
    devs.iter()
        .map(|dev| dev.name.as_str())
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Answers prompts from a script and records every prompt it was shown.
    struct ScriptedPrompter {
        answers: VecDeque<String>,
        seen: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[&str]) -> Self {
            ScriptedPrompter {
                answers: answers.iter().map(|s| s.to_string()).collect(),
                seen: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn prompt(&mut self, prompt: &str) -> Result<String> {
            self.seen.push(prompt.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| Error::Prompt(format!("unexpected prompt: {}", prompt)))
        }
    }

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_lowercases_and_sorts() {
        let mut k = keys(&["DevB", "DevA"]);
        normalize_keys(&mut k);
        assert_eq!(k, keys(&["deva", "devb"]));
    }

    #[test]
    fn normalize_drops_duplicates_differing_in_case() {
        let mut k = keys(&["dev1", "DEV1", "dev0"]);
        normalize_keys(&mut k);
        assert_eq!(k, keys(&["dev0", "dev1"]));
    }

    #[test]
    fn reconcile_prompts_only_for_unknown_dev() {
        let mut config = Config::default();
        config
            .devs
            .insert("deva".to_string(), Dev::new("Full Name A", ""));
        let mut k = keys(&["DevB", "DevA"]);
        normalize_keys(&mut k);
        let mut prompter = ScriptedPrompter::new(&["Person B"]);

        let devs = reconcile(&k, &mut config, &mut prompter, false).expect("reconcile");

        assert_eq!(prompter.seen, vec!["Please enter a full name for devb:"]);
        assert_eq!(combined_name(&devs), "Full Name A and Person B");
        assert_eq!(config.devs.len(), 2);
        assert_eq!(config.devs["devb"].name, "Person B");
    }

    #[test]
    fn reconcile_known_dev_never_prompts() {
        let mut config = Config::default();
        config
            .devs
            .insert("deva".to_string(), Dev::new("Full Name A", "a@example.com"));
        let mut prompter = ScriptedPrompter::new(&[]);

        let devs = reconcile(&keys(&["deva"]), &mut config, &mut prompter, true)
            .expect("reconcile");

        assert!(prompter.seen.is_empty());
        assert_eq!(devs, vec![Dev::new("Full Name A", "a@example.com")]);
    }

    #[test]
    fn reconcile_asks_email_only_with_integration() {
        let mut config = Config::default();
        config
            .devs
            .insert("deva".to_string(), Dev::new("Full Name A", ""));

        let mut quiet = ScriptedPrompter::new(&[]);
        reconcile(&keys(&["deva"]), &mut config, &mut quiet, false).expect("reconcile");
        assert!(quiet.seen.is_empty());

        let mut asking = ScriptedPrompter::new(&["a@example.com"]);
        let devs =
            reconcile(&keys(&["deva"]), &mut config, &mut asking, true).expect("reconcile");
        assert_eq!(
            asking.seen,
            vec![
                "Please enter an email for deva (for github integration use email associated with github):"
            ]
        );
        assert_eq!(devs[0].email, "a@example.com");
        assert_eq!(config.devs["deva"].email, "a@example.com");
    }

    #[test]
    fn reconcile_propagates_prompt_failure() {
        let mut config = Config::default();
        let mut prompter = ScriptedPrompter::new(&[]);

        let result = reconcile(&keys(&["ghost"]), &mut config, &mut prompter, false);

        assert!(matches!(result, Err(Error::Prompt(_))));
    }

    #[test]
    fn base_email_is_prompted_once_and_cached() {
        let mut config = Config::default();
        let mut prompter = ScriptedPrompter::new(&["dev@pear.biz"]);

        assert_eq!(base_email(&mut config, &mut prompter).unwrap(), "dev@pear.biz");
        assert_eq!(base_email(&mut config, &mut prompter).unwrap(), "dev@pear.biz");
        assert_eq!(prompter.seen.len(), 1);
        assert_eq!(config.email, "dev@pear.biz");
    }

    #[test]
    fn format_email_plus_addresses_each_key() {
        assert_eq!(
            format_email("dev@example.com", &["dev1"]).unwrap(),
            "dev+dev1@example.com"
        );
        assert_eq!(
            format_email("dev@example.com", &["dev1", "dev2"]).unwrap(),
            "dev+dev1+dev2@example.com"
        );
        assert_eq!(
            format_email("dev@example.com", &["dev1", "dev2", "dev3"]).unwrap(),
            "dev+dev1+dev2+dev3@example.com"
        );
    }

    #[test]
    fn format_email_rejects_malformed_base() {
        assert!(matches!(
            format_email("dev.example.com", &["dev1"]),
            Err(Error::InvalidEmail(_))
        ));
        assert!(matches!(
            format_email("a@b@c", &["dev1"]),
            Err(Error::InvalidEmail(_))
        ));
    }

    #[test]
    fn combined_name_of_single_dev_is_its_name() {
        assert_eq!(combined_name(&[Dev::new("user1", "")]), "user1");
    }
}
