//! Environment variable loading.
//!
//! Fallback chains live here so callers never repeat `or_else` ladders.

use std::env;
use std::path::Path;

/// Load `.env` from the current directory into the process environment.
/// Variables that are already set are left untouched. Runs at most once.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
    });
}

/// Load `<dir>/.env` without overriding variables that are already set.
/// Returns the number of variables applied.
pub fn load_dotenv_from_dir(dir: &Path) -> usize {
    let Ok(content) = std::fs::read_to_string(dir.join(".env")) else {
        return 0;
    };
    let mut applied = 0;
    for (key, value) in parse_dotenv(&content) {
        if env::var_os(&key).is_none() {
            env::set_var(&key, &value);
            applied += 1;
        }
    }
    if applied > 0 {
        tracing::debug!(dir = %dir.display(), applied, "loaded .env");
    }
    applied
}

/// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped, an
/// unquoted trailing `# comment` is stripped, and one level of matching
/// quotes is removed.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Read the primary key or the first set alias; fall back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// Read the primary key or the first set alias. Blank values count as unset.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// Boolean env var: anything but 0/false/no/off counts as true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match env_optional(primary, aliases) {
        Some(s) => !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_skips_comments_and_strips_quotes() {
        let pairs = parse_dotenv(
            "# launcher settings\n\nHARMORYC_PYTHON=\"py -3.11\"\nexport HARMORYC_QUIET=1 # silence\nBROKEN LINE\nEMPTY=\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("HARMORYC_PYTHON".to_string(), "py -3.11".to_string()),
                ("HARMORYC_QUIET".to_string(), "1".to_string()),
                ("EMPTY".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_parse_dotenv_keeps_hash_inside_quotes() {
        let pairs = parse_dotenv("TAG='a # b'\n");
        assert_eq!(pairs, vec![("TAG".to_string(), "a # b".to_string())]);
    }

    #[test]
    fn test_load_dotenv_from_dir_does_not_override() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(".env"),
            "HARMORYC_TEST_DOTENV_NEW=fresh\nHARMORYC_TEST_DOTENV_SET=from-file\n",
        )
        .unwrap();
        env::set_var("HARMORYC_TEST_DOTENV_SET", "from-env");

        let applied = load_dotenv_from_dir(tmp.path());

        assert_eq!(applied, 1);
        assert_eq!(env::var("HARMORYC_TEST_DOTENV_NEW").unwrap(), "fresh");
        assert_eq!(env::var("HARMORYC_TEST_DOTENV_SET").unwrap(), "from-env");
    }

    #[test]
    fn test_load_dotenv_from_dir_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(load_dotenv_from_dir(tmp.path()), 0);
    }

    #[test]
    fn test_env_optional_alias_and_blank() {
        env::set_var("HARMORYC_TEST_OPT_PRIMARY", "   ");
        env::set_var("HARMORYC_TEST_OPT_ALIAS", "value");
        assert_eq!(
            env_optional("HARMORYC_TEST_OPT_PRIMARY", &[]),
            None,
            "blank primary is unset"
        );
        assert_eq!(
            env_optional("HARMORYC_TEST_OPT_MISSING", &["HARMORYC_TEST_OPT_ALIAS"]),
            Some("value".to_string())
        );
        assert_eq!(
            env_or("HARMORYC_TEST_OPT_MISSING", &[], || "dflt".to_string()),
            "dflt"
        );
    }

    #[test]
    fn test_env_bool() {
        env::set_var("HARMORYC_TEST_BOOL_OFF", "off");
        env::set_var("HARMORYC_TEST_BOOL_ON", "yes");
        assert!(!env_bool("HARMORYC_TEST_BOOL_OFF", &[], true));
        assert!(env_bool("HARMORYC_TEST_BOOL_ON", &[], false));
        assert!(env_bool("HARMORYC_TEST_BOOL_UNSET", &[], true));
    }
}
