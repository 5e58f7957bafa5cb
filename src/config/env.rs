//! Mode-aware `.env` loading.
//!
//! Files are read from a directory in this order, later files overriding
//! earlier ones:
//!
//! ```text
//! .env
//! .env.local
//! .env.<mode>
//! .env.<mode>.local
//! ```
//!
//! Variables already set in the process environment win over every file.
//! Only keys carrying the public prefix (`VITE_`) are exposed.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Prefix of variables exposed to the app.
pub const PUBLIC_PREFIX: &str = "VITE_";

/// Resolved environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Build from explicit pairs. No prefix filtering is applied.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Look up a variable. Empty values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Load env files for `mode` from `dir`, overlaid with the process environment.
pub fn load_env(dir: &Path, mode: &str) -> EnvVars {
    load_env_with(dir, mode, std::env::vars())
}

/// Same as [`load_env`] with an explicit process environment.
pub fn load_env_with<I>(dir: &Path, mode: &str, process: I) -> EnvVars
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut vars = HashMap::new();

    let files = [
        ".env".to_string(),
        ".env.local".to_string(),
        format!(".env.{mode}"),
        format!(".env.{mode}.local"),
    ];

    for name in &files {
        let path = dir.join(name);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let parsed = parse_env_file(&contents);
                tracing::debug!(file = %path.display(), count = parsed.len(), "Loaded env file");
                vars.extend(parsed);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to read env file");
            }
        }
    }

    vars.extend(process);
    vars.retain(|k, _| k.starts_with(PUBLIC_PREFIX));

    EnvVars { vars }
}

/// Parse `KEY=VALUE` lines, skipping blanks and comments.
pub fn parse_env_file(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            out.push((key.to_string(), unquote(value.trim()).to_string()));
        }
    }

    out
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
