//! Storage mode selection rules.
//!
//! Deciding whether the remote backend may be used is split in two: the
//! static configuration check here, and a reachability check performed by
//! the store crate's mode resolver. Both must pass for remote mode.

use serde::Serialize;

/// Which storage substrate the process runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    Remote,
    Local,
}

impl StorageMode {
    /// Parse the `STORAGE_MODE` flag. Anything other than `remote` means local.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("remote") {
            Self::Remote
        } else {
            Self::Local
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

/// Values shipped in sample configuration files that must never be treated
/// as real settings.
pub const PLACEHOLDER_SENTINELS: &[&str] = &[
    "your-remote-url",
    "your_remote_url",
    "https://your-project.example.com",
    "your-remote-key",
    "your_remote_key",
    "changeme",
];

/// Minimum accepted length for the remote credential.
pub const MIN_CREDENTIAL_LENGTH: usize = 16;

/// True when `value` is empty or one of the [`PLACEHOLDER_SENTINELS`].
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || PLACEHOLDER_SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(value))
}

/// Static check of the remote settings.
///
/// Returns `Err` with a human-readable reason when remote mode cannot be
/// used; the caller logs it and falls back to local mode.
pub fn check_remote_settings(
    requested: StorageMode,
    endpoint: Option<&str>,
    credential: Option<&str>,
) -> Result<(), String> {
    if requested != StorageMode::Remote {
        return Err("local mode requested".into());
    }

    let endpoint = endpoint.unwrap_or_default();
    if is_placeholder(endpoint) {
        return Err("remote endpoint is missing or a placeholder".into());
    }
    if !(endpoint.starts_with("postgres://") || endpoint.starts_with("postgresql://")) {
        return Err("remote endpoint is not a postgres:// URL".into());
    }

    let credential = credential.unwrap_or_default();
    if is_placeholder(credential) {
        return Err("remote credential is missing or a placeholder".into());
    }
    if credential.trim().len() < MIN_CREDENTIAL_LENGTH {
        return Err(format!(
            "remote credential must be at least {MIN_CREDENTIAL_LENGTH} characters"
        ));
    }

    Ok(())
}
