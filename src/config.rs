// ecxctl - CLI for the Equinix ECX Fabric API
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::token::{DEFAULT_GRANT_TYPE, OAuthRequest};
use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DEFAULT_PLAYGROUND_ENDPOINT: &str = "playgroundapi.equinix.com";
pub const CONFIG_DIR_ENV: &str = "ECXCTL_CONFIG_DIR";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub grant_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub playground_token: Option<String>,
    pub playground_endpoint: Option<String>,
    #[serde(default)]
    pub ignore_ssl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    User,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a writable config directory for the current user")]
    MissingConfigDir,
    #[error("ECX API endpoint is required; pass --ecx-api-host or set ECX_API_HOST")]
    MissingEndpoint,
    #[error("application id is required; pass --equinix-api-id or set EQUINIX_API_ID")]
    MissingClientId,
    #[error("application secret is required; pass --equinix-api-secret or set EQUINIX_API_SECRET")]
    MissingClientSecret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Playground { token: String },
    OAuth(OAuthRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub endpoint: String,
    pub credentials: Credentials,
    pub ignore_ssl: bool,
}

pub fn config_path(scope: Scope, cwd: &Path) -> Result<PathBuf> {
    match scope {
        Scope::Local => Ok(cwd.join(".ecxctl.yaml")),
        Scope::User => {
            if let Ok(custom) = env::var(CONFIG_DIR_ENV) {
                return Ok(PathBuf::from(custom).join("config.yaml"));
            }
            let base = config_dir().ok_or(ConfigError::MissingConfigDir)?;
            Ok(base.join("ecxctl").join("config.yaml"))
        }
    }
}

pub fn load(cwd: &Path) -> Result<Config> {
    let user = read_if_exists(&config_path(Scope::User, cwd)?)?.unwrap_or_default();
    let local = read_if_exists(&config_path(Scope::Local, cwd)?)?.unwrap_or_default();
    Ok(merge(user, local))
}

/// Read an explicitly named config file in place of the user and local ones.
pub fn load_file(path: &Path) -> Result<Config> {
    read_if_exists(path)?.ok_or_else(|| anyhow!("config file {:?} does not exist", path))
}

/// Contents of `path`, or an empty config when it does not exist yet.
pub fn load_or_default(path: &Path) -> Result<Config> {
    Ok(read_if_exists(path)?.unwrap_or_default())
}

pub fn save(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(config).context("serializing config")?;
    fs::write(path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}

/// Merge file settings with per-invocation overrides (flags or env).
///
/// A playground token switches to playground mode: no credential exchange and
/// the playground endpoint replaces the regular one.
pub fn resolve(files: Config, overrides: Config) -> Result<EffectiveConfig> {
    let merged = merge(files, overrides);
    let ignore_ssl = merged.ignore_ssl;

    if let Some(token) = non_empty(merged.playground_token) {
        let endpoint = non_empty(merged.playground_endpoint)
            .unwrap_or_else(|| DEFAULT_PLAYGROUND_ENDPOINT.to_string());
        return Ok(EffectiveConfig {
            endpoint,
            credentials: Credentials::Playground { token },
            ignore_ssl,
        });
    }

    let endpoint = non_empty(merged.endpoint).ok_or(ConfigError::MissingEndpoint)?;
    let client_id = non_empty(merged.client_id).ok_or(ConfigError::MissingClientId)?;
    let client_secret = non_empty(merged.client_secret).ok_or(ConfigError::MissingClientSecret)?;
    let grant_type =
        non_empty(merged.grant_type).unwrap_or_else(|| DEFAULT_GRANT_TYPE.to_string());

    Ok(EffectiveConfig {
        endpoint,
        credentials: Credentials::OAuth(OAuthRequest {
            client_id,
            client_secret,
            grant_type,
            user_name: non_empty(merged.username),
            user_password: non_empty(merged.password),
        }),
        ignore_ssl,
    })
}

/// Copy with secrets replaced, for display.
pub fn masked(config: &Config) -> Config {
    let mask = |v: &Option<String>| v.as_ref().map(|_| "*****".to_string());
    Config {
        client_secret: mask(&config.client_secret),
        password: mask(&config.password),
        playground_token: mask(&config.playground_token),
        ..config.clone()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_if_exists(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let config = serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(config))
}

/// Field-wise merge; values from `over` win.
fn merge(base: Config, over: Config) -> Config {
    Config {
        endpoint: over.endpoint.or(base.endpoint),
        client_id: over.client_id.or(base.client_id),
        client_secret: over.client_secret.or(base.client_secret),
        grant_type: over.grant_type.or(base.grant_type),
        username: over.username.or(base.username),
        password: over.password.or(base.password),
        playground_token: over.playground_token.or(base.playground_token),
        playground_endpoint: over.playground_endpoint.or(base.playground_endpoint),
        ignore_ssl: over.ignore_ssl || base.ignore_ssl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use tempfile::{TempDir, tempdir};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn isolated() -> (MutexGuard<'static, ()>, TempDir) {
        let guard = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let cwd = tempdir().unwrap();
        unsafe {
            env::set_var(CONFIG_DIR_ENV, cwd.path().join("config"));
        }
        fs::create_dir_all(cwd.path().join("config")).unwrap();
        (guard, cwd)
    }

    #[test]
    fn merges_user_local_and_overrides() {
        let (_guard, cwd) = isolated();

        let user_cfg = Config {
            endpoint: Some("api.equinix.com".into()),
            client_id: Some("user-app".into()),
            client_secret: Some("user-secret".into()),
            username: Some("alice".into()),
            ..Config::default()
        };
        save(&config_path(Scope::User, cwd.path()).unwrap(), &user_cfg).unwrap();

        let local_cfg = Config {
            client_id: Some("local-app".into()),
            password: Some("pw".into()),
            ignore_ssl: true,
            ..Config::default()
        };
        save(&config_path(Scope::Local, cwd.path()).unwrap(), &local_cfg).unwrap();

        let effective = resolve(load(cwd.path()).unwrap(), Config::default()).unwrap();
        assert_eq!(effective.endpoint, "api.equinix.com");
        assert!(effective.ignore_ssl);
        let Credentials::OAuth(request) = effective.credentials else {
            panic!("expected OAuth credentials");
        };
        assert_eq!(request.client_id, "local-app");
        assert_eq!(request.client_secret, "user-secret");
        assert_eq!(request.grant_type, DEFAULT_GRANT_TYPE);
        assert_eq!(request.user_name.as_deref(), Some("alice"));
        assert_eq!(request.user_password.as_deref(), Some("pw"));

        let overridden = resolve(
            load(cwd.path()).unwrap(),
            Config {
                endpoint: Some("sandboxapi.equinix.com".into()),
                grant_type: Some("password".into()),
                ..Config::default()
            },
        )
        .unwrap();
        assert_eq!(overridden.endpoint, "sandboxapi.equinix.com");
        let Credentials::OAuth(request) = overridden.credentials else {
            panic!("expected OAuth credentials");
        };
        assert_eq!(request.grant_type, "password");
    }

    #[test]
    fn playground_token_replaces_endpoint_and_credentials() {
        let (_guard, cwd) = isolated();

        let effective = resolve(
            load(cwd.path()).unwrap(),
            Config {
                endpoint: Some("api.equinix.com".into()),
                playground_token: Some("play-token".into()),
                ..Config::default()
            },
        )
        .unwrap();

        assert_eq!(effective.endpoint, DEFAULT_PLAYGROUND_ENDPOINT);
        assert_eq!(
            effective.credentials,
            Credentials::Playground {
                token: "play-token".into()
            }
        );
    }

    #[test]
    fn errors_when_missing_endpoint_or_secret() {
        let (_guard, cwd) = isolated();

        let err = resolve(load(cwd.path()).unwrap(), Config::default()).unwrap_err();
        assert!(err.to_string().contains("endpoint is required"));

        let err = resolve(
            load(cwd.path()).unwrap(),
            Config {
                endpoint: Some("api.equinix.com".into()),
                client_id: Some("app".into()),
                client_secret: Some("   ".into()),
                ..Config::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("application secret is required"));
    }

    #[test]
    fn masks_secrets() {
        let config = Config {
            client_id: Some("app".into()),
            client_secret: Some("secret".into()),
            playground_token: Some("tok".into()),
            ..Config::default()
        };
        let shown = masked(&config);
        assert_eq!(shown.client_id.as_deref(), Some("app"));
        assert_eq!(shown.client_secret.as_deref(), Some("*****"));
        assert_eq!(shown.playground_token.as_deref(), Some("*****"));
        assert_eq!(shown.password, None);
    }

    #[test]
    fn explicit_file_replaces_user_and_local() {
        let (_guard, cwd) = isolated();
        let user_cfg = Config {
            endpoint: Some("api.equinix.com".into()),
            client_id: Some("user-app".into()),
            ..Config::default()
        };
        save(&config_path(Scope::User, cwd.path()).unwrap(), &user_cfg).unwrap();

        let custom = cwd.path().join("team.yaml");
        let team_cfg = Config {
            playground_token: Some("team-token".into()),
            ..Config::default()
        };
        save(&custom, &team_cfg).unwrap();

        let loaded = load_file(&custom).unwrap();
        assert_eq!(loaded, team_cfg);
        assert_eq!(loaded.client_id, None);

        let effective = resolve(loaded, Config::default()).unwrap();
        assert_eq!(
            effective.credentials,
            Credentials::Playground {
                token: "team-token".into()
            }
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let (_guard, cwd) = isolated();
        let missing = cwd.path().join("nope.yaml");

        let err = load_file(&missing).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert_eq!(load_or_default(&missing).unwrap(), Config::default());
    }
}
