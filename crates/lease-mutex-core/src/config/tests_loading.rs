//! Loading-focused tests for configuration
//!
//! File parsing, explicit paths, environment overrides and CLI precedence.

#[cfg(test)]
mod loading_tests {
    use std::{collections::HashMap, io::Write};

    use serial_test::serial;

    use crate::config::{
        global_config_path, load_config, load_toml_file, project_config_path, Config,
        PartialConfig, PartialLockConfig,
    };
    use crate::{Error, Result};

    fn write_config(dir: &tempfile::TempDir, body: &str) -> Result<std::path::PathBuf> {
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path)?;
        file.write_all(body.as_bytes())?;
        Ok(path)
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_paths_point_at_config_toml() -> Result<()> {
        assert!(project_config_path()?.ends_with(".lease-mutex/config.toml"));
        if let Some(global) = global_config_path() {
            assert!(global.ends_with("config.toml"));
        }
        Ok(())
    }

    #[test]
    fn test_partial_file_only_sets_named_fields() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_config(
            &dir,
            "[lock]\nname = \"reports\"\nseed = [\"compaction\"]\n\n[client]\ntimeout_ms = 250\n",
        )?;

        let config = Config::default().merge(load_toml_file(&path)?);
        assert_eq!(config.lock.name, "reports");
        assert_eq!(config.lock.seed, vec!["compaction".to_string()]);
        assert_eq!(config.client.timeout_ms, 250);
        assert_eq!(config.lock.lease_ms, 1000);
        Ok(())
    }

    #[test]
    fn test_malformed_toml_returns_parse_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_config(&dir, "[lock\nname = ")?;
        let result = load_toml_file(&path);
        assert!(matches!(result, Err(Error::ParseError(_))), "{result:?}");
        Ok(())
    }

    #[test]
    fn test_unknown_key_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_config(&dir, "[lock]\nlease_seconds = 5\n")?;
        assert!(matches!(load_toml_file(&path), Err(Error::ParseError(_))));
        Ok(())
    }

    #[test]
    fn test_directory_path_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let result = load_toml_file(dir.path());
        assert!(matches!(result, Err(Error::IoError(msg)) if msg.contains("directory")));
        Ok(())
    }

    #[test]
    fn test_env_overrides_applied() -> Result<()> {
        let config = Config::default().apply_env_with(env(&[
            ("LEASE_MUTEX_DATABASE_URL", "sqlite::memory:"),
            ("LEASE_MUTEX_TABLE", "locks_v2"),
            ("LEASE_MUTEX_LOCK_NAME", "nightly"),
            ("LEASE_MUTEX_OWNER", "worker-7"),
            ("LEASE_MUTEX_LEASE_MS", "2500"),
            ("LEASE_MUTEX_TIMEOUT_MS", " 40 "),
        ]))?;
        assert_eq!(config.store.database_url, "sqlite::memory:");
        assert_eq!(config.store.table, "locks_v2");
        assert_eq!(config.lock.name, "nightly");
        assert_eq!(config.owner(), "worker-7");
        assert_eq!(config.lock.lease_ms, 2500);
        assert_eq!(config.client.timeout_ms, 40);
        Ok(())
    }

    #[test]
    fn test_env_bad_number_is_invalid_config() {
        let result = Config::default().apply_env_with(env(&[("LEASE_MUTEX_LEASE_MS", "soon")]));
        assert!(matches!(result, Err(Error::InvalidConfig(msg)) if msg.contains("LEASE_MUTEX_LEASE_MS")));
    }

    #[test]
    fn test_env_blank_owner_rejected() {
        let result = Config::default().apply_env_with(env(&[("LEASE_MUTEX_OWNER", "  ")]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    #[serial]
    fn test_explicit_file_then_env_then_cli() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_config(&dir, "[lock]\nname = \"from-file\"\nlease_ms = 700\n")?;

        std::env::set_var("LEASE_MUTEX_LEASE_MS", "900");
        let overrides = PartialConfig {
            lock: PartialLockConfig {
                name: Some("from-cli".into()),
                ..PartialLockConfig::default()
            },
            ..PartialConfig::default()
        };
        let loaded = load_config(Some(&path), overrides);
        std::env::remove_var("LEASE_MUTEX_LEASE_MS");

        let config = loaded?;
        assert_eq!(config.lock.name, "from-cli");
        assert_eq!(config.lock.lease_ms, 900);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let result = load_config(Some(&dir.path().join("absent.toml")), PartialConfig::default());
        assert!(matches!(result, Err(Error::IoError(_))));
        Ok(())
    }
}
