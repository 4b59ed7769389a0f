//! Validation-focused tests for configuration

#[cfg(test)]
mod validation_tests {
    use std::time::Duration;

    use crate::config::Config;
    use crate::Error;

    fn rejects(mutate: impl FnOnce(&mut Config)) -> bool {
        let mut config = Config::default();
        mutate(&mut config);
        matches!(config.validate(), Err(Error::InvalidConfig(_)))
    }

    #[test]
    fn test_zero_lease_rejected() {
        assert!(rejects(|c| c.lock.lease_ms = 0));
    }

    #[test]
    fn test_lease_beyond_century_rejected() {
        assert!(rejects(|c| c.lock.lease_ms = u64::MAX));
    }

    #[test]
    fn test_zero_connections_rejected() {
        assert!(rejects(|c| c.store.max_connections = 0));
    }

    #[test]
    fn test_blank_names_rejected() {
        assert!(rejects(|c| c.lock.name = "   ".into()));
        assert!(rejects(|c| c.lock.seed = vec!["ok".into(), String::new()]));
        assert!(rejects(|c| c.lock.owner = Some("\t".into())));
    }

    #[test]
    fn test_unsafe_table_name_rejected() {
        assert!(rejects(|c| c.store.table = "locks; DROP TABLE x".into()));
        assert!(rejects(|c| c.store.table = "1locks".into()));
    }

    #[test]
    fn test_zero_client_intervals_rejected() {
        assert!(rejects(|c| c.client.timeout_ms = 0));
        assert!(rejects(|c| c.client.poll_interval_ms = 0));
    }

    #[test]
    fn test_derived_durations() {
        let mut config = Config::default();
        config.lock.lease_ms = 1500;
        config.client.timeout_ms = 20;
        assert_eq!(config.lease(), Duration::from_millis(1500));
        assert_eq!(config.timeout(), Duration::from_millis(20));
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_seed_names_start_with_lock_and_dedupe() {
        let mut config = Config::default();
        config.lock.seed = vec!["a".into(), "default-mutex".into(), "a".into(), "b".into()];
        assert_eq!(config.seed_names(), vec!["default-mutex", "a", "b"]);
    }
}
