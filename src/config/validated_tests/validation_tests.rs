//! Tests for value validation.

use std::num::NonZeroU32;

use super::*;

fn site_block(name: &str) -> String {
    format!(
        "[[sites]]\nsite = \"{name}\"\nwebhook_url = \"https://{name}/webhook\"\n"
    )
}

mod sites {
    use super::*;

    #[test]
    fn duplicate_site_is_rejected() {
        let toml = toml(&format!(
            "{}{}",
            site_block("a.atlassian.net"),
            site_block("a.atlassian.net")
        ));

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::DuplicateSite(name)) if name == "a.atlassian.net"));
    }

    #[test]
    fn distinct_sites_are_kept_in_order() {
        let toml = toml(&format!(
            "{}{}",
            site_block("a.atlassian.net"),
            site_block("b.atlassian.net")
        ));

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();
        let names: Vec<_> = config.sites.sites().iter().map(|s| s.site.as_str()).collect();

        assert_eq!(names, ["a.atlassian.net", "b.atlassian.net"]);
    }
}

mod durations {
    use super::*;

    #[test]
    fn zero_timeout_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--timeout", "0"]), None);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration { field: "timeout", .. })
        ));
    }

    #[test]
    fn zero_connect_timeout_in_toml_is_rejected() {
        let toml = toml("[http]\nconnect_timeout = 0");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration {
                field: "connect_timeout",
                ..
            })
        ));
    }
}

mod rate_limit {
    use super::*;

    #[test]
    fn burst_defaults_to_rate() {
        let toml = toml("[rate_limit]\nrequests_per_minute = 30");

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();
        let limit = config.rate_limit.unwrap();

        assert_eq!(limit.requests_per_minute, NonZeroU32::new(30).unwrap());
        assert_eq!(limit.burst, NonZeroU32::new(30).unwrap());
    }

    #[test]
    fn explicit_burst_is_kept() {
        let toml = toml("[rate_limit]\nrequests_per_minute = 30\nburst = 5");

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();
        let limiter = config.rate_limit.unwrap().limiter();

        assert_eq!(limiter.burst(), NonZeroU32::new(5).unwrap());
    }

    #[test]
    fn zero_rate_is_rejected() {
        let toml = toml("[rate_limit]\nrequests_per_minute = 0");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::InvalidRateLimit(_))));
    }

    #[test]
    fn zero_burst_is_rejected() {
        let toml = toml("[rate_limit]\nrequests_per_minute = 10\nburst = 0");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::InvalidRateLimit(_))));
    }

    #[test]
    fn burst_without_rate_is_rejected() {
        let toml = toml("[rate_limit]\nburst = 3");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::InvalidRateLimit(_))));
    }
}

mod retry {
    use super::*;

    #[test]
    fn zero_attempts_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--retry-max", "0"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidRetry(_))));
    }

    #[test]
    fn zero_initial_delay_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--retry-delay", "0"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidRetry(_))));
    }

    #[test]
    fn non_positive_multiplier_is_rejected() {
        let toml = toml("[retry]\nmultiplier = 0.0");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::InvalidRetry(_))));
    }

    #[test]
    fn max_delay_below_initial_is_rejected() {
        let toml = toml("[retry]\ninitial_delay = 10\nmax_delay = 5");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::InvalidRetry(msg)) if msg.contains("max_delay")));
    }
}

mod stage_pattern {
    use super::*;

    #[test]
    fn custom_pattern_is_compiled() {
        let toml = toml("[auto_deployments]\nregex = '^(?<envName>\\w+)-rollout$'");

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert!(config.stage_pattern.is_match("staging-rollout"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let toml = toml("[auto_deployments]\nregex = '^deploy to ('");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::InvalidRegex { .. })));
    }

    #[test]
    fn pattern_without_env_group_is_rejected() {
        let toml = toml("[auto_deployments]\nregex = '^deploy to (.*)$'");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::MissingCaptureGroup {
                group: "envName",
                ..
            })
        ));
    }
}
