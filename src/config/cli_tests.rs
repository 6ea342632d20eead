//! Tests for CLI argument parsing.

use std::path::{Path, PathBuf};

use clap::Parser;

use super::cli::{Cli, Command, EnvironmentTypeArg, is_stdin};
use crate::notify::EnvironmentType;

mod parsing {
    use super::*;

    #[test]
    fn parse_build_with_payload_file() {
        let cli = Cli::parse_from_iter(["jira-notify", "build", "--payload", "build.json"]);

        match cli.command {
            Command::Build { payload } => assert_eq!(payload, PathBuf::from("build.json")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn payload_defaults_to_stdin() {
        let cli = Cli::parse_from_iter(["jira-notify", "build"]);

        match cli.command {
            Command::Build { payload } => assert!(is_stdin(&payload)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_deployment_options() {
        let cli = Cli::parse_from_iter([
            "jira-notify",
            "deployment",
            "-p",
            "deploy.json",
            "--environment",
            "prod-east-1",
            "--environment-type",
            "production",
        ]);

        match cli.command {
            Command::Deployment {
                payload,
                environment,
                environment_type,
                stage,
            } => {
                assert_eq!(payload, PathBuf::from("deploy.json"));
                assert_eq!(environment.as_deref(), Some("prod-east-1"));
                assert_eq!(environment_type, Some(EnvironmentTypeArg::Production));
                assert_eq!(stage, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn deployment_environment_type_is_optional() {
        let cli = Cli::parse_from_iter(["jira-notify", "deployment", "--stage", "deploy to qa"]);

        match cli.command {
            Command::Deployment {
                environment_type,
                stage,
                ..
            } => {
                assert_eq!(environment_type, None);
                assert_eq!(stage.as_deref(), Some("deploy to qa"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn environment_conflicts_with_stage() {
        let result = Cli::try_parse_from([
            "jira-notify",
            "deployment",
            "--environment",
            "qa",
            "--stage",
            "deploy to qa",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn environment_type_requires_environment_or_stage() {
        let result = Cli::try_parse_from([
            "jira-notify",
            "deployment",
            "--environment-type",
            "production",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn environment_type_with_stage() {
        let cli = Cli::parse_from_iter([
            "jira-notify",
            "deployment",
            "--stage",
            "deploy to qa",
            "--environment-type",
            "testing",
        ]);

        match cli.command {
            Command::Deployment {
                environment_type, ..
            } => assert_eq!(environment_type, Some(EnvironmentTypeArg::Testing)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from_iter([
            "jira-notify",
            "build",
            "--site",
            "example.atlassian.net",
            "--timeout",
            "5",
            "--connect-timeout",
            "2",
            "--retry-max",
            "3",
            "--retry-delay",
            "1",
            "--dry-run",
            "-v",
            "-c",
            "custom.toml",
        ]);

        assert_eq!(cli.site.as_deref(), Some("example.atlassian.net"));
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.connect_timeout, Some(2));
        assert_eq!(cli.retry_max, Some(3));
        assert_eq!(cli.retry_delay, Some(1));
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn default_values() {
        let cli = Cli::parse_from_iter(["jira-notify", "sites"]);

        assert!(matches!(cli.command, Command::Sites));
        assert_eq!(cli.config, None);
        assert_eq!(cli.site, None);
        assert_eq!(cli.timeout, None);
        assert_eq!(cli.retry_max, None);
        assert!(!cli.dry_run);
        assert!(!cli.verbose);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["jira-notify"]).is_err());
    }
}

mod init {
    use super::*;

    #[test]
    fn parse_init_with_default_output() {
        let cli = Cli::parse_from_iter(["jira-notify", "init"]);

        match cli.command {
            Command::Init { output } => assert_eq!(output, PathBuf::from("jira-notify.toml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_init_with_custom_output() {
        let cli = Cli::parse_from_iter(["jira-notify", "init", "-o", "custom.toml"]);

        match cli.command {
            Command::Init { output } => assert_eq!(output, PathBuf::from("custom.toml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn init_does_not_accept_payload() {
        assert!(Cli::try_parse_from(["jira-notify", "init", "--payload", "x.json"]).is_err());
    }
}

mod environment_type_arg {
    use super::*;

    #[test]
    fn maps_to_environment_type() {
        assert_eq!(
            EnvironmentType::from(EnvironmentTypeArg::Staging),
            EnvironmentType::Staging
        );
        assert_eq!(
            EnvironmentType::from(EnvironmentTypeArg::Unmapped),
            EnvironmentType::Unmapped
        );
    }

    #[test]
    fn invalid_value_is_rejected() {
        let result = Cli::try_parse_from([
            "jira-notify",
            "deployment",
            "--environment-type",
            "prod",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn stdin_marker() {
        assert!(is_stdin(Path::new("-")));
        assert!(!is_stdin(Path::new("payload.json")));
    }
}
