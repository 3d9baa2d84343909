use super::*;

#[test]
fn parses_db_subcommands() {
    for (arg, expected) in [
        ("ping", "Ping"),
        ("migrate", "Migrate"),
        ("seed", "Seed"),
    ] {
        let cli = Cli::try_parse_from(["vibecheck-cli", "db", arg]).expect("expected valid cli args");
        let Some(Commands::Db { command }) = cli.command else {
            panic!("expected db command for {arg}");
        };
        assert_eq!(format!("{command:?}"), expected);
    }
}

#[test]
fn parses_run_job_names() {
    let cli = Cli::try_parse_from(["vibecheck-cli", "run", "news"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Run { job: JobArg::News })
    ));

    let cli =
        Cli::try_parse_from(["vibecheck-cli", "run", "stories"]).expect("expected valid cli args");
    let Some(Commands::Run { job }) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(JobKind::from(job).name(), "poll_stories");
}

#[test]
fn run_rejects_unknown_job() {
    assert!(Cli::try_parse_from(["vibecheck-cli", "run", "weekly"]).is_err());
    assert!(Cli::try_parse_from(["vibecheck-cli", "run"]).is_err());
}

#[test]
fn executions_defaults_limit_and_accepts_job_filter() {
    let cli = Cli::try_parse_from(["vibecheck-cli", "executions"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Executions {
            job_name: None,
            limit: 20
        })
    ));

    let cli = Cli::try_parse_from([
        "vibecheck-cli",
        "executions",
        "--job-name",
        "poll_news",
        "--limit",
        "5",
    ])
    .expect("expected valid cli args");
    let Some(Commands::Executions { job_name, limit }) = cli.command else {
        panic!("expected executions command");
    };
    assert_eq!(job_name.as_deref(), Some("poll_news"));
    assert_eq!(limit, 5);
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["vibecheck-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}
