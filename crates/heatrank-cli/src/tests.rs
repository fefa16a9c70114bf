use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["heatrank-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["heatrank-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["heatrank-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(!cli.json);
}

#[test]
fn collect_defaults_to_persisting_run() {
    let cli = Cli::try_parse_from(["heatrank-cli", "collect"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            dry_run: false,
            count: None
        })
    ));
}

#[test]
fn collect_dry_run_with_count() {
    let cli = Cli::try_parse_from(["heatrank-cli", "collect", "--dry-run", "--count", "5"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            dry_run: true,
            count: Some(5)
        })
    ));
}

#[test]
fn classify_takes_a_name_with_spaces() {
    let cli = Cli::try_parse_from([
        "heatrank-cli",
        "classify",
        "Quake Champions",
        "--viewers",
        "900",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Classify { ref name, viewers: 900 }) if name == "Quake Champions"
    ));
}

#[test]
fn classify_requires_a_name() {
    assert!(Cli::try_parse_from(["heatrank-cli", "classify"]).is_err());
}

#[test]
fn ranking_defaults() {
    let cli = Cli::try_parse_from(["heatrank-cli", "ranking"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Ranking {
            limit: 20,
            hours: 24,
            local: false
        })
    ));
}

#[test]
fn json_flag_is_global() {
    let cli = Cli::try_parse_from(["heatrank-cli", "trending", "--limit", "3", "--json"])
        .expect("expected valid cli args");
    assert!(cli.json);
    assert!(matches!(cli.command, Some(Commands::Trending { limit: 3 })));
}
