use clap::{CommandFactory, FromArgMatches, Parser};
use modforge::config::{Config, OptimizerSettings, SearchParams};
use modforge::error::ModForgeError;
use modforge::stats::Fixed;
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    config: Config,
}

fn parse(args: &[&str]) -> (Config, clap::ArgMatches) {
    let matches = TestCli::command()
        .try_get_matches_from(std::iter::once("modforge").chain(args.iter().copied()))
        .unwrap();
    let cli = TestCli::from_arg_matches(&matches).unwrap();
    (cli.config, matches)
}

fn write_json(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults_match_settings() {
    let config = Config::default();
    assert!(!config.settings.force_complete_sets);
    assert!(!config.settings.lock_unselected_characters);
    assert_eq!(config.settings.mod_change_threshold, 0.0);
    assert!(config.settings.optimize_with_primary_and_set_restrictions);
    assert!(config.search.validate().is_ok());
}

#[test]
fn test_cli_defaults_equal_struct_defaults() {
    let (cli, _) = parse(&[]);
    let defaults = Config::default();
    assert_eq!(cli.search.shortlist_size, defaults.search.shortlist_size);
    assert_eq!(cli.search.goal_ladder, defaults.search.goal_ladder);
    assert_eq!(
        cli.settings.optimize_with_primary_and_set_restrictions,
        defaults.settings.optimize_with_primary_and_set_restrictions
    );
}

#[test]
fn test_partial_json_fills_defaults() {
    let file = write_json(r#"{ "settings": { "mod_change_threshold": 15.0 } }"#);
    let config = Config::load_from_file(file.path()).unwrap();

    assert_eq!(config.settings.mod_change_threshold, 15.0);
    assert!(config.settings.optimize_with_primary_and_set_restrictions);
    assert_eq!(
        config.search.shortlist_size,
        SearchParams::default().shortlist_size
    );
}

#[test]
fn test_file_with_bad_ladder_is_rejected() {
    let file = write_json(r#"{ "search": { "goal_ladder": "1,-2" } }"#);
    let err = Config::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ModForgeError::Config(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Config::load_from_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ModForgeError::Io(_)));
}

#[test]
fn test_cli_overrides_only_typed_values() {
    let mut config = Config {
        settings: OptimizerSettings {
            mod_change_threshold: 10.0,
            force_complete_sets: true,
            ..Default::default()
        },
        search: SearchParams {
            shortlist_size: 3,
            ..Default::default()
        },
    };
    let (cli, matches) = parse(&["--shortlist-size", "9", "--lock-unselected-characters"]);
    config.merge_from_cli(&cli, &matches);

    assert_eq!(config.search.shortlist_size, 9);
    assert!(config.settings.lock_unselected_characters);
    // untouched on the command line, so the file values survive
    assert_eq!(config.settings.mod_change_threshold, 10.0);
    assert!(config.settings.force_complete_sets);
}

#[test]
fn test_restrictions_flag_takes_a_value() {
    let (cli, _) = parse(&["--optimize-with-primary-and-set-restrictions", "false"]);
    assert!(!cli.settings.optimize_with_primary_and_set_restrictions);
}

#[test]
fn test_custom_ladder_parsing() {
    let params = SearchParams {
        goal_ladder: "0.5, 1, ,4".to_string(),
        ..Default::default()
    };
    let ladder = params.get_goal_ladder().unwrap();
    assert_eq!(
        ladder,
        vec![Fixed::from_f64(0.5), Fixed::ONE, Fixed::from_int(4)]
    );
}

#[test]
fn test_zero_shortlist_is_invalid() {
    let params = SearchParams {
        shortlist_size: 0,
        ..Default::default()
    };
    assert!(matches!(params.validate(), Err(ModForgeError::Config(_))));
}
