use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn script_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("parcel_ledger_cli").unwrap();
    cmd.env("PARCEL_LEDGER_HOME", home.path())
        .env("PARCEL_LEDGER_CLI_SCRIPT", "1")
        .env("PARCEL_LEDGER_TODAY", "2025-01-15")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_records_days_and_summarizes() {
    let home = TempDir::new().unwrap();
    let input = "\
# two days of deliveries
add 2025-01-14 6 2 20000 8000 0
add today 5 1 15000 6000 0
summary
exit
";

    script_cmd(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Recorded 2025-01-14"))
        .stdout(contains("Recorded 2025-01-15"))
        .stdout(contains("Monthly parcel deficit: 5"))
        .stdout(contains("Real deficit of 5 parcel(s)"));

    let csv = std::fs::read_to_string(home.path().join("ledgers").join("2025_01.csv")).unwrap();
    assert!(csv.starts_with("date,orders_placed,orders_delivered,orders_lost,"));
    assert!(csv.contains("2025-01-15,5,1,4,"));
}

#[test]
fn edit_and_delete_rewrite_the_month() {
    let home = TempDir::new().unwrap();
    let input = "\
add 3 4 4 40000 10000 0
add 4 4 0 0 5000 0
edit 4 4 4 40000 10000 0
delete 3
list
summary 10
";

    script_cmd(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Updated 2025-01-04"))
        .stdout(contains("Deleted 2025-01-03"))
        .stdout(contains("No parcel deficit"))
        .stdout(contains("over 10 day(s)"));

    let backups = std::fs::read_dir(home.path().join("backups").join("2025_01"))
        .unwrap()
        .count();
    assert!(backups >= 1);
}

#[test]
fn command_errors_do_not_stop_the_script() {
    let home = TempDir::new().unwrap();
    let input = "\
add 2025-01-02 1 1 0 0 0
add 2025-01-02 1 1 0 0 0
edit 2025-01-20 1 1 0 0 0
add 2025-01-03 -1 0 0 0 0
sumary
summary
";

    script_cmd(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Suggestion: `summary`?"))
        .stdout(contains("Monthly parcel deficit: 3"))
        .stderr(contains("already"))
        .stderr(contains("2025-01-20"));
}

#[test]
fn open_switches_months() {
    let home = TempDir::new().unwrap();
    let input = "\
open 2024-12
add 31 4 1 0 0 0
open 2025-01
list
";

    script_cmd(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Started a new ledger for 2024-12"))
        .stdout(contains("No days recorded yet."));

    assert!(home.path().join("ledgers").join("2024_12.csv").exists());
}

#[test]
fn config_set_persists_and_rederives_the_month() {
    let home = TempDir::new().unwrap();
    let input = "\
add 2025-01-10 4 4 50000 10000 6850
config set tax_rate 1.0
config set monthly_goal 80000
config set tax_rate 1e40
config set colour blue
list
";

    script_cmd(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Set tax_rate = 1.0"))
        .stdout(contains("Set monthly_goal = 80000"))
        .stderr(contains("tax_rate must be a fraction"))
        .stderr(contains("unknown setting `colour`"));

    let config = std::fs::read_to_string(home.path().join("config.json")).unwrap();
    assert!(config.contains("\"tax_rate\": 1.0"));
    assert!(config.contains("\"monthly_goal\": 80000"));

    let csv = std::fs::read_to_string(home.path().join("ledgers").join("2025_01.csv")).unwrap();
    assert!(csv.contains(",50000,10000,6850,13700,26300,"));
}
