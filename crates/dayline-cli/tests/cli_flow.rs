//! End-to-end tests driving the `dayline` binary against temp notes.
//!
//! Events come from an `--events-json` fixture so no network access is
//! needed. `TZ=UTC` pins the local zone and `HOME` isolates config lookup.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const EVENTS: &str = r#"{
  "items": [
    {
      "summary": "Sleep",
      "start": {"dateTime": "2024-10-21T23:30:00Z"},
      "end": {"dateTime": "2024-10-22T07:00:00Z"}
    },
    {
      "summary": "Standup",
      "colorId": "5",
      "start": {"dateTime": "2024-10-22T09:00:00Z"},
      "end": {"dateTime": "2024-10-22T09:15:00Z"}
    },
    {
      "summary": "Holiday",
      "start": {"date": "2024-10-22"},
      "end": {"date": "2024-10-23"}
    },
    {
      "summary": "Lunch",
      "colorId": "2",
      "start": {"dateTime": "2024-10-22T12:00:00Z"},
      "end": {"dateTime": "2024-10-22T13:00:00Z"}
    },
    {
      "summary": "Sleep",
      "start": {"dateTime": "2024-10-22T23:00:00Z"},
      "end": {"dateTime": "2024-10-23T07:00:00Z"}
    },
    {
      "summary": "Breakfast",
      "start": {"dateTime": "2024-10-23T07:30:00Z"},
      "end": {"dateTime": "2024-10-23T08:00:00Z"}
    }
  ]
}"#;

struct Fixture {
    temp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("events.json"), EVENTS).unwrap();
        Self { temp }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.temp.path().join(name)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_dayline"));
        command
            .env("HOME", self.temp.path())
            .env("XDG_CONFIG_HOME", self.temp.path().join(".config"))
            .env("XDG_DATA_HOME", self.temp.path().join(".local/share"))
            .env("TZ", "UTC")
            .env_remove("RUST_LOG");
        command
    }

    fn day(&self, extra: &[&str]) -> Output {
        self.command()
            .arg("day")
            .arg("2024-10-22")
            .arg("--events-json")
            .arg(self.path("events.json"))
            .args(extra)
            .output()
            .expect("failed to run dayline day")
    }

    fn day_with_file(&self, note: &Path, extra: &[&str]) -> Output {
        let mut args = vec!["--file", note.to_str().unwrap()];
        args.extend_from_slice(extra);
        self.day(&args)
    }
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "dayline failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn titles(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let start = line.find("**")? + 2;
            let end = line[start..].find("**")? + start;
            Some(line[start..end].to_string())
        })
        .collect()
}

#[test]
fn test_day_prints_rendered_lines() {
    let fixture = Fixture::new();
    let output = stdout(&fixture.day(&[]));

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("07:00 AM - "));
    assert!(lines[1].starts_with("09:00 AM - "));
    assert!(lines[1].contains("background-color: #"));
    assert!(lines[2].starts_with("12:00 PM - "));
    assert!(lines[3].starts_with("11:00 PM - "));
    assert_eq!(titles(&output), ["Wake Up", "Standup", "Lunch", "Sleep"]);
}

#[test]
fn test_day_json_includes_window_and_lines() {
    let fixture = Fixture::new();
    let output = stdout(&fixture.day(&["--json"]));
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["date"], "2024-10-22");
    assert_eq!(value["window"]["start"], "2024-10-22T07:00:00Z");
    assert_eq!(value["window"]["end"], "2024-10-22T23:00:00Z");
    assert_eq!(value["events"].as_array().unwrap().len(), 4);
    assert_eq!(value["events"][0]["marker"], "wake_up");
    assert_eq!(value["lines"].as_array().unwrap().len(), 4);
}

#[test]
fn test_day_reconciles_note_idempotently() {
    let fixture = Fixture::new();
    let note = fixture.path("2024-10-22.md");
    let old = r#"<span style="display: inline-block; background-color: #000;"></span>"#;
    fs::write(
        &note,
        format!(
            "# Tuesday\n\n## Schedule\n\n08:00 AM - {old} **Old one**\n10:00 AM - {old} **Old two**\n\n## Notes\nkeep me\n"
        ),
    )
    .unwrap();

    let first = stdout(&fixture.day_with_file(&note, &[]));
    assert_eq!(first, "SUCCESS:2 updated, 0 deleted, 2 added\n");
    let content = fs::read_to_string(&note).unwrap();
    assert!(content.starts_with("# Tuesday\n\n## Schedule\n\n07:00 AM - "));
    assert!(content.ends_with("**Sleep**\n\n## Notes\nkeep me\n"));
    assert_eq!(titles(&content), ["Wake Up", "Standup", "Lunch", "Sleep"]);

    let second = stdout(&fixture.day_with_file(&note, &[]));
    assert_eq!(second, "SUCCESS:4 updated, 0 deleted, 0 added\n");
    assert_eq!(fs::read_to_string(&note).unwrap(), content);
}

#[test]
fn test_day_leaves_note_without_events_untouched() {
    let fixture = Fixture::new();
    let note = fixture.path("empty.md");
    fs::write(&note, "# Tuesday\n\nNo schedule yet.\n").unwrap();

    let output = stdout(&fixture.day_with_file(&note, &[]));
    assert_eq!(output, "NO_EXISTING_EVENTS\n");
    assert_eq!(
        fs::read_to_string(&note).unwrap(),
        "# Tuesday\n\nNo schedule yet.\n"
    );

    let output = stdout(&fixture.day_with_file(&note, &["--append"]));
    assert_eq!(output, "APPENDED:4 events\n");
    let content = fs::read_to_string(&note).unwrap();
    assert!(content.starts_with("# Tuesday\n\nNo schedule yet.\n07:00 AM - "));
    assert_eq!(titles(&content), ["Wake Up", "Standup", "Lunch", "Sleep"]);
}

#[test]
fn test_config_file_selects_keyed_merge_and_theme() {
    let fixture = Fixture::new();
    let config = fixture.path("config.toml");
    fs::write(&config, "merge_strategy = \"keyed\"\ntheme = \"classic\"\n").unwrap();

    let note = fixture.path("keyed.md");
    let old = r#"<span style="display: inline-block; background-color: #000;"></span>"#;
    fs::write(
        &note,
        format!("09:00 AM - {old} **Standup**\n03:00 PM - {old} **Dentist**\n"),
    )
    .unwrap();

    let output = fixture
        .command()
        .arg("--config")
        .arg(&config)
        .arg("day")
        .arg("2024-10-22")
        .arg("--events-json")
        .arg(fixture.path("events.json"))
        .arg("--file")
        .arg(&note)
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "SUCCESS:1 updated, 0 deleted, 3 added\n");

    let content = fs::read_to_string(&note).unwrap();
    assert_eq!(
        titles(&content),
        ["Standup", "Dentist", "Wake Up", "Lunch", "Sleep"]
    );
    assert!(content.contains("background-color: #e1e1e1;"));
}

#[test]
fn test_env_overrides_theme() {
    let fixture = Fixture::new();
    let dark = stdout(&fixture.day(&[]));
    assert!(dark.contains("background-color: #7c7c7c;"));

    let output = fixture
        .command()
        .env("DAYLINE_THEME", "classic")
        .arg("day")
        .arg("2024-10-22")
        .arg("--events-json")
        .arg(fixture.path("events.json"))
        .output()
        .unwrap();
    let classic = stdout(&output);
    assert!(classic.contains("background-color: #e1e1e1;"));
    assert!(!classic.contains("#7c7c7c"));
}

#[test]
fn test_window_json() {
    let fixture = Fixture::new();
    let output = fixture
        .command()
        .arg("window")
        .arg("2024-10-22")
        .arg("--events-json")
        .arg(fixture.path("events.json"))
        .arg("--json")
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["start"], "2024-10-22T07:00:00Z");
    assert_eq!(value["end"], "2024-10-22T23:00:00Z");
    assert_eq!(value["duration_minutes"], 960);
}

#[test]
fn test_invalid_date_fails_before_touching_note() {
    let fixture = Fixture::new();
    let note = fixture.path("note.md");
    fs::write(&note, "keep\n").unwrap();

    let output = fixture
        .command()
        .arg("day")
        .arg("22/10/2024")
        .arg("--file")
        .arg(&note)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid date"));
    assert_eq!(fs::read_to_string(&note).unwrap(), "keep\n");
}

#[test]
fn test_date_at_calendar_limit_is_rejected() {
    let fixture = Fixture::new();
    let output = fixture
        .command()
        .arg("window")
        .arg("+262142-12-31")
        .arg("--events-json")
        .arg(fixture.path("events.json"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid date"), "{stderr}");
    assert!(!stderr.contains("panicked"), "{stderr}");
}

#[test]
fn test_auth_status_without_token() {
    let fixture = Fixture::new();
    let output = fixture
        .command()
        .arg("auth")
        .arg("status")
        .output()
        .unwrap();
    assert!(stdout(&output).starts_with("No token stored at "));
}

#[test]
fn test_fetch_without_credentials_fails() {
    let fixture = Fixture::new();
    let output = fixture
        .command()
        .env_remove("DAYLINE_CLIENT_ID")
        .env_remove("DAYLINE_CLIENT_SECRET")
        .arg("day")
        .arg("2024-10-22")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("OAuth client is not configured"));
}
