use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn almanac() -> Command {
    Command::cargo_bin("almanac").unwrap()
}

fn json_output(args: &[&str]) -> Value {
    let output = almanac().args(args).output().unwrap();
    assert!(output.status.success(), "{output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Write `body` to a per-test file in the temp dir.
fn temp_file(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("almanac-cli-{}-{name}", std::process::id()));
    fs::write(&path, body).unwrap();
    path
}

// ── day ─────────────────────────────────────────────────────────────────────

#[test]
fn test_day_spring_festival() {
    let day = json_output(&["day", "2024-02-10"]);
    assert_eq!(day["date"], "2024-02-10");
    assert_eq!(day["lunar"]["year"], 2024);
    assert_eq!(day["lunar"]["month"], 1);
    assert_eq!(day["lunar"]["day"], 1);
    assert_eq!(day["lunar"]["day_name"], "初一");
    assert_eq!(day["festival"], "春节");
    assert_eq!(day["subtitle"], "春节");
    assert_eq!(day["solar_term"]["name"], "立春");
    assert_eq!(day["solar_term"]["day"], 7);
    assert_eq!(day["eight_chars"]["year"], "甲辰");
    assert_eq!(day["eight_chars"]["day"], "甲辰");
    assert_eq!(day["eight_chars"]["hour"], "庚午");
    assert_eq!(day["western_zodiac"]["name"], "水瓶座");
    assert_eq!(day["lucky_hours"].as_array().unwrap().len(), 13);
}

#[test]
fn test_day_time_sets_hour_pillar() {
    let day = json_output(&["day", "2024-02-10", "--time", "00:30"]);
    assert_eq!(day["eight_chars"]["hour"], "甲子");
}

#[test]
fn test_day_outside_tables_is_null() {
    let day = json_output(&["day", "2150-01-01"]);
    assert!(day["lunar"].is_null());
    assert!(day["eight_chars"].is_null());
    assert_eq!(day["western_zodiac"]["name"], "摩羯座");
}

#[test]
fn test_day_rejects_bad_date() {
    almanac()
        .args(["day", "2024-02-30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ── terms ───────────────────────────────────────────────────────────────────

#[test]
fn test_terms_2024() {
    let terms = json_output(&["terms", "2024"]);
    let terms = terms.as_array().unwrap();
    assert_eq!(terms.len(), 24);
    assert_eq!(terms[0]["name"], "小寒");
    assert_eq!(terms[0]["date"], "2024-01-06");
    assert_eq!(terms[23]["name"], "冬至");
    assert_eq!(terms[23]["date"], "2024-12-21");
}

#[test]
fn test_terms_out_of_range_fails() {
    almanac()
        .args(["terms", "1900"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no solar term data for 1900"));
}

// ── next ────────────────────────────────────────────────────────────────────

#[test]
fn test_next_one_time() {
    let base = ["next", "--kind", "one-time", "--time", "07:50", "--day", "2024-06-26"];
    almanac()
        .args(base)
        .args(["--after", "2024-06-26T07:49"])
        .assert()
        .success()
        .stdout("2024-06-26T07:50:00\n");
    almanac()
        .args(base)
        .args(["--after", "2024-06-26T07:51"])
        .assert()
        .success()
        .stdout("none\n");
}

#[test]
fn test_next_weekly_without_weekday_is_none() {
    almanac()
        .args(["next", "--kind", "every-week", "--time", "07:50"])
        .args(["--after", "2024-06-26T07:00"])
        .assert()
        .success()
        .stdout("none\n");
}

#[test]
fn test_next_weekly() {
    almanac()
        .args(["next", "--kind", "every-week", "--time", "07:50", "--weekday", "mon"])
        .args(["--after", "2024-06-26T07:00"])
        .assert()
        .success()
        .stdout("2024-07-01T07:50:00\n");
}

#[test]
fn test_next_leap_day_yearly() {
    almanac()
        .args(["next", "--kind", "every-year", "--time", "07:50"])
        .args(["--month", "2", "--month-day", "29"])
        .args(["--after", "1896-02-29T07:51"])
        .assert()
        .success()
        .stdout("1904-02-29T07:50:00\n");
}

#[test]
fn test_next_impossible_date_exits_non_zero() {
    almanac()
        .args(["next", "--kind", "every-year", "--time", "07:50"])
        .args(["--month", "2", "--month-day", "30"])
        .args(["--after", "2024-01-01T00:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scan exceeded"));
}

#[test]
fn test_next_rejects_invalid_field() {
    almanac()
        .args(["next", "--kind", "every-year", "--time", "07:50"])
        .args(["--month", "13", "--month-day", "1"])
        .args(["--after", "2024-01-01T00:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid alarm"));
}

#[test]
fn test_next_work_day_with_holiday_file() {
    let mut entries = vec![
        r#""09-29":{"holiday":false,"name":"国庆节前补班","wage":1,"date":"2024-09-29"}"#
            .to_string(),
    ];
    for day in 1..=7 {
        entries.push(format!(
            r#""10-{day:02}":{{"holiday":true,"name":"国庆节","wage":2,"date":"2024-10-{day:02}"}}"#
        ));
    }
    let body = format!(r#"{{"code":0,"holiday":{{{}}}}}"#, entries.join(","));
    let path = temp_file("holidays.json", &body);
    let path = path.to_str().unwrap();

    // Saturday: the Sunday make-up day is a work day.
    almanac()
        .args(["next", "--kind", "work-day", "--time", "07:50", "--holidays", path])
        .args(["--after", "2024-09-28T09:00"])
        .assert()
        .success()
        .stdout("2024-09-29T07:50:00\n");

    // Monday evening: the whole national-day week is off.
    almanac()
        .args(["next", "--kind", "work-day", "--time", "07:50", "--holidays", path])
        .args(["--after", "2024-09-30T09:00"])
        .assert()
        .success()
        .stdout("2024-10-08T07:50:00\n");
}

#[test]
fn test_next_work_day_defaults_to_weekends() {
    almanac()
        .args(["next", "--kind", "work-day", "--time", "07:50"])
        .args(["--after", "2024-06-28T09:00"])
        .assert()
        .success()
        .stdout("2024-07-01T07:50:00\n");
}

#[test]
fn test_next_bad_holiday_file() {
    let path = temp_file("broken.json", "{not json");
    almanac()
        .args(["next", "--kind", "work-day", "--time", "07:50"])
        .args(["--holidays", path.to_str().unwrap()])
        .args(["--after", "2024-06-28T09:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}
