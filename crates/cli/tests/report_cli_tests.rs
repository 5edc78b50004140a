// Integration tests for `rulemerge run` / `rulemerge validate`.
//
// Run with: cargo test -p rulemerge-cli --test report_cli_tests

use std::path::Path;
use std::process::Command;

fn rulemerge() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rulemerge"))
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

const REPORT_CONFIG: &str = r#"
name = "Rule change report"

[primary]
file = "combined.csv"
label = "Rule Name"

[secondary]
file = "fixed.csv"
label = "Rule Name"
required = false

[[normalize]]
pattern = " - linux"
replace = ""

[output]
file = "final.csv"
label = "Rule Name"

[[output.carry]]
source = "Command Count"
name = "Command Count"

[[output.compare]]
source = "Match Events"
original = "Original Match Events"
fixed = "Fixed Match Events"
change = "Match Events Change"

[[output.compare]]
source = "Bypass Rate (%)"
original = "Original Bypass Rate (%)"
fixed = "Fixed Bypass Rate (%)"
change = "Bypass Rate Change (%)"
kind = "rate"
"#;

const PRIMARY_CSV: &str = "\
Rule Name,Command Count,Match Events,Bypass Rate (%)
Shell Execution via Flock - Linux,5,4,20.00
Orphan Rule,3,7,10.00
GRAND TOTAL,8,11,15.00
";

const SECONDARY_CSV: &str = "\
Rule Name,Match Events,Bypass Rate (%)
Shell Execution via Flock,6,10.00
TOTAL,6,10.00
";

const EXPECTED_FINAL: &str = "\
Rule Name,Command Count,Original Match Events,Fixed Match Events,Match Events Change,Original Bypass Rate (%),Fixed Bypass Rate (%),Bypass Rate Change (%)
Shell Execution via Flock - Linux,5,4,6,2,20.00,10.00,-10.00
Orphan Rule,3,7,,,10.00,,
GRAND TOTAL,8,11,6,-5,15.00,10.00,-5.00
";

#[test]
fn run_writes_change_report() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "report.toml", REPORT_CONFIG);
    write(dir.path(), "combined.csv", PRIMARY_CSV);
    write(dir.path(), "fixed.csv", SECONDARY_CSV);

    let output = rulemerge()
        .args(["run", dir.path().join("report.toml").to_str().unwrap()])
        .output()
        .expect("rulemerge run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let final_csv = std::fs::read_to_string(dir.path().join("final.csv")).unwrap();
    assert_eq!(final_csv, EXPECTED_FINAL);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("matched 2 of 3 rows"), "stderr: {stderr}");
}

#[test]
fn run_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "report.toml", REPORT_CONFIG);
    write(dir.path(), "combined.csv", PRIMARY_CSV);
    write(dir.path(), "fixed.csv", SECONDARY_CSV);
    let config = dir.path().join("report.toml");

    assert!(rulemerge().args(["run", config.to_str().unwrap()]).output().unwrap().status.success());
    let first = std::fs::read(dir.path().join("final.csv")).unwrap();

    assert!(rulemerge().args(["run", config.to_str().unwrap()]).output().unwrap().status.success());
    let second = std::fs::read(dir.path().join("final.csv")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn missing_optional_secondary_yields_blank_columns() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "report.toml", REPORT_CONFIG);
    write(dir.path(), "combined.csv", PRIMARY_CSV);
    // no fixed.csv on disk

    let output = rulemerge()
        .args(["run", dir.path().join("report.toml").to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let final_csv = std::fs::read_to_string(dir.path().join("final.csv")).unwrap();
    for line in final_csv.lines().skip(1) {
        // Fixed Match Events and all change columns stay blank
        assert!(line.ends_with(",,"), "line: {line}");
    }
}

#[test]
fn missing_required_primary_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "report.toml", REPORT_CONFIG);
    write(dir.path(), "fixed.csv", SECONDARY_CSV);

    let output = rulemerge()
        .args(["run", dir.path().join("report.toml").to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("primary input not found"), "stderr: {stderr}");
}

#[test]
fn missing_label_column_exits_with_column_code() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "report.toml", REPORT_CONFIG);
    write(dir.path(), "combined.csv", "Name,Command Count\nA,1\n");
    write(dir.path(), "fixed.csv", SECONDARY_CSV);

    let output = rulemerge()
        .args(["run", dir.path().join("report.toml").to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing column 'Rule Name'"), "stderr: {stderr}");
}

#[test]
fn invalid_config_exits_with_config_code() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "report.toml", "name = \"broken\"\n");

    let output = rulemerge()
        .args(["run", dir.path().join("report.toml").to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn json_flag_prints_single_json_value() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "report.toml", REPORT_CONFIG);
    write(dir.path(), "combined.csv", PRIMARY_CSV);
    write(dir.path(), "fixed.csv", SECONDARY_CSV);

    let output = rulemerge()
        .args(["run", dir.path().join("report.toml").to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let val: serde_json::Value = serde_json::from_str(stdout.trim()).expect("valid JSON");
    let obj = val.as_object().unwrap();
    assert!(obj.contains_key("meta"));
    assert!(obj.contains_key("summary"));
    assert!(obj.contains_key("rows"));
    assert_eq!(obj["summary"]["matched_exact"], serde_json::json!(1));
    assert_eq!(obj["summary"]["matched_total"], serde_json::json!(1));
    assert_eq!(obj["summary"]["unmatched"], serde_json::json!(1));
}

#[test]
fn output_flag_overrides_config_path() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "report.toml", REPORT_CONFIG);
    write(dir.path(), "combined.csv", PRIMARY_CSV);
    write(dir.path(), "fixed.csv", SECONDARY_CSV);
    let elsewhere = dir.path().join("elsewhere.csv");

    let output = rulemerge()
        .args([
            "run",
            dir.path().join("report.toml").to_str().unwrap(),
            "--output",
            elsewhere.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(elsewhere.exists());
    assert!(!dir.path().join("final.csv").exists());
}

#[test]
fn validate_accepts_good_config() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "report.toml", REPORT_CONFIG);

    let output = rulemerge()
        .args(["validate", dir.path().join("report.toml").to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("valid:"), "stderr: {stderr}");
}

#[test]
fn validate_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "report.toml", "not even toml [");

    let output = rulemerge()
        .args(["validate", dir.path().join("report.toml").to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn merge_config_appends_grand_total() {
    let config = r#"
name = "Combined rule summary"

[primary]
file = "rule_summary.csv"
label = "Rule Name"

[secondary]
file = "bypass.csv"
label = "Rule Name"
required = false

[[normalize]]
pattern = " - linux"
replace = ""

[[normalize]]
pattern = " - auditd"
replace = ""

[[normalize]]
pattern = "/job"
replace = ""

[output]
file = "combined.csv"
label = "Rule Name"

[[output.carry]]
source = "Command Count"
name = "Command Count (Summarize)"

[[output.pull]]
source = "Match Events"
name = "Match Events (Bypass)"

[[output.pull]]
source = "Evasion Events"
name = "Evasion Events (Bypass)"

[[output.pull]]
source = "Total Events"
name = "Total Events (Bypass)"

[aggregate]
label = "GRAND TOTAL"
sum = [
    "Command Count (Summarize)",
    "Match Events (Bypass)",
    "Evasion Events (Bypass)",
    "Total Events (Bypass)",
]
"#;
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "merge.toml", config);
    write(
        dir.path(),
        "rule_summary.csv",
        "Rule Name,Command Count\n\
         Cron Tampering - Auditd,10\n\
         At Task Creation/job,20\n\
         Setuid Abuse,30\n",
    );
    write(
        dir.path(),
        "bypass.csv",
        "Rule Name,Match Events,Evasion Events,Total Events\n\
         Cron Tampering,8,0,8\n\
         At Task Creation,15,5,20\n",
    );

    let output = rulemerge()
        .args(["run", dir.path().join("merge.toml").to_str().unwrap()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let combined = std::fs::read_to_string(dir.path().join("combined.csv")).unwrap();
    let expected = "\
Rule Name,Command Count (Summarize),Match Events (Bypass),Evasion Events (Bypass),Total Events (Bypass)
Cron Tampering - Auditd,10,8,0,8
At Task Creation/job,20,15,5,20
Setuid Abuse,30,,,
GRAND TOTAL,60,23,5,28
";
    assert_eq!(combined, expected);
}

#[test]
fn rank_variant_orders_by_rate() {
    let config = r#"
name = "Ranked report"

[primary]
file = "combined.csv"
label = "Rule Name"

[secondary]
file = "fixed.csv"
label = "Rule Name"
required = false

[output]
file = "ranked.csv"
label = "Rule Name"
sort = "rate_desc"
sort_by = "Fixed Bypass Rate (%)"

[[output.compare]]
source = "Bypass Rate (%)"
original = "Original Bypass Rate (%)"
fixed = "Fixed Bypass Rate (%)"
change = "Bypass Rate Change (%)"
kind = "rate"
"#;
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "rank.toml", config);
    write(
        dir.path(),
        "combined.csv",
        "Rule Name,Bypass Rate (%)\n\
         Low Rule,5.00\n\
         High Rule,5.00\n\
         Zebra Unmatched,5.00\n\
         Apple Unmatched,5.00\n\
         GRAND TOTAL,5.00\n",
    );
    write(
        dir.path(),
        "fixed.csv",
        "Rule Name,Bypass Rate (%)\n\
         Low Rule,10.00\n\
         High Rule,90.00\n\
         TOTAL,50.00\n",
    );

    let output = rulemerge()
        .args(["run", dir.path().join("rank.toml").to_str().unwrap()])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let ranked = std::fs::read_to_string(dir.path().join("ranked.csv")).unwrap();
    let labels: Vec<&str> = ranked
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(
        labels,
        vec!["High Rule", "Low Rule", "Apple Unmatched", "Zebra Unmatched", "GRAND TOTAL"]
    );
}
