use std::process::{Command, Output};

#[derive(Debug)]
struct Summary {
    net_lcoe: f64,
    gas_only_lcoe: f64,
    gas_backup_pct: f64,
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_sizings() {
    let data_center = run_and_parse(&["--scenario", "scenarios/data_center.toml"]);
    let desert = run_and_parse(&["--scenario", "scenarios/desert_peaker.toml"]);
    let premium = run_and_parse(&["--scenario", "scenarios/storage_premium.toml"]);

    for (name, s) in [
        ("data_center", &data_center),
        ("desert_peaker", &desert),
        ("storage_premium", &premium),
    ] {
        assert!(
            s.net_lcoe > 0.0 && s.gas_only_lcoe > 0.0,
            "{name}: non-positive LCOE {s:?}"
        );
    }

    assert!(
        (data_center.net_lcoe - desert.net_lcoe).abs() > 1.0,
        "expected data_center and desert_peaker LCOE to differ: {data_center:?} vs {desert:?}"
    );
    assert!(
        (premium.net_lcoe - data_center.net_lcoe).abs() > 0.01,
        "custom cost table should change the result: {premium:?} vs {data_center:?}"
    );
    assert!(premium.gas_backup_pct <= 100.0);
}

#[test]
fn presets_run_and_report_status() {
    for preset in ["data_center", "desert_peaker", "northern_plant"] {
        let out = run(&["--preset", preset]);
        let stdout = String::from_utf8(out.stdout).expect("stdout should be valid UTF-8");
        assert!(
            stdout.lines().any(|l| l.starts_with("Status:")),
            "{preset}: no status line in {stdout}"
        );
    }
}

#[test]
fn json_output_and_csv_exports() {
    let dir = std::env::temp_dir().join(format!("hybrid-sizer-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let dispatch = dir.join("dispatch.csv");
    let summary = dir.join("summary.csv");
    let candidates = dir.join("candidates.csv");

    let out = run(&[
        "--scenario",
        "scenarios/coarse_full_year.toml",
        "--json",
        "--dispatch-out",
        dispatch.to_str().expect("utf-8 path"),
        "--summary-out",
        summary.to_str().expect("utf-8 path"),
        "--candidates-out",
        candidates.to_str().expect("utf-8 path"),
    ]);
    let json: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout should be JSON");
    assert_eq!(json["resolution"], "full-year");
    assert_eq!(json["candidatesEvaluated"], 5 * (1 + 2 * 2));

    let lines = |p: &std::path::Path| {
        std::fs::read_to_string(p)
            .expect("csv should exist")
            .lines()
            .count()
    };
    assert_eq!(lines(&dispatch), 8761);
    assert_eq!(lines(&summary), 25);
    assert_eq!(lines(&candidates), 26);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn zero_solar_cf_override_uses_floor() {
    let out = run(&["--preset", "data_center", "--solar-cf", "0", "--json"]);
    let json: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout should be JSON");
    let cf = json["solarCapacityFactor"]
        .as_f64()
        .expect("numeric capacity factor");
    assert!((cf - 0.12).abs() < 1e-6, "expected the 0.12 floor, got {cf}");
}

#[test]
fn scenario_cost_table_resolves_from_any_directory() {
    let scenario = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/storage_premium.toml");
    let output = Command::new(env!("CARGO_BIN_EXE_hybrid-sizer"))
        .args(["--scenario", scenario])
        .current_dir(std::env::temp_dir())
        .output()
        .expect("hybrid-sizer process should run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    assert!(parse_metric(&stdout, "Net LCOE:", "$/MWh") > 0.0);
}

#[test]
fn invalid_override_exits_nonzero() {
    let out = Command::new(env!("CARGO_BIN_EXE_hybrid-sizer"))
        .args(["--preset", "data_center", "--max-gas", "1.5"])
        .output()
        .expect("hybrid-sizer process should run");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("constraints.max_gas_backup_fraction"),
        "stderr: {stderr}"
    );
}

#[test]
fn unknown_preset_exits_nonzero() {
    let out = Command::new(env!("CARGO_BIN_EXE_hybrid-sizer"))
        .args(["--preset", "moon_base"])
        .output()
        .expect("hybrid-sizer process should run");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown preset"));
}

fn run(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_hybrid-sizer"))
        .args(args)
        .output()
        .expect("hybrid-sizer process should run");

    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn run_and_parse(args: &[&str]) -> Summary {
    let out = run(args);
    let stdout = String::from_utf8(out.stdout).expect("stdout should be valid UTF-8");
    Summary {
        net_lcoe: parse_metric(&stdout, "Net LCOE:", "$/MWh"),
        gas_only_lcoe: parse_metric(&stdout, "Gas-only LCOE:", "$/MWh"),
        gas_backup_pct: parse_metric(&stdout, "Gas backup:", "%"),
    }
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid format for line `{line}`"));
    let value = raw
        .split_once(unit)
        .map(|(left, _)| left.trim())
        .unwrap_or_else(|| panic!("missing unit `{unit}` in line `{line}`"));

    value
        .parse::<f64>()
        .unwrap_or_else(|e| panic!("failed to parse `{value}` in `{line}`: {e}"))
}
