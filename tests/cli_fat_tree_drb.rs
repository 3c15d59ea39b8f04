use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "fattree-drb-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fat_tree_drb"))
        .arg("--outputDir")
        .arg(dir)
        .args(args)
        .output()
        .expect("run fat_tree_drb")
}

fn xml_files(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".xml"))
        .collect()
}

#[test]
fn invalid_parameters_fail_without_output() {
    let dir = unique_temp_dir("invalid");
    for args in [
        &["--K", "3"][..],
        &["--runMode", "FOO"][..],
        &["--load", "1.0"][..],
        &["--load", "0"][..],
    ] {
        let output = run(&dir, args);
        assert!(
            !output.status.success(),
            "expected failure for {args:?}, stdout={}",
            String::from_utf8_lossy(&output.stdout)
        );
    }
    assert!(xml_files(&dir).is_empty());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn drb_run_writes_named_flow_statistics() {
    let dir = unique_temp_dir("drb");
    let output = run(
        &dir,
        &[
            "--ID", "3", "--K", "4", "--runMode", "DRB", "--load", "0.2", "--flowSize", "500",
            "--randomSeed", "11",
        ],
    );
    assert!(
        output.status.success(),
        "fat_tree_drb failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let xml = fs::read_to_string(dir.join("3-fattree-4-0.2-drb-500.xml")).expect("read xml");
    assert!(xml.contains("<FlowMonitor>"));
    assert!(xml.contains("<Ipv4FlowClassifier>"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("avg_fct="), "stdout={stdout}");
    assert!(stdout.contains("lost_packets=0"), "stdout={stdout}");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn plan_json_is_deterministic_for_fixed_seed() {
    let dir = unique_temp_dir("plan");
    let mut plans = Vec::new();
    for name in ["a.json", "b.json"] {
        let path = dir.join(name);
        let output = run(
            &dir,
            &[
                "--runMode",
                "RR",
                "--randomSeed",
                "77",
                "--load",
                "0.3",
                "--noRun",
                "--planJson",
                path.to_str().expect("utf-8 path"),
            ],
        );
        assert!(
            output.status.success(),
            "fat_tree_drb failed: stderr={}",
            String::from_utf8_lossy(&output.stderr)
        );
        let raw = fs::read_to_string(&path).expect("read plan");
        let v: Value = serde_json::from_str(&raw).expect("parse plan");
        plans.push(v);
    }
    assert!(xml_files(&dir).is_empty(), "--noRun skips the simulation");

    let plan = &plans[0];
    assert_eq!(plan["seed"], 77);
    assert_eq!(plan["flows"], plans[1]["flows"]);

    let paths = plan["paths"].as_array().expect("paths array");
    assert_eq!(paths.len(), 16);
    assert!(paths.iter().all(|p| p.as_array().map(Vec::len) == Some(4)));

    for flow in plan["flows"].as_array().expect("flows array") {
        let src = flow["source"].as_u64().expect("source");
        let dst = flow["destination"].as_u64().expect("destination");
        assert_ne!(src / 4, dst / 4, "cross-pod destination: {flow}");
    }
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn transport_toggles_accept_bare_and_valued_forms() {
    let dir = unique_temp_dir("toggles");
    let cases = [
        (&["--enableDcTcp", "--resequenceBuffer"][..], true, true),
        (&["--enableDcTcp", "false", "--resequenceBuffer", "true"][..], false, true),
        (&[][..], true, false),
    ];
    for (i, (flags, dctcp, reseq)) in cases.into_iter().enumerate() {
        let path = dir.join(format!("plan-{i}.json"));
        let mut args = vec!["--randomSeed", "5", "--noRun", "--planJson"];
        let path_str = path.to_str().expect("utf-8 path");
        args.push(path_str);
        args.extend_from_slice(flags);

        let output = run(&dir, &args);
        assert!(
            output.status.success(),
            "flags {flags:?} rejected: stderr={}",
            String::from_utf8_lossy(&output.stderr)
        );
        let raw = fs::read_to_string(&path).expect("read plan");
        let v: Value = serde_json::from_str(&raw).expect("parse plan");
        assert_eq!(v["config"]["transport"]["enable_dctcp"], dctcp, "{flags:?}");
        assert_eq!(v["config"]["transport"]["resequence_buffer"], reseq, "{flags:?}");
    }
    let _ = fs::remove_dir_all(&dir);
}
