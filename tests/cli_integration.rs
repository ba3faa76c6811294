use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{TempDir, tempdir};

/// Six samples, four features in two groups of two, plus matching inputs for
/// both binaries.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let features = "\
1.0,0.2,0.0,0.1
0.9,0.1,0.3,0.0
0.1,1.0,0.2,0.4
0.0,0.8,1.1,0.2
0.3,0.0,0.9,1.0
0.5,0.4,0.1,0.9
";
        fs::write(dir.path().join("features.csv"), features).unwrap();
        fs::write(dir.path().join("response.csv"), "2.1\n1.9\n0.4\n0.2\n0.6\n1.1\n").unwrap();
        fs::write(dir.path().join("groups.csv"), "1,2\n3,4\n").unwrap();
        fs::write(dir.path().join("field.csv"), "1,2,2,3,4,\n").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn command(&self, bin: &str) -> Command {
        let mut cmd = Command::cargo_bin(bin).unwrap();
        cmd.arg("-f")
            .arg(self.path("features.csv"))
            .arg("-n")
            .arg(self.path("groups.csv"))
            .arg("-r")
            .arg(self.path("response.csv"))
            .arg("-w")
            .arg(self.path("model"));
        cmd
    }

    fn write_lambda_list(&self, text: &str) -> PathBuf {
        let path = self.path("lambdas.txt");
        fs::write(&path, text).unwrap();
        path
    }

    fn xml_outputs(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".xml"))
            .collect();
        names.sort();
        names
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn single_mode_writes_prefix_xml() {
    let fx = Fixture::new();
    fx.command("sg_lasso_leastr")
        .args(["-z", "0.05", "-y", "0.05"])
        .assert()
        .success()
        .stdout(contains("fitted"));
    assert_eq!(fx.xml_outputs(), vec!["model.xml".to_string()]);
    let xml = read(&fx.path("model.xml"));
    assert!(xml.contains(r#"<model solver="sg_lasso_leastr">"#));
    assert!(xml.contains("<lambda1>0.05</lambda1>"));
    assert!(xml.contains(r#"<weights count="4">"#));
}

#[test]
fn sweep_mode_writes_one_labelled_file_per_fitted_pair() {
    let fx = Fixture::new();
    let list = fx.write_lambda_list("0.01 0.5\nnot a pair\n\n0.01 0.25\n");
    fx.command("sg_lasso_leastr")
        .arg("-l")
        .arg(&list)
        .args(["-c", "0"])
        .assert()
        .success()
        .stderr(contains("Processing SLEP options file: -..."))
        .stderr(contains("0.01 - 0.5"));
    let outputs = fx.xml_outputs();
    assert!(outputs.contains(&"model_01_5.xml".to_string()), "{outputs:?}");
    assert!(!outputs.contains(&"model.xml".to_string()));
}

#[test]
fn pruning_skips_pairs_above_the_initial_ceiling() {
    let fx = Fixture::new();
    let list = fx.write_lambda_list("0.01 1.5\n");
    fx.command("sg_lasso_leastr")
        .arg("-l")
        .arg(&list)
        .assert()
        .success()
        .stderr(contains("Skipping this lambda value due to gene count thresholding..."));
    assert!(fx.xml_outputs().is_empty());
}

#[test]
fn large_threshold_stops_the_sweep_after_the_first_fit() {
    let fx = Fixture::new();
    let list = fx.write_lambda_list("0.1 0.9\n0.1 0.5\n0.1 0.1\n");
    fx.command("sg_lasso_leastr")
        .arg("-l")
        .arg(&list)
        .args(["-c", "10"])
        .assert()
        .success()
        .stderr(contains(
            "Skipping all further lambda pairs due to gene count thresholding...",
        ));
    assert_eq!(fx.xml_outputs(), vec!["model_1_9.xml".to_string()]);
}

#[test]
fn negative_threshold_fits_every_pair() {
    let fx = Fixture::new();
    let list = fx.write_lambda_list("0.1 0.9\n0.1 0.5\n0.1 0.1\n");
    fx.command("sg_lasso_leastr")
        .arg("-l")
        .arg(&list)
        .args(["-c", "-1"])
        .assert()
        .success()
        .stderr(contains("Skipping").not());
    assert_eq!(
        fx.xml_outputs(),
        vec![
            "model_1_1.xml".to_string(),
            "model_1_5.xml".to_string(),
            "model_1_9.xml".to_string(),
        ]
    );
}

#[test]
fn overlapping_sweep_fits_every_pair() {
    let fx = Fixture::new();
    let list = fx.write_lambda_list("0.1 1.5\n0.1 0.5\n0.1 0.1\n");
    let report = fx.path("report.json");
    fx.command("overlapping_sg_lasso_leastr")
        .arg("-g")
        .arg(fx.path("field.csv"))
        .arg("-l")
        .arg(&list)
        .arg("--report")
        .arg(&report)
        .assert()
        .success();
    assert_eq!(
        fx.xml_outputs(),
        vec![
            "model_1_1.5.xml".to_string(),
            "model_1_1.xml".to_string(),
            "model_1_5.xml".to_string(),
        ]
    );
    let json: serde_json::Value = serde_json::from_str(&read(&report)).unwrap();
    assert_eq!(json["stopped_early"], false);
    assert_eq!(json["records"].as_array().unwrap().len(), 3);
    assert_eq!(json["records"][0]["outcome"]["kind"], "fitted");
    assert_eq!(json["records"][0]["outcome"]["output"]["status"], "written");
}

#[test]
fn overlapping_binary_requires_a_field_file() {
    let fx = Fixture::new();
    fx.command("overlapping_sg_lasso_leastr")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("--field"));
}

#[test]
fn missing_required_arguments_print_usage() {
    Command::cargo_bin("sg_lasso_leastr")
        .unwrap()
        .args(["-f", "features.csv"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Usage"));
}

#[test]
fn sample_count_mismatch_is_fatal_and_writes_nothing() {
    let fx = Fixture::new();
    fs::write(fx.path("response.csv"), "1\n2\n3\n4\n5\n").unwrap();
    fx.command("sg_lasso_leastr")
        .assert()
        .failure()
        .code(1)
        .stderr(contains(
            "The responses must have the same number of columns as the feature set",
        ));
    assert!(fx.xml_outputs().is_empty());
}

#[test]
fn malformed_slep_value_is_fatal_before_fitting() {
    let fx = Fixture::new();
    fs::write(fx.path("slep.tsv"), "tFlag\t9\n").unwrap();
    fx.command("sg_lasso_leastr")
        .arg("-s")
        .arg(fx.path("slep.tsv"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("tFlag"));
    assert!(fx.xml_outputs().is_empty());
}

#[test]
fn unreadable_lambda_list_is_an_empty_sweep() {
    let fx = Fixture::new();
    fx.command("sg_lasso_leastr")
        .arg("-l")
        .arg(fx.path("absent.txt"))
        .assert()
        .success()
        .stderr(contains("Unable to open the file."))
        .stdout(contains("no lambda pairs visited"));
    assert!(fx.xml_outputs().is_empty());
}
