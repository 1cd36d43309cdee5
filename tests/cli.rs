mod cli {
    #![allow(non_snake_case)]

    use assert_cmd::prelude::*;
    use predicates::str::contains;

    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::Command;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const NAME: &str = "darab";
    const HEADER: &str = "WinDarab export\nSession\nDate\nVehicle\nChannels\nUnits\n";

    fn write_log(dir: &Path, name: &str, rows: &[(f64, f64, f64)]) -> std::io::Result<PathBuf> {
        let mut text = HEADER.to_string();
        for (t, oilp, rpm) in rows {
            text.push_str(&format!("{t}\t{oilp}\t{rpm}\n"));
        }
        let path = dir.join(name);
        fs::write(&path, text)?;
        Ok(path)
    }

    fn good_rows() -> Vec<(f64, f64, f64)> {
        (0..50)
            .map(|i| {
                let rpm = 2000.0 + 100.0 * i as f64;
                (i as f64 * 0.05, 18.0 * (rpm - 800.0_f64).ln() - 80.0, rpm)
            })
            .collect()
    }

    /// `darab` run inside `dir` with no inherited configuration.
    fn darab(dir: &Path) -> Result<Command, Box<dyn std::error::Error>> {
        let mut cmd = Command::cargo_bin(NAME)?;
        cmd.current_dir(dir);
        for (key, _) in std::env::vars() {
            if key.starts_with("DARAB_") || key == "RUST_LOG" {
                cmd.env_remove(key);
            }
        }
        Ok(cmd)
    }

    #[test]
    fn test_output__when_no_subcommand() -> TestResult {
        let dir = tempfile::tempdir()?;
        darab(dir.path())?.assert().failure();
        Ok(())
    }

    #[test]
    fn test_fit__writes_chart_and_report() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "good.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args(["fit", "--dpi", "20", "-o", "chart.svg", "-r", "oilp.cpp"])
            .arg(&input);

        cmd.assert()
            .success()
            .stdout(contains("Samples: n=50 | fitted n=44 (rpm > 2500)"))
            .stdout(contains("Wrote chart.svg"))
            .stdout(contains("Wrote oilp.cpp"));

        let report = fs::read_to_string(dir.path().join("oilp.cpp"))?;
        assert!(report.contains("// WinDarab function:\n// "));
        assert!(report.contains("ln({M400_rpm} "));
        assert!(report.contains("float oil_pressure_prediction(StateSignal &rpm){\n\treturn "));
        assert!(dir.path().join("chart.svg").exists());
        Ok(())
    }

    #[test]
    fn test_fit__default_outputs_are_png_and_cpp() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "good.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args(["fit", "--dpi", "50"]).arg(&input);

        cmd.assert()
            .success()
            .stdout(contains("Wrote lower_cutoff.png"))
            .stdout(contains("Wrote oilp_prediction.cpp"));

        let png = fs::read(dir.path().join("lower_cutoff.png"))?;
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert!(dir.path().join("oilp_prediction.cpp").exists());
        Ok(())
    }

    #[test]
    fn test_fit__jpeg_chart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "good.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args(["fit", "--dpi", "50", "-o", "chart.jpg"]).arg(&input);
        cmd.assert().success();

        let jpg = fs::read(dir.path().join("chart.jpg"))?;
        assert!(jpg.starts_with(&[0xFF, 0xD8, 0xFF]));
        Ok(())
    }

    #[test]
    fn test_fit__function_name_must_be_an_identifier() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "good.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args(["fit", "--function", "oil-pressure prediction"]).arg(&input);

        cmd.assert()
            .failure()
            .code(2)
            .stderr(contains("is not a C++ identifier"));
        assert!(!dir.path().join("lower_cutoff.png").exists());
        Ok(())
    }

    #[test]
    fn test_fit__custom_names_and_curve_export() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "good.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args([
            "fit",
            "--dpi",
            "20",
            "-o",
            "chart.svg",
            "-r",
            "pred.cpp",
            "--signal",
            "P_Engine_rpm",
            "--function",
            "oilp_min",
            "--export-curve",
            "curve.json",
        ])
        .arg(&input);
        cmd.assert().success();

        let report = fs::read_to_string(dir.path().join("pred.cpp"))?;
        assert!(report.contains("{P_Engine_rpm}"));
        assert!(report.contains("float oilp_min(StateSignal &rpm)"));
        let json = fs::read_to_string(dir.path().join("curve.json"))?;
        assert!(json.contains("\"rpm_lower_bound\": 2500.0"));
        Ok(())
    }

    #[test]
    fn test_fit__bound_from_environment() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "good.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.env("DARAB_RPM_LOWER_BOUND", "4000")
            .args(["fit", "--dpi", "20", "-o", "chart.svg"])
            .arg(&input);

        cmd.assert()
            .success()
            .stdout(contains("fitted n=29 (rpm > 4000)"));
        Ok(())
    }

    #[test]
    fn test_fit__missing_secondary_leaves_no_outputs() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "good.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args(["fit", "--dpi", "20", "-o", "chart.svg", "--secondary", "missing.txt"])
            .arg(&input);

        cmd.assert()
            .failure()
            .code(2)
            .stderr(contains("File not found: 'missing.txt'"));
        assert!(!dir.path().join("chart.svg").exists());
        assert!(!dir.path().join("oilp_prediction.cpp").exists());
        Ok(())
    }

    #[test]
    fn test_fit__missing_input() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut cmd = darab(dir.path())?;
        cmd.args(["fit", "nope.txt"]);

        cmd.assert()
            .failure()
            .code(2)
            .stderr(contains("File not found: 'nope.txt'"));
        Ok(())
    }

    #[test]
    fn test_fit__column_mismatch_is_a_data_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "good.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args(["fit", "--labels", "Time,Oil Pressure,RPM,Oil Temp"])
            .arg(&input);

        cmd.assert()
            .failure()
            .code(3)
            .stderr(contains("line 7"));
        Ok(())
    }

    #[test]
    fn test_fit__bound_above_data_is_invalid() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "good.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args(["fit", "-b", "9000"]).arg(&input);

        cmd.assert()
            .failure()
            .code(2)
            .stderr(contains("outside the observed RPM range"));
        Ok(())
    }

    #[test]
    fn test_load__prints_preview_table() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "log.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args(["load", "--labels", "Time,Oil Pressure,RPM", "--rows", "2"])
            .arg(&input);

        cmd.assert()
            .success()
            .stdout(contains("Oil Pressure"))
            .stdout(contains("[50 rows x 2 columns]"));
        Ok(())
    }

    #[test]
    fn test_load__renders_preview_image() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "log.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args([
            "load",
            "--labels",
            "Time,Oil Pressure,RPM",
            "--preview",
            "preview.svg",
            "--dpi",
            "20",
        ])
        .arg(&input);

        cmd.assert().success().stdout(contains("Wrote preview.svg"));
        assert!(dir.path().join("preview.svg").exists());
        Ok(())
    }

    #[test]
    fn test_load__renders_png_preview() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "log.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.args([
            "load",
            "--labels",
            "Time,Oil Pressure,RPM",
            "--preview",
            "preview.png",
            "--dpi",
            "50",
        ])
        .arg(&input);

        cmd.assert().success().stdout(contains("Wrote preview.png"));
        assert!(fs::read(dir.path().join("preview.png"))?.starts_with(b"\x89PNG"));
        Ok(())
    }

    #[test]
    fn test_load__default_labels_expect_five_columns() -> TestResult {
        let dir = tempfile::tempdir()?;
        let input = write_log(dir.path(), "log.txt", &good_rows())?;

        let mut cmd = darab(dir.path())?;
        cmd.arg("load").arg(&input);

        cmd.assert()
            .failure()
            .code(3)
            .stderr(contains("expected 5 column(s)"));
        Ok(())
    }
}
