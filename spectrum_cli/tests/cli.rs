use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use spectrum_core::{CodecMetadata, Raster, RunLogEntry};
use tempfile::tempdir;

fn fft_tool(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fft-tool"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("fft-tool binary runs")
}

fn write_gradient(root: &Path, key: &str, height: usize, width: usize) -> Raster {
    let data = (0..height * width)
        .map(|i| ((i / width) * 9 + (i % width) * 5) as u8)
        .collect();
    let raster = Raster::from_vec(height, width, data).unwrap();
    let path = root.join(key);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, raster.encode_png().unwrap()).unwrap();
    raster
}

#[test]
fn forward_then_inverse_round_trip() {
    let dir = tempdir().unwrap();
    let original = write_gradient(dir.path(), "input/scene.png", 5, 5);

    let forward = fft_tool(dir.path(), &["forward", "input/scene.png"]);
    assert!(
        forward.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&forward.stderr)
    );
    let stdout = String::from_utf8_lossy(&forward.stdout);
    assert!(stdout.contains("output/scene_magnitude.png"));
    assert!(stdout.contains("output/scene_phase.png"));

    let inverse = fft_tool(
        dir.path(),
        &[
            "inverse",
            "output/scene_magnitude.png",
            "output/scene_phase.png",
            "restored/scene.png",
            "--scaling",
            "preserve",
        ],
    );
    assert!(
        inverse.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&inverse.stderr)
    );

    let bytes = fs::read(dir.path().join("restored/scene.png")).unwrap();
    let restored = Raster::decode(&bytes, "restored").unwrap();
    assert_eq!(restored.dim(), original.dim());
    for (a, b) in restored.pixels().iter().zip(original.pixels().iter()) {
        assert!((i16::from(*a) - i16::from(*b)).abs() <= 2);
    }
}

#[test]
fn explicit_names_and_metadata_record() {
    let dir = tempdir().unwrap();
    write_gradient(dir.path(), "in.png", 4, 6);

    let forward = fft_tool(
        dir.path(),
        &["forward", "in.png", "mag.png", "phase.png", "--metadata", "data/bounds.json"],
    );
    assert!(forward.status.success());
    let record = fs::read(dir.path().join("data/bounds.json")).unwrap();
    let metadata = CodecMetadata::from_json(&record, "bounds").unwrap();
    assert!(metadata.mag_min <= metadata.mag_max);

    fs::remove_file(dir.path().join("mag.png.meta.json")).unwrap();
    let inverse = fft_tool(
        dir.path(),
        &["inverse", "mag.png", "phase.png", "out.png", "--metadata", "data/bounds.json"],
    );
    assert!(inverse.status.success());
    assert!(dir.path().join("out.png").exists());
}

#[test]
fn inverse_without_metadata_exits_non_zero() {
    let dir = tempdir().unwrap();
    write_gradient(dir.path(), "in.png", 4, 4);
    assert!(fft_tool(dir.path(), &["forward", "in.png", "m.png", "p.png"])
        .status
        .success());
    fs::remove_file(dir.path().join("m.png.meta.json")).unwrap();

    let inverse = fft_tool(dir.path(), &["inverse", "m.png", "p.png", "out.png"]);
    assert!(!inverse.status.success());
    let stderr = String::from_utf8_lossy(&inverse.stderr);
    assert!(stderr.contains("metadata"), "stderr: {stderr}");
    assert!(!dir.path().join("out.png").exists());
}

#[test]
fn missing_input_exits_non_zero() {
    let dir = tempdir().unwrap();
    let forward = fft_tool(dir.path(), &["forward", "input/absent.png"]);
    assert!(!forward.status.success());
    assert!(String::from_utf8_lossy(&forward.stderr).contains("input/absent.png"));
}

#[test]
fn config_file_enables_journal() {
    let dir = tempdir().unwrap();
    write_gradient(dir.path(), "in.png", 3, 3);
    let config_path = dir.path().join("fft_tool.toml");
    fs::write(
        &config_path,
        format!(
            "[logging]\nlevel = \"warn\"\njournal = \"{}\"\n",
            dir.path().join("runs.jsonl").display()
        ),
    )
    .unwrap();

    let output = fft_tool(
        dir.path(),
        &[
            "--config",
            config_path.to_str().unwrap(),
            "forward",
            "in.png",
            "m.png",
            "p.png",
        ],
    );
    assert!(output.status.success());

    let contents = fs::read_to_string(dir.path().join("runs.jsonl")).unwrap();
    let entry: RunLogEntry = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert_eq!(entry.operation, "forward");
    assert_eq!(entry.inputs, vec!["in.png".to_string()]);
}

#[test]
fn debug_filter_reports_resolved_configuration() {
    let dir = tempdir().unwrap();
    write_gradient(dir.path(), "in.png", 2, 2);

    let output = Command::new(env!("CARGO_BIN_EXE_fft-tool"))
        .arg("--root")
        .arg(dir.path())
        .args(["forward", "in.png", "m.png", "p.png"])
        .env("RUST_LOG", "debug")
        .output()
        .expect("fft-tool binary runs");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configuration resolved"), "stderr: {stderr}");
}
