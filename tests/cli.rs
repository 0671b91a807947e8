use assert_cmd::prelude::*;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

const FACES: [&str; 6] = ["posx", "negx", "posy", "negy", "posz", "negz"];

fn write_faces(dir: &Path) {
    for name in FACES {
        RgbaImage::from_pixel(4, 4, Rgba([90, 120, 200, 255]))
            .save(dir.join(format!("{name}.png")))
            .expect("write face");
    }
}

fn write_scene(faces: &Path, last_face: &str) -> NamedTempFile {
    let scene = format!(
        r#"<scene name="hall">
  <camera><distance>3.5</distance></camera>
  <environment>
    <path>{}</path>
    <face>posx.png</face><face>negx.png</face>
    <face>posy.png</face><face>negy.png</face>
    <face>posz.png</face><face>{last_face}</face>
  </environment>
  <mirror/>
</scene>
"#,
        faces.display()
    );
    let mut tmp = NamedTempFile::new().expect("temp scene");
    tmp.write_all(scene.as_bytes()).expect("write scene");
    tmp
}

fn faces_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    write_faces(dir.path());
    dir
}

#[test]
fn cli_loads_environment_and_prints_summary() {
    let faces = faces_dir();
    let scene = write_scene(faces.path(), "negz.png");
    let mut cmd = Command::cargo_bin("mirror-stage").expect("binary exists");
    cmd.arg(scene.path())
        .args(["--summary-only", "--ticks", "10"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene 'hall'"))
        .stdout(contains("after 10 ticks"))
        .stdout(contains("Environment: loaded"))
        .stdout(contains(format!("Environment source: {}", faces.path().display())))
        .stdout(contains("Backdrop: environment 4x4"))
        .stdout(contains("Rotation: 0.0500 rad"))
        .stdout(contains("reflective=true"));
}

#[test]
fn cli_falls_back_when_a_face_is_missing() {
    let faces = faces_dir();
    let scene = write_scene(faces.path(), "negz.jpg");
    let mut cmd = Command::cargo_bin("mirror-stage").expect("binary exists");
    cmd.arg(scene.path())
        .args(["--summary-only", "--ticks", "3"]);
    cmd.assert()
        .success()
        .stdout(contains("Environment: failed"))
        .stdout(contains("Backdrop: color #666666"))
        .stdout(contains("after 3 ticks"));
}

#[test]
fn cli_runs_cube_preset() {
    let mut cmd = Command::cargo_bin("mirror-stage").expect("binary exists");
    cmd.args(["--preset", "cube", "--summary-only", "--ticks", "1", "--size", "800x600"]);
    cmd.assert()
        .success()
        .stdout(contains("Scene 'cube' after 1 ticks (800x600)"))
        .stdout(contains("Environment: absent"))
        .stdout(contains("Backdrop: color #202020"))
        .stdout(contains("Environment source:").not());
}

#[test]
fn cli_rejects_unknown_preset() {
    let mut cmd = Command::cargo_bin("mirror-stage").expect("binary exists");
    cmd.args(["--preset", "teapot", "--summary-only"]);
    cmd.assert().failure().stderr(contains("teapot"));
}
