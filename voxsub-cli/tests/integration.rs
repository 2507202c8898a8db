//! Integration tests: run CLI binary with temp fixtures.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn voxsub_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_voxsub"))
}

#[test]
fn check_config_prints_effective_values() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("voxsub.toml");
    fs::write(&cfg, "[server]\nport = 4100\n[transcoder]\nsample_rate = 22050\n").unwrap();

    let out = Command::new(voxsub_bin())
        .args(["--config", cfg.to_str().unwrap(), "check-config"])
        .env_remove("VOXSUB_PORT")
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("port = 4100"), "{}", stdout);
    assert!(stdout.contains("sample_rate = 22050"));
    assert!(stdout.contains("program = \"ffmpeg\""));
}

#[test]
fn invalid_config_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("voxsub.toml");
    fs::write(&cfg, "[tts]\ndefault_speed = -1.0\n").unwrap();
    let out = Command::new(voxsub_bin())
        .args(["-c", cfg.to_str().unwrap(), "check-config"])
        .output()
        .unwrap();
    assert!(!out.status.success());
}

#[test]
fn empty_text_is_rejected_before_synthesis() {
    let out = Command::new(voxsub_bin())
        .args(["synth", "--text", ""])
        .current_dir(std::env::temp_dir())
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("No text provided"));
}

#[test]
fn unknown_voice_is_rejected() {
    let out = Command::new(voxsub_bin())
        .args(["synth", "--text", "hi", "--voice", "robot"])
        .current_dir(std::env::temp_dir())
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid request"));
}

#[cfg(unix)]
fn executable(path: &Path, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

#[test]
#[cfg(unix)]
fn subtitle_with_stub_tools() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    let upload = base.join("upload");
    let public = base.join("public");
    fs::create_dir_all(&upload).unwrap();
    fs::write(upload.join("tts_123.mp3"), b"ID3").unwrap();

    let ffmpeg = executable(&base.join("ffmpeg.sh"), "cp \"$2\" \"$5\"");
    let align = executable(
        &base.join("align.sh"),
        &format!(
            "printf '[{{\"start\":0,\"end\":1,\"text\":\"hi\"}}]' > \"{}\"",
            public.join("tts_123.json").display()
        ),
    );
    let cfg = base.join("voxsub.toml");
    fs::write(
        &cfg,
        format!(
            r#"
[storage]
upload_root = "{}"
output_root = "{}"

[transcoder]
program = "{}"

[aligner]
program = "{}"
args = []
"#,
            upload.display(),
            public.display(),
            ffmpeg,
            align
        ),
    )
    .unwrap();

    let out = Command::new(voxsub_bin())
        .args(["--config", cfg.to_str().unwrap(), "subtitle", "tts_123.mp3"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["filename"], "tts_123.wav");
    assert_eq!(v["segments"], 1);
    assert_eq!(v["subJson"][0]["text"], "hi");
    assert_eq!(fs::read(public.join("tts_123.wav")).unwrap(), b"ID3");
}

#[test]
#[cfg(unix)]
fn subtitle_reports_transcoder_failure() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    let upload = base.join("upload");
    fs::create_dir_all(&upload).unwrap();
    fs::write(upload.join("tts_9.mp3"), b"ID3").unwrap();
    let broken = executable(&base.join("ffmpeg.sh"), "exit 1");
    let cfg = base.join("voxsub.toml");
    fs::write(
        &cfg,
        format!(
            "[storage]\nupload_root = \"{}\"\noutput_root = \"{}\"\n[transcoder]\nprogram = \"{}\"\n",
            upload.display(),
            base.join("public").display(),
            broken
        ),
    )
    .unwrap();

    let out = Command::new(voxsub_bin())
        .args(["--config", cfg.to_str().unwrap(), "subtitle", "tts_9.mp3"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("transcoding failed"));
}
