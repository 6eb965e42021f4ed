//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const HF_TOKEN: &str = "hf_integration_secret_value_42";
const CIVITAI_TOKEN: &str = "civitai_integration_secret";

fn settings(port: &str, nodes_dir: &str) -> String {
    format!(
        r#"[tokens]
hf_token = ".env"
civitai_api_token = ".env"

[web]
host = "0.0.0.0"
port = {port}

[filesystem]
volume_name = "my-comfy-models"
volume_mount_location = "/root/per_comfy-storage"
comfyui_dir = "/root/comfy/ComfyUI"
custom_nodes_dir = "{nodes_dir}"
custom_output_dir = "/root/per_comfy-storage/output"

[resources]
gpu_type = "L40S"
max_containers = 1
scaledown_window = 300
timeout = 3600
max_inputs = 10
"#
    )
}

fn project(port: &str) -> TempDir {
    let tmp = TempDir::new().expect("temp project dir");
    let nodes = tmp.path().join("no-such-custom-nodes");
    fs::write(
        tmp.path().join("config.toml"),
        settings(port, nodes.to_str().expect("utf8 nodes path")),
    )
    .expect("write settings");
    fs::write(
        tmp.path().join(".env"),
        format!("HF_TOKEN=\"{HF_TOKEN}\"\nCIVITAI_API_TOKEN=\"{CIVITAI_TOKEN}\"\n"),
    )
    .expect("write secrets");
    tmp
}

fn cmd(project: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("comfy-modal"));
    cmd.env_remove("COMFY_MODAL_PROJECT_DIR")
        .env_remove("COMFY_MODAL_CONFIG")
        .env_remove("COMFY_MODAL_ENV_FILE")
        .arg("--project-dir")
        .arg(project.path());
    cmd
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("comfy-modal"));
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("comfy-modal"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("comfy-modal"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ComfyUI deployment on Modal"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("launch"));
}

#[test]
fn test_check_prints_masked_configuration() {
    let project = project("8188");
    cmd(&project)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration loaded"))
        .stdout(predicate::str::contains("my-comfy-models"))
        .stdout(predicate::str::contains(HF_TOKEN).not())
        .stdout(predicate::str::contains(CIVITAI_TOKEN).not());
}

#[test]
fn test_check_json_masks_tokens() {
    let project = project("\"8188\"");
    cmd(&project)
        .args(["check", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"port\": 8188"))
        .stdout(predicate::str::contains("\"cpu\": null"))
        .stdout(predicate::str::contains(HF_TOKEN).not());
}

#[test]
fn test_check_rejects_out_of_range_port() {
    let project = project("70000");
    cmd(&project)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("web.port"))
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_check_rejects_placeholder_token() {
    let project = project("8188");
    fs::write(project.path().join(".env"), "HF_TOKEN=your_hf_token_here\nCIVITAI_API_TOKEN=x\n")
        .expect("write secrets");
    cmd(&project)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("tokens.hf_token"));
}

#[test]
fn test_check_without_secrets_file_points_to_setup() {
    let project = project("8188");
    fs::remove_file(project.path().join(".env")).expect("remove secrets");
    cmd(&project)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("comfy-modal setup"));
}

#[test]
fn test_plan_yaml_and_json() {
    let project = project("8188");
    cmd(&project)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"app_name\": \"comfyui-app\""))
        .stdout(predicate::str::contains("\"startup_timeout\": 60"))
        .stdout(predicate::str::contains(HF_TOKEN).not());

    cmd(&project)
        .args(["plan", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app_name: comfyui-app"))
        .stdout(predicate::str::contains("comfy node install comfyui-kjnodes"))
        .stdout(predicate::str::contains(CIVITAI_TOKEN).not());
}

#[test]
fn test_paths_writes_model_paths_once() {
    let project = project("8188");
    let target = project.path().join("extra_model_paths.yaml");

    cmd(&project).arg("paths").assert().success().stdout(predicate::str::contains("Wrote"));
    let written = fs::read_to_string(&target).expect("read model paths");
    assert!(written.contains("base_path: /root/per_comfy-storage/"));

    fs::write(&target, "kept: true\n").expect("overwrite");
    cmd(&project)
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&target).expect("read"), "kept: true\n");

    cmd(&project).args(["paths", "--force"]).assert().success();
    assert!(fs::read_to_string(&target).expect("read").contains("checkpoints: checkpoints/"));
}

#[test]
fn test_enter_without_custom_nodes_is_a_no_op() {
    let project = project("8188");
    cmd(&project)
        .arg("enter")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 nodes, 0 installed, 0 failed"));
}

#[test]
fn test_explicit_yaml_settings_file() {
    let project = project("8188");
    let yaml = project.path().join("staging.yml");
    fs::write(
        &yaml,
        "web:\n  host: 127.0.0.1\n  port: 9000\nfilesystem:\n  volume_name: staging\n  volume_mount_location: /mnt/vol\n  comfyui_dir: /root/comfy/ComfyUI\n  custom_nodes_dir: /mnt/vol/custom_nodes\n  custom_output_dir: /mnt/vol/output\nresources:\n  max_containers: 2\n  scaledown_window: 0\n  timeout: 60\n  max_inputs: 1\n",
    )
    .expect("write yaml");

    cmd(&project)
        .arg("--config")
        .arg(&yaml)
        .args(["check", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"volume_name\": \"staging\""))
        .stdout(predicate::str::contains("\"gpu_type\": null"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("comfy-modal"));
    cmd.args(["completions", "bash"]);
    cmd.assert().success().stdout(predicate::str::contains("comfy-modal"));
}

#[test]
fn test_config_ini_is_discovered() {
    let project = project("8188");
    fs::remove_file(project.path().join("config.toml")).expect("remove toml");
    fs::write(
        project.path().join("config.ini"),
        "[web]\nhost = 0.0.0.0\nport = 8189\n\n[filesystem]\nvolume_name = ini-models\nvolume_mount_location = /root/per_comfy-storage\ncomfyui_dir = /root/comfy/ComfyUI\ncustom_nodes_dir = /root/per_comfy-storage/custom_nodes\ncustom_output_dir = /root/per_comfy-storage/output\n\n[resources]\ngpu_type = L40S\nmax_containers = 1\nscaledown_window = 300\ntimeout = 3600\nmax_inputs = 10\n",
    )
    .expect("write ini");

    cmd(&project)
        .args(["check", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"port\": 8189"))
        .stdout(predicate::str::contains("\"volume_name\": \"ini-models\""));
}
