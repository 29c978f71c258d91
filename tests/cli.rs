use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn convenios(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_convenios"));
    cmd.env("CONVENIOS_DATA_DIR", data_dir)
        .env("RUST_LOG", "off")
        .env_remove("CONVENIOS_USER");
    cmd
}

/// Value after `label` on the first output line that starts with it
fn field(stdout: &[u8], label: &str) -> String {
    String::from_utf8_lossy(stdout)
        .lines()
        .find_map(|line| line.trim().strip_prefix(label).map(|v| v.trim().to_string()))
        .expect("field in output")
}

fn create_agreement(dir: &Path, agency: &str, received: bool) -> String {
    let output = convenios(dir)
        .args(["agreement", "create", "-t", "FEDERAL", "-a", agency])
        .args(["-o", "Pavimentação", "-e", "2030-12-31"])
        .args(["--start", "2025-01-15", "--transfer", "1000", "--counterpart", "500,00"])
        .args(["--received", if received { "true" } else { "false" }])
        .output()
        .expect("run agreement create");
    assert!(output.status.success());
    field(&output.stdout, "ID:")
}

#[test]
fn init_writes_settings() {
    let dir = TempDir::new().unwrap();

    convenios(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));
    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("agreements.json").exists());

    convenios(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized:     yes"));
}

#[test]
fn company_create_and_list() {
    let dir = TempDir::new().unwrap();

    convenios(dir.path())
        .args(["company", "create", "12.345.678/0001-90", "Construtora Alfa Ltda"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created company: Construtora Alfa Ltda"));

    convenios(dir.path())
        .args(["company", "create", "12345678000190", "Outra"])
        .assert()
        .failure();

    convenios(dir.path())
        .args(["company", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Construtora Alfa Ltda"));
}

#[test]
fn agreement_create_list_and_show() {
    let dir = TempDir::new().unwrap();
    let id = create_agreement(dir.path(), "Ministerio das Cidades", true);
    assert!(id.starts_with("cnv-"));
    create_agreement(dir.path(), "Secretaria Estadual", false);

    convenios(dir.path())
        .args(["agreement", "list", "--received"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ministerio das Cidades"))
        .stdout(predicate::str::contains("Secretaria Estadual").not());

    convenios(dir.path())
        .args(["agreement", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("R$ 1.500,00"));
}

#[test]
fn invalid_input_fails() {
    let dir = TempDir::new().unwrap();

    convenios(dir.path())
        .args(["agreement", "create", "-t", "FEDERAL", "-a", "X", "-o", "Y"])
        .args(["-e", "31/12/2030"])
        .assert()
        .failure();

    convenios(dir.path())
        .args(["agreement", "create", "-t", "MUNICIPAL", "-a", "X", "-o", "Y"])
        .args(["-e", "2030-12-31"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid agreement type"));
}

#[test]
fn contract_payment_flow() {
    let dir = TempDir::new().unwrap();
    let agreement = create_agreement(dir.path(), "Fundo Nacional de Saude", true);

    convenios(dir.path())
        .args(["company", "create", "11.222.333/0001-44", "Alfa Obras"])
        .assert()
        .success();

    convenios(dir.path())
        .args(["contract", "create", &agreement, "11222333000144", "001/2025", "1000"])
        .args(["-o", "Reforma", "--start", "2025-02-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created contract: 001/2025"));

    convenios(dir.path())
        .args(["amendment", "add", "001/2025", "-t", "valor", "-n", "1", "--increase", "200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R$ 1.200,00"));

    convenios(dir.path())
        .args(["payment", "add", "001/2025", "300", "-d", "2025-03-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Balance: R$ 900,00"));

    // Companies with contracts cannot be removed
    convenios(dir.path())
        .args(["company", "delete", "11222333000144"])
        .assert()
        .failure();

    convenios(dir.path())
        .args(["agreement", "delete", &agreement])
        .assert()
        .success();

    convenios(dir.path())
        .args(["contract", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nenhum contrato."));
}

#[test]
fn report_summary_json_and_pdf() {
    let dir = TempDir::new().unwrap();
    create_agreement(dir.path(), "Fundo Nacional de Saude", true);
    create_agreement(dir.path(), "Secretaria Estadual", false);

    let output = convenios(dir.path())
        .args(["report", "summary", "--json", "--orgao", "saude"])
        .output()
        .expect("run report summary");
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report json");
    assert_eq!(report["qtd_total"], 1);
    assert_eq!(report["total_geral"].as_f64(), Some(1500.0));

    let pdf = dir.path().join("relatorio.pdf");
    convenios(dir.path())
        .args(["report", "pdf", "-o"])
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 agreement(s)"));
    let bytes = std::fs::read(&pdf).expect("pdf file");
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.ends_with(b"%%EOF\n"));
}

#[test]
fn export_and_history() {
    let dir = TempDir::new().unwrap();
    create_agreement(dir.path(), "Ministerio das Cidades", false);

    let out = dir.path().join("backup.json");
    convenios(dir.path())
        .args(["export", "all"])
        .arg(&out)
        .assert()
        .success();
    let raw = std::fs::read(&out).expect("export file");
    let parsed: serde_json::Value = serde_json::from_slice(&raw).expect("export json");
    assert_eq!(parsed["schema_version"], "1.0.0");
    assert_eq!(parsed["agreements"].as_array().map(Vec::len), Some(1));

    convenios(dir.path())
        .args(["history", "--limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE Agreement"));
}
