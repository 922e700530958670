//! Tests for CLI argument parsing and end-to-end command execution.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use std::path::Path;

use clap::Parser;
use pressfit::cli::{AuditAction, Cli, CliError, Commands, execute, read_assessment_input};
use pressfit_core::{AuditStore, ConfidenceLevel, EntityRef, RedbAuditStore};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

const ASSESSMENT: &str = r#"{
  "equipment": {
    "equipment_id": "V-101",
    "equipment_type": "pressure_vessel",
    "design_pressure": "250",
    "design_temperature": "400",
    "nominal_thickness": "0.625",
    "material_specification": "SA-516 Gr 70",
    "allowable_stress": "20000",
    "joint_efficiency": "1.0",
    "inside_diameter": "72"
  },
  "inspection": {
    "inspection_id": "I-2026-01",
    "inspection_type": "external",
    "minimum_measured_thickness": "0.610",
    "corrosion_rate": "0.005",
    "confidence_level": "conservative",
    "proposed_interval_years": "5"
  }
}"#;

/// Run a command against a config file pointing at `db`.
fn run(dir: &Path, args: &[&str]) -> Result<(), CliError> {
    let config = dir.join("pressfit.toml");
    if !config.exists() {
        std::fs::write(
            &config,
            format!(
                "[storage]\npath = {:?}\n\n[audit]\ndefault_actor = \"test-runner\"\n",
                dir.join("audit.db")
            ),
        )
        .unwrap();
    }
    let config = config.to_string_lossy().into_owned();
    let mut argv = vec!["pressfit", "--config", config.as_str()];
    argv.extend_from_slice(args);
    execute(Cli::try_parse_from(argv).unwrap())
}

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn test_parse_thickness() {
    let cli = Cli::try_parse_from([
        "pressfit", "thickness", "-p", "1000", "-r", "24", "-s", "17500",
    ])
    .unwrap();

    match cli.command {
        Commands::Thickness {
            pressure,
            radius,
            stress,
            efficiency,
            record,
        } => {
            assert_eq!(pressure, d("1000"));
            assert_eq!(radius, d("24"));
            assert_eq!(stress, d("17500"));
            assert_eq!(efficiency, d("1.0"));
            assert!(record.record.is_none());
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_life_with_record() {
    let cli = Cli::try_parse_from([
        "pressfit",
        "--json-mode",
        "life",
        "-c",
        "1.150",
        "-m",
        "0.875",
        "-r",
        "0.010",
        "-l",
        "conservative",
        "--record",
        "equipment/V-101",
        "-a",
        "inspector@plant",
    ])
    .unwrap();

    assert!(cli.json_mode);
    match cli.command {
        Commands::Life {
            confidence, record, ..
        } => {
            assert_eq!(confidence, ConfidenceLevel::Conservative);
            assert_eq!(
                record.record,
                Some(EntityRef::new("equipment", "V-101").unwrap())
            );
            assert_eq!(record.actor.as_deref(), Some("inspector@plant"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_rejects_bad_values() {
    assert!(Cli::try_parse_from(["pressfit", "rsf", "-c", "abc", "-m", "1", "-n", "2"]).is_err());
    assert!(
        Cli::try_parse_from([
            "pressfit", "life", "-c", "1", "-m", "0.5", "-r", "0.01", "-l", "reckless"
        ])
        .is_err()
    );
    assert!(Cli::try_parse_from(["pressfit", "audit", "history", "no-slash"]).is_err());
}

#[test]
fn test_parse_audit_verify_requires_target() {
    assert!(Cli::try_parse_from(["pressfit", "audit", "verify"]).is_err());
    assert!(
        Cli::try_parse_from(["pressfit", "audit", "verify", "equipment/V-1", "--all"]).is_err()
    );

    let cli = Cli::try_parse_from(["pressfit", "audit", "verify", "--all"]).unwrap();
    match cli.command {
        Commands::Audit {
            action: AuditAction::Verify { entity, all },
        } => {
            assert!(entity.is_none());
            assert!(all);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_global_database_flag() {
    let cli = Cli::try_parse_from(["pressfit", "audit", "show", "equipment/V-1", "3", "-D", "x.db"])
        .unwrap();
    assert_eq!(cli.database.as_deref(), Some(Path::new("x.db")));
}

// =============================================================================
// EXECUTION
// =============================================================================

#[test]
fn test_init_refuses_existing_database() {
    let dir = tempdir().unwrap();
    run(dir.path(), &["init"]).unwrap();
    assert!(dir.path().join("audit.db").exists());

    let err = run(dir.path(), &["init"]).unwrap_err();
    assert!(matches!(err, CliError::Usage(_)));
}

#[test]
fn test_assess_records_and_verifies() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("v101.json");
    std::fs::write(&input, ASSESSMENT).unwrap();
    let input = input.to_string_lossy().into_owned();

    run(dir.path(), &["--json-mode", "assess", "-f", input.as_str()]).unwrap();
    run(dir.path(), &["--json-mode", "assess", "-f", input.as_str(), "-a", "lead@plant"]).unwrap();
    run(dir.path(), &["--json-mode", "audit", "verify", "--all"]).unwrap();
    run(dir.path(), &["--json-mode", "audit", "show", "equipment/V-101", "2"]).unwrap();

    let store = RedbAuditStore::open(dir.path().join("audit.db")).unwrap();
    let history = store.history("equipment/V-101").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].actor, "test-runner");
    assert_eq!(history[1].actor, "lead@plant");
    assert_eq!(history[1].chain_hash, history[0].content_hash);
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("v101.json");
    std::fs::write(&input, ASSESSMENT).unwrap();
    let input = input.to_string_lossy().into_owned();

    run(dir.path(), &["--json-mode", "assess", "-f", input.as_str(), "--dry-run"]).unwrap();
    assert!(!dir.path().join("audit.db").exists());
}

#[test]
fn test_recorded_calculation_extends_chain() {
    let dir = tempdir().unwrap();
    let args = [
        "--json-mode", "rsf", "-c", "1.200", "-m", "0.875", "-n", "1.250", "-f", "0.050",
        "--record", "equipment/V-7",
    ];
    run(dir.path(), &args).unwrap();
    run(dir.path(), &args).unwrap();

    let store = RedbAuditStore::open(dir.path().join("audit.db")).unwrap();
    assert_eq!(store.record_count().unwrap(), 2);
    assert_eq!(store.entities().unwrap(), vec!["equipment/V-7".to_string()]);
}

#[test]
fn test_engine_errors_surface() {
    let dir = tempdir().unwrap();
    let err = run(
        dir.path(),
        &["thickness", "-p", "30000", "-r", "24", "-s", "17500"],
    )
    .unwrap_err();
    assert!(matches!(err, CliError::Core(_)));
}

#[test]
fn test_show_missing_record() {
    let dir = tempdir().unwrap();
    run(dir.path(), &["init"]).unwrap();
    let err = run(dir.path(), &["audit", "show", "equipment/V-404", "1"]).unwrap_err();
    assert!(matches!(err, CliError::Usage(_)));
}

#[test]
fn test_audit_reads_never_create_a_database() {
    let dir = tempdir().unwrap();
    let typo = dir.path().join("typo.db");
    let typo_arg = typo.to_string_lossy().into_owned();

    let err = run(dir.path(), &["-D", typo_arg.as_str(), "audit", "verify", "--all"]).unwrap_err();
    assert!(matches!(
        err,
        CliError::Core(pressfit_core::PressfitError::Storage(_))
    ));
    assert!(run(dir.path(), &["-D", typo_arg.as_str(), "audit", "history", "equipment/V-101"]).is_err());
    assert!(run(dir.path(), &["-D", typo_arg.as_str(), "audit", "show", "equipment/V-101", "1"]).is_err());
    assert!(!typo.exists());
    assert!(!dir.path().join("audit.db").exists());
}

// =============================================================================
// INPUT FILES
// =============================================================================

#[test]
fn test_read_assessment_input() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("input.json");
    std::fs::write(&path, ASSESSMENT).unwrap();

    let input = read_assessment_input(&path).unwrap();
    assert_eq!(input.equipment.equipment_id, "V-101");
    assert_eq!(input.equipment.radius().unwrap(), d("36"));
    assert_eq!(input.inspection.minimum_measured_thickness, d("0.610"));
}

#[test]
fn test_malformed_input_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("input.json");
    std::fs::write(&path, "{\"equipment\": 3}").unwrap();

    let err = read_assessment_input(&path).unwrap_err();
    assert!(matches!(err, CliError::InputFormat { .. }));
    assert!(matches!(
        read_assessment_input(&dir.path().join("absent.json")).unwrap_err(),
        CliError::Io { .. }
    ));
}
