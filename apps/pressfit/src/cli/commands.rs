//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use std::path::Path;

use chrono::Duration;
use pressfit_core::{
    AssessmentReport, Assessor, AuditRecord, AuditStore, AuditTrailManager, CalculationEngine,
    ChainReport, ConfidenceLevel, EntityRef, EquipmentData, InMemoryAuditStore, InspectionData,
    Level1Outcome, RedbAuditStore, VerifiedResult,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CliError, RecordArgs};
use crate::config::PressfitConfig;

/// Maximum size of an assessment input file (1 MB).
const MAX_INPUT_FILE_SIZE: u64 = 1024 * 1024;

/// Contents of an `assess --file` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentInput {
    pub equipment: EquipmentData,
    pub inspection: InspectionData,
}

// =============================================================================
// CALCULATION COMMANDS
// =============================================================================

/// Minimum required thickness.
pub fn cmd_thickness(
    config: &PressfitConfig,
    json_mode: bool,
    pressure: Decimal,
    radius: Decimal,
    stress: Decimal,
    efficiency: Decimal,
    record: &RecordArgs,
) -> Result<(), CliError> {
    let engine = engine(config)?;
    let result = engine.minimum_required_thickness(pressure, radius, stress, efficiency)?;
    report_calculation(config, json_mode, engine, &result, record)
}

/// Remaining strength factor.
pub fn cmd_rsf(
    config: &PressfitConfig,
    json_mode: bool,
    current: Decimal,
    minimum: Decimal,
    nominal: Decimal,
    fca: Decimal,
    record: &RecordArgs,
) -> Result<(), CliError> {
    let engine = engine(config)?;
    let result = engine.remaining_strength_factor(current, minimum, nominal, fca)?;
    report_calculation(config, json_mode, engine, &result, record)
}

/// Maximum allowable working pressure.
#[allow(clippy::too_many_arguments)]
pub fn cmd_mawp(
    config: &PressfitConfig,
    json_mode: bool,
    current: Decimal,
    radius: Decimal,
    stress: Decimal,
    efficiency: Decimal,
    fca: Decimal,
    record: &RecordArgs,
) -> Result<(), CliError> {
    let engine = engine(config)?;
    let result =
        engine.maximum_allowable_working_pressure(current, radius, stress, efficiency, fca)?;
    report_calculation(config, json_mode, engine, &result, record)
}

/// Remaining life.
pub fn cmd_life(
    config: &PressfitConfig,
    json_mode: bool,
    current: Decimal,
    minimum: Decimal,
    rate: Decimal,
    confidence: ConfidenceLevel,
    record: &RecordArgs,
) -> Result<(), CliError> {
    let engine = engine(config)?;
    let result = engine.remaining_life(current, minimum, rate, confidence)?;
    report_calculation(config, json_mode, engine, &result, record)
}

/// Print a result and, with `--record`, append it to the entity's chain.
fn report_calculation(
    config: &PressfitConfig,
    json_mode: bool,
    engine: CalculationEngine,
    result: &VerifiedResult,
    args: &RecordArgs,
) -> Result<(), CliError> {
    let recorded = match &args.record {
        Some(entity) => {
            let assessor = Assessor::new(engine, audit_manager(config)?);
            let actor = actor(config, args.actor.as_deref());
            Some(assessor.record_calculation(entity.clone(), result, actor)?)
        }
        None => None,
    };

    if json_mode {
        let output = serde_json::json!({
            "result": result,
            "record": recorded,
        });
        print_json(&output);
        return Ok(());
    }

    print_result(result);
    if let Some(record) = recorded {
        println!();
        println!(
            "Recorded as {} #{} ({})",
            record.entity_key(),
            record.sequence,
            record.content_hash
        );
    }
    Ok(())
}

// =============================================================================
// ASSESS COMMAND
// =============================================================================

/// Run a Level 1 assessment from a JSON file.
pub fn cmd_assess(
    config: &PressfitConfig,
    json_mode: bool,
    file: &Path,
    actor_arg: Option<&str>,
    dry_run: bool,
) -> Result<(), CliError> {
    let input = read_assessment_input(file)?;
    tracing::info!(
        equipment = %input.equipment.equipment_id,
        inspection = %input.inspection.inspection_id,
        dry_run,
        "Running Level 1 assessment"
    );

    let engine = engine(config)?;
    if dry_run {
        let assessor = Assessor::new(engine, AuditTrailManager::new(InMemoryAuditStore::new()));
        let report = assessor.evaluate(&input.equipment, &input.inspection)?;
        if json_mode {
            print_json(&report);
        } else {
            print_report(&report);
        }
        return Ok(());
    }

    let assessor = Assessor::new(engine, audit_manager(config)?);
    let recorded = assessor.assess(
        &input.equipment,
        &input.inspection,
        actor(config, actor_arg),
    )?;

    if json_mode {
        print_json(&recorded);
        return Ok(());
    }

    print_report(&recorded.report);
    println!();
    println!(
        "Recorded as {} #{} ({})",
        recorded.record.entity_key(),
        recorded.record.sequence,
        recorded.record.content_hash
    );
    Ok(())
}

/// Read and parse an assessment document.
pub fn read_assessment_input(file: &Path) -> Result<AssessmentInput, CliError> {
    let io_err = |source| CliError::Io {
        path: file.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(file).map_err(io_err)?;
    if !metadata.is_file() {
        return Err(CliError::Usage(format!(
            "'{}' is not a regular file",
            file.display()
        )));
    }
    if metadata.len() > MAX_INPUT_FILE_SIZE {
        return Err(CliError::Usage(format!(
            "'{}' is {} bytes; the limit is {} bytes",
            file.display(),
            metadata.len(),
            MAX_INPUT_FILE_SIZE
        )));
    }

    let contents = std::fs::read(file).map_err(io_err)?;
    serde_json::from_slice(&contents).map_err(|source| CliError::InputFormat {
        path: file.to_path_buf(),
        source,
    })
}

// =============================================================================
// AUDIT COMMANDS
// =============================================================================

/// List an entity's records.
pub fn cmd_audit_history(
    config: &PressfitConfig,
    json_mode: bool,
    entity: &EntityRef,
) -> Result<(), CliError> {
    let manager = existing_audit_manager(config)?;
    let history = manager.history(entity)?;

    if json_mode {
        print_json(&history);
        return Ok(());
    }

    println!("Audit history for {}", entity);
    println!("{}", "=".repeat(18 + entity.key().len()));
    if history.is_empty() {
        println!("No records");
        return Ok(());
    }
    for record in &history {
        println!(
            "#{:<4} {}  {:<22} {:<20} {}",
            record.sequence,
            record.event_timestamp.to_rfc3339(),
            record.event_type.tag(),
            record.actor,
            short_hash(&record.content_hash)
        );
    }
    Ok(())
}

/// Verify one chain or all of them. Fails if any chain is broken.
pub fn cmd_audit_verify(
    config: &PressfitConfig,
    json_mode: bool,
    entity: Option<&EntityRef>,
    all: bool,
) -> Result<(), CliError> {
    let manager = existing_audit_manager(config)?;

    let entities = match (entity, all) {
        (Some(entity), false) => vec![entity.clone()],
        (None, true) => manager
            .store()
            .entities()?
            .iter()
            .map(|key| key.parse::<EntityRef>())
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(CliError::Usage(
                "give either an entity or --all".to_string(),
            ));
        }
    };

    let reports = entities
        .iter()
        .map(|entity| manager.verify_chain(entity))
        .collect::<Result<Vec<ChainReport>, _>>()?;
    let broken = reports.iter().filter(|r| !r.valid).count();

    if json_mode {
        print_json(&reports);
    } else {
        for report in &reports {
            print_chain_report(report);
        }
        println!();
        println!("{} chain(s) checked, {} broken", reports.len(), broken);
    }

    if broken > 0 {
        tracing::warn!(broken, "Audit verification found broken chains");
        return Err(CliError::Usage(format!(
            "{} audit chain(s) failed verification",
            broken
        )));
    }
    Ok(())
}

/// Show one record with its integrity status.
pub fn cmd_audit_show(
    config: &PressfitConfig,
    json_mode: bool,
    entity: &EntityRef,
    sequence: u64,
) -> Result<(), CliError> {
    let manager = existing_audit_manager(config)?;
    let record = manager
        .store()
        .get(&entity.key(), sequence)?
        .ok_or_else(|| CliError::Usage(format!("No record {} #{}", entity, sequence)))?;
    let integrity = manager.verify_integrity(&record)?;

    if json_mode {
        let output = serde_json::json!({
            "record": record,
            "after_state": record.after_state_value()?,
            "integrity": integrity,
        });
        print_json(&output);
        return Ok(());
    }

    print_record(&record);
    println!();
    println!(
        "Integrity:   {}",
        if integrity.valid { "valid" } else { "INVALID" }
    );
    for error in &integrity.errors {
        println!("  - {}", error);
    }
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty audit database. An existing database is never touched.
pub fn cmd_init(config: &PressfitConfig) -> Result<(), CliError> {
    let path = &config.storage.path;
    if path.exists() {
        return Err(CliError::Usage(format!(
            "Database already exists at {}; audit databases are never replaced",
            path.display()
        )));
    }

    let store = RedbAuditStore::open(path)?;
    tracing::info!(path = %path.display(), records = store.record_count()?, "Initialized audit database");
    println!("Initialized new audit database at {}", path.display());
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn engine(config: &PressfitConfig) -> Result<CalculationEngine, CliError> {
    Ok(CalculationEngine::with_settings(config.engine.clone())?)
}

/// Open the configured audit database, creating it on first write.
pub fn audit_manager(
    config: &PressfitConfig,
) -> Result<AuditTrailManager<RedbAuditStore>, CliError> {
    let store = RedbAuditStore::open(&config.storage.path)?;
    Ok(with_config(store, config))
}

/// Open the configured audit database for reading. A missing file is an error.
pub fn existing_audit_manager(
    config: &PressfitConfig,
) -> Result<AuditTrailManager<RedbAuditStore>, CliError> {
    let store = RedbAuditStore::open_existing(&config.storage.path)?;
    Ok(with_config(store, config))
}

fn with_config(store: RedbAuditStore, config: &PressfitConfig) -> AuditTrailManager<RedbAuditStore> {
    AuditTrailManager::new(store)
        .with_clock_skew(Duration::seconds(config.audit.clock_skew_seconds))
}

fn actor<'a>(config: &'a PressfitConfig, explicit: Option<&'a str>) -> &'a str {
    explicit.unwrap_or(config.audit.default_actor.as_str())
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

fn print_result(result: &VerifiedResult) {
    let unit = result.quantity.unit();
    println!("{}: {} {}", result.quantity, result.value, unit);
    println!("  Primary:     {}", result.primary_value);
    println!(
        "  Secondary:   {} ({})",
        result.secondary_value, result.verification_method
    );
    println!("  Tolerance:   {}", result.tolerance_used);
    println!("  Reference:   {}", result.standard_reference);
    println!("  Calculation: {}", result.calculation_id);
    if !result.assumptions.is_empty() {
        println!("  Assumptions:");
        for assumption in &result.assumptions {
            println!("    - {}", assumption);
        }
    }
    if result.has_warnings() {
        println!("  Warnings:");
        for warning in &result.warnings {
            println!("    ! {}", warning);
        }
    }
}

fn print_report(report: &AssessmentReport) {
    println!("Level 1 Assessment");
    println!("==================");
    println!("Equipment:  {}", report.equipment_id);
    println!("Inspection: {}", report.inspection_id);
    println!();
    for result in [
        &report.minimum_thickness,
        &report.rsf,
        &report.mawp,
        &report.remaining_life,
    ] {
        print_result(result);
    }
    println!();
    println!(
        "Next inspection within {} years",
        report.next_inspection_interval
    );
    for warning in report
        .thickness_check
        .warnings
        .iter()
        .chain(&report.rsf_check.warnings)
        .chain(&report.interval_warnings)
    {
        println!("  ! {}", warning);
    }
    for finding in &report.cross_check.inconsistencies {
        println!("  x {}", finding);
    }
    for recommendation in &report.cross_check.recommendations {
        println!("  > {}", recommendation);
    }
    println!();
    match &report.outcome {
        Level1Outcome::Accept => println!("Outcome: ACCEPT"),
        Level1Outcome::Reject { reasons } => {
            println!("Outcome: REJECT");
            for reason in reasons {
                println!("  - {}", reason);
            }
        }
    }
}

fn print_chain_report(report: &ChainReport) {
    println!(
        "{:<40} {:>5} record(s)  {}",
        report.entity,
        report.length,
        if report.valid { "ok" } else { "BROKEN" }
    );
    for error in &report.errors {
        println!("  - {}", error);
    }
    for (sequence, integrity) in &report.records {
        for error in &integrity.errors {
            println!("  #{}: {}", sequence, error);
        }
    }
}

fn print_record(record: &AuditRecord) {
    println!("Record {}", record.record_id);
    println!("  Entity:      {}", record.entity_key());
    println!("  Sequence:    {}", record.sequence);
    println!("  Event:       {}", record.event_type);
    println!("  Timestamp:   {}", record.event_timestamp.to_rfc3339());
    println!("  Actor:       {}", record.actor);
    if let Some(reference) = &record.standard_reference {
        println!("  Reference:   {}", reference);
    }
    println!("  Chain hash:  {}", record.chain_hash);
    println!("  Content:     {}", record.content_hash);
    if let Some(before) = &record.before_state {
        println!("  Before:      {}", before);
    }
    println!("  After:       {}", record.after_state);
}
