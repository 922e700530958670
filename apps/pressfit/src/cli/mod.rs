//! # Pressfit CLI Module
//!
//! This module implements the CLI interface for Pressfit.
//!
//! ## Available Commands
//!
//! - `thickness` - Minimum required wall thickness
//! - `rsf` - Remaining strength factor
//! - `mawp` - Maximum allowable working pressure
//! - `life` - Remaining service life
//! - `assess` - Full Level 1 assessment from a JSON file, recorded to the audit trail
//! - `audit` - Audit trail history, verification and record display
//! - `init` - Initialize a new audit database

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pressfit_core::{ConfidenceLevel, EntityRef, PressfitError};
use rust_decimal::Decimal;

use crate::config::{ConfigError, PressfitConfig};

pub use commands::*;

// =============================================================================
// ERRORS
// =============================================================================

/// Everything a command can fail with.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] PressfitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid input file '{}': {source}", .path.display())]
    InputFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{0}")]
    Usage(String),
}

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Pressfit - dual-path fitness-for-service calculations
///
/// Every result is computed by two independent methods that must agree, and
/// recorded results are kept in a hash-chained, append-only audit trail.
#[derive(Parser, Debug)]
#[command(name = "pressfit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a pressfit.toml configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the audit database (overrides storage.path)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Minimum required wall thickness of a cylindrical shell (in)
    Thickness {
        /// Design pressure (psi)
        #[arg(short, long)]
        pressure: Decimal,

        /// Inside radius (in)
        #[arg(short, long)]
        radius: Decimal,

        /// Allowable stress at design temperature (psi)
        #[arg(short, long)]
        stress: Decimal,

        /// Weld joint efficiency (0, 1]
        #[arg(short, long, default_value = "1.0")]
        efficiency: Decimal,

        #[command(flatten)]
        record: RecordArgs,
    },

    /// Remaining strength factor (Level 1)
    Rsf {
        /// Current measured thickness (in)
        #[arg(short, long)]
        current: Decimal,

        /// Minimum required thickness (in)
        #[arg(short, long)]
        minimum: Decimal,

        /// Nominal thickness (in)
        #[arg(short, long)]
        nominal: Decimal,

        /// Future corrosion allowance (in)
        #[arg(short, long, default_value = "0")]
        fca: Decimal,

        #[command(flatten)]
        record: RecordArgs,
    },

    /// Maximum allowable working pressure (psi)
    Mawp {
        /// Current measured thickness (in)
        #[arg(short, long)]
        current: Decimal,

        /// Inside radius (in)
        #[arg(short, long)]
        radius: Decimal,

        /// Allowable stress at design temperature (psi)
        #[arg(short, long)]
        stress: Decimal,

        /// Weld joint efficiency (0, 1]
        #[arg(short, long, default_value = "1.0")]
        efficiency: Decimal,

        /// Future corrosion allowance (in)
        #[arg(short, long, default_value = "0")]
        fca: Decimal,

        #[command(flatten)]
        record: RecordArgs,
    },

    /// Remaining service life (years)
    Life {
        /// Current measured thickness (in)
        #[arg(short, long)]
        current: Decimal,

        /// Minimum required thickness (in)
        #[arg(short, long)]
        minimum: Decimal,

        /// Corrosion rate (in/yr)
        #[arg(short = 'r', long)]
        rate: Decimal,

        /// Confidence in the rate (conservative, average, optimistic)
        #[arg(short = 'l', long, default_value = "average")]
        confidence: ConfidenceLevel,

        #[command(flatten)]
        record: RecordArgs,
    },

    /// Run a full Level 1 assessment and record it
    Assess {
        /// JSON file with `equipment` and `inspection` objects
        #[arg(short, long)]
        file: PathBuf,

        /// Who is performing the assessment
        #[arg(short, long)]
        actor: Option<String>,

        /// Evaluate only; do not write to the audit trail
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect the audit trail
    Audit {
        #[command(subcommand)]
        action: AuditAction,
    },

    /// Initialize a new empty audit database (never replaces an existing one)
    Init,
}

/// Optional recording of a single calculation.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RecordArgs {
    /// Append the result to this entity's audit chain (`type/id`)
    #[arg(long)]
    pub record: Option<EntityRef>,

    /// Actor for the audit record
    #[arg(short, long)]
    pub actor: Option<String>,
}

/// Audit trail subcommands.
#[derive(Subcommand, Debug)]
pub enum AuditAction {
    /// List an entity's records in sequence order
    History {
        /// Entity (`type/id`)
        entity: EntityRef,
    },

    /// Verify an entity's chain, or every chain with --all
    Verify {
        /// Entity (`type/id`)
        #[arg(required_unless_present = "all")]
        entity: Option<EntityRef>,

        /// Verify every entity in the database
        #[arg(long, conflicts_with = "entity")]
        all: bool,
    },

    /// Show one record in full
    Show {
        /// Entity (`type/id`)
        entity: EntityRef,

        /// Sequence number
        sequence: u64,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CliError> {
    let mut config = PressfitConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config.storage.path = path;
    }
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Thickness {
            pressure,
            radius,
            stress,
            efficiency,
            record,
        } => cmd_thickness(&config, json_mode, pressure, radius, stress, efficiency, &record),
        Commands::Rsf {
            current,
            minimum,
            nominal,
            fca,
            record,
        } => cmd_rsf(&config, json_mode, current, minimum, nominal, fca, &record),
        Commands::Mawp {
            current,
            radius,
            stress,
            efficiency,
            fca,
            record,
        } => cmd_mawp(
            &config, json_mode, current, radius, stress, efficiency, fca, &record,
        ),
        Commands::Life {
            current,
            minimum,
            rate,
            confidence,
            record,
        } => cmd_life(&config, json_mode, current, minimum, rate, confidence, &record),
        Commands::Assess {
            file,
            actor,
            dry_run,
        } => cmd_assess(&config, json_mode, &file, actor.as_deref(), dry_run),
        Commands::Audit { action } => match action {
            AuditAction::History { entity } => cmd_audit_history(&config, json_mode, &entity),
            AuditAction::Verify { entity, all } => {
                cmd_audit_verify(&config, json_mode, entity.as_ref(), all)
            }
            AuditAction::Show { entity, sequence } => {
                cmd_audit_show(&config, json_mode, &entity, sequence)
            }
        },
        Commands::Init => cmd_init(&config),
    }
}
