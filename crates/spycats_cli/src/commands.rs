//! Subcommands mapping CLI input onto the core services.

use crate::breed_source::load_breeds;
use crate::config::CliConfig;
use anyhow::Result;
use clap::Subcommand;
use log::warn;
use serde_json::json;
use spycats_core::db::open_db;
use spycats_core::{
    BreedValidator, CatId, CatService, MissionId, MissionService, NewCat, NewMission, NewTarget,
    SqliteCatRepository, SqliteMissionRepository, TargetId, TargetUpdate,
};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage cats
    #[command(subcommand)]
    Cats(CatCommand),
    /// Manage missions
    #[command(subcommand)]
    Missions(MissionCommand),
    /// Inspect and update mission targets
    #[command(subcommand)]
    Targets(TargetCommand),
    /// Load the breed catalog and print the accepted names
    Breeds,
    /// Print the core version
    Version,
}

#[derive(Debug, Subcommand)]
pub enum CatCommand {
    /// Create a cat; the breed must be in the catalog
    Create {
        #[arg(long)]
        name: String,
        /// Years of experience
        #[arg(long)]
        experience: i64,
        #[arg(long)]
        breed: String,
        #[arg(long)]
        salary: i64,
    },
    /// Show one cat
    Get { id: CatId },
    /// List all cats
    List,
    /// Overwrite a cat's salary
    Salary { id: CatId, salary: i64 },
    /// Delete a cat
    Delete { id: CatId },
}

#[derive(Debug, Subcommand)]
pub enum MissionCommand {
    /// Create a mission with 1 to 3 targets
    Create {
        /// Assign the mission to this cat right away
        #[arg(long)]
        cat: Option<CatId>,
        /// Target as NAME:COUNTRY[:NOTES]; repeat for each target
        #[arg(long = "target", value_parser = parse_target_arg)]
        targets: Vec<NewTarget>,
    },
    /// Show one mission with its targets
    Get { id: MissionId },
    /// List all missions
    List,
    /// Delete an unassigned mission and its targets
    Delete { id: MissionId },
    /// Assign a cat to a mission
    Assign { mission_id: MissionId, cat_id: CatId },
}

#[derive(Debug, Subcommand)]
pub enum TargetCommand {
    /// Show one target
    Get { id: TargetId },
    /// Update notes and/or completion of a target
    Update {
        id: TargetId,
        #[arg(long)]
        notes: Option<String>,
        /// true or false
        #[arg(long)]
        complete: Option<bool>,
    },
}

impl Command {
    /// Whether the command needs the breed catalog loaded first.
    fn needs_breeds(&self) -> bool {
        matches!(self, Self::Cats(CatCommand::Create { .. }) | Self::Breeds)
    }

    pub fn run(self, config: &CliConfig) -> Result<()> {
        let breeds = BreedValidator::new();
        if self.needs_breeds() {
            if let Err(err) = load_breeds(&config.breed_source, &breeds) {
                if matches!(self, Self::Breeds) {
                    return Err(err);
                }
                // Creation then fails with `not_ready` instead of aborting here.
                warn!("event=cli_start module=cli status=degraded error_code=breeds_not_ready");
                eprintln!("warning: {err:#}");
            }
        }

        match self {
            Self::Cats(command) => run_cat_command(command, config, &breeds),
            Self::Missions(command) => run_mission_command(command, config),
            Self::Targets(command) => run_target_command(command, config),
            Self::Breeds => print_json(&breeds.sorted_names().unwrap_or_default()),
            Self::Version => {
                println!("spycats_core version={}", spycats_core::core_version());
                Ok(())
            }
        }
    }
}

fn run_cat_command(command: CatCommand, config: &CliConfig, breeds: &BreedValidator) -> Result<()> {
    let conn = open_db(&config.db_path)?;
    let service = CatService::new(SqliteCatRepository::try_new(&conn)?, breeds);

    match command {
        CatCommand::Create {
            name,
            experience,
            breed,
            salary,
        } => print_json(&service.create_cat(NewCat::new(name, experience, breed, salary))?),
        CatCommand::Get { id } => print_json(&service.get_cat(id)?),
        CatCommand::List => print_json(&service.list_cats()?),
        CatCommand::Salary { id, salary } => print_json(&service.update_salary(id, salary)?),
        CatCommand::Delete { id } => {
            service.delete_cat(id)?;
            print_json(&json!({ "deleted_cat_id": id }))
        }
    }
}

fn run_mission_command(command: MissionCommand, config: &CliConfig) -> Result<()> {
    let mut conn = open_db(&config.db_path)?;
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn)?);

    match command {
        MissionCommand::Create { cat, targets } => {
            let mission = NewMission {
                cat_id: cat,
                targets,
            };
            print_json(&service.create_mission(&mission)?)
        }
        MissionCommand::Get { id } => print_json(&service.get_mission(id)?),
        MissionCommand::List => print_json(&service.list_missions()?),
        MissionCommand::Delete { id } => {
            service.delete_mission(id)?;
            print_json(&json!({ "deleted_mission_id": id }))
        }
        MissionCommand::Assign { mission_id, cat_id } => {
            print_json(&service.assign_cat(mission_id, cat_id)?)
        }
    }
}

fn run_target_command(command: TargetCommand, config: &CliConfig) -> Result<()> {
    let mut conn = open_db(&config.db_path)?;
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn)?);

    match command {
        TargetCommand::Get { id } => print_json(&service.get_target(id)?),
        TargetCommand::Update {
            id,
            notes,
            complete,
        } => print_json(&service.update_target(id, &TargetUpdate { notes, complete })?),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parses `NAME:COUNTRY[:NOTES]`. Notes may contain further colons.
fn parse_target_arg(value: &str) -> Result<NewTarget, String> {
    let mut parts = value.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    let country = parts.next().unwrap_or_default().trim();
    if name.is_empty() || country.is_empty() {
        return Err(format!("expected NAME:COUNTRY[:NOTES], got `{value}`"));
    }

    let target = NewTarget::new(name, country);
    Ok(match parts.next() {
        Some(notes) => target.with_notes(notes),
        None => target,
    })
}
