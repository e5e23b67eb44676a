//! `mender species`: inspect the taxonomy and try the resolver.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::adapters::sqlite::SqliteSpeciesRepository;
use crate::cli::context::AppContext;
use crate::cli::output::{output, table, CommandOutput};
use crate::domain::models::Species;
use crate::domain::ports::SpeciesRepository;
use crate::services::Resolution;

#[derive(Args, Debug)]
pub struct SpeciesArgs {
    #[command(subcommand)]
    pub command: SpeciesCommands,
}

#[derive(Subcommand, Debug)]
pub enum SpeciesCommands {
    /// List every taxonomy entry
    List,
    /// Resolve a free-text label and show which strategy matched
    Resolve {
        /// Species label, e.g. "dark elf"
        label: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct SpeciesListOutput {
    pub species: Vec<Species>,
    pub unknown_species_id: i64,
}

impl CommandOutput for SpeciesListOutput {
    fn to_human(&self) -> String {
        let mut t = table(["ID", "NAME"]);
        for s in &self.species {
            let name = if s.id == self.unknown_species_id {
                format!("{} (fallback)", s.name)
            } else {
                s.name.clone()
            };
            t.add_row(vec![s.id.to_string(), name]);
        }
        t.to_string()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ResolveOutput {
    pub label: String,
    pub species_id: i64,
    pub matched_name: Option<String>,
    pub strategy: &'static str,
}

impl From<(String, Resolution)> for ResolveOutput {
    fn from((label, resolution): (String, Resolution)) -> Self {
        Self {
            label,
            species_id: resolution.species_id,
            matched_name: resolution.matched_name,
            strategy: resolution.strategy.as_str(),
        }
    }
}

impl CommandOutput for ResolveOutput {
    fn to_human(&self) -> String {
        match &self.matched_name {
            Some(name) => format!("{:?} -> {} (id {}) via {}", self.label, name, self.species_id, self.strategy),
            None => format!("{:?} -> unknown species (id {})", self.label, self.species_id),
        }
    }
}

pub async fn execute(args: SpeciesArgs, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let resolver = ctx.species_resolver();

    match args.command {
        SpeciesCommands::List => {
            let repo = SqliteSpeciesRepository::new(ctx.pool.clone());
            let species = repo.list().await.context("Failed to list species")?;
            output(
                &SpeciesListOutput {
                    species,
                    unknown_species_id: resolver.unknown_species_id(),
                },
                json_mode,
            );
        }
        SpeciesCommands::Resolve { label } => {
            let taxonomy = resolver.taxonomy().await.context("Failed to load taxonomy")?;
            let resolution = resolver.resolve_in(&taxonomy, &label);
            output(&ResolveOutput::from((label, resolution)), json_mode);
        }
    }
    Ok(())
}
