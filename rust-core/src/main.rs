use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};

use li_percolation::{
    Configuration, ConfigurationDocument, PercolationConfig, PercolationNetwork, PercolationScheme,
};

#[derive(Parser)]
#[command(name = "li-percolation")]
#[command(about = "Largest percolating Li network in a crystal supercell")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads to use (default: all available cores)
    #[arg(short, long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster a target configuration over the network of a reference configuration
    Analyze {
        /// Reference site table (JSON) used to build neighbours and gates
        #[arg(short, long)]
        reference: PathBuf,

        /// Target site table (JSON) whose occupancy is clustered; defaults to the reference
        #[arg(long)]
        target: Option<PathBuf>,

        #[command(flatten)]
        settings: Settings,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build the reference network and report its size
    Inspect {
        /// Reference site table (JSON)
        #[arg(short, long)]
        reference: PathBuf,

        #[command(flatten)]
        settings: Settings,
    },
}

#[derive(clap::Args)]
struct Settings {
    /// Percolation config file (JSON); flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Percolation scheme: 0 (0TM), 1 (0TM & 1TM), 2 (ungated)
    #[arg(short, long)]
    scheme: Option<u8>,

    /// Mobile species to cluster
    #[arg(long)]
    species: Option<String>,

    /// Species never treated as candidate sites
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Lower bound of the bond window (Angstrom)
    #[arg(long)]
    r_min: Option<f64>,

    /// Upper bound of the bond window (Angstrom)
    #[arg(long)]
    r_max: Option<f64>,
}

impl Settings {
    fn resolve(&self) -> Result<PercolationConfig> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&read(path)?)
                .with_context(|| format!("Failed to parse config {}", path.display()))?,
            None => PercolationConfig::default(),
        };
        if let Some(scheme) = self.scheme {
            config.scheme = PercolationScheme::try_from(scheme)?;
        }
        if let Some(species) = &self.species {
            config.target_species = species.clone();
        }
        if let Some(exclude) = &self.exclude {
            config.excluded_species = exclude.iter().cloned().collect();
        }
        if let Some(r_min) = self.r_min {
            config.bond_window.r_min = r_min;
        }
        if let Some(r_max) = self.r_max {
            config.bond_window.r_max = r_max;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Set thread pool size if specified
    if let Some(threads) = cli.threads {
        #[cfg(feature = "parallel")]
        {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .context("Failed to set thread pool size")?;
            info!("Using {} threads", threads);
        }
        #[cfg(not(feature = "parallel"))]
        {
            warn!(
                "Thread count {} specified but parallel feature not enabled. Ignoring.",
                threads
            );
        }
    }

    info!("Starting li-percolation v{}", li_percolation::VERSION);

    match cli.command {
        Commands::Analyze {
            reference,
            target,
            settings,
            output,
        } => analyze(&reference, target.as_deref(), &settings, output.as_deref()),
        Commands::Inspect {
            reference,
            settings,
        } => inspect(&reference, &settings),
    }
}

fn analyze(
    reference_path: &Path,
    target_path: Option<&Path>,
    settings: &Settings,
    output: Option<&Path>,
) -> Result<()> {
    let config = settings.resolve()?;
    info!(
        "Scheme {}, species '{}', bond window [{}, {}]",
        config.scheme, config.target_species, config.bond_window.r_min, config.bond_window.r_max
    );

    let reference = load_configuration(reference_path)?;
    let network = PercolationNetwork::from_reference(&reference, &config)
        .context("Failed to build the reference network")?;

    let report = match target_path {
        Some(path) => {
            let target = load_configuration(path)?;
            network.analyze(&target, &config)?
        }
        None => network.analyze(&reference, &config)?,
    };

    let json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn inspect(reference_path: &Path, settings: &Settings) -> Result<()> {
    let config = settings.resolve()?;
    let reference = load_configuration(reference_path)?;
    let network = PercolationNetwork::from_reference(&reference, &config)
        .context("Failed to build the reference network")?;

    let neighbors = network.neighbors();
    let (min, max) = neighbors
        .iter()
        .map(|(_, list)| list.len())
        .fold((usize::MAX, 0), |(lo, hi), n| (lo.min(n), hi.max(n)));
    println!("Supercell:         {:?}", network.supercell());
    println!("Sites:             {}", reference.len());
    println!("Candidate sites:   {}", neighbors.len());
    println!("Directed edges:    {}", neighbors.edge_count());
    println!("Gates:             {}", network.gates().len());
    if !neighbors.is_empty() {
        println!("Neighbours/site:   {}..={}", min, max);
    }
    println!(
        "'{}' sites:          {}",
        config.target_species,
        reference.count_species(&config.target_species)
    );
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_configuration(path: &Path) -> Result<Configuration> {
    let document: ConfigurationDocument = serde_json::from_str(&read(path)?)
        .with_context(|| format!("Failed to parse site table {}", path.display()))?;
    let configuration = Configuration::from_document(document)
        .with_context(|| format!("Invalid site table {}", path.display()))?;
    info!(
        "Loaded {} sites from {} (supercell {:?})",
        configuration.len(),
        path.display(),
        configuration.supercell()
    );
    Ok(configuration)
}
