//! qgraph - query graph CLI
//!
//! Compiles XML questions to SPARQL, runs them against an endpoint and
//! renders justification responses.

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use qgraph_core::config::CONFIG_FILE;
use qgraph_core::{
    parse_justification, FieldMapping, HttpEndpoint, MalformedPolicy, OntologyMapping, QueryMode,
    Question, ResponseTranslator, RunConfig, SparqlQuery,
};

#[derive(Parser)]
#[command(name = "qgraph")]
#[command(version)]
#[command(about = "XML query graphs to SPARQL and justification responses", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a question to SPARQL
    Compile {
        /// Question file (.xml) or literal XML
        question: String,
        /// Run configuration (defaults to ./qgraph.yaml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Ontology mapping JSON
        #[arg(long)]
        ontology: Option<PathBuf>,
        /// Output form (select, construct); defaults to the config's mode
        #[arg(long)]
        mode: Option<String>,
        /// Run the result through the SPARQL parser
        #[arg(long)]
        check: bool,
        /// Write the query here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run a question against an endpoint and print the response XML
    Ask {
        /// Question file (.xml) or literal XML
        question: String,
        /// Run configuration (defaults to ./qgraph.yaml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// SPARQL endpoint URL
        #[arg(long)]
        endpoint: Option<String>,
        /// Ontology mapping JSON
        #[arg(long)]
        ontology: Option<PathBuf>,
        /// Justification field -> XML tag mapping JSON
        #[arg(long)]
        xml_mapping: Option<PathBuf>,
        /// Keep going when a justification cannot be parsed
        #[arg(long)]
        skip_malformed: bool,
        /// Write the response here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Parse an N3 justification document and print it as JSON
    Justify {
        /// N3 file
        n3: PathBuf,
        /// Justification field -> XML tag mapping JSON
        #[arg(long)]
        xml_mapping: Option<PathBuf>,
    },
    /// Check SPARQL syntax
    Check {
        /// SPARQL file
        sparql: PathBuf,
    },
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber")?;
    Ok(())
}

fn emit(text: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "written");
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn load_field_mapping(path: Option<&Path>) -> anyhow::Result<FieldMapping> {
    match path {
        Some(p) => FieldMapping::load(p).with_context(|| format!("loading xml mapping {}", p.display())),
        None => Ok(FieldMapping::default()),
    }
}

/// Config file (explicit or ./qgraph.yaml) with command line overrides applied
fn resolve_run_config(
    config: Option<PathBuf>,
    endpoint: Option<String>,
    ontology: Option<PathBuf>,
    xml_mapping: Option<PathBuf>,
    skip_malformed: bool,
) -> anyhow::Result<RunConfig> {
    let default_path = PathBuf::from(CONFIG_FILE);
    let mut run = match config {
        Some(path) => Some(RunConfig::load(&path).with_context(|| format!("loading {}", path.display()))?),
        None if default_path.exists() => Some(RunConfig::load(&default_path)?),
        None => None,
    };

    if let Some(ont) = ontology {
        match run.as_mut() {
            Some(r) => r.ontology = ont,
            None => run = Some(RunConfig::new(ont)),
        }
    }
    let mut run = run.ok_or_else(|| anyhow!("no ontology given: pass --ontology or provide {}", CONFIG_FILE))?;

    if endpoint.is_some() {
        run.endpoint = endpoint;
    }
    if xml_mapping.is_some() {
        run.xml_mapping = xml_mapping;
    }
    if skip_malformed {
        run.on_malformed_justification = MalformedPolicy::Skip;
    }
    run.validate()?;
    Ok(run)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Compile {
            question,
            config,
            ontology,
            mode,
            check,
            out,
        } => {
            let run = resolve_run_config(config, None, ontology, None, false)?;
            let mode: QueryMode = match mode {
                Some(m) => m.parse()?,
                None => run.mode,
            };
            let ont = OntologyMapping::load(&run.ontology);
            let query = Question::from_source(&ont, &question)?.serialize(mode);
            if check {
                query.check_syntax()?;
                info!("syntax ok");
            }
            emit(query.as_str(), out.as_deref())?;
        }

        Commands::Ask {
            question,
            config,
            endpoint,
            ontology,
            xml_mapping,
            skip_malformed,
            out,
        } => {
            let run = resolve_run_config(config, endpoint, ontology, xml_mapping, skip_malformed)?;
            let url = run
                .endpoint
                .clone()
                .ok_or_else(|| anyhow!("no endpoint given: pass --endpoint or set it in {}", CONFIG_FILE))?;

            let ont = OntologyMapping::load(&run.ontology);
            let question = Question::from_source(&ont, &question)?;
            let endpoint = HttpEndpoint::with_timeout(url, Duration::from_secs(run.timeout_secs))?;
            let translator = ResponseTranslator::new(load_field_mapping(run.xml_mapping.as_deref())?)
                .with_policy(run.on_malformed_justification);

            let xml = translator.ask(&question, &endpoint)?;
            emit(&xml, out.as_deref())?;
        }

        Commands::Justify { n3, xml_mapping } => {
            let text = fs::read_to_string(&n3).with_context(|| format!("reading {}", n3.display()))?;
            let mapping = load_field_mapping(xml_mapping.as_deref())?;
            let record = parse_justification(&text, &mapping)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Check { sparql } => {
            let text = fs::read_to_string(&sparql).with_context(|| format!("reading {}", sparql.display()))?;
            match SparqlQuery::new(text).check_syntax() {
                Ok(()) => println!("✓ {} is valid SPARQL", sparql.display()),
                Err(e) => bail!("{}: {}", sparql.display(), e),
            }
        }
    }

    Ok(())
}
