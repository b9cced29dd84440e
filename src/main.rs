//! Command-line interface for schemawiki

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use schemawiki::client::DokuWikiClient;
#[cfg(feature = "cli")]
use schemawiki::config::WikiConfig;
#[cfg(feature = "cli")]
use schemawiki::error::Error;
#[cfg(feature = "cli")]
use schemawiki::manager::{PublishManager, PublishState};
#[cfg(feature = "cli")]
use schemawiki::schema::{FileSchemaSource, SchemaSource};
#[cfg(feature = "cli")]
use schemawiki::transport::{ListOptions, WikiTransport};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "schemawiki")]
#[command(author, version, about = "Schema documentation wiki publisher", long_about = None)]
struct Cli {
    /// Path to the wiki configuration file
    #[arg(short, long, default_value = "schemawiki.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish a pre-parsed schema dump to the wiki
    Publish {
        /// Path to the schema dump (.yaml, .yml or .json)
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Publish a single element instead of the whole schema
        #[arg(short, long)]
        element: Option<String>,

        /// Publish to the public namespace instead of draft
        #[arg(long)]
        public: bool,
    },

    /// Print a summary of a schema dump without publishing
    Summary {
        /// Path to the schema dump
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,
    },

    /// List the wiki pages below a namespace
    #[command(name = "list-pages")]
    ListPages {
        /// Namespace to list; defaults to the configured namespace
        #[arg(value_name = "NAMESPACE")]
        namespace: Option<String>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Publish {
            schema,
            element,
            public,
        } => cmd_publish(&cli.config, schema, element, public),
        Commands::Summary { schema } => cmd_summary(schema),
        Commands::ListPages { namespace } => cmd_list_pages(&cli.config, namespace),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn connect(config_path: &Path) -> Result<(WikiConfig, DokuWikiClient), Error> {
    let config = WikiConfig::from_file(config_path)?;
    let client = DokuWikiClient::new(&config.wiki_url)?;
    let (user, pswd) = WikiConfig::credentials()?;
    if !client.login(&user, &pswd)? {
        return Err(Error::Transport(format!(
            "login to {} was rejected",
            config.wiki_url
        )));
    }
    Ok((config, client))
}

#[cfg(feature = "cli")]
fn cmd_publish(
    config_path: &Path,
    schema: PathBuf,
    element: Option<String>,
    public: bool,
) -> Result<(), Error> {
    let (_, client) = connect(config_path)?;
    let (user, _) = WikiConfig::credentials()?;
    let mut manager = PublishManager::new(client, user);
    if public {
        manager.set_publish_state(PublishState::Public);
    }

    let source = FileSchemaSource::new(schema);
    if !manager.ingest(&source) {
        return Err(Error::Ingestion(format!(
            "failed to process schema dump '{}'",
            source.path().display()
        )));
    }

    match element {
        Some(name) => {
            let element = manager
                .element(&name)?
                .cloned()
                .ok_or_else(|| Error::Other(format!("no schema element named '{}'", name)))?;
            let written = manager.publish_element(&element)?;
            if written {
                println!("Published page {}:{}", element.prefix, element.name);
            } else {
                println!("Failed publishing {}:{}", element.prefix, element.name);
            }
        }
        None => {
            let namespace = manager.publish_namespace();
            let elements = manager.publish_all_elements()?;
            let attributes = manager.publish_all_attributes()?;
            let simple_types = manager.publish_all_simple_types()?;
            let enums = manager.publish_all_enums()?;
            println!(
                "Published to namespace '{}': {} elements, {} attributes, {} simple types, {} enumerators",
                namespace, elements, attributes, simple_types, enums
            );
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_summary(schema: PathBuf) -> Result<(), Error> {
    let parsed = FileSchemaSource::new(schema).parse()?;
    println!("Schema version {}", parsed.version);
    println!("Target namespace {}", parsed.namespace);
    println!("  Elements:        {}", parsed.elements.len());
    println!("  Attributes:      {}", parsed.attributes.len());
    println!("  Attribute groups {}", parsed.attribute_groups.len());
    println!("  Simple types:    {}", parsed.simple_types.len());
    println!("  Enumerators:     {}", parsed.enumerators.len());
    println!("  Builtin types:   {}", parsed.builtin_types.len());
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_list_pages(config_path: &Path, namespace: Option<String>) -> Result<(), Error> {
    let (config, client) = connect(config_path)?;
    let namespace = namespace.unwrap_or(config.default_namespace);
    let pages = client.list_pages(&namespace, ListOptions::default())?;
    if pages.is_empty() {
        println!("No pages below namespace '{}'", namespace);
        return Ok(());
    }
    for (id, info) in &pages {
        println!("{}\trev {}\t{} bytes", id, info.rev, info.size);
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
