use clap::{Parser, Subcommand};
use prompt_catalog::archive::{self, ArchiveTarget, BundleStatus, ZipPackager};
use prompt_catalog::store::{CatalogStore, ContentDirSource};
use prompt_catalog::{catalog, config, output, views, watch};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prompt-catalog")]
#[command(about = "Catalog, export, and bundle a library of prompt and skill documents")]
#[command(long_about = "\
Catalog, export, and bundle a library of prompt and skill documents

Your filesystem is the data source. Directories become categories, markdown
files with frontmatter become prompts, and a directory holding SKILL.md
becomes a downloadable skill.

Content structure:

  content/
  ├── config.toml                  # Catalog config (optional)
  ├── _meta.toml                   # Ordering + title overrides (optional, any dir)
  ├── getting-started.md           # Prompt
  ├── prompts/                     # Category
  │   ├── code-review.md
  │   └── writing/blog-post.mdx
  └── skills/
      └── pdf-tools/               # Skill
          ├── SKILL.md
          └── references/forms.md  # Reference bundled with the skill

Every document starts with a YAML header that sets at least a title:

  ---
  title: Code Review
  description: Review a diff for correctness
  ---

Run 'prompt-catalog gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Log debug details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the content directory
    Check,
    /// Show the navigation tree
    Tree,
    /// List every document in navigation order
    List {
        /// Print the JSON listing
        #[arg(long)]
        json: bool,
    },
    /// Show one document
    Show {
        slug: String,
        /// Print the document as JSON
        #[arg(long)]
        json: bool,
        /// Print only the raw markdown body
        #[arg(long, conflicts_with = "json")]
        raw: bool,
    },
    /// Print every document as one splittable text
    Export,
    /// Show the archive manifest for a skill, or for all skills
    Manifest {
        #[arg(required_unless_present = "all")]
        slug: Option<String>,
        #[arg(long, conflicts_with = "slug")]
        all: bool,
    },
    /// Write skill bundles and bundles.json
    Bundle {
        #[arg(long, default_value = "dist/skills")]
        output: PathBuf,
    },
    /// Check written bundles against the current content
    Verify {
        #[arg(long, default_value = "dist/skills")]
        output: PathBuf,
    },
    /// Rebuild the catalog whenever content changes
    Watch,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = cli.source.as_path();

    match cli.command {
        Command::Check => {
            let site_config = load_site_config(source)?;
            eprintln!("==> Checking {}", source.display());
            let catalog = catalog::build(source, &site_config)?;
            println!("{}", output::format_check_summary(&catalog));
        }
        Command::Tree => {
            let site_config = load_site_config(source)?;
            let catalog = catalog::build(source, &site_config)?;
            output::print_tree(&catalog);
        }
        Command::List { json } => {
            let site_config = load_site_config(source)?;
            let catalog = catalog::build(source, &site_config)?;
            if json {
                println!("{}", views::listing_json(&catalog)?);
            } else {
                output::print_listing(&views::listing(&catalog));
            }
        }
        Command::Show { slug, json, raw } => {
            let site_config = load_site_config(source)?;
            let catalog = catalog::build(source, &site_config)?;
            if raw {
                print!("{}", views::raw_markdown(&catalog, &slug)?);
            } else {
                let doc = views::get_content(&catalog, &slug)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&doc)?);
                } else {
                    for line in output::format_document(&doc) {
                        println!("{}", line);
                    }
                }
            }
        }
        Command::Export => {
            let site_config = load_site_config(source)?;
            let catalog = catalog::build(source, &site_config)?;
            print!("{}", views::aggregated_export(&catalog));
        }
        Command::Manifest { slug, all } => {
            let site_config = load_site_config(source)?;
            let catalog = catalog::build(source, &site_config)?;
            let target = match (&slug, all) {
                (_, true) => ArchiveTarget::All,
                (Some(slug), false) => ArchiveTarget::Skill(slug),
                (None, false) => return Err("a skill slug or --all is required".into()),
            };
            output::print_manifest(&archive::manifest(&catalog, target, &site_config)?);
        }
        Command::Bundle { output: out_dir } => {
            let site_config = load_site_config(source)?;
            let catalog = catalog::build(source, &site_config)?;
            let packager = ZipPackager::new(site_config.archive.compression);
            let index = archive::write_bundles(&catalog, &site_config, &packager, &out_dir)?;
            output::print_bundle_index(&index);
        }
        Command::Verify { output: out_dir } => {
            let site_config = load_site_config(source)?;
            let catalog = catalog::build(source, &site_config)?;
            let packager = ZipPackager::new(site_config.archive.compression);
            let checks = archive::verify_bundles(&catalog, &site_config, &packager, &out_dir)?;
            output::print_verify(&checks);
            if checks.iter().any(|c| c.status != BundleStatus::Current) {
                return Err("bundles are out of date; run 'prompt-catalog bundle'".into());
            }
        }
        Command::Watch => {
            let site_config = load_site_config(source)?;
            // Watch events carry absolute paths.
            let root = source.canonicalize()?;
            let store = CatalogStore::open(ContentDirSource::new(&root, site_config.clone()))?;
            println!("{}", output::format_check_summary(&store.current()));
            let running = AtomicBool::new(true);
            watch::watch(&store, &root, &site_config, &running)?;
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

/// Load the content root's config and size the rayon pool from it.
fn load_site_config(source: &Path) -> Result<config::SiteConfig, config::ConfigError> {
    let site_config = config::load_config(source)?;
    init_thread_pool(&site_config.processing);
    Ok(site_config)
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` directives take precedence over the default level.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
