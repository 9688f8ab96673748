use anyhow::Context;
use clap::{Parser, Subcommand};
use mdpress::build::build_site;
use mdpress::config::{Project, SiteConfig};
use mdpress::draft::create_draft;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mdpress", about = "A markdown blog generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a draft post in the drafts directory
    New { title: String },

    /// Build the site into the output directory
    Build,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Usage errors exit with status 1 rather than clap's default; help and
    // version requests are not usage errors and exit 0.
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        use clap::error::ErrorKind;
        let _ = err.print();
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                std::process::exit(0)
            }
            _ => std::process::exit(1),
        }
    });

    let project = Project::default();
    match cli.command {
        Commands::New { title } => {
            let path = create_draft(&title, &project.drafts_directory)
                .with_context(|| format!("creating draft '{}'", title))?;
            println!("draft '{}' created at `{}`", title, path.display());
        }
        Commands::Build => {
            let site = SiteConfig::from_file(&project.config_file)?;
            build_site(&project, &site)?;
            println!("site built successfully");
        }
    }

    Ok(())
}
