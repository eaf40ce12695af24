use clap::{Parser, Subcommand};
use opendocs::{config, output, site};
use std::path::PathBuf;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "opendocs")]
#[command(about = "Static documentation site generator for MDX-flavored markdown")]
#[command(long_about = "\
Static documentation site generator for MDX-flavored markdown

Pages are plain GFM plus a small set of custom tags: callouts, tab groups,
and annotated images. Documents are resolved by id — guides/install maps to
<content root>/guides/install.mdx, then .md. Ids that match nothing render
a placeholder page instead of an error.

Project structure:

  docs.toml                        # Site config (title, nav, colors, repo)
  docs.local.toml                  # Optional machine-local overrides
  content/
  ├── introduction.mdx             # Doc id: introduction
  └── guides/
      └── install.md               # Doc id: guides/install

Custom tags (all degrade to plain markdown):

  <Callout type=\"warning\">...</Callout>      also <Warning>, <Tip>, ...
  <TabGroup><Tab title=\"npm\">...</Tab></TabGroup>
  <img src=\"x.png\" width=\"300\" theme=\"dark\" />

Run 'opendocs gen-config' to generate a documented docs.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project directory (the one holding docs.toml)
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the whole site into the output directory
    Build,
    /// Render a single document id to HTML on stdout
    Render {
        /// Document id, e.g. guides/install
        id: String,
        /// Render under this theme instead of the configured default
        #[arg(long)]
        theme: Option<String>,
    },
    /// Strictly compile every page and report malformed ones
    Check,
    /// Print a stock docs.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let summary = site::build(&cli.project, &cli.output)?;
            output::print_build_output(&summary);
        }
        Command::Render { id, theme } => {
            let html = site::render_doc(&cli.project, &id, theme.as_deref())?;
            print!("{html}");
        }
        Command::Check => {
            let failures = site::check(&cli.project)?;
            output::print_check_output(&failures);
            if !failures.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}
