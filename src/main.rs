use std::path::PathBuf;

use clap::{Parser, Subcommand};
use spacdn::{AppError, BuildOptions, OutputFormat};

#[derive(Parser)]
#[command(name = "spacdn")]
#[command(version)]
#[command(
    about = "Shape CloudFront and Route 53 resources for single-page-app deployments",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shape the baseline fragment with a deployment config
    #[clap(visible_alias = "b")]
    Build {
        /// Host config file (YAML) with the service name and custom section
        #[arg(short, long)]
        config: PathBuf,
        /// Deployment stage name
        #[arg(short, long)]
        stage: String,
        /// Target region
        #[arg(short, long)]
        region: String,
        /// Display name used in distribution comments
        #[arg(long)]
        service: Option<String>,
        /// Existing template to merge the shaped fragment into
        #[arg(long)]
        merge_into: Option<PathBuf>,
        /// Output format: yaml or json
        #[arg(short, long, default_value = "yaml")]
        format: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the embedded baseline fragment
    Baseline {
        /// Output format: yaml or json
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Build { config, stage, region, service, merge_into, format, output } => {
            let options = BuildOptions {
                config,
                stage,
                region,
                service,
                merge_into,
                format: OutputFormat::parse(&format)?,
                output,
            };
            let rendered = spacdn::build(&options)?;
            match &options.output {
                Some(path) => println!("✅ Wrote shaped template to {}", path.display()),
                None => print!("{rendered}"),
            }
            Ok(())
        }
        Commands::Baseline { format } => {
            let rendered = spacdn::baseline(OutputFormat::parse(&format)?)?;
            print!("{rendered}");
            Ok(())
        }
    }
}
