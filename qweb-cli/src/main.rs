use anyhow::Result;
use clap::{Parser, Subcommand};
use qweb_cli::{PlanFormat, compile_cmd, compile_options, render_cmd, write_output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qweb", version, about = "QWeb template compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a template and print its render plan.
    Compile {
        /// Path to the template file
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = PlanFormat::Text)]
        format: PlanFormat,
        /// Element whose whitespace is kept verbatim (repeatable, default: pre)
        #[arg(long = "preserve", value_name = "TAG")]
        preserve: Vec<String>,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render a template against a JSON context and print the HTML.
    Render {
        /// Path to the template file
        input: PathBuf,
        /// JSON object supplying the template's names
        #[arg(long)]
        context: Option<PathBuf>,
        /// Fail on any name missing from the context
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Compile {
            input,
            format,
            preserve,
            output,
        } => {
            let plan = compile_cmd(&input, format, &compile_options(&preserve))?;
            write_output(&plan, output.as_deref())?;
        }
        Commands::Render {
            input,
            context,
            strict,
            output,
        } => {
            let html = render_cmd(&input, context.as_deref(), strict)?;
            write_output(&html, output.as_deref())?;
        }
    }
    Ok(())
}
