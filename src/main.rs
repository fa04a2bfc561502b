use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use briefdoc::gdocs::{DocsClient, GoogleDocs};
use briefdoc::server::{AppState, ServerConfig};
use briefdoc::{BriefingStamp, FieldEntry, FontConfig, RenderOptions};

#[derive(Parser)]
#[command(name = "briefdoc", version, about = "Turn submitted form fields into PDF briefings or Google Docs")]
struct Cli {
    #[command(flatten)]
    fonts: FontArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct FontArgs {
    /// TrueType font for regular text (default: Helvetica)
    #[arg(long, env = "BRIEFDOC_FONT_REGULAR", global = true)]
    font_regular: Option<PathBuf>,

    /// TrueType font for bold text (default: Helvetica-Bold)
    #[arg(long, env = "BRIEFDOC_FONT_BOLD", global = true)]
    font_bold: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, env = "BRIEFDOC_LISTEN", default_value = "127.0.0.1:4321")]
        listen: SocketAddr,

        /// Google service account key file used by /api/save-doc
        #[arg(long, env = "BRIEFDOC_SERVICE_ACCOUNT", default_value = "./service-account.json")]
        service_account: PathBuf,

        /// Allow cross-origin requests
        #[arg(long)]
        cors: bool,
    },
    /// Render a briefing PDF from fields given on the command line
    Render {
        /// Field as LABEL=VALUE; repeat in display order
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<FieldEntry>,

        /// Title for the header (default: value of the Empresa field)
        #[arg(short, long)]
        title: Option<String>,

        /// Output PDF path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_field(s: &str) -> Result<FieldEntry, String> {
    let (label, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got {s:?}"))?;
    Ok(FieldEntry::new(label, value))
}

fn load_docs_client(path: &std::path::Path) -> Option<Arc<dyn DocsClient>> {
    match GoogleDocs::from_key_file(path) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            log::warn!("Google Docs disabled: {e}");
            None
        }
    }
}

fn run(cli: Cli) -> Result<(), briefdoc::Error> {
    let fonts = FontConfig {
        regular: cli.fonts.font_regular,
        bold: cli.fonts.font_bold,
    };
    let options = RenderOptions::default();

    match cli.command {
        Command::Serve {
            listen,
            service_account,
            cors,
        } => {
            let docs = load_docs_client(&service_account);
            let state = AppState::new(options, fonts, docs);
            let config = ServerConfig { addr: listen, cors };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(briefdoc::server::serve(config, state))
        }
        Command::Render {
            fields,
            title,
            output,
        } => {
            let mut briefing =
                briefdoc::form::build_briefing(fields, &options, BriefingStamp::now());
            if title.is_some() {
                briefing.title = title;
            }
            briefdoc::render_briefing_to_file(&briefing, &options, &fonts, &output)?;
            println!("Wrote {}", output.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
