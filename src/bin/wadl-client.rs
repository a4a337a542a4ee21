/// Inspect the operations a WADL description would expose as a client
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    /// WADL file(s) to load
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// API prefix stripped from resource paths, e.g. "api/2"
    #[arg(long, env = "WADL_API_PREFIX", default_value = "")]
    prefix: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every canonical operation name
    List,
    /// List canonical names containing a substring
    Search { needle: String },
    /// Show one operation's signature, path and documentation
    Show { name: String },
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let client = match wadl_client::Client::from_files(&args.input, &args.prefix) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    match args.command {
        Command::List => {
            for name in client.flat_names() {
                println!("{}", name);
            }
        }
        Command::Search { needle } => {
            for name in client.search(&needle) {
                println!("{}", name);
            }
        }
        Command::Show { name } => match client.flat(&name) {
            Some(operation) => {
                println!("{}", operation.signature());
                println!("{} {}", operation.verb, operation.resource_path);
                if !operation.docstring.is_empty() {
                    println!("\n{}", operation.docstring);
                }
            }
            None => {
                eprintln!("No operation named {:?}", name);
                std::process::exit(1);
            }
        },
    }
}
