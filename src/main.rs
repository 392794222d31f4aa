use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use termvec::config::AppConfig;
use termvec::core::search::{sql, TermVector, TextSearch, Weight};

/// Multilingual term vectors and search queries
#[derive(Parser, Debug)]
#[command(name = "termvec", about = "Build term vectors and search queries", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Term vector of a text
    Vector {
        profile: String,
        text: String,
        /// Weight applied to every position (A-D)
        weight: Option<Weight>,
    },

    /// Stems of a text, one per line
    Stems { profile: String, text: String },

    /// Boolean query expression
    Query {
        text: String,
        /// Profile to use instead of the detected one
        profile: Option<String>,
    },

    /// Detected profile and candidate languages
    Detect { text: String },

    /// Text with $$ formulas $$ rewritten as words
    Latex { profile: String, text: String },

    /// Concatenate serialized vectors
    Concat {
        #[arg(required = true)]
        vectors: Vec<TermVector>,
    },

    /// Database setup statements
    SetupSql,

    /// Effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = termvec::core::logging::init(&config.log);
    log::debug!("termvec v{} starting", termvec::VERSION);

    let search = || TextSearch::new(&config.search).context("Failed to initialize search pipeline");

    match cli.command {
        Command::Vector {
            profile,
            text,
            weight,
        } => {
            println!("{}", search()?.build_vector(&profile, &text, weight)?);
        }
        Command::Stems { profile, text } => {
            for stem in search()?.stems(&profile, &text)? {
                println!("{stem}");
            }
        }
        Command::Query { text, profile } => {
            let query = search()?.build_query(&text, profile.as_deref());
            println!("profile: {}", query.profile);
            if query.is_empty() {
                println!("query: (empty, matches nothing)");
            } else {
                println!("query: {}", query.expression);
            }
        }
        Command::Detect { text } => {
            let search = search()?;
            println!("profile: {}", search.detect(&text));
            match search.detect_languages(&text) {
                Ok(candidates) => {
                    for record in candidates {
                        println!("candidate: {} ({})", record.abbr, record.name);
                    }
                }
                Err(e) => log::debug!("No candidate languages: {e}"),
            }
        }
        Command::Latex { profile, text } => {
            println!("{}", search()?.transform_latex(&text, &profile));
        }
        Command::Concat { vectors } => {
            println!("{}", search()?.concatenate(&vectors));
        }
        Command::SetupSql => {
            for statement in sql::setup_statements(search()?.resources())? {
                println!("{statement};");
            }
        }
        Command::Config => print!("{}", config.to_toml()?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["termvec", "query", "#cats", "english", "--config", "t.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("t.toml")));
        assert!(matches!(
            cli.command,
            Command::Query { profile: Some(ref p), .. } if p == "english"
        ));
    }

    #[test]
    fn test_vector_weight_is_parsed() {
        let cli = Cli::try_parse_from(["termvec", "vector", "simple", "cats", "A"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Vector {
                weight: Some(Weight::A),
                ..
            }
        ));
        assert!(Cli::try_parse_from(["termvec", "vector", "simple", "cats", "Q"]).is_err());
    }

    #[test]
    fn test_concat_needs_a_vector() {
        assert!(Cli::try_parse_from(["termvec", "concat"]).is_err());
        let cli = Cli::try_parse_from(["termvec", "concat", "'cat':1", "'dog':1"]).unwrap();
        assert!(matches!(cli.command, Command::Concat { ref vectors } if vectors.len() == 2));
    }
}
