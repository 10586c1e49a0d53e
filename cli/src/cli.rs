//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Store code snippets and find them by meaning.
#[derive(Parser, Debug)]
#[command(name = "snipsearch", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(short, long, env = "SNIPSEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store a new snippet.
    Add {
        /// Snippet title.
        #[arg(long)]
        title: String,

        /// Code body.
        #[arg(long, required_unless_present = "file", conflicts_with = "file")]
        code: Option<String>,

        /// Read the code body from a file.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Language label.
        #[arg(short, long)]
        language: String,

        /// Free-text description.
        #[arg(short, long)]
        description: Option<String>,

        /// Comma-separated tags.
        #[arg(short, long, default_value = "")]
        tags: String,
    },

    /// List all snippets, newest first.
    List,

    /// Show one snippet.
    Show {
        /// Snippet id.
        id: String,
    },

    /// Change fields of a snippet.
    Update {
        /// Snippet id.
        id: String,

        /// New title.
        #[arg(long)]
        title: Option<String>,

        /// New code body.
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,

        /// Read the new code body from a file.
        #[arg(long)]
        file: Option<PathBuf>,

        /// New language label.
        #[arg(short, long)]
        language: Option<String>,

        /// New description. An empty string clears it.
        #[arg(short, long)]
        description: Option<String>,

        /// New comma-separated tags.
        #[arg(short, long)]
        tags: Option<String>,
    },

    /// Delete a snippet.
    Delete {
        /// Snippet id.
        id: String,
    },

    /// Case-sensitive substring search over titles, descriptions, tags and
    /// languages.
    Search {
        /// Text to look for.
        text: String,
    },

    /// Natural-language search by embedding similarity.
    Semantic {
        /// What the code should do.
        query: String,
    },

    /// Compute embeddings for snippets that lack a fresh one.
    Reindex {
        /// Re-embed every snippet.
        #[arg(short, long)]
        force: bool,
    },

    /// Ask the chat model to explain and review a stored snippet.
    Analyze {
        /// Snippet id.
        id: String,
    },

    /// Ask the chat model to write a snippet.
    Suggest {
        /// What the code should do. At least ten characters.
        description: String,

        /// Language to write it in.
        #[arg(short, long)]
        language: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_requires_code_or_file() {
        let err = Cli::try_parse_from(["snipsearch", "add", "--title", "t", "-l", "rust"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from([
            "snipsearch",
            "add",
            "--title",
            "t",
            "-l",
            "rust",
            "--file",
            "src/lib.rs",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Add { file: Some(_), code: None, .. }));
    }

    #[test]
    fn test_suggest_requires_language() {
        let err = Cli::try_parse_from(["snipsearch", "suggest", "parse a csv line"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from([
            "snipsearch",
            "suggest",
            "--language",
            "rust",
            "parse a csv line",
        ])
        .unwrap();
        match cli.command {
            Command::Suggest {
                description,
                language,
            } => {
                assert_eq!(description, "parse a csv line");
                assert_eq!(language, "rust");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_semantic_query() {
        let cli = Cli::try_parse_from(["snipsearch", "-v", "semantic", "debounce input"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Semantic { query } => assert_eq!(query, "debounce input"),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
