//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Page schema and form document tools
#[derive(Debug, Parser)]
#[command(name = "examdesk", version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "EXAMDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Schema document (JSON, YAML or TOML) replacing the built-in page types
    #[arg(long, global = true)]
    pub schemas: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List page types
    Types,

    /// Print the form for a page type
    Render {
        /// Page type key; defaults to the document's `page_type`
        #[arg(long)]
        page_type: Option<String>,

        /// Page document to fill the form from
        #[arg(long)]
        data: Option<PathBuf>,

        /// Print the rendered view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print an empty page document
    Scaffold {
        /// Page type key
        #[arg(long)]
        page_type: String,

        /// Section types to add, in order
        #[arg(long = "section")]
        sections: Vec<String>,
    },

    /// Check required fields and formats; exits 1 when issues are found
    Validate {
        /// Page type key; defaults to the document's `page_type`
        #[arg(long)]
        page_type: Option<String>,

        /// Page document
        #[arg(long)]
        data: PathBuf,
    },

    /// Upload a file into a file field and save the document
    Upload {
        /// Page type key; defaults to the document's `page_type`
        #[arg(long)]
        page_type: Option<String>,

        /// Page document, rewritten in place
        #[arg(long)]
        data: PathBuf,

        /// Field path, e.g. `logo` or `sections[0].background_image`
        #[arg(long)]
        field: String,

        /// File to upload
        #[arg(long)]
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scaffold_sections() {
        let cli = Cli::try_parse_from([
            "examdesk",
            "scaffold",
            "--page-type",
            "city_page",
            "--section",
            "hero",
            "--section",
            "faq",
        ])
        .unwrap();
        match cli.command {
            Command::Scaffold {
                page_type,
                sections,
            } => {
                assert_eq!(page_type, "city_page");
                assert_eq!(sections, vec!["hero", "faq"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["examdesk", "types", "--schemas", "pages.yaml"]).unwrap();
        assert_eq!(cli.schemas, Some(PathBuf::from("pages.yaml")));
    }

    #[test]
    fn upload_requires_field_and_file() {
        assert!(Cli::try_parse_from(["examdesk", "upload", "--data", "p.json"]).is_err());
    }

    #[test]
    fn verify_command() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
