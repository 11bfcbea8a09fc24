use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "milk",
    about = "Command-line client for Remember The Milk",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Authenticate interactively and store the token in the config file.
    /// Requires a config file with a valid api key and shared secret
    /// (see `configsample`).
    Authenticate {
        /// Path to the TOML config file.
        config: PathBuf,
    },
    /// Show all lists. Requires a successful `authenticate`.
    Lists { config: PathBuf },
    /// Show the open tasks of a list.
    Tasks {
        config: PathBuf,
        list_id: String,
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
    },
    /// Write a sample config file.
    Configsample {
        #[arg(short, long, default_value = "sample.toml")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_authenticate_subcommand() {
        let cli = Cli::try_parse_from(["milk", "authenticate", "milk.toml"]).expect("parse");
        assert_eq!(
            cli.command,
            Command::Authenticate {
                config: PathBuf::from("milk.toml")
            }
        );
    }

    #[test]
    fn parses_lists_subcommand() {
        let cli = Cli::try_parse_from(["milk", "lists", "milk.toml"]).expect("parse");
        assert_eq!(
            cli.command,
            Command::Lists {
                config: PathBuf::from("milk.toml")
            }
        );
    }

    #[test]
    fn tasks_default_to_open_only() {
        let cli = Cli::try_parse_from(["milk", "tasks", "milk.toml", "100653"]).expect("parse");
        assert_eq!(
            cli.command,
            Command::Tasks {
                config: PathBuf::from("milk.toml"),
                list_id: "100653".into(),
                all: false,
            }
        );

        let cli = Cli::try_parse_from(["milk", "tasks", "milk.toml", "100653", "--all"])
            .expect("parse");
        assert!(matches!(cli.command, Command::Tasks { all: true, .. }));
    }

    #[test]
    fn configsample_has_default_output() {
        let cli = Cli::try_parse_from(["milk", "configsample"]).expect("parse");
        assert_eq!(
            cli.command,
            Command::Configsample {
                output: PathBuf::from("sample.toml")
            }
        );
    }

    #[test]
    fn tasks_requires_list_id() {
        assert!(Cli::try_parse_from(["milk", "tasks", "milk.toml"]).is_err());
    }
}
