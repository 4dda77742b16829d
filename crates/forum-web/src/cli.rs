use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for the `forum` binary.
#[derive(Debug, Parser)]
#[command(name = "forum", version, about = "Question and answer forum server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default).
    Serve(ServeArgs),
    /// Create or upgrade the database schema, then exit.
    Migrate(MigrateArgs),
}

/// Overrides applied on top of the loaded configuration.
#[derive(Clone, Debug, Default, Args)]
pub struct ServeArgs {
    /// Address to bind (e.g. 127.0.0.1)
    #[arg(long)]
    pub bind: Option<String>,
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,
    /// Database file path
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Clone, Debug, Default, Args)]
pub struct MigrateArgs {
    /// Database file path
    #[arg(long)]
    pub database: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_optional() {
        let cli = Cli::try_parse_from(["forum"]).expect("cli should parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_overrides_parse() {
        let cli = Cli::try_parse_from(["forum", "-v", "serve", "--port", "9000", "--database", "x.db"])
            .expect("cli should parse");
        assert!(cli.verbose);
        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.database.as_deref(), Some("x.db"));
        assert_eq!(args.bind, None);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["forum", "-q", "-v"]).is_err());
    }
}
