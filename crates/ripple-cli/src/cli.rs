use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ripple",
    about = "Ripple: diff and patch ordered collections and trees",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with diff settings (`algorithm`, `detect_moves`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the diff and generated patch between two JSON arrays
    Diff(PairArgs),
    /// Like `diff`, then replay the patch and verify the result
    Patch(PairArgs),
    /// Diff two JSON forests of `{"value": .., "children": [..]}` nodes
    TreeDiff(PairArgs),
}

#[derive(Args)]
pub struct PairArgs {
    pub old: PathBuf,
    pub new: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_diff() {
        let cli = Cli::try_parse_from(["ripple", "diff", "a.json", "b.json"]).unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.old, PathBuf::from("a.json"));
            assert_eq!(args.new, PathBuf::from("b.json"));
        } else { panic!("wrong command"); }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parse_patch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "ripple", "patch", "a.json", "b.json", "--format", "json", "--config", "diff.toml", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Patch(_)));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("diff.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_tree_diff() {
        let cli = Cli::try_parse_from(["ripple", "tree-diff", "a.json", "b.json"]).unwrap();
        assert!(matches!(cli.command, Command::TreeDiff(_)));
    }

    #[test]
    fn missing_operand_is_rejected() {
        assert!(Cli::try_parse_from(["ripple", "diff", "a.json"]).is_err());
    }
}
