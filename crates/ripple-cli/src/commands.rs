use std::fmt;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use ripple_changeset::{ChangesetContainer, ContainerConfig};
use ripple_diff::{diff_slices, diff_trees, DiffConfig, OrderedDiff};
use ripple_types::{IndexPath, Operation, OrderedCollection, TreeArray, TreeNode};

use crate::cli::*;

/// What a command found: the diff, the patch generated from it and, for
/// `patch`, whether replaying it reproduced the new input.
#[derive(Debug, Serialize)]
pub struct Report<I, E> {
    pub diff: OrderedDiff<I>,
    pub patch: Vec<Operation<E, I>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let output = match cli.command {
        Command::Diff(args) => {
            let (old, new) = read_pair::<Vec<Value>>(&args)?;
            render(&list_report(&old, &new, &config)?, cli.format)?
        }
        Command::Patch(args) => {
            let (old, new) = read_pair::<Vec<Value>>(&args)?;
            let report = verified_list_report(&old, &new, &config)?;
            if report.verified != Some(true) {
                bail!("replaying the patch did not reproduce {}", args.new.display());
            }
            render(&report, cli.format)?
        }
        Command::TreeDiff(args) => {
            let (old, new) = read_pair::<TreeArray<Value>>(&args)?;
            render(&tree_report(&old, &new, &config)?, cli.format)?
        }
    };
    println!("{output}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DiffConfig> {
    let Some(path) = path else {
        return Ok(DiffConfig::default());
    };
    let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = toml::from_str(&source).with_context(|| format!("parsing {}", path.display()))?;
    debug!(?config, "loaded diff config");
    Ok(config)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing {}", path.display()))
}

fn read_pair<T: DeserializeOwned>(args: &PairArgs) -> anyhow::Result<(T, T)> {
    Ok((read_json(&args.old)?, read_json(&args.new)?))
}

pub fn list_report(old: &[Value], new: &[Value], config: &DiffConfig) -> anyhow::Result<Report<usize, Value>> {
    let diff = diff_slices(old, new, config);
    let patch = diff.generate_patch(&new.to_vec())?;
    Ok(Report {
        diff,
        patch,
        verified: None,
    })
}

/// Push `new` through a container seeded with `old` and check that the
/// published patch replays `old` into `new` and aggregates back into the
/// published diff.
pub fn verified_list_report(old: &[Value], new: &[Value], config: &DiffConfig) -> anyhow::Result<Report<usize, Value>> {
    let container = ChangesetContainer::with_config(
        old.to_vec(),
        ContainerConfig {
            diff: config.clone(),
            ..ContainerConfig::default()
        },
    );
    container.replace_with_diff(new.to_vec(), true)?;
    let changeset = container.changeset();
    let diff = changeset.diff()?.clone();
    let patch = changeset.patch()?.to_vec();

    let mut replayed = old.to_vec();
    replayed.apply_patch(patch.clone())?;
    let aggregated = OrderedDiff::from_patch(&patch)?;
    let verified = replayed == new && aggregated.canonical() == diff.canonical();
    debug!(operations = patch.len(), verified, "replayed patch");
    Ok(Report {
        diff,
        patch,
        verified: Some(verified),
    })
}

pub fn tree_report(
    old: &TreeArray<Value>,
    new: &TreeArray<Value>,
    config: &DiffConfig,
) -> anyhow::Result<Report<IndexPath, TreeNode<Value>>> {
    let diff = diff_trees(old, new, config);
    let patch = diff.generate_patch(new)?;
    Ok(Report {
        diff,
        patch,
        verified: None,
    })
}

pub fn render<I, E>(report: &Report<I, E>, format: OutputFormat) -> anyhow::Result<String>
where
    I: Serialize + fmt::Debug,
    E: Serialize + fmt::Debug,
{
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    if report.diff.is_empty() {
        return Ok("No changes.".into());
    }
    let mut out = vec![
        format!("{} {:?}", "inserts:".green().bold(), report.diff.inserts),
        format!("{} {:?}", "deletes:".red().bold(), report.diff.deletes),
        format!("{} {:?}", "updates:".yellow().bold(), report.diff.updates),
        format!("{} {:?}", "moves:  ".cyan().bold(), report.diff.moves),
        format!("{} ({} operations)", "patch:".bold(), report.patch.len()),
    ];
    out.extend(report.patch.iter().map(|op| format!("  {op:?}")));
    if report.verified == Some(true) {
        out.push(format!("{} patch replays old into new", "✓".green().bold()));
    }
    Ok(out.join("\n"))
}
