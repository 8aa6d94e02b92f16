//! Command dispatch

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::LoadedTree;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{NodeId, NodeProperties};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Load settings for the working directory and run the command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(Commands::Completion { shell }) = &cli.command {
        return completion(*shell);
    }
    let container = ServiceContainer::load()?;
    run(cli, &container)
}

/// Run the command against an already wired container.
pub fn run(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Count { id }) => count(&load(cli, container)?, &NodeId::new(id.as_str())),
        Some(Commands::Children { id, offset, limit }) => children(
            container,
            &load(cli, container)?,
            &NodeId::new(id.as_str()),
            *offset,
            *limit,
        ),
        Some(Commands::Parent { id }) => parent(&load(cli, container)?, &NodeId::new(id.as_str())),
        Some(Commands::Tree { id, depth }) => {
            let tree = load(cli, container)?;
            let id = id.as_deref().map(NodeId::new).unwrap_or_else(|| tree.root.clone());
            show_tree(container, &tree, &id, *depth)
        }
        Some(Commands::Config { command }) => config(container, command),
        Some(Commands::Completion { shell }) => completion(*shell),
        None => Err(CliError::Usage("no command given (see --help)".into())),
    }
}

fn load(cli: &Cli, container: &ServiceContainer) -> CliResult<LoadedTree> {
    let tree = container
        .tree_service
        .load(cli.tree_file.as_deref(), &cli_properties(cli))?;
    debug!(root = %tree.root, properties = %describe(tree.node.properties()), "tree ready");
    Ok(tree)
}

fn cli_properties(cli: &Cli) -> NodeProperties {
    cli.properties.iter().cloned().collect()
}

fn describe(properties: &NodeProperties) -> String {
    properties.iter().map(|(k, v)| format!("{k}={v}")).join(", ")
}

#[instrument(skip(tree))]
fn count(tree: &LoadedTree, id: &NodeId) -> CliResult<()> {
    output::info(&tree.node.child_count(id)?);
    Ok(())
}

#[instrument(skip(container, tree))]
fn children(
    container: &ServiceContainer,
    tree: &LoadedTree,
    id: &NodeId,
    offset: usize,
    limit: Option<usize>,
) -> CliResult<()> {
    let page = container.tree_service.page(&tree.node, id, offset, limit)?;
    for child in &page.children {
        output::info(child);
    }
    if page.children.is_empty() {
        output::note(&format!("no children at offset {} ({} total)", page.offset, page.total));
    } else {
        output::note(&format!(
            "{}-{} of {}",
            page.offset + 1,
            page.offset + page.children.len(),
            page.total
        ));
    }
    if let Some(next) = page.next_offset() {
        output::note(&format!("next page: --offset {next}"));
    }
    Ok(())
}

/// The root's parent is the farm; below it the owning provider answers.
#[instrument(skip(tree))]
fn parent(tree: &LoadedTree, id: &NodeId) -> CliResult<()> {
    let parent = if tree.node.child_nodes().is_root(id) {
        tree.node.parent(id)
    } else {
        tree.node.child_nodes().parent(id, tree.node.properties())?
    };
    output::info(&parent);
    Ok(())
}

#[instrument(skip(container, tree))]
fn show_tree(
    container: &ServiceContainer,
    tree: &LoadedTree,
    id: &NodeId,
    depth: Option<usize>,
) -> CliResult<()> {
    let rendered = container.tree_service.render(&tree.node, id, depth)?;
    print!("{rendered}");
    Ok(())
}

fn config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::header("Effective configuration");
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(no config directory)".into());
            let cwd = container
                .fs
                .current_dir()
                .map_err(|e| InfraError::io("resolve working directory", e))?;
            output::field("global", &global);
            output::field("local", &local_config_path(&cwd).display());
        }
    }
    Ok(())
}

fn completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
