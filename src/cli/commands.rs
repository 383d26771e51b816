use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::arena::Tree;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::node::NodeRef;
use crate::tree_traits::TreeRender;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    match &cli.command {
        Some(Commands::Demo {
            fanout,
            grandchildren,
            show_ids,
        }) => _demo(&settings, *fanout, *grandchildren, *show_ids),
        Some(Commands::Children { count }) => _children(*count),
        Some(Commands::Config { command }) => _config(&settings, command),
        Some(Commands::Completion { shell }) => _completion(*shell),
        None => Ok(()),
    }
}

/// Root 0; children 1..=fanout; child `i` gets children `i1..=i<grandchildren>`.
///
/// Each branch is built as its own tree and then grafted below the root.
pub fn build_demo_tree(fanout: usize, grandchildren: usize) -> CliResult<Tree<usize>> {
    if !(1..=9).contains(&fanout) {
        return Err(CliError::InvalidArgs(format!(
            "fanout must be between 1 and 9, got {fanout}"
        )));
    }
    if grandchildren > 9 {
        return Err(CliError::InvalidArgs(format!(
            "grandchildren must be between 0 and 9, got {grandchildren}"
        )));
    }

    let mut tree = Tree::with_value(0);
    for i in 1..=fanout {
        let mut branch = Tree::with_value(i);
        let mut branch_root = branch.root_mut();
        for j in 1..=grandchildren {
            branch_root.add_child(i * 10 + j);
        }
        tree.root_mut().add_subtree(branch);
    }
    Ok(tree)
}

/// Space separated values, `-` for nodes without one.
pub fn format_values<'a>(nodes: impl Iterator<Item = NodeRef<'a, usize>>) -> String {
    nodes
        .map(|node| match node.value() {
            Ok(value) => value.to_string(),
            Err(_) => "-".to_string(),
        })
        .join(" ")
}

#[instrument(skip(settings))]
fn _demo(
    settings: &Settings,
    fanout: Option<usize>,
    grandchildren: Option<usize>,
    show_ids: bool,
) -> CliResult<()> {
    let fanout = fanout.unwrap_or(settings.demo.fanout);
    let grandchildren = grandchildren.unwrap_or(settings.demo.grandchildren);
    debug!(fanout, grandchildren, "building demo tree");
    let tree = build_demo_tree(fanout, grandchildren)?;

    let mut render = settings.render.clone();
    render.show_ids |= show_ids;

    output::tree_summary(tree.len(), tree.depth());
    print!("{}", tree.to_termtree_with(&render));
    output::sequence("pre-order", &format_values(tree.pre_order()));
    output::sequence("post-order", &format_values(tree.post_order()));
    output::sequence("level-order", &format_values(tree.level_order()));
    output::sequence("leaves", &format_values(tree.leaves()));
    Ok(())
}

#[instrument]
fn _children(count: usize) -> CliResult<()> {
    let mut tree = Tree::with_value(0);
    let mut root = tree.root_mut();
    for i in 1..=count {
        root.add_child(i);
    }

    output::sequence("left-to-right", &format_values(tree.root().children()));
    output::sequence("right-to-left", &format_values(tree.root().children_rev()));

    if tree.root().is_leaf() {
        output::warning("no children to remove");
        return Ok(());
    }
    let removed = tree.root_mut().remove_child(0)?;
    debug!(?removed, "removed first child");

    output::sequence("left-to-right", &format_values(tree.root().children()));
    output::sequence("right-to-left", &format_values(tree.root().children_rev()));
    Ok(())
}

fn _config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => print!("{}", settings.to_toml()?),
        ConfigCommands::Template => print!("{}", Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => println!("{}", path.display()),
            None => output::warning("no config directory for this platform"),
        },
    }
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn given_default_shape_when_building_demo_then_matches_reference_walk() {
        let tree = build_demo_tree(3, 2).unwrap();
        assert_eq!(
            format_values(tree.pre_order()),
            "0 1 11 12 2 21 22 3 31 32"
        );
        assert_eq!(tree.len(), 10);
        assert_eq!(tree.depth(), 3);
    }

    #[rstest]
    fn given_no_grandchildren_when_building_demo_then_children_are_leaves() {
        let tree = build_demo_tree(4, 0).unwrap();
        assert_eq!(format_values(tree.leaves()), "1 2 3 4");
    }

    #[rstest]
    #[case(0, 2)]
    #[case(10, 2)]
    #[case(3, 10)]
    fn given_out_of_range_shape_when_building_demo_then_rejects(
        #[case] fanout: usize,
        #[case] grandchildren: usize,
    ) {
        let err = build_demo_tree(fanout, grandchildren).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgs(_)));
    }

    #[rstest]
    fn given_empty_node_when_formatting_then_uses_dash() {
        let mut tree = Tree::with_value(0);
        tree.root_mut().add_empty_child();
        tree.root_mut().add_child(2);
        assert_eq!(format_values(tree.root().children()), "- 2");
    }
}
