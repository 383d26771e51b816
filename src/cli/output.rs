//! Terminal output for the demo commands
//!
//! Traversal results go to stdout, diagnostics to stderr. Colouring follows
//! NO_COLOR / CLICOLOR through `colored`.

use colored::Colorize;
use std::fmt::Display;

/// Width the traversal labels are padded to, so sequences line up
const LABEL_WIDTH: usize = 13;

pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow(), msg);
}

/// One line per walk: the order name, then the visited values.
pub fn sequence(order: &str, values: &(impl Display + ?Sized)) {
    let label = format!("{order:>LABEL_WIDTH$}");
    println!("{}: {}", label.green(), values);
}

/// Summary line printed above a rendered tree.
pub fn tree_summary(nodes: usize, depth: usize) {
    println!("{}", format!("tree: {nodes} nodes, depth {depth}").cyan().bold());
}
