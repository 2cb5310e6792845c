//! Tree rendering of differences

use crate::difference::Differences;
use std::fmt::{self, Write};

/// Render `differences` as tree lines under a header, using the same
/// branch markers for every nesting level.
pub fn write_tree(f: &mut impl Write, header: &str, differences: &Differences) -> fmt::Result {
    writeln!(f, "{}", header)?;
    write_branches(f, differences, "")
}

fn write_branches(f: &mut impl Write, differences: &Differences, prefix: &str) -> fmt::Result {
    let entries = entries(differences);
    for (i, (label, child)) in entries.iter().enumerate() {
        let is_last = i == entries.len() - 1;
        let marker = if is_last { "└─" } else { "├─" };
        match child {
            Entry::Leaf(text) => writeln!(f, "{}{} {}{}", prefix, marker, label, text)?,
            Entry::Branch(nested) => {
                writeln!(f, "{}{} {}", prefix, marker, label.trim_end())?;
                let nested_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
                write_branches(f, nested, &nested_prefix)?;
            }
        }
    }
    Ok(())
}

enum Entry<'a> {
    Leaf(String),
    Branch(&'a Differences),
}

fn entries(differences: &Differences) -> Vec<(String, Entry<'_>)> {
    match differences {
        Differences::Single(diff) => vec![(String::new(), Entry::Leaf(diff.to_string()))],
        Differences::List(list) => list
            .iter()
            .map(|diff| (String::new(), Entry::Leaf(diff.to_string())))
            .collect(),
        Differences::Positional(map) => map
            .iter()
            .map(|((i, j), diff)| (format!("[{}, {}] ", i, j), Entry::Leaf(diff.to_string())))
            .collect(),
        Differences::Keyed(map) => map
            .iter()
            .map(|(key, nested)| match nested {
                Differences::Single(diff) => (format!("{}: ", key), Entry::Leaf(diff.to_string())),
                other => (format!("{}:", key), Entry::Branch(other)),
            })
            .collect(),
    }
}
