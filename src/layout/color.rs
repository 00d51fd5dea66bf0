use std::collections::HashMap;
use std::fmt;

use crate::graph::Graph;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb { r, g, b }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Ten-color categorical palette (`schemeCategory10`).
pub const PALETTE: [Rgb; 10] = [
    rgb(0x1f, 0x77, 0xb4),
    rgb(0xff, 0x7f, 0x0e),
    rgb(0x2c, 0xa0, 0x2c),
    rgb(0xd6, 0x27, 0x28),
    rgb(0x94, 0x67, 0xbd),
    rgb(0x8c, 0x56, 0x4b),
    rgb(0xe3, 0x77, 0xc2),
    rgb(0x7f, 0x7f, 0x7f),
    rgb(0xbc, 0xbd, 0x22),
    rgb(0x17, 0xbe, 0xcf),
];

/// Ordinal group → color mapping in first-seen order, wrapping around the palette.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorAssignment {
    by_group: HashMap<String, Rgb>,
    order: Vec<String>,
}

impl ColorAssignment {
    pub fn from_groups<'a, I>(groups: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut assignment = Self::default();
        for group in groups {
            if assignment.by_group.contains_key(group) {
                continue;
            }
            let color = PALETTE[assignment.order.len() % PALETTE.len()];
            assignment.by_group.insert(group.to_owned(), color);
            assignment.order.push(group.to_owned());
        }
        assignment
    }

    pub fn for_graph(graph: &Graph) -> Self {
        Self::from_groups(graph.groups())
    }

    pub fn color_for(&self, group: &str) -> Option<Rgb> {
        self.by_group.get(group).copied()
    }

    /// Groups with their colors, in assignment order.
    pub fn legend(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.order
            .iter()
            .map(|group| (group.as_str(), self.by_group[group]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
