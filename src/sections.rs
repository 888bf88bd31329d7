//! Section buffer: the three ordered slots of AUTOEXEC.BAT lines

/// Where a line is placed in the generated AUTOEXEC.BAT
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    /// Autogenerated commands placed before the `[autoexec]` content
    Before,
    /// Content of the `[autoexec]` section from the configuration file(s)
    UserContent,
    /// Autogenerated commands placed after the `[autoexec]` content
    After,
}

/// Origin of a block of lines, decides which header comment is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Generated,
    ConfigSection,
}

impl Location {
    /// All locations, in rendering order
    pub const ALL: [Location; 3] = [Location::Before, Location::UserContent, Location::After];

    pub fn provenance(self) -> Provenance {
        match self {
            Location::Before | Location::After => Provenance::Generated,
            Location::UserContent => Provenance::ConfigSection,
        }
    }

    fn index(self) -> usize {
        match self {
            Location::Before => 0,
            Location::UserContent => 1,
            Location::After => 2,
        }
    }
}

/// Lines to be placed in the generated AUTOEXEC.BAT, by location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionBuffer {
    slots: [Vec<String>; 3],
}

impl SectionBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to the given location
    pub fn push(&mut self, location: Location, line: impl Into<String>) {
        self.slots[location.index()].push(line.into());
    }

    pub fn add_command_before(&mut self, line: impl Into<String>) {
        self.push(Location::Before, line);
    }

    pub fn add_command_after(&mut self, line: impl Into<String>) {
        self.push(Location::After, line);
    }

    pub fn add_autoexec_line(&mut self, line: impl Into<String>) {
        self.push(Location::UserContent, line);
    }

    /// Lines stored at a location, in insertion order
    pub fn lines(&self, location: Location) -> &[String] {
        &self.slots[location.index()]
    }

    /// Iterate locations in rendering order, regardless of insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Location, &[String])> {
        Location::ALL
            .into_iter()
            .map(move |location| (location, self.lines(location)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }
}
