//! Active pattern selection

use std::fmt;
use std::str::FromStr;

/// Which pattern renderer consumes the analysis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Bloom,     // Radial blossoms
    Snowflake, // Crystal arms
    Spores,    // Branching growth
    Flow,      // Node-link conversation
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Bloom, Mode::Snowflake, Mode::Spores, Mode::Flow];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Mode for an index, wrapping modulo the mode count
    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % Self::ALL.len()]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Bloom => "bloom",
            Mode::Snowflake => "snowflake",
            Mode::Spores => "spores",
            Mode::Flow => "flow",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bloom" | "blossom" | "blossoms" | "0" => Ok(Mode::Bloom),
            "snowflake" | "fractal" | "snow" | "1" => Ok(Mode::Snowflake),
            "spores" | "spore" | "growth" | "mold" | "2" => Ok(Mode::Spores),
            "flow" | "conversation" | "graph" | "3" => Ok(Mode::Flow),
            other => Err(format!(
                "unknown mode '{}' (expected bloom, snowflake, spores, flow or 0-3)",
                other
            )),
        }
    }
}

/// Four-state cycle driven by an external "advance" trigger
#[derive(Clone, Copy, Debug, Default)]
pub struct ModeController {
    mode: Mode,
}

impl ModeController {
    pub fn new(initial: Mode) -> Self {
        Self { mode: initial }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Step to the next mode and return it
    pub fn advance(&mut self) -> Mode {
        self.mode = self.mode.next();
        self.mode
    }
}
