//! Survey areas and their area page URLs
//!
//! The survey is split into four areas. Each area page hosts the
//! neighborhood dropdown the crawl starts from.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// One of the four survey areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Area {
    A,
    B,
    C,
    D,
}

/// Area page URL for each area, in crawl order
pub const AREA_URLS: [(Area, &str); 4] = [
    (
        Area::A,
        "https://image.lva.virginia.gov/cgi-bin/res/res.pl?ox=0&oy=0&filename=LVA_maps15.sid&title=Area+A%3Cbr%3EFan+District,+VCU+area,+and+Oregon+Hill&res=3&size=12&default_x=3462.5&default_y=3622.5&fullwidth=6925&fullheight=7245",
    ),
    (
        Area::B,
        "https://image.lva.virginia.gov/cgi-bin/res/res.pl?ox=0&oy=0&filename=LVA_maps16.sid&title=Area+B%3Cbr%3EJackson+Ward,+MCV+area,+Navy+Hill,+Carver,+Gilpin+Court&res=3&size=12&default_x=3076&default_y=3947.5&fullwidth=6152&fullheight=7895",
    ),
    (
        Area::C,
        "https://image.lva.virginia.gov/cgi-bin/res/res.pl?ox=0&oy=0&filename=LVA_maps16.sid&title=Area+C%3Cbr%3ECapitol+Square,+Financial+District,+Shockoe+Slip,+Monroe+Ward,+Gamble%39s+Hill&res=3&size=12&default_x=3076&default_y=3947.5&fullwidth=6152&fullheight=7895",
    ),
    (
        Area::D,
        "https://image.lva.virginia.gov/cgi-bin/res/res.pl?ox=0&oy=0&filename=LVA_maps17.sid&title=Area+D%3Cbr%3EChurch+Hill,+Shockoe+Bottom,+Shockoe+Valley,+Fulton&res=3&size=12&default_x=3014&default_y=3485.5&fullwidth=6028&fullheight=6971",
    ),
];

impl Area {
    /// All areas in crawl order
    pub const ALL: [Area; 4] = [Area::A, Area::B, Area::C, Area::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// The built-in area page URL
    pub fn default_url(&self) -> &'static str {
        AREA_URLS[*self as usize].1
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Area {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            other => Err(format!("unknown area '{}'", other)),
        }
    }
}

/// Accepts the same spellings as [`FromStr`], so `a` and `A` name one area
impl<'de> Deserialize<'de> for Area {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Which areas a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaSelector {
    Single(Area),
    All,
}

impl AreaSelector {
    /// Resolves the selector to a concrete, ordered list of areas
    pub fn areas(&self) -> Vec<Area> {
        match self {
            Self::Single(area) => vec![*area],
            Self::All => Area::ALL.to_vec(),
        }
    }
}

impl fmt::Display for AreaSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(area) => write!(f, "{}", area),
            Self::All => f.write_str("ALL"),
        }
    }
}

impl FromStr for AreaSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Single)
        }
    }
}
