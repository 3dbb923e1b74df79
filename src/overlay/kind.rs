use std::fmt;
use std::str::FromStr;

use crate::error::OverlayError;

/// Fixed set of independently toggleable overlay groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OverlayKind {
    Route,
    Ports,
    Disasters,
    /// Vessels inside disaster areas or a tracked region
    Ships,
    /// Vessels around the origin/destination ports
    PortShips,
    Chokepoints,
    ChokepointShips,
    Collisions,
    ProtectedAreas,
    Piracy,
}

impl OverlayKind {
    pub const COUNT: usize = 10;

    pub const ALL: [OverlayKind; Self::COUNT] = [
        OverlayKind::Route,
        OverlayKind::Ports,
        OverlayKind::Disasters,
        OverlayKind::Ships,
        OverlayKind::PortShips,
        OverlayKind::Chokepoints,
        OverlayKind::ChokepointShips,
        OverlayKind::Collisions,
        OverlayKind::ProtectedAreas,
        OverlayKind::Piracy,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable machine name, as accepted by `--hide`
    pub fn name(self) -> &'static str {
        match self {
            OverlayKind::Route => "route",
            OverlayKind::Ports => "ports",
            OverlayKind::Disasters => "disasters",
            OverlayKind::Ships => "ships",
            OverlayKind::PortShips => "port-ships",
            OverlayKind::Chokepoints => "chokepoints",
            OverlayKind::ChokepointShips => "chokepoint-ships",
            OverlayKind::Collisions => "collisions",
            OverlayKind::ProtectedAreas => "protected-areas",
            OverlayKind::Piracy => "piracy",
        }
    }

    /// Human readable legend label
    pub fn label(self) -> &'static str {
        match self {
            OverlayKind::Route => "Route",
            OverlayKind::Ports => "Ports",
            OverlayKind::Disasters => "Disasters",
            OverlayKind::Ships => "Ships",
            OverlayKind::PortShips => "Port traffic",
            OverlayKind::Chokepoints => "Chokepoints",
            OverlayKind::ChokepointShips => "Chokepoint ships",
            OverlayKind::Collisions => "Collisions",
            OverlayKind::ProtectedAreas => "ECA / MPA",
            OverlayKind::Piracy => "Piracy",
        }
    }

    /// Legend hotkey, `1`..`9` then `0`
    pub fn hotkey(self) -> char {
        match self.index() {
            i @ 0..=8 => char::from(b'1' + i as u8),
            _ => '0',
        }
    }

    pub fn from_hotkey(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.hotkey() == key)
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OverlayKind {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        match wanted.as_str() {
            // aliases
            "vessels" => return Ok(OverlayKind::Ships),
            "congestion" => return Ok(OverlayKind::PortShips),
            "protected" | "ecampa" | "eca-mpa" => return Ok(OverlayKind::ProtectedAreas),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| OverlayError::UnknownGroup(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_all() {
        for (i, kind) in OverlayKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_parse_names_and_aliases() {
        for kind in OverlayKind::ALL {
            assert_eq!(kind.name().parse::<OverlayKind>(), Ok(kind));
        }
        assert_eq!("Protected".parse::<OverlayKind>(), Ok(OverlayKind::ProtectedAreas));
        assert_eq!("port_ships".parse::<OverlayKind>(), Ok(OverlayKind::PortShips));
        assert_eq!("vessels".parse::<OverlayKind>(), Ok(OverlayKind::Ships));
    }

    #[test]
    fn test_unknown_name_is_error() {
        assert_eq!(
            "lighthouses".parse::<OverlayKind>(),
            Err(OverlayError::UnknownGroup("lighthouses".into()))
        );
    }

    #[test]
    fn test_hotkeys_round_trip() {
        assert_eq!(OverlayKind::Route.hotkey(), '1');
        assert_eq!(OverlayKind::Piracy.hotkey(), '0');
        for kind in OverlayKind::ALL {
            assert_eq!(OverlayKind::from_hotkey(kind.hotkey()), Some(kind));
        }
        assert_eq!(OverlayKind::from_hotkey('x'), None);
    }
}
