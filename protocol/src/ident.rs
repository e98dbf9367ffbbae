//! Side and combatant identifiers

/// Two-value side axis distinguishing the battle's participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideAxis {
    P1,
    P2,
}

impl SideAxis {
    /// Parse a side token down to its axis, tolerating a trailing slot
    /// letter or display-name suffix (`p1`, `p1a` and `p1: Alice` all
    /// normalize to the same axis).
    pub fn parse(s: &str) -> Option<Self> {
        if s.starts_with("p1") {
            Some(SideAxis::P1)
        } else if s.starts_with("p2") {
            Some(SideAxis::P2)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SideAxis::P1 => "p1",
            SideAxis::P2 => "p2",
        }
    }

}

impl std::fmt::Display for SideAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Combatant identifier in the form "POSITION: NAME" (e.g. "p1a: Pikachu")
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub axis: SideAxis,
    /// Position letter (a, b for active slots, or None if side-scoped)
    pub slot: Option<char>,
    /// Combatant's name/nickname
    pub name: String,
}

impl Position {
    /// Parse a position token like "p1a: Pikachu" or "p1: Pikachu"
    pub fn parse(s: &str) -> Option<Self> {
        let (pos_part, name) = s.split_once(": ")?;
        let axis = SideAxis::parse(pos_part)?;
        let slot = pos_part.chars().nth(2);

        Some(Position {
            axis,
            slot,
            name: name.to_string(),
        })
    }
}

/// HP and status condition (e.g. "100/100", "50/100 slp", "0 fnt")
#[derive(Debug, Clone, PartialEq)]
pub struct HpStatus {
    /// Current HP (raw value or percentage depending on context)
    pub current: u32,
    /// Max HP (if known)
    pub max: Option<u32>,
    /// Status condition (slp, par, brn, psn, tox, frz, fnt)
    pub status: Option<String>,
}

impl HpStatus {
    /// Parse an HP status string like "100/100", "50/100 slp", or "0 fnt"
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let hp_part = parts.next()?;
        let status = parts.next().map(|s| s.to_string());

        if let Some((current_str, max_str)) = hp_part.split_once('/') {
            Some(HpStatus {
                current: current_str.parse().ok()?,
                max: Some(max_str.parse().ok()?),
                status,
            })
        } else {
            Some(HpStatus {
                current: hp_part.parse().ok()?,
                max: None,
                status,
            })
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.status.as_deref() == Some("fnt") || (self.current == 0 && self.status.is_none())
    }
}

impl std::fmt::Display for HpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}/{}", self.current, max),
            None => write!(f, "{}", self.current),
        }
    }
}
