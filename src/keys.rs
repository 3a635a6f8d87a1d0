use std::fmt;

pub const UNKNOWN_TEAM: &str = "UNK";

/// Identifier used to join records that come from different collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown_team(&self) -> bool {
        self.0 == UNKNOWN_TEAM
    }

    /// Blank identifiers name no entity and never join.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    TeamName,
    TeamAbbrev,
    PlayerId,
    Venue,
}

const TEAM_NICKNAMES: &[(&str, &str)] = &[
    ("Phillies", "PHI"),
    ("Blue Jays", "TOR"),
    ("Cubs", "CHC"),
    ("Athletics", "OAK"),
    ("Rockies", "COL"),
    ("Diamondbacks", "ARI"),
    ("Angels", "LAA"),
    ("White Sox", "CHW"),
    ("Orioles", "BAL"),
    ("Giants", "SFG"),
    ("Reds", "CIN"),
    ("Braves", "ATL"),
    ("Guardians", "CLE"),
    ("Twins", "MIN"),
    ("Marlins", "MIA"),
    ("Dodgers", "LAD"),
    ("Padres", "SDP"),
    ("Astros", "HOU"),
    ("Rays", "TBR"),
    ("Red Sox", "BOS"),
    ("Mets", "NYM"),
    ("Nationals", "WSH"),
    ("Royals", "KCR"),
    ("Tigers", "DET"),
    ("Brewers", "MIL"),
    ("Cardinals", "STL"),
    ("Pirates", "PIT"),
    ("Rangers", "TEX"),
    ("Mariners", "SEA"),
    ("Yankees", "NYY"),
];

// Codes the temperature service uses where they differ from the preview feed.
const TEAM_CODE_ALIASES: &[(&str, &str)] = &[
    ("CWS", "CHW"),
    ("KC", "KCR"),
    ("SD", "SDP"),
    ("SF", "SFG"),
    ("TB", "TBR"),
    ("WSN", "WSH"),
    ("WAS", "WSH"),
    ("AZ", "ARI"),
    ("ATH", "OAK"),
];

/// Team codes as the temperature service expects them in series requests.
pub const SERIES_TEAMS: &[&str] = &[
    "ARI", "ATL", "BAL", "BOS", "CHC", "CIN", "CLE", "COL", "CWS", "DET", "HOU", "KC", "LAA",
    "LAD", "MIA", "MIL", "MIN", "NYM", "NYY", "OAK", "PHI", "PIT", "SD", "SEA", "SF", "STL", "TB",
    "TEX", "TOR", "WSH",
];

pub fn normalize(raw: &str, kind: IdentifierKind) -> CanonicalKey {
    match kind {
        IdentifierKind::TeamName => CanonicalKey(team_code_from_name(raw).to_string()),
        IdentifierKind::TeamAbbrev => CanonicalKey(team_code_from_abbrev(raw).to_string()),
        IdentifierKind::PlayerId => CanonicalKey(raw.trim().to_string()),
        IdentifierKind::Venue => CanonicalKey(normalize_venue(raw)),
    }
}

pub fn team_key(name: &str) -> CanonicalKey {
    normalize(name, IdentifierKind::TeamName)
}

pub fn player_key(id: &str) -> CanonicalKey {
    normalize(id, IdentifierKind::PlayerId)
}

fn team_code_from_name(raw: &str) -> &'static str {
    let name = raw.trim();
    if name.is_empty() {
        return UNKNOWN_TEAM;
    }
    for (nickname, code) in TEAM_NICKNAMES {
        if name.eq_ignore_ascii_case(nickname) || ends_with_word_ci(name, nickname) {
            return code;
        }
    }
    canonical_code(name).unwrap_or(UNKNOWN_TEAM)
}

fn team_code_from_abbrev(raw: &str) -> &'static str {
    let code = raw.trim();
    if let Some(found) = canonical_code(code) {
        return found;
    }
    TEAM_CODE_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(code))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(UNKNOWN_TEAM)
}

fn canonical_code(code: &str) -> Option<&'static str> {
    TEAM_NICKNAMES
        .iter()
        .map(|(_, canonical)| *canonical)
        .find(|canonical| canonical.eq_ignore_ascii_case(code))
}

/// True when `name` is `"<city> <suffix>"`, compared ASCII case-insensitively.
fn ends_with_word_ci(name: &str, suffix: &str) -> bool {
    if name.len() <= suffix.len() || !name.is_char_boundary(name.len() - suffix.len()) {
        return false;
    }
    let (head, tail) = name.split_at(name.len() - suffix.len());
    tail.eq_ignore_ascii_case(suffix) && head.ends_with(' ')
}

fn normalize_venue(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}
