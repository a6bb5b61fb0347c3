use std::fmt;

pub const DECK_SIZE: usize = 8;

pub type Loadout = [&'static str; DECK_SIZE];

/// Trophy range a player currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bracket {
    Under2000,
    From2000To4000,
    From4000To6000,
    Over6000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Attack,
    Defense,
    Balance,
}

impl Bracket {
    pub const ALL: [Bracket; 4] = [
        Bracket::Under2000,
        Bracket::From2000To4000,
        Bracket::From4000To6000,
        Bracket::Over6000,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Bracket::Under2000 => "<2000",
            Bracket::From2000To4000 => "2000-4000",
            Bracket::From4000To6000 => "4000-6000",
            Bracket::Over6000 => ">6000",
        }
    }

    /// Labels match exactly after trimming; there is no fuzzy matching on trophy ranges.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|b| b.label() == raw)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|b| b.label()).collect()
    }
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Attack, Style::Defense, Style::Balance];

    pub fn label(self) -> &'static str {
        match self {
            Style::Attack => "attack",
            Style::Defense => "defense",
            Style::Balance => "balance",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.label() == raw)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.label()).collect()
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[rustfmt::skip]
pub fn loadout(bracket: Bracket, style: Style) -> &'static Loadout {
    use Bracket::*;
    use Style::*;

    match (bracket, style) {
        (Under2000, Attack) => &[
            "Hog Rider", "Knight", "Fire Spirits", "Zap", "Valkyrie", "Skeleton Army", "Arrows",
            "Musketeer",
        ],
        (Under2000, Defense) => &[
            "Knight", "Mini PEKKA", "Archers", "Tombstone", "Arrows", "Fireball", "Baby Dragon",
            "Valkyrie",
        ],
        (Under2000, Balance) => &[
            "Giant", "Mini PEKKA", "Musketeer", "Fireball", "Skeleton Army", "Arrows", "Knight",
            "Zap",
        ],
        (From2000To4000, Attack) => &[
            "Hog Rider", "Rage", "Mini PEKKA", "Valkyrie", "Arrows", "Fire Spirits", "Knight",
            "Musketeer",
        ],
        (From2000To4000, Defense) => &[
            "Mega Knight", "Archers", "Tombstone", "Fireball", "Arrows", "Valkyrie",
            "Electro Wizard", "Knight",
        ],
        (From2000To4000, Balance) => &[
            "Golem", "Musketeer", "Valkyrie", "Arrows", "Zap", "Skeleton Army", "Knight",
            "Baby Dragon",
        ],
        (From4000To6000, Attack) => &[
            "Balloon", "Miner", "Zap", "Inferno Tower", "Goblin Barrel", "Skeleton Army",
            "Knight", "Musketeer",
        ],
        (From4000To6000, Defense) => &[
            "Mega Knight", "Electro Wizard", "Archers", "Tombstone", "Fireball", "Arrows",
            "Valkyrie", "Knight",
        ],
        (From4000To6000, Balance) => &[
            "Golem", "Lava Hound", "Miner", "Zap", "Arrows", "Baby Dragon", "Knight",
            "Mega Minion",
        ],
        (Over6000, Attack) => &[
            "E-Giant", "Ram Rider", "Lightning", "Zap", "Bandit", "Musketeer", "Electro Wizard",
            "Skeleton Army",
        ],
        (Over6000, Defense) => &[
            "P.E.K.K.A", "Mega Knight", "Electro Wizard", "Tornado", "Arrows", "Fireball",
            "Goblin Gang", "Valkyrie",
        ],
        (Over6000, Balance) => &[
            "Royal Hogs", "Zappies", "Fireball", "Zap", "Musketeer", "Knight", "Baby Dragon",
            "Electro Wizard",
        ],
    }
}
