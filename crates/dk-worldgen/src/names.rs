//! Name tables for keepers and settlements, and the identifiers derived
//! from them.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Keeper names drawn when the player gives none.
pub const KEEPER_NAMES: &[&str] = &[
    "Azgoth", "Belzara", "Cruor", "Drevak", "Esmorr", "Falgrim", "Gorrath", "Hexil", "Ilvane",
    "Jaxor", "Karneth", "Lurza", "Morgra", "Nethrak", "Ozzrin", "Pyrreth", "Quorvash", "Rakul",
    "Sarnoth", "Thuzad", "Ulrex", "Vorgha", "Wraxis", "Xyloth", "Yzmira", "Zarnak",
];

/// Settlement names, handed out without repetition.
pub const TOWN_NAMES: &[&str] = &[
    "Ashford",
    "Barrowmere",
    "Brightwater",
    "Coldharbour",
    "Dunmoor",
    "Eastwick",
    "Fairhollow",
    "Greywater",
    "Hallowdene",
    "Ironhold",
    "Kettlebrook",
    "Lindenfall",
    "Marrowgate",
    "Northcairn",
    "Oakhaven",
    "Pellmarsh",
    "Ravenscar",
    "Stonebridge",
    "Thornbury",
    "Underhill",
    "Westmarch",
    "Wyvernrest",
];

/// Characters used in game-id suffixes.
const SUFFIX_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Hands out town names in a seeded order, never repeating one within a
/// world. Once the table runs out, names get a numeral.
#[derive(Debug, Clone)]
pub struct TownNames {
    order: Vec<&'static str>,
    issued: usize,
}

impl TownNames {
    /// Shuffle the table with `rng`.
    pub fn new(rng: &mut StdRng) -> Self {
        let mut order = TOWN_NAMES.to_vec();
        order.shuffle(rng);
        Self { order, issued: 0 }
    }

    /// The next unused name.
    pub fn next_name(&mut self) -> String {
        let round = self.issued / self.order.len();
        let base = self.order[self.issued % self.order.len()];
        self.issued += 1;
        if round == 0 {
            base.to_string()
        } else {
            format!("{base} {}", round + 1)
        }
    }
}

/// Keeper name: the player's choice if non-empty, otherwise one from
/// [`KEEPER_NAMES`].
pub fn keeper_name(chosen: Option<&str>, rng: &mut StdRng) -> String {
    match chosen.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => KEEPER_NAMES.choose(rng).copied().unwrap_or("Keeper").to_string(),
    }
}

/// Save-game identifier: `"{keeper}_{world}"` plus four alphanumeric
/// characters.
pub fn game_id(keeper: &str, world: &str, rng: &mut StdRng) -> String {
    let suffix: String = (0..4)
        .map(|_| char::from(SUFFIX_CHARS[rng.random_range(0..SUFFIX_CHARS.len())]))
        .collect();
    format!("{keeper}_{world}{suffix}")
}

/// Title shown for a game.
pub fn display_name(keeper: &str, world: &str) -> String {
    format!("{keeper} of {world}")
}
