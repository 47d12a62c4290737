use crate::make_error;
use eyre::{Report, WrapErr};
use indexmap::{indexmap, IndexMap, IndexSet};
use itertools::{chain, Itertools};
use ndarray::{stack, Array1, Array2, Axis};
use std::collections::BTreeSet;
use std::iter::once;

/// Amino acids in the order of rows and columns of the empirical rate matrices
pub const AMINO_ACIDS: [char; 20] = [
  'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W', 'Y',
];

pub type ProfileMap = IndexMap<char, Array1<f64>>;

#[derive(Clone, Debug)]
pub struct Alphabet {
  all: IndexSet<char>,
  canonical: IndexSet<char>,
  ambiguous: IndexMap<char, Vec<char>>,
  unknown: char,
  gap: char,
  profile_map: ProfileMap,
}

impl Alphabet {
  /// Create the 20-letter amino-acid alphabet.
  ///
  /// The gap has no state of its own in amino-acid models and is treated as unknown.
  pub fn amino_acids() -> Result<Self, Report> {
    Self::with_config(&AlphabetConfig {
      canonical: AMINO_ACIDS.to_vec(),
      ambiguous: indexmap! {
        'B' => vec!['N', 'D'],
        'Z' => vec!['Q', 'E'],
        'J' => vec!['L', 'I'],
      },
      unknown: 'X',
      gap: '-',
    })
  }

  /// Create custom alphabet from a given config
  pub fn with_config(cfg: &AlphabetConfig) -> Result<Self, Report> {
    cfg.validate().wrap_err("When validating alphabet config")?;

    let AlphabetConfig {
      canonical,
      ambiguous,
      unknown,
      gap,
    } = cfg;

    let canonical: IndexSet<char> = canonical.iter().copied().collect();
    let ambiguous: IndexMap<char, Vec<char>> = ambiguous.to_owned();

    let all: IndexSet<char> = chain!(
      canonical.iter().copied(),
      ambiguous.keys().copied(),
      [*unknown, *gap].into_iter(),
    )
    .collect();

    let profile_map = cfg.create_profile_map();

    Ok(Self {
      all,
      canonical,
      ambiguous,
      unknown: *unknown,
      gap: *gap,
      profile_map,
    })
  }

  /// Resolve possible ambiguity of the given character to the set of canonical chars
  pub fn disambiguate(&self, c: char) -> BTreeSet<char> {
    // Unknown and gap could be any canonical (e.g. X => { A, C, D, ... })
    if self.is_unknown(c) || self.is_gap(c) {
      self.canonical().collect()
    }
    // If ambiguous (e.g. B => { N, D })
    else if let Some(resolutions) = self.ambiguous.get(&c) {
      resolutions.iter().copied().collect()
    }
    // Otherwise it's not ambiguous and it's the char itself
    else {
      once(c).collect()
    }
  }

  /// Indicator vector over canonical states which are compatible with the character
  pub fn get_profile(&self, c: char) -> Result<&Array1<f64>, Report> {
    match self.profile_map.get(&c) {
      Some(profile) => Ok(profile),
      None => make_error!(
        "When accessing profile map: Unknown character: '{c}'. Known characters: {}",
        self.profile_map.keys().join(", ")
      ),
    }
  }

  /// Convert a sequence to a profile matrix of shape (L, n), where L is the sequence length
  /// and n is the number of canonical characters
  pub fn seq2prof(&self, chars: impl IntoIterator<Item = char>) -> Result<Array2<f64>, Report> {
    let profiles = chars
      .into_iter()
      .map(|c| self.get_profile(c).map(|profile| profile.view()))
      .collect::<Result<Vec<_>, Report>>()?;

    if profiles.is_empty() {
      return Ok(Array2::zeros((0, self.n_canonical())));
    }

    Ok(stack(Axis(0), &profiles)?)
  }

  /// Index of a canonical character, i.e. its row and column in the rate matrix
  pub fn index(&self, c: char) -> Result<usize, Report> {
    match self.canonical.get_index_of(&c) {
      Some(index) => Ok(index),
      None => make_error!(
        "When looking up state index: Character '{c}' is not one of the canonical characters: {}",
        self.canonical().join(", ")
      ),
    }
  }

  /// Canonical character at a given state index
  pub fn char(&self, index: usize) -> Option<char> {
    self.canonical.get_index(index).copied()
  }

  /// All existing characters (including 'unknown' and 'gap')
  pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
    self.all.iter().copied()
  }

  /// Canonical (unambiguous) characters
  pub fn canonical(&self) -> impl Iterator<Item = char> + '_ {
    self.canonical.iter().copied()
  }

  pub fn n_canonical(&self) -> usize {
    self.canonical.len()
  }

  /// Number of model states
  pub fn len(&self) -> usize {
    self.n_canonical()
  }

  pub fn is_empty(&self) -> bool {
    self.canonical.is_empty()
  }

  pub fn is_unknown(&self, c: char) -> bool {
    c == self.unknown
  }

  pub fn is_gap(&self, c: char) -> bool {
    c == self.gap
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphabetConfig {
  pub canonical: Vec<char>,
  pub ambiguous: IndexMap<char, Vec<char>>,
  pub unknown: char,
  pub gap: char,
}

impl AlphabetConfig {
  fn create_profile_map(&self) -> ProfileMap {
    let AlphabetConfig {
      canonical,
      ambiguous,
      unknown,
      gap,
    } = self;

    let eye = Array2::<f64>::eye(canonical.len());

    let mut profile_map: ProfileMap = canonical
      .iter()
      .zip(eye.rows())
      .map(|(c, x)| (*c, x.to_owned()))
      .collect();

    ambiguous.iter().for_each(|(&key, values)| {
      let profile = canonical
        .iter()
        .map(|c| if values.contains(c) { 1.0 } else { 0.0 })
        .collect::<Array1<f64>>();
      profile_map.insert(key, profile);
    });

    profile_map.insert(*unknown, Array1::<f64>::ones(canonical.len()));
    profile_map.insert(*gap, Array1::<f64>::ones(canonical.len()));

    profile_map
  }

  pub fn validate(&self) -> Result<(), Report> {
    let AlphabetConfig {
      canonical,
      ambiguous,
      unknown,
      gap,
    } = self;

    if canonical.is_empty() {
      return make_error!("Canonical set of characters is empty. This is not allowed.");
    }

    let duplicates = canonical.iter().duplicates().collect_vec();
    if !duplicates.is_empty() {
      return make_error!(
        "Canonical set of characters contains duplicates: {}",
        duplicates.iter().join(", ")
      );
    }

    for (key, values) in ambiguous {
      if canonical.contains(key) {
        return make_error!("Ambiguous character '{key}' is also a canonical character");
      }
      if let Some(c) = values.iter().find(|&c| !canonical.contains(c)) {
        return make_error!("Ambiguous character '{key}' resolves to a non-canonical character '{c}'");
      }
    }

    for special in [unknown, gap] {
      if canonical.contains(special) || ambiguous.contains_key(special) {
        return make_error!("Special character '{special}' is also a canonical or an ambiguous character");
      }
    }

    if unknown == gap {
      return make_error!("Unknown and gap characters should be different, but both are '{unknown}'");
    }

    Ok(())
  }
}
