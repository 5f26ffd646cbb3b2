/*!
 * Candidate generation
 *
 * Expands one dictionary entry into the passwords that get tried:
 * - Plain mode: the entry itself
 * - Casing mode: every upper/lower assignment of its characters
 *
 * Casing order: position 0 varies slowest, and for each position the
 * upper-case variant comes before the lower-case one. "ab" yields
 * "AB", "Ab", "aB", "ab". Characters without a case variant (digits,
 * symbols) contribute a single choice, so no duplicates are produced.
 */

/// How a dictionary entry is expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CasingMode {
    /// Try the entry exactly as written
    #[default]
    Plain,
    /// Try every upper/lower casing of the entry (slow: up to 2^N candidates)
    AllCasings,
}

impl CasingMode {
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            CasingMode::AllCasings
        } else {
            CasingMode::Plain
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CasingMode::Plain => "OFF",
            CasingMode::AllCasings => "ON",
        }
    }
}

/// Build the lazy candidate sequence for one entry
pub fn candidates(entry: &str, mode: CasingMode) -> Candidates {
    match mode {
        CasingMode::Plain => Candidates::Plain(Some(entry.to_string())),
        CasingMode::AllCasings => Candidates::Casings(CasingPermutations::new(entry)),
    }
}

/// Ordered candidates derived from a single dictionary entry
#[derive(Debug, Clone)]
pub enum Candidates {
    Plain(Option<String>),
    Casings(CasingPermutations),
}

impl Iterator for Candidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self {
            Candidates::Plain(entry) => entry.take(),
            Candidates::Casings(perms) => perms.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Candidates::Plain(entry) => {
                let n = usize::from(entry.is_some());
                (n, Some(n))
            }
            Candidates::Casings(perms) => perms.size_hint(),
        }
    }
}

/// Cartesian product of {upper(c), lower(c)} over the characters of an entry
///
/// Works like an odometer over per-position choice indices, so only the
/// current assignment is held in memory.
#[derive(Debug, Clone)]
pub struct CasingPermutations {
    choices: Vec<Vec<String>>,
    cursor: Vec<usize>,
    exhausted: bool,
}

impl CasingPermutations {
    pub fn new(entry: &str) -> Self {
        let choices: Vec<Vec<String>> = entry
            .chars()
            .map(|c| {
                let upper: String = c.to_uppercase().collect();
                let lower: String = c.to_lowercase().collect();
                if upper == lower {
                    vec![upper]
                } else {
                    vec![upper, lower]
                }
            })
            .collect();

        let cursor = vec![0; choices.len()];
        Self {
            choices,
            cursor,
            exhausted: false,
        }
    }

    /// Total number of distinct casings (saturates at `u64::MAX`)
    pub fn total(&self) -> u64 {
        self.choices
            .iter()
            .fold(1u64, |acc, c| acc.saturating_mul(c.len() as u64))
    }

    /// Start the sequence over from the first casing
    pub fn restart(&mut self) {
        self.cursor.iter_mut().for_each(|i| *i = 0);
        self.exhausted = false;
    }

    fn remaining(&self) -> u64 {
        if self.exhausted {
            return 0;
        }

        // Mixed-radix value of the cursor = number already yielded
        let consumed = self
            .choices
            .iter()
            .zip(&self.cursor)
            .fold(0u64, |acc, (c, &i)| {
                acc.saturating_mul(c.len() as u64).saturating_add(i as u64)
            });
        self.total().saturating_sub(consumed)
    }

    fn advance(&mut self) {
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.choices[pos].len() {
                return;
            }
            self.cursor[pos] = 0;
        }
        // Carry fell off the most significant position
        self.exhausted = true;
    }
}

impl Iterator for CasingPermutations {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }

        let candidate: String = self
            .choices
            .iter()
            .zip(&self.cursor)
            .map(|(c, &i)| c[i].as_str())
            .collect();

        self.advance();
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Saturated totals only give a lower bound
        if self.total() == u64::MAX {
            return (usize::MAX, None);
        }
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
