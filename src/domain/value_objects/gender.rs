//! Running gender counts for the curation balancing policy

/// Gender cue detected in a suggestion's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderSignal {
    Male,
    Female,
    Unstated,
}

/// Running tally of accepted male and female entities.
///
/// The balancing policy is intentionally skewed: while
/// `female * 2 >= male`, the next suggestion is biased toward male.
/// At equilibrium the accepted population approaches a 2:1 male:female
/// ratio. This reproduces the observed behavior and is not a fairness
/// mechanism.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenderTally {
    male: u32,
    female: u32,
}

impl GenderTally {
    pub fn record(&mut self, signal: GenderSignal) {
        match signal {
            GenderSignal::Male => self.male += 1,
            GenderSignal::Female => self.female += 1,
            GenderSignal::Unstated => {}
        }
    }

    /// Whether the next suggestion should be biased toward male.
    pub fn needs_male_bias(&self) -> bool {
        self.female * 2 >= self.male
    }

    pub fn male(&self) -> u32 {
        self.male
    }

    pub fn female(&self) -> u32 {
        self.female
    }
}
