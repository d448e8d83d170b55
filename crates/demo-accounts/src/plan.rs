//! Generation plans: a seed plus per-role account counts.

/// Seed used when callers do not pick one.
pub const DEFAULT_DEMO_SEED: u64 = 20_240_611;

const DEFAULT_PATIENTS: usize = 3;
const DEFAULT_DOCTORS: usize = 2;
const DEFAULT_ADMINS: usize = 1;

/// Describes which demo accounts to generate.
///
/// The same plan always yields the same accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoPlan {
    seed: u64,
    patients: usize,
    doctors: usize,
    admins: usize,
}

impl DemoPlan {
    /// Plan with the default role mix for `seed`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            patients: DEFAULT_PATIENTS,
            doctors: DEFAULT_DOCTORS,
            admins: DEFAULT_ADMINS,
        }
    }

    /// Replace the per-role counts.
    #[must_use]
    pub const fn with_counts(mut self, patients: usize, doctors: usize, admins: usize) -> Self {
        self.patients = patients;
        self.doctors = doctors;
        self.admins = admins;
        self
    }

    /// RNG seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of patient accounts.
    #[must_use]
    pub const fn patients(&self) -> usize {
        self.patients
    }

    /// Number of doctor accounts.
    #[must_use]
    pub const fn doctors(&self) -> usize {
        self.doctors
    }

    /// Number of admin accounts.
    #[must_use]
    pub const fn admins(&self) -> usize {
        self.admins
    }

    /// Total number of accounts the plan produces, or `None` when the counts
    /// overflow `usize`.
    #[must_use]
    pub const fn total(&self) -> Option<usize> {
        match self.patients.checked_add(self.doctors) {
            Some(sum) => sum.checked_add(self.admins),
            None => None,
        }
    }
}

impl Default for DemoPlan {
    fn default() -> Self {
        Self::new(DEFAULT_DEMO_SEED)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DemoPlan::new(1).with_counts(2, 1, 1), Some(4))]
    #[case(DemoPlan::new(1).with_counts(usize::MAX, 1, 0), None)]
    #[case(DemoPlan::new(1).with_counts(1, usize::MAX - 1, 1), None)]
    fn total_reports_overflow(#[case] plan: DemoPlan, #[case] expected: Option<usize>) {
        assert_eq!(plan.total(), expected);
    }
}
