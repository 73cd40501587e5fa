use std::ops::{Add, AddAssign};

/// Number of messages and their cumulative size in KB.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tally {
    pub count: u64,
    pub size_kb: f64,
}

impl Tally {
    pub fn of_bytes(size: u64) -> Self {
        Tally {
            count: 1,
            size_kb: size as f64 / 1024.0,
        }
    }

    pub fn add_kb(&mut self, size_kb: f64) {
        self.count += 1;
        self.size_kb += size_kb;
    }

    pub fn size_mb(&self) -> f64 {
        self.size_kb / 1024.0
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, other: Tally) -> Tally {
        Tally {
            count: self.count + other.count,
            size_kb: self.size_kb + other.size_kb,
        }
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Tally) {
        *self = *self + other;
    }
}
