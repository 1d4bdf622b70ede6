use std::io::{self, BufRead, BufReader, Read};

/// Occurrence counts for all 256 byte values.
///
/// Counts are 32-bit, but the table never wraps. Each byte keeps a small pending counter, and
/// only every `multiplier`-th occurrence bumps the stored frequency. When a stored frequency
/// would overflow, the whole table is rebased: every frequency is halved (rounding up, so a
/// counted byte never drops back to zero) and the multiplier doubles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable {
    frequencies: [u32; 256],
    pending: [u64; 256],
    multiplier: u64,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTable {
    pub const fn new() -> Self {
        Self {
            frequencies: [0; 256],
            pending: [0; 256],
            multiplier: 1,
        }
    }

    /// Records one more occurrence of `byte`.
    pub fn increment(&mut self, byte: u8) {
        let idx = byte as usize;

        // both counters pinned at their maximum: nothing left to count with.
        if self.pending[idx] == u64::MAX && self.frequencies[idx] == u32::MAX {
            return;
        }

        self.pending[idx] += 1;
        if self.pending[idx] >= self.multiplier {
            if self.frequencies[idx] == u32::MAX {
                self.rebase();
            } else {
                self.frequencies[idx] += 1;
            }
            self.pending[idx] = 0;
        }
    }

    /// Assigns a frequency directly, discarding any pending occurrences of `byte`.
    pub fn set(&mut self, byte: u8, frequency: u32) {
        self.frequencies[byte as usize] = frequency;
        self.pending[byte as usize] = 0;
    }

    /// Best-known frequency of `byte`.
    ///
    /// A byte that has been seen but not yet promoted (see the multiplier) reports 1, never 0.
    pub fn get(&self, byte: u8) -> u32 {
        let idx = byte as usize;
        match self.frequencies[idx] {
            0 if self.pending[idx] > 0 => 1,
            f => f,
        }
    }

    /// Non-zero `(byte, frequency)` pairs in ascending byte order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        (0..=u8::MAX).map(|b| (b, self.get(b))).filter(|&(_, f)| f > 0)
    }

    /// Number of distinct bytes with a non-zero frequency.
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Sum of all reported frequencies.
    pub fn total(&self) -> u64 {
        self.entries().map(|(_, f)| f as u64).sum()
    }

    /// Number of raw occurrences currently represented by one unit of frequency.
    #[cfg(test)]
    pub const fn multiplier(&self) -> u64 {
        self.multiplier
    }

    /// Counts every byte of `reader` until end of input. Returns the number of bytes read.
    pub fn count_from<R: Read>(&mut self, reader: R) -> io::Result<u64> {
        let mut reader = BufReader::new(reader);
        let mut read = 0u64;
        loop {
            let chunk = match reader.fill_buf() {
                Ok([]) => break,
                Ok(chunk) => chunk,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let n = chunk.len();
            for &b in chunk {
                self.increment(b);
            }
            reader.consume(n);
            read += n as u64;
        }
        Ok(read)
    }

    fn rebase(&mut self) {
        if_tracing! {
            tracing::debug!(target = "frequency", multiplier = self.multiplier, "rebasing frequency table");
        }
        for f in self.frequencies.iter_mut() {
            *f = f.div_ceil(2);
        }
        self.multiplier = self.multiplier.saturating_mul(2);
    }
}

impl Extend<u8> for FrequencyTable {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        for b in iter {
            self.increment(b);
        }
    }
}

impl FromIterator<u8> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}
