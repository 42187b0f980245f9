/// Deterministic PRNG so a seed reproduces a whole game setup.
///
/// This is `xoshiro256**` seeded via SplitMix64.
#[derive(Clone, Copy, Debug)]
pub struct GameRng {
    state: [u64; 4],
}

impl GameRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        let mut sm = SplitMix64 { state: seed };
        Self {
            state: [sm.next(), sm.next(), sm.next(), sm.next()],
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        // xoshiro256**
        let result = self.state[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);

        let t = self.state[1] << 17;

        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];

        self.state[2] ^= t;

        self.state[3] = self.state[3].rotate_left(45);

        result
    }

    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform value in `[0, bound)`; `bound` must be non-zero.
    fn below(&mut self, bound: u32) -> u32 {
        let threshold = u32::MAX - (u32::MAX % bound);
        loop {
            let x = self.next_u32();
            if x < threshold {
                return x % bound;
            }
        }
    }

    /// Uniform integer in `range`. An empty range yields its start.
    pub fn gen_range_i32(&mut self, range: std::ops::Range<i32>) -> i32 {
        if range.start >= range.end {
            return range.start;
        }
        let span = (i64::from(range.end) - i64::from(range.start)) as u32;
        range.start + self.below(span) as i32
    }

    /// Uniform index into a slice of length `len`, or `None` when empty.
    pub fn gen_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.below(len.min(u32::MAX as usize) as u32) as usize)
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let index = self.gen_index(items.len())?;
        items.get(index)
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }
}

struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn next(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = GameRng::seed_from_u64(42);
        let mut b = GameRng::seed_from_u64(42);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn ranges_stay_in_bounds() {
        let mut rng = GameRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = rng.gen_range_i32(0..10);
            assert!((0..10).contains(&v));
        }
        assert_eq!(rng.gen_range_i32(5..5), 5);
        assert_eq!(rng.gen_index(0), None);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = GameRng::seed_from_u64(3);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }
}
