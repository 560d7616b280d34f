//! Seedable random source with a selectable generator family.
//!
//! Every stochastic decision in the engine draws from an [`EvoRng`]. For a
//! fixed [`GeneratorKind`], seed and call sequence the stream is fully
//! reproducible, which is what the determinism tests rely on.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::{ChaCha12Rng, ChaCha20Rng, ChaCha8Rng};

/// Generator algorithm backing an [`EvoRng`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeneratorKind {
    /// ChaCha with 8 rounds. Fastest of the ChaCha family.
    ChaCha8,
    /// ChaCha with 12 rounds (the algorithm behind `rand::rngs::StdRng`).
    #[default]
    ChaCha12,
    /// ChaCha with 20 rounds.
    ChaCha20,
    /// `rand`'s small non-cryptographic generator.
    ///
    /// Not portable across platforms or `rand` versions.
    Small,
}

#[derive(Debug, Clone)]
enum Inner {
    ChaCha8(ChaCha8Rng),
    ChaCha12(ChaCha12Rng),
    ChaCha20(ChaCha20Rng),
    Small(SmallRng),
}

/// Random source used by the GA engine.
///
/// Implements [`RngCore`], so every `rand::Rng` method is available; the
/// two helpers [`uniform_int`](Self::uniform_int) and
/// [`uniform_unit`](Self::uniform_unit) cover what the engine needs.
///
/// ```
/// use u_fjsp::random::{EvoRng, GeneratorKind};
///
/// let mut a = EvoRng::new(GeneratorKind::ChaCha8, 7);
/// let mut b = EvoRng::new(GeneratorKind::ChaCha8, 7);
/// assert_eq!(a.uniform_int(0, 100), b.uniform_int(0, 100));
/// ```
#[derive(Debug, Clone)]
pub struct EvoRng {
    kind: GeneratorKind,
    inner: Inner,
}

impl EvoRng {
    /// Creates a generator of the given kind seeded with `seed`.
    pub fn new(kind: GeneratorKind, seed: u64) -> Self {
        let inner = match kind {
            GeneratorKind::ChaCha8 => Inner::ChaCha8(ChaCha8Rng::seed_from_u64(seed)),
            GeneratorKind::ChaCha12 => Inner::ChaCha12(ChaCha12Rng::seed_from_u64(seed)),
            GeneratorKind::ChaCha20 => Inner::ChaCha20(ChaCha20Rng::seed_from_u64(seed)),
            GeneratorKind::Small => Inner::Small(SmallRng::seed_from_u64(seed)),
        };
        Self { kind, inner }
    }

    /// Creates a generator seeded from the operating system's entropy.
    pub fn from_entropy(kind: GeneratorKind) -> Self {
        Self::new(kind, rand::random())
    }

    /// Restarts the stream from `seed`, keeping the generator kind.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(self.kind, seed);
    }

    /// Switches to another generator algorithm, seeded with `seed`.
    pub fn set_generator(&mut self, kind: GeneratorKind, seed: u64) {
        *self = Self::new(kind, seed);
    }

    /// The active generator algorithm.
    pub fn kind(&self) -> GeneratorKind {
        self.kind
    }

    /// Uniform integer in `[lo, hi]` (both inclusive).
    ///
    /// Convenience wrapper over `random_range(lo..=hi)`. The engine itself
    /// draws through `rand::Rng`, since mating events use their own
    /// [`derive_stream`] generators.
    ///
    /// # Panics
    /// Panics if `lo > hi`.
    pub fn uniform_int(&mut self, lo: usize, hi: usize) -> usize {
        assert!(lo <= hi, "empty range [{lo}, {hi}]");
        self.random_range(lo..=hi)
    }

    /// Uniform float in `[0, 1)`.
    ///
    /// Convenience wrapper over `random::<f64>()`; same stream position as
    /// calling that directly.
    pub fn uniform_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

impl RngCore for EvoRng {
    fn next_u32(&mut self) -> u32 {
        match &mut self.inner {
            Inner::ChaCha8(r) => r.next_u32(),
            Inner::ChaCha12(r) => r.next_u32(),
            Inner::ChaCha20(r) => r.next_u32(),
            Inner::Small(r) => r.next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match &mut self.inner {
            Inner::ChaCha8(r) => r.next_u64(),
            Inner::ChaCha12(r) => r.next_u64(),
            Inner::ChaCha20(r) => r.next_u64(),
            Inner::Small(r) => r.next_u64(),
        }
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        match &mut self.inner {
            Inner::ChaCha8(r) => r.fill_bytes(dst),
            Inner::ChaCha12(r) => r.fill_bytes(dst),
            Inner::ChaCha20(r) => r.fill_bytes(dst),
            Inner::Small(r) => r.fill_bytes(dst),
        }
    }
}

/// Independent sub-stream `index` of the ChaCha8 stream family seeded by `base`.
///
/// Used to give every mating event its own generator, so reproduction yields
/// the same genomes no matter how the work is spread across threads.
pub fn derive_stream(base: u64, index: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(base);
    rng.set_stream(index);
    rng
}
