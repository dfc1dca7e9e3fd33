//! Clockers: fire at (possibly random) intervals as time is fed in.

use rand::Rng;

use super::fuzzy::FuzzyValue;

/// Interval growth of a slowing clocker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slowdown {
    /// ms added to every interval, growing by `decelerate` per clock
    pub downspeed: f64,
    pub decelerate: f64,
    padding: f64,
}

/// Counts fed time down to the next clock.
///
/// ```
/// use rand::SeedableRng;
/// use zep::particles::Clocker;
///
/// let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
/// let mut clock = Clocker::new(1000.0);
/// assert!(clock.time(&mut rng, 600.0).is_empty());
/// assert_eq!(clock.time(&mut rng, 600.0), vec![200.0]);
/// assert_eq!(clock.time(&mut rng, 2000.0).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Clocker {
    pub interval: FuzzyValue,
    /// How many kicks each clock produces
    pub multiplier: FuzzyValue,
    initial: Option<FuzzyValue>,
    count: Option<f64>,
    slowdown: Option<Slowdown>,
}

impl Clocker {
    pub fn new(interval: impl Into<FuzzyValue>) -> Self {
        Self {
            interval: interval.into(),
            multiplier: FuzzyValue::exact(1.0),
            initial: None,
            count: None,
            slowdown: None,
        }
    }

    /// Time to the first clock, when it differs from the interval.
    pub fn with_initial(mut self, initial: impl Into<FuzzyValue>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    pub fn with_multiplier(mut self, multiplier: impl Into<FuzzyValue>) -> Self {
        self.multiplier = multiplier.into();
        self
    }

    /// Makes each interval `downspeed` ms longer than the previous one, with
    /// `downspeed` itself growing by `decelerate` per clock.
    pub fn slowing(mut self, downspeed: f64, decelerate: f64) -> Self {
        self.slowdown = Some(Slowdown {
            downspeed,
            decelerate,
            padding: 0.0,
        });
        self
    }

    fn next(&mut self, rng: &mut impl Rng) -> f64 {
        let mut interval = self.interval.int(rng) as f64;
        if let Some(slow) = &mut self.slowdown {
            slow.padding += slow.downspeed;
            slow.downspeed += slow.decelerate;
            interval += slow.padding;
        }
        interval
    }

    /// Feeds `delta` ms and returns the excess time of every kick that came
    /// due, oldest first. A clock with a multiplier of n yields its excess n
    /// times.
    pub fn time(&mut self, rng: &mut impl Rng, delta: f64) -> Vec<f64> {
        let mut count = match self.count {
            Some(count) => count,
            None => match self.initial {
                Some(initial) => initial.int(rng) as f64,
                None => self.next(rng),
            },
        };
        count -= delta;

        let mut kicks = Vec::new();
        while count <= 0.0 {
            let times = self.multiplier.int(rng).max(0) as usize;
            kicks.extend(std::iter::repeat(-count).take(times));
            let next = self.next(rng);
            if next <= 0.0 {
                // a non-positive interval would clock forever
                count = next.max(f64::MIN_POSITIVE);
                break;
            }
            count += next;
        }
        self.count = Some(count);
        kicks
    }
}
