use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::Distribution;
use crate::utils::{iround, lognormal_dist};

/// Trait for generating per-click values of agents
pub trait ValueGeneratorTrait {
    /// Draw a per-click value for a new agent
    fn generate_value(&self, rng: &mut StdRng) -> u64;

    /// Get a string representation of the generator for logging
    fn generator_string(&self) -> String;
}

/// Value generator that always returns a fixed value
pub struct ValueGeneratorFixed {
    pub value: u64,
}

impl ValueGeneratorFixed {
    pub fn new(value: u64) -> Box<Self> {
        Box::new(Self { value })
    }
}

impl ValueGeneratorTrait for ValueGeneratorFixed {
    fn generate_value(&self, _rng: &mut StdRng) -> u64 {
        self.value
    }

    fn generator_string(&self) -> String {
        format!("fixed {}", self.value)
    }
}

/// Value generator drawing uniformly from an inclusive range
pub struct ValueGeneratorUniform {
    pub min_value: u64,
    pub max_value: u64,
}

impl ValueGeneratorUniform {
    /// Bounds are swapped if given in the wrong order
    pub fn new(min_value: u64, max_value: u64) -> Box<Self> {
        Box::new(Self {
            min_value: min_value.min(max_value),
            max_value: min_value.max(max_value),
        })
    }
}

impl ValueGeneratorTrait for ValueGeneratorUniform {
    fn generate_value(&self, rng: &mut StdRng) -> u64 {
        rng.gen_range(self.min_value..=self.max_value)
    }

    fn generator_string(&self) -> String {
        format!("uniform {}..={}", self.min_value, self.max_value)
    }
}

/// Value generator using a log-normal distribution with the given mean and stddev
pub struct ValueGeneratorLogNormal {
    mean: f64,
    stddev: f64,
}

impl ValueGeneratorLogNormal {
    pub fn new(mean: f64, stddev: f64) -> Box<Self> {
        Box::new(Self { mean, stddev })
    }
}

impl ValueGeneratorTrait for ValueGeneratorLogNormal {
    fn generate_value(&self, rng: &mut StdRng) -> u64 {
        match lognormal_dist(self.mean, self.stddev) {
            // Every agent values a click at least at one unit
            Some(dist) => iround(Distribution::sample(&dist, rng)).max(1),
            None => iround(self.mean).max(1),
        }
    }

    fn generator_string(&self) -> String {
        format!("lognormal mean {:.1} stddev {:.1}", self.mean, self.stddev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_stays_in_range() {
        let generator = ValueGeneratorUniform::new(25, 175);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let value = generator.generate_value(&mut rng);
            assert!((25..=175).contains(&value));
        }
    }

    #[test]
    fn test_uniform_swapped_bounds() {
        let generator = ValueGeneratorUniform::new(9, 4);
        assert_eq!((generator.min_value, generator.max_value), (4, 9));
    }

    #[test]
    fn test_lognormal_mean_is_close() {
        let generator = ValueGeneratorLogNormal::new(100.0, 20.0);
        let mut rng = StdRng::seed_from_u64(5);
        let samples: Vec<f64> = (0..5000).map(|_| generator.generate_value(&mut rng) as f64).collect();
        let mean = crate::utils::mean(&samples);
        assert!((mean - 100.0).abs() < 3.0, "mean was {}", mean);
        assert!(samples.iter().all(|&v| v >= 1.0));
    }

    #[test]
    fn test_fixed_value() {
        let generator = ValueGeneratorFixed::new(42);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(generator.generate_value(&mut rng), 42);
    }
}
