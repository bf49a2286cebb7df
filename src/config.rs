/// Simulation configuration and its command-line parsing
///
/// Flags: --mech gsp|vcg|switch, --reserve N, --budget N, --rounds N, --dropoff F,
/// --iters N, --seed N, --min-value N, --max-value N, --values uniform|lognormal|fixed
/// Positional arguments are agent specs: <truthful|balanced|adaptive|pacing>[,count]
///
/// Everything is validated here, before any round runs.

use std::error::Error;
use std::fmt;
use std::str::FromStr;
use crate::agents::{AgentSpec, AgentType};
use crate::mechanism::MechanismType;
use crate::values::{ValueGeneratorFixed, ValueGeneratorLogNormal, ValueGeneratorTrait, ValueGeneratorUniform};

/// Largest accepted per-click value, in cents
/// Keeps value times clicks well inside the signed utility range
pub const MAX_VALUE_PER_CLICK: u64 = 1_000_000_000;

/// How agent values are drawn from the min_value..=max_value range
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(non_camel_case_types)]
pub enum ValueDistribution {
    UNIFORM,
    /// Centered on the middle of the range, stddev a quarter of its width
    LOGNORMAL,
    /// Every agent gets the middle of the range
    FIXED,
}

impl ValueDistribution {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "uniform" => Some(ValueDistribution::UNIFORM),
            "lognormal" => Some(ValueDistribution::LOGNORMAL),
            "fixed" => Some(ValueDistribution::FIXED),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub mechanism: MechanismType,
    /// Minimum qualifying bid, in cents
    pub reserve: u64,
    /// Per-agent budget cap over the whole run, in cents
    pub budget: u64,
    pub num_rounds: usize,
    /// Click ratio between consecutive slot ranks
    pub dropoff: f64,
    /// Number of runs with fresh agent values
    pub iterations: usize,
    /// None means a production run seeded from entropy
    pub seed: Option<u64>,
    /// Agent values are drawn from min_value..=max_value
    pub min_value: u64,
    pub max_value: u64,
    pub values: ValueDistribution,
    pub agent_specs: Vec<AgentSpec>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mechanism: MechanismType::GSP,
            reserve: 0,
            budget: 500_000,
            num_rounds: 48,
            dropoff: 0.75,
            iterations: 1,
            seed: None,
            min_value: 25,
            max_value: 175,
            values: ValueDistribution::UNIFORM,
            agent_specs: vec![AgentSpec { agent_type: AgentType::TRUTHFUL, count: 5 }],
        }
    }
}

impl SimulationConfig {
    pub fn num_agents(&self) -> usize {
        self.agent_specs.iter().map(|spec| spec.count).sum()
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dropoff > 0.0 && self.dropoff <= 1.0) {
            return Err(ConfigError::InvalidDropoff(self.dropoff));
        }
        if self.min_value > self.max_value {
            return Err(ConfigError::InvalidValueRange { min_value: self.min_value, max_value: self.max_value });
        }
        if self.max_value > MAX_VALUE_PER_CLICK {
            return Err(ConfigError::ValueAboveLimit { max_value: self.max_value, limit: MAX_VALUE_PER_CLICK });
        }
        if self.iterations == 0 {
            return Err(ConfigError::InvalidValue { flag: "--iters".to_string(), value: "0".to_string() });
        }
        if self.num_agents() == 0 {
            return Err(ConfigError::NoAgents);
        }
        Ok(())
    }

    /// Generator for agent values, built from the distribution and the value range
    pub fn value_generator(&self) -> Box<dyn ValueGeneratorTrait> {
        let middle = self.min_value + self.max_value.saturating_sub(self.min_value) / 2;
        match self.values {
            ValueDistribution::UNIFORM => ValueGeneratorUniform::new(self.min_value, self.max_value),
            ValueDistribution::LOGNORMAL => {
                let stddev = self.max_value.saturating_sub(self.min_value) as f64 / 4.0;
                ValueGeneratorLogNormal::new(middle as f64, stddev)
            }
            ValueDistribution::FIXED => ValueGeneratorFixed::new(middle),
        }
    }

    /// One-line summary for logs
    pub fn summary_string(&self) -> String {
        let agents: Vec<String> = self.agent_specs.iter()
            .map(|spec| format!("{},{}", spec.agent_type.as_str(), spec.count))
            .collect();
        format!(
            "mech={} reserve={} budget={} rounds={} dropoff={} iters={} values={} agents=[{}]",
            self.mechanism.as_str(),
            self.reserve,
            self.budget,
            self.num_rounds,
            self.dropoff,
            self.iterations,
            self.value_generator().generator_string(),
            agents.join(" "),
        )
    }
}

/// Configuration errors; all of them are fatal
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    UnknownMechanism(String),
    UnknownAgentType(String),
    UnknownValueDistribution(String),
    UnknownFlag(String),
    MissingValue(String),
    InvalidValue { flag: String, value: String },
    NegativeValue { flag: String, value: String },
    InvalidDropoff(f64),
    InvalidValueRange { min_value: u64, max_value: u64 },
    ValueAboveLimit { max_value: u64, limit: u64 },
    NoAgents,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownMechanism(name) => write!(f, "mechanism must be one of 'gsp', 'vcg', or 'switch', got '{}'", name),
            ConfigError::UnknownAgentType(name) => write!(f, "unknown agent type '{}' (expected truthful, balanced, adaptive or pacing)", name),
            ConfigError::UnknownValueDistribution(name) => write!(f, "value distribution must be one of 'uniform', 'lognormal' or 'fixed', got '{}'", name),
            ConfigError::UnknownFlag(flag) => write!(f, "unknown flag '{}'", flag),
            ConfigError::MissingValue(flag) => write!(f, "flag '{}' requires a value", flag),
            ConfigError::InvalidValue { flag, value } => write!(f, "invalid value '{}' for '{}'", value, flag),
            ConfigError::NegativeValue { flag, value } => write!(f, "'{}' must not be negative, got '{}'", flag, value),
            ConfigError::InvalidDropoff(dropoff) => write!(f, "dropoff must be in (0, 1], got {}", dropoff),
            ConfigError::InvalidValueRange { min_value, max_value } => write!(f, "min value {} is above max value {}", min_value, max_value),
            ConfigError::ValueAboveLimit { max_value, limit } => write!(f, "max value {} is above the limit of {}", max_value, limit),
            ConfigError::NoAgents => write!(f, "at least one agent is required"),
        }
    }
}

impl Error for ConfigError {}

fn parse_number<T: FromStr>(flag: &str, value: &str) -> Result<T, ConfigError> {
    if value.starts_with('-') {
        return Err(ConfigError::NegativeValue { flag: flag.to_string(), value: value.to_string() });
    }
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue { flag: flag.to_string(), value: value.to_string() })
}

/// Parse an agent spec such as "balanced,3" or "truthful"
pub fn parse_agent_spec(spec: &str) -> Result<AgentSpec, ConfigError> {
    let mut parts = spec.splitn(2, ',');
    let name = parts.next().unwrap_or_default();
    let agent_type = AgentType::parse(name).ok_or_else(|| ConfigError::UnknownAgentType(name.to_string()))?;
    let count = match parts.next() {
        Some(count) => parse_number::<usize>(spec, count)?,
        None => 1,
    };
    Ok(AgentSpec { agent_type, count })
}

/// Parse command-line arguments (without program name and command) into a validated configuration
pub fn parse_args(args: &[String]) -> Result<SimulationConfig, ConfigError> {
    let mut config = SimulationConfig::default();
    let mut agent_specs = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if !arg.starts_with("--") {
            agent_specs.push(parse_agent_spec(arg)?);
            continue;
        }
        let flag = arg.as_str();
        let value = iter.next().ok_or_else(|| ConfigError::MissingValue(flag.to_string()))?;
        match flag {
            "--mech" => {
                config.mechanism = MechanismType::parse(value).ok_or_else(|| ConfigError::UnknownMechanism(value.clone()))?;
            }
            "--reserve" => config.reserve = parse_number(flag, value)?,
            "--budget" => config.budget = parse_number(flag, value)?,
            "--rounds" => config.num_rounds = parse_number(flag, value)?,
            "--dropoff" => config.dropoff = parse_number(flag, value)?,
            "--iters" => config.iterations = parse_number(flag, value)?,
            "--seed" => config.seed = Some(parse_number(flag, value)?),
            "--min-value" => config.min_value = parse_number(flag, value)?,
            "--max-value" => config.max_value = parse_number(flag, value)?,
            "--values" => {
                config.values = ValueDistribution::parse(value).ok_or_else(|| ConfigError::UnknownValueDistribution(value.clone()))?;
            }
            _ => return Err(ConfigError::UnknownFlag(flag.to_string())),
        }
    }

    if !agent_specs.is_empty() {
        config.agent_specs = agent_specs;
    }
    config.validate()?;
    Ok(config)
}
