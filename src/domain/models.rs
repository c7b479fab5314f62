use crate::domain::errors::EngineError;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Named numeric outputs of one evaluation. Ordered so reports serialize stably.
pub type Metrics = BTreeMap<String, f64>;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Domain {
    Power,
    Propulsion,
    Ew,
    Crypto,
    Avionics,
    DirectedEnergy,
    Exotic,
}

impl Domain {
    pub const ALL: [Domain; 7] = [
        Domain::Power,
        Domain::Propulsion,
        Domain::Ew,
        Domain::Crypto,
        Domain::Avionics,
        Domain::DirectedEnergy,
        Domain::Exotic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Power => "POWER",
            Domain::Propulsion => "PROPULSION",
            Domain::Ew => "EW",
            Domain::Crypto => "CRYPTO",
            Domain::Avionics => "AVIONICS",
            Domain::DirectedEnergy => "DIRECTED_ENERGY",
            Domain::Exotic => "EXOTIC",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = EngineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim().to_ascii_uppercase().replace('-', "_");
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == key)
            .ok_or_else(|| EngineError::UnsupportedDomain(raw.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Operational,
    Degraded,
    Standby,
    Theoretical,
    Failed,
    Skipped,
}

impl Status {
    /// Position in the overall-status order. SKIPPED never takes part.
    pub fn severity(&self) -> Option<u8> {
        match self {
            Status::Operational => Some(0),
            Status::Theoretical => Some(1),
            Status::Standby => Some(2),
            Status::Degraded => Some(3),
            Status::Failed => Some(4),
            Status::Skipped => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Operational => "OPERATIONAL",
            Status::Degraded => "DEGRADED",
            Status::Standby => "STANDBY",
            Status::Theoretical => "THEORETICAL",
            Status::Failed => "FAILED",
            Status::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nominal operating envelope for one metric. Either side may be open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBound {
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl MetricBound {
    pub fn at_least(metric: &str, min: f64) -> Self {
        Self {
            metric: metric.to_string(),
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(metric: &str, max: f64) -> Self {
        Self {
            metric: metric.to_string(),
            min: None,
            max: Some(max),
        }
    }

    pub fn within(metric: &str, min: f64, max: f64) -> Self {
        Self {
            metric: metric.to_string(),
            min: Some(min),
            max: Some(max),
        }
    }

    /// Describes the violation, if `value` falls outside the envelope.
    pub fn violation(&self, value: f64) -> Option<String> {
        let shown = fmt_num(value);
        if let Some(min) = self.min.filter(|min| value < *min) {
            return Some(format!("{}={shown} below {}", self.metric, fmt_num(min)));
        }
        if let Some(max) = self.max.filter(|max| value > *max) {
            return Some(format!("{}={shown} above {}", self.metric, fmt_num(max)));
        }
        None
    }
}

fn fmt_num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    format!("{}", rounded)
}

/// Static profile of one modeled subsystem. Read-only once registered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsystemSpec {
    pub id: String,
    pub name: String,
    pub domain: Domain,
    pub trl: u8,
    /// `f64::INFINITY` marks an unbounded draw; written as `"unbounded"`.
    #[serde(serialize_with = "serialize_power_draw")]
    pub power_draw_kw: f64,
    pub dependencies: BTreeSet<String>,
    pub parameters: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<MetricBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SubsystemSpec {
    pub fn new(id: &str, name: &str, domain: Domain, trl: u8, power_draw_kw: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            domain,
            trl,
            power_draw_kw,
            dependencies: BTreeSet::new(),
            parameters: BTreeMap::new(),
            bounds: Vec::new(),
            description: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn depends_on(mut self, id: &str) -> Self {
        self.dependencies.insert(id.to_string());
        self
    }

    pub fn param(mut self, name: &str, value: f64) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    pub fn bound(mut self, bound: MetricBound) -> Self {
        self.bounds.push(bound);
        self
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    pub fn power_unbounded(&self) -> bool {
        self.power_draw_kw.is_infinite()
    }
}

pub fn serialize_power_draw<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() {
        s.serialize_str("unbounded")
    } else {
        s.serialize_f64(*value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub subsystem_id: String,
    pub domain: Domain,
    pub trl: u8,
    pub metrics: Metrics,
    pub status: Status,
    pub reason: Option<String>,
    pub illustrative: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSummary {
    pub operational: usize,
    pub degraded: usize,
    pub standby: usize,
    pub theoretical: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl StatusSummary {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Operational => self.operational += 1,
            Status::Degraded => self.degraded += 1,
            Status::Standby => self.standby += 1,
            Status::Theoretical => self.theoretical += 1,
            Status::Failed => self.failed += 1,
            Status::Skipped => self.skipped += 1,
        }
    }
}

/// Per-domain roll-up of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainSummary {
    pub subsystems: usize,
    pub overall_status: Status,
    pub readiness_score: f64,
    pub summary: StatusSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub timestamp: u64,
    pub registry_digest: String,
    pub order: Vec<String>,
    pub ordered_results: Vec<EvaluationResult>,
    pub overall_status: Status,
    pub failed_ids: BTreeSet<String>,
    pub skipped_ids: BTreeSet<String>,
    pub summary: StatusSummary,
    pub readiness_score: f64,
    pub domains: BTreeMap<Domain, DomainSummary>,
}

impl RunReport {
    pub fn result(&self, id: &str) -> Option<&EvaluationResult> {
        self.ordered_results.iter().find(|r| r.subsystem_id == id)
    }
}

#[derive(Serialize)]
pub struct OrderItem {
    pub position: usize,
    pub id: String,
    pub domain: Domain,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    #[default]
    Failed,
    Degraded,
    Standby,
    Theoretical,
    Never,
}

impl FailOn {
    pub fn trips(&self, overall: Status) -> bool {
        let threshold = match self {
            FailOn::Failed => Status::Failed,
            FailOn::Degraded => Status::Degraded,
            FailOn::Standby => Status::Standby,
            FailOn::Theoretical => Status::Theoretical,
            FailOn::Never => return false,
        };
        match (overall.severity(), threshold.severity()) {
            (Some(o), Some(t)) => o >= t,
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct PolicyFile {
    #[serde(default)]
    pub general: PolicyGeneral,
    /// Domain name -> weight.
    #[serde(default)]
    pub criticality: BTreeMap<String, f64>,
    /// Domain name -> metric -> limits.
    #[serde(default)]
    pub bounds: BTreeMap<String, BTreeMap<String, BoundLimits>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PolicyGeneral {
    #[serde(default)]
    pub fail_on: FailOn,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundLimits {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Serialize)]
pub struct CheckItem {
    pub name: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct CheckReport {
    pub overall: String,
    pub registry: String,
    pub subsystem_count: usize,
    pub checks: Vec<CheckItem>,
    pub recommendations: Vec<String>,
}
