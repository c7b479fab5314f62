//! Per-domain metric models.
//!
//! Each domain registers one [`DomainModel`] in an [`EvaluatorTable`]. Models are
//! pure: they read the subsystem's parameters and the results of its declared
//! dependencies, and either return finite metrics or an
//! [`InvalidOperatingPoint`].

use crate::domain::errors::{EngineError, EngineResult, InvalidOperatingPoint};
use crate::domain::models::{Domain, EvaluationResult, MetricBound, Metrics, SubsystemSpec};
use std::collections::BTreeMap;

pub type EvalOutcome = Result<Metrics, InvalidOperatingPoint>;

pub trait DomainModel: Send + Sync {
    fn domain(&self) -> Domain;

    fn evaluate(&self, spec: &SubsystemSpec, upstream: &[&EvaluationResult]) -> EvalOutcome;

    /// Envelope a subsystem of this domain is expected to stay inside.
    fn nominal_bounds(&self) -> Vec<MetricBound>;
}

pub struct EvaluatorTable {
    models: BTreeMap<Domain, Box<dyn DomainModel>>,
}

impl Default for EvaluatorTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl EvaluatorTable {
    pub fn empty() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }

    /// Table with a model for every known domain.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register(Box::new(PowerModel));
        table.register(Box::new(PropulsionModel));
        table.register(Box::new(EwModel));
        table.register(Box::new(CryptoModel));
        table.register(Box::new(AvionicsModel));
        table.register(Box::new(DirectedEnergyModel));
        table.register(Box::new(ExoticModel));
        table
    }

    /// Later registrations replace earlier ones for the same domain.
    pub fn register(&mut self, model: Box<dyn DomainModel>) {
        self.models.insert(model.domain(), model);
    }

    pub fn supports(&self, domain: Domain) -> bool {
        self.models.contains_key(&domain)
    }

    pub fn model(&self, domain: Domain) -> EngineResult<&dyn DomainModel> {
        self.models
            .get(&domain)
            .map(|m| m.as_ref())
            .ok_or_else(|| EngineError::UnsupportedDomain(domain.to_string()))
    }

    /// Runs the domain model and rejects any non-finite output.
    pub fn evaluate(
        &self,
        spec: &SubsystemSpec,
        upstream: &[&EvaluationResult],
    ) -> EngineResult<EvalOutcome> {
        let model = self.model(spec.domain)?;
        Ok(model.evaluate(spec, upstream).and_then(ensure_finite))
    }
}

fn ensure_finite(metrics: Metrics) -> EvalOutcome {
    match metrics.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, value)) => Err(InvalidOperatingPoint(format!(
            "{name} is not finite ({value})"
        ))),
        None => Ok(metrics),
    }
}

fn param(spec: &SubsystemSpec, name: &str, default: f64) -> f64 {
    spec.parameters.get(name).copied().unwrap_or(default)
}

fn divide(num: f64, den: f64, what: &str) -> Result<f64, InvalidOperatingPoint> {
    if den == 0.0 || !den.is_finite() {
        return Err(InvalidOperatingPoint(format!("{what}: divisor is {den}")));
    }
    Ok(num / den)
}

fn log10(value: f64, what: &str) -> Result<f64, InvalidOperatingPoint> {
    if value <= 0.0 || !value.is_finite() {
        return Err(InvalidOperatingPoint(format!("{what}: log10 of {value}")));
    }
    Ok(value.log10())
}

fn draw(spec: &SubsystemSpec) -> Result<f64, InvalidOperatingPoint> {
    if spec.power_unbounded() {
        return Err(InvalidOperatingPoint(format!(
            "{} has unbounded power draw",
            spec.domain
        )));
    }
    Ok(spec.power_draw_kw)
}

/// Sum of `power_margin_kw` across the given upstream results. `None` when no
/// upstream result reports a margin.
pub fn upstream_power_margin(upstream: &[&EvaluationResult]) -> Option<f64> {
    upstream
        .iter()
        .filter_map(|r| r.metrics.get("power_margin_kw"))
        .fold(None, |acc, m| Some(acc.unwrap_or(0.0) + m))
}

pub struct PowerModel;

impl DomainModel for PowerModel {
    fn domain(&self) -> Domain {
        Domain::Power
    }

    fn evaluate(&self, spec: &SubsystemSpec, _upstream: &[&EvaluationResult]) -> EvalOutcome {
        let efficiency = param(spec, "efficiency", 0.92);
        let load = param(spec, "load_kw", 0.0);
        let ambient = param(spec, "ambient_c", 20.0);
        let resistance = param(spec, "thermal_resistance_c_per_kw", 0.3);

        let delivered = draw(spec)? * efficiency;
        let loss = divide(delivered, efficiency, "conversion loss")? - delivered;

        let mut m = Metrics::new();
        m.insert("delivered_kw".into(), delivered);
        m.insert("conversion_loss_kw".into(), loss);
        m.insert("heat_sink_c".into(), ambient + loss * resistance);
        m.insert("power_margin_kw".into(), delivered - load);
        m.insert("efficiency".into(), efficiency);
        m.insert("bus_voltage_v".into(), param(spec, "bus_voltage_v", 270.0));
        Ok(m)
    }

    fn nominal_bounds(&self) -> Vec<MetricBound> {
        vec![
            MetricBound::at_least("efficiency", 0.92),
            MetricBound::at_least("power_margin_kw", 0.0),
            MetricBound::at_most("heat_sink_c", 50.0),
            MetricBound::within("bus_voltage_v", 269.0, 271.0),
        ]
    }
}

pub struct PropulsionModel;

impl DomainModel for PropulsionModel {
    fn domain(&self) -> Domain {
        Domain::Propulsion
    }

    fn evaluate(&self, spec: &SubsystemSpec, _upstream: &[&EvaluationResult]) -> EvalOutcome {
        let max_thrust = param(spec, "max_thrust_lbf", 43_000.0);
        let mil_thrust = param(spec, "military_thrust_lbf", 28_000.0);
        let extraction = param(spec, "power_extraction_kw", 285.0);

        let mut m = Metrics::new();
        m.insert(
            "afterburner_gain".into(),
            divide(max_thrust, mil_thrust, "afterburner gain")?,
        );
        // 1 lbf = 4.448222 N
        m.insert("max_thrust_kn".into(), max_thrust * 4.448_222 / 1000.0);
        m.insert("extraction_margin_kw".into(), extraction - draw(spec)?);
        m.insert("turbine_inlet_c".into(), param(spec, "turbine_inlet_c", 1900.0));
        m.insert("bypass_ratio".into(), param(spec, "bypass_ratio", 0.57));
        Ok(m)
    }

    fn nominal_bounds(&self) -> Vec<MetricBound> {
        vec![
            MetricBound::at_least("extraction_margin_kw", 0.0),
            MetricBound::at_most("turbine_inlet_c", 1900.0),
            MetricBound::at_least("afterburner_gain", 1.0),
        ]
    }
}

pub struct EwModel;

impl DomainModel for EwModel {
    fn domain(&self) -> Domain {
        Domain::Ew
    }

    fn evaluate(&self, spec: &SubsystemSpec, upstream: &[&EvaluationResult]) -> EvalOutcome {
        let elements = param(spec, "array_elements", 64.0);
        let active = param(spec, "active_elements", elements);
        let loss_db = param(spec, "implementation_loss_db", 6.0);
        let draw = draw(spec)?;

        let mut m = Metrics::new();
        m.insert(
            "active_fraction".into(),
            divide(active, elements, "active fraction")?,
        );
        m.insert(
            "suppression_db".into(),
            20.0 * log10(active, "array gain")? - loss_db,
        );
        m.insert(
            "power_per_element_kw".into(),
            divide(draw, active, "power per element")?,
        );
        if let Some(margin) = upstream_power_margin(upstream) {
            m.insert("supply_headroom_kw".into(), margin - draw);
        }
        if let (Some(baseline), Some(treated)) = (
            spec.parameters.get("baseline_rcs_dbsm"),
            spec.parameters.get("treated_rcs_dbsm"),
        ) {
            m.insert("signature_reduction_db".into(), baseline - treated);
        }
        Ok(m)
    }

    fn nominal_bounds(&self) -> Vec<MetricBound> {
        vec![
            MetricBound::at_least("suppression_db", 30.0),
            // 60 of 64 elements
            MetricBound::at_least("active_fraction", 0.9375),
            MetricBound::at_least("supply_headroom_kw", 0.0),
        ]
    }
}

pub struct CryptoModel;

impl DomainModel for CryptoModel {
    fn domain(&self) -> Domain {
        Domain::Crypto
    }

    fn evaluate(&self, spec: &SubsystemSpec, _upstream: &[&EvaluationResult]) -> EvalOutcome {
        let lattice = param(spec, "lattice_dimension", 256.0);
        let latency = param(spec, "latency_us", 18.0);

        let mut m = Metrics::new();
        m.insert("security_bits".into(), lattice / 2.0);
        m.insert("throughput_gbps".into(), param(spec, "throughput_gbps", 1.2));
        m.insert("latency_us".into(), latency);
        m.insert(
            "frames_per_ms".into(),
            divide(1000.0, latency, "frame rate")?,
        );
        Ok(m)
    }

    fn nominal_bounds(&self) -> Vec<MetricBound> {
        vec![
            MetricBound::at_least("security_bits", 128.0),
            MetricBound::at_least("throughput_gbps", 1.2),
            MetricBound::at_most("latency_us", 18.0),
        ]
    }
}

pub struct AvionicsModel;

impl DomainModel for AvionicsModel {
    fn domain(&self) -> Domain {
        Domain::Avionics
    }

    fn evaluate(&self, spec: &SubsystemSpec, _upstream: &[&EvaluationResult]) -> EvalOutcome {
        let tflops = param(spec, "compute_tflops", 100.0);
        let processor_kw = param(spec, "processor_power_kw", 0.3);

        let mut m = Metrics::new();
        m.insert(
            "display_latency_ms".into(),
            param(spec, "display_latency_ms", 12.0),
        );
        m.insert(
            "field_of_view_deg".into(),
            param(spec, "field_of_view_deg", 150.0),
        );
        m.insert("compute_tflops".into(), tflops);
        m.insert(
            "tflops_per_kw".into(),
            divide(tflops, processor_kw, "compute efficiency")?,
        );
        Ok(m)
    }

    fn nominal_bounds(&self) -> Vec<MetricBound> {
        vec![
            MetricBound::at_most("display_latency_ms", 12.0),
            MetricBound::at_least("field_of_view_deg", 150.0),
            MetricBound::at_least("compute_tflops", 100.0),
        ]
    }
}

pub struct DirectedEnergyModel;

impl DomainModel for DirectedEnergyModel {
    fn domain(&self) -> Domain {
        Domain::DirectedEnergy
    }

    fn evaluate(&self, spec: &SubsystemSpec, upstream: &[&EvaluationResult]) -> EvalOutcome {
        let draw = draw(spec)?;
        let output = draw * param(spec, "wall_plug_efficiency", 0.3);

        let mut m = Metrics::new();
        m.insert("output_kw".into(), output);
        m.insert("waste_heat_kw".into(), draw - output);
        m.insert(
            "stability_index".into(),
            param(spec, "stability_index", 100.0),
        );
        if let Some(margin) = upstream_power_margin(upstream) {
            m.insert("supply_headroom_kw".into(), margin - draw);
        }
        Ok(m)
    }

    fn nominal_bounds(&self) -> Vec<MetricBound> {
        vec![
            MetricBound::at_least("stability_index", 90.0),
            MetricBound::at_least("supply_headroom_kw", 0.0),
        ]
    }
}

pub struct ExoticModel;

impl DomainModel for ExoticModel {
    fn domain(&self) -> Domain {
        Domain::Exotic
    }

    fn evaluate(&self, spec: &SubsystemSpec, _upstream: &[&EvaluationResult]) -> EvalOutcome {
        let mut m = Metrics::new();
        m.insert("stability_index".into(), param(spec, "stability_index", 0.0));
        m.insert(
            "power_unbounded".into(),
            if spec.power_unbounded() { 1.0 } else { 0.0 },
        );
        if !spec.power_unbounded() && spec.power_draw_kw > 0.0 {
            let capacity = param(spec, "platform_capacity_kw", 600.0);
            let ratio = divide(spec.power_draw_kw, capacity, "power ratio")?;
            m.insert("power_ratio_log10".into(), log10(ratio, "power ratio")?);
        }
        Ok(m)
    }

    fn nominal_bounds(&self) -> Vec<MetricBound> {
        vec![
            MetricBound::at_least("stability_index", 50.0),
            MetricBound::at_most("power_ratio_log10", 0.0),
        ]
    }
}
