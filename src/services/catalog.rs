//! Reference catalogue served by the `builtin` registry source.
//!
//! Figures (TRL, draw in kW, stability index) follow the diagnostic suite the
//! catalogue was reconstructed from. Sections map onto domains:
//! - weapons (directed energy, EMP, plasma, quantum) -> DIRECTED_ENERGY,
//! - signature management and cloaking -> EW,
//! - graviton, phase-shift, lensing and teleportation hardware -> EXOTIC,
//! - the F135 and the advanced propulsion block -> PROPULSION.

use crate::domain::errors::EngineResult;
use crate::domain::models::{Domain, SubsystemSpec};
use crate::services::registry::SubsystemRegistry;

pub const BUILTIN_NAME: &str = "builtin";

fn entry(id: &str, domain: Domain, trl: u8, draw_kw: f64) -> SubsystemSpec {
    SubsystemSpec::new(id, id, domain, trl, draw_kw)
}

fn directed_energy(id: &str, trl: u8, draw_kw: f64, stability: f64) -> SubsystemSpec {
    entry(id, Domain::DirectedEnergy, trl, draw_kw)
        .depends_on("apdn")
        .param("stability_index", stability)
}

fn signature(id: &str, trl: u8, draw_kw: f64, stability: f64) -> SubsystemSpec {
    entry(id, Domain::Ew, trl, draw_kw)
        .depends_on("apdn")
        .param("stability_index", stability)
}

fn propulsion(id: &str, trl: u8, draw_kw: f64, stability: f64) -> SubsystemSpec {
    entry(id, Domain::Propulsion, trl, draw_kw).param("stability_index", stability)
}

fn exotic(id: &str, trl: u8, draw_kw: f64, stability: f64) -> SubsystemSpec {
    entry(id, Domain::Exotic, trl, draw_kw).param("stability_index", stability)
}

fn platform() -> Vec<SubsystemSpec> {
    vec![
        entry("apdn", Domain::Power, 8, 700.0)
            .named("Adaptive Power Distribution Network")
            .param("efficiency", 0.92)
            .param("bus_voltage_v", 270.0)
            .describe("270 V DC bus, 600+ kW delivered capacity"),
        entry("qrcm", Domain::Crypto, 7, 0.5)
            .named("Quantum-Resistant Crypto Module")
            .param("lattice_dimension", 256.0)
            .param("throughput_gbps", 1.2)
            .param("latency_us", 18.0)
            .describe("Lattice KEM, lambda 256"),
        entry("cognitive_ew", Domain::Ew, 7, 45.0)
            .named("Cognitive EW Suite")
            .depends_on("apdn")
            .param("array_elements", 64.0)
            .describe("64-element null-steering array"),
        entry("pvi", Domain::Avionics, 7, 2.0)
            .named("Pilot-Vehicle Interface")
            .depends_on("apdn")
            .depends_on("qrcm")
            .param("display_latency_ms", 12.0)
            .param("field_of_view_deg", 150.0)
            .param("compute_tflops", 100.0)
            .param("processor_power_kw", 0.3)
            .describe("Helmet display with photonic sensor fusion"),
        entry("fire_control", Domain::Avionics, 9, 3.0)
            .named("Fire Control System")
            .depends_on("apdn"),
        entry("hypersonic_link", Domain::Avionics, 7, 1.5)
            .named("HYPER-HAWK Interface")
            .depends_on("apdn")
            .depends_on("qrcm")
            .describe("Data link to the hypersonic demonstrator"),
        entry("f135", Domain::Propulsion, 9, 250.0)
            .named("F135 Propulsion")
            .param("max_thrust_lbf", 43_000.0)
            .param("military_thrust_lbf", 28_000.0)
            .param("power_extraction_kw", 285.0)
            .param("turbine_inlet_c", 1900.0)
            .param("bypass_ratio", 0.57),
    ]
}

fn weapons() -> Vec<SubsystemSpec> {
    vec![
        directed_energy("hel", 7, 150.0, 98.5).named("High-Energy Laser"),
        directed_energy("active_denial", 8, 50.0, 99.2).named("Active Denial Microwave"),
        directed_energy("emp", 6, 0.0, 100.0)
            .named("Focused EMP Generator")
            .describe("Explosively pumped, no bus draw"),
        directed_energy("champ", 8, 85.0, 97.8).named("CHAMP Variant"),
        directed_energy("plasma_containment", 4, 280.0, 87.3).named("Plasma Containment Array"),
        directed_energy("plasma_bolt", 3, 450.0, 72.1)
            .named("Plasma Bolt Accelerator")
            .depends_on("plasma_containment"),
        directed_energy("entanglement_disruptor", 2, 180.0, 45.2)
            .named("Quantum Entanglement Disruptor")
            .describe("Decoherence field generator at 0.01 K"),
        directed_energy("probability_collapser", 1, 320.0, 33.8)
            .named("Probability Wave Collapser"),
        directed_energy("k1_saber", 3, 50_000.0, 99.5)
            .named("K1 Dissonance Projector")
            .describe("Surge capacity around 50 MW"),
        exotic("graviton_projector", 1, 850.0, 12.4).named("Graviton Beam Projector"),
        exotic("gravity_well", 1, 1200.0, 8.7).named("Localized Gravity Well Generator"),
    ]
}

fn cloaking() -> Vec<SubsystemSpec> {
    vec![
        signature("metasurface", 5, 85.0, 94.2)
            .named("Adaptive Metasurface Array")
            .param("baseline_rcs_dbsm", 0.0)
            .param("treated_rcs_dbsm", -30.0)
            .describe("Signature management skin"),
        signature("negative_index_layer", 4, 120.0, 89.1).named("Negative Refractive Index Layer"),
        signature("ionization_field", 4, 200.0, 78.5).named("Ionization Field Generator"),
        signature("absorption_plasma", 4, 180.0, 82.3)
            .named("Radar Absorption Plasma")
            .depends_on("ionization_field")
            .param("baseline_rcs_dbsm", 0.0)
            .param("treated_rcs_dbsm", -45.0),
        signature("electrochromic_skin", 6, 45.0, 96.8).named("Electrochromic Skin"),
        signature("light_cancellation", 5, 60.0, 91.2).named("Active Light Cancellation"),
        signature("ir_suppressor", 8, 25.0, 97.5).named("IR Signature Suppressor"),
        signature("thermal_grid", 7, 15.0, 98.2).named("Thermal Redistribution Grid"),
        exotic("gravity_lens", 1, 5000.0, 5.2).named("Gravity Lens Array"),
        exotic("photon_deflector", 1, 8500.0, 3.1).named("Photon Path Deflector"),
    ]
}

fn phase_shift() -> Vec<SubsystemSpec> {
    vec![
        exotic("phase_oscillator", 1, 2500.0, 23.4).named("Phase Oscillator Core"),
        exotic("temporal_phase_lock", 1, 800.0, 31.2)
            .named("Temporal Phase Lock")
            .depends_on("phase_oscillator"),
        exotic("brane_detector", 2, 150.0, 67.8).named("Brane Detector Array"),
        exotic("membrane_coils", 1, 3200.0, 15.3)
            .named("Membrane Phasing Coils")
            .depends_on("brane_detector"),
        exotic("coherence_field", 1, 1800.0, 19.7).named("Coherence Field Generator"),
        exotic("decoherence_suppressor", 2, 450.0, 42.1).named("Decoherence Suppressor"),
    ]
}

fn teleportation() -> Vec<SubsystemSpec> {
    vec![
        exotic("entanglement_generator", 2, 500.0, 45.0).named("Entanglement Generator"),
        exotic("state_teleporter", 2, 200.0, 38.2)
            .named("Quantum State Teleporter")
            .depends_on("entanglement_generator"),
        exotic("lattice_distortion", 1, 1e9, 8.5).named("Lattice Distortion Field"),
        exotic("casimir_amplifier", 1, 5e6, 12.3).named("Casimir Effect Amplifier"),
        exotic("wormhole_initiator", 0, f64::INFINITY, 0.01).named("Wormhole Initiator"),
        exotic("exotic_containment", 0, f64::INFINITY, 0.0)
            .named("Exotic Matter Containment")
            .describe("No exotic matter source"),
        exotic("wormhole_stabilizer", 0, 1e18, 0.001).named("Traversable Wormhole Stabilizer"),
        exotic("warp_bubble", 0, 1e20, 0.0001).named("Warp Bubble Generator"),
        exotic("negative_energy_shell", 0, 1e19, 0.00001).named("Negative Energy Shell"),
        exotic("lattice_collapse", 0, 1e21, 0.000001).named("Lattice Collapse Initiator"),
        exotic("destination_lock", 1, 1000.0, 15.0).named("Destination Lock Computer"),
        exotic("reintegration_buffer", 1, 5000.0, 22.5).named("Matter Reintegration Buffer"),
    ]
}

fn advanced_propulsion() -> Vec<SubsystemSpec> {
    vec![
        propulsion("rde_core", 5, 0.0, 78.5)
            .named("RDE Core")
            .describe("Continuous detonation wave at 20 kHz"),
        propulsion("hall_thrusters", 9, 50.0, 95.2)
            .named("Hall Effect Thrusters")
            .param("max_thrust_lbf", 0.07)
            .param("military_thrust_lbf", 0.07)
            .param("turbine_inlet_c", 0.0)
            .param("bypass_ratio", 0.0),
        propulsion("mhd_accelerator", 3, 500.0, 45.0).named("MHD Accelerator"),
        propulsion("antimatter_containment", 2, 100.0, 25.0)
            .named("Antimatter Containment")
            .depends_on("apdn"),
        propulsion("annihilation_chamber", 1, 50.0, 15.0)
            .named("Annihilation Chamber")
            .depends_on("antimatter_containment"),
    ]
}

pub fn builtin_specs() -> Vec<SubsystemSpec> {
    [
        platform(),
        weapons(),
        cloaking(),
        phase_shift(),
        teleportation(),
        advanced_propulsion(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn collect(name: &str, specs: Vec<SubsystemSpec>) -> EngineResult<SubsystemRegistry> {
    let mut registry = SubsystemRegistry::new(name);
    for spec in specs {
        registry.register(spec)?;
    }
    Ok(registry)
}

pub fn builtin() -> EngineResult<SubsystemRegistry> {
    collect(BUILTIN_NAME, builtin_specs())
}

/// Catalogue in the on-disk registry format.
pub fn builtin_document() -> serde_json::Value {
    serde_json::json!({
        "name": BUILTIN_NAME,
        "subsystems": builtin_specs(),
    })
}
