use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{Domain, SubsystemSpec};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Immutable-after-load collection of subsystem specs keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SubsystemRegistry {
    name: String,
    specs: BTreeMap<String, SubsystemSpec>,
}

impl SubsystemRegistry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            specs: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register(&mut self, spec: SubsystemSpec) -> EngineResult<()> {
        if self.specs.contains_key(&spec.id) {
            return Err(EngineError::DuplicateId(spec.id));
        }
        self.specs.insert(spec.id.clone(), spec);
        Ok(())
    }

    pub fn get(&self, id: &str) -> EngineResult<&SubsystemSpec> {
        self.specs
            .get(id)
            .ok_or_else(|| EngineError::UnknownSubsystem(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.specs.contains_key(id)
    }

    /// Every spec, ascending by id.
    pub fn all(&self) -> impl Iterator<Item = &SubsystemSpec> {
        self.specs.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn by_domain(&self, domain: Domain) -> Vec<&SubsystemSpec> {
        self.all().filter(|s| s.domain == domain).collect()
    }

    /// Ids that declare `id` as a direct dependency.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        self.all()
            .filter(|s| s.dependencies.contains(id))
            .map(|s| s.id.as_str())
            .collect()
    }

    /// SHA-256 over the canonical JSON of all specs in id order.
    pub fn digest(&self) -> String {
        let specs: Vec<&SubsystemSpec> = self.all().collect();
        let canonical = serde_json::to_vec(&specs).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::SubsystemRegistry;
    use crate::domain::errors::EngineError;
    use crate::domain::models::{Domain, SubsystemSpec};

    fn power() -> SubsystemSpec {
        SubsystemSpec::new("apdn", "APDN", Domain::Power, 6, 850.0)
    }

    #[test]
    fn register_rejects_duplicate_ids() {
        let mut reg = SubsystemRegistry::new("t");
        reg.register(power()).unwrap();
        let err = reg.register(power()).unwrap_err();
        assert_eq!(err, EngineError::DuplicateId("apdn".to_string()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn get_reports_unknown_ids() {
        let reg = SubsystemRegistry::new("t");
        assert_eq!(
            reg.get("nope").unwrap_err(),
            EngineError::UnknownSubsystem("nope".to_string())
        );
    }

    #[test]
    fn all_is_sorted_regardless_of_registration_order() {
        let mut reg = SubsystemRegistry::new("t");
        reg.register(SubsystemSpec::new("zeta", "Z", Domain::Exotic, 0, 1.0))
            .unwrap();
        reg.register(power()).unwrap();
        reg.register(SubsystemSpec::new("mid", "M", Domain::Crypto, 8, 2.0))
            .unwrap();
        let ids: Vec<&str> = reg.ids().collect();
        assert_eq!(ids, vec!["apdn", "mid", "zeta"]);
    }

    #[test]
    fn digest_ignores_registration_order() {
        let ew = SubsystemSpec::new("ew", "EW", Domain::Ew, 7, 120.0).depends_on("apdn");
        let mut a = SubsystemRegistry::new("a");
        a.register(power()).unwrap();
        a.register(ew.clone()).unwrap();
        let mut b = SubsystemRegistry::new("b");
        b.register(ew).unwrap();
        b.register(power()).unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }

    #[test]
    fn dependents_are_direct_only() {
        let mut reg = SubsystemRegistry::new("t");
        reg.register(power()).unwrap();
        reg.register(SubsystemSpec::new("ew", "EW", Domain::Ew, 7, 120.0).depends_on("apdn"))
            .unwrap();
        reg.register(SubsystemSpec::new("pvi", "PVI", Domain::Avionics, 7, 30.0).depends_on("ew"))
            .unwrap();
        assert_eq!(reg.dependents_of("apdn"), vec!["ew"]);
        assert!(reg.dependents_of("pvi").is_empty());
    }
}
