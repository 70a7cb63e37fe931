//! Operator registry: resolves an operator kind to a factory.
//!
//! The process-wide registry returned by [`OperatorRegistry::global`] is what
//! [`Graph::new`](crate::shape::graph::Graph::new) equips from. Downstream
//! crates can swap a factory there, or build their own registry and pass it
//! to [`Graph::with_registry`](crate::shape::graph::Graph::with_registry).

use super::incidence::{FaceDivergence, FaceOrientation, FaceValuedGradient};
use super::{OperatorFactory, OperatorKind};
use crate::shape_error::ShapeError;
use hashbrown::HashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

static GLOBAL: Lazy<RwLock<OperatorRegistry>> =
    Lazy::new(|| RwLock::new(OperatorRegistry::default()));

/// Mapping from operator kind to factory.
#[derive(Clone, Debug)]
pub struct OperatorRegistry {
    factories: HashMap<OperatorKind, OperatorFactory>,
}

impl Default for OperatorRegistry {
    /// Registry holding the incidence-based graph operators.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(
            OperatorKind::FaceValuedGradient,
            FaceValuedGradient::from_registry,
        );
        registry.register(OperatorKind::FaceDivergence, FaceDivergence::from_registry);
        registry.register(OperatorKind::FaceOrientation, FaceOrientation::from_registry);
        registry
    }
}

impl OperatorRegistry {
    /// A registry with no factories.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static RwLock<OperatorRegistry> {
        &GLOBAL
    }

    /// Register `factory` for `kind`, returning the factory it replaces.
    pub fn register(
        &mut self,
        kind: OperatorKind,
        factory: OperatorFactory,
    ) -> Option<OperatorFactory> {
        let previous = self.factories.insert(kind, factory);
        if previous.is_some() {
            log::debug!("operator registry: replaced factory for `{kind}`");
        }
        previous
    }

    /// Remove the factory for `kind`.
    pub fn unregister(&mut self, kind: OperatorKind) -> Option<OperatorFactory> {
        self.factories.remove(&kind)
    }

    /// Resolve `kind` to its factory.
    pub fn from_registry(&self, kind: OperatorKind) -> Result<OperatorFactory, ShapeError> {
        self.factories
            .get(&kind)
            .copied()
            .ok_or(ShapeError::UnregisteredOperator(kind))
    }

    /// Resolve an operator by its registry name.
    pub fn from_name(&self, name: &str) -> Result<(OperatorKind, OperatorFactory), ShapeError> {
        let kind: OperatorKind = name.parse()?;
        Ok((kind, self.from_registry(kind)?))
    }

    pub fn contains(&self, kind: OperatorKind) -> bool {
        self.factories.contains_key(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_every_kind() {
        let registry = OperatorRegistry::default();
        for kind in OperatorKind::ALL {
            assert!(registry.contains(kind));
            assert!(registry.from_registry(kind).is_ok());
        }
    }

    #[test]
    fn empty_registry_reports_missing_kind() {
        let registry = OperatorRegistry::empty();
        assert_eq!(
            registry.from_registry(OperatorKind::FaceDivergence).unwrap_err(),
            ShapeError::UnregisteredOperator(OperatorKind::FaceDivergence)
        );
    }

    #[test]
    fn lookup_by_name() {
        let registry = OperatorRegistry::default();
        let (kind, _) = registry.from_name("face_orientation_operator").unwrap();
        assert_eq!(kind, OperatorKind::FaceOrientation);
        assert!(matches!(
            registry.from_name("laplacian"),
            Err(ShapeError::UnknownOperatorName(_))
        ));
    }

    #[test]
    fn register_returns_previous() {
        let mut registry = OperatorRegistry::default();
        let prev = registry.register(
            OperatorKind::FaceDivergence,
            FaceValuedGradient::from_registry,
        );
        assert!(prev.is_some());
        let mut registry = OperatorRegistry::empty();
        assert!(
            registry
                .register(OperatorKind::FaceDivergence, FaceDivergence::from_registry)
                .is_none()
        );
    }
}
