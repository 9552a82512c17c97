//! Qualified types: the currency exchanged by every higher layer
//!
//! A [`QualType`] pairs an interned type handle with a qualifier set. All
//! transformations are pure: they return a freshly interned type and never
//! mutate an existing chain.

use crate::ast::{PrimitiveKind, Span};
use crate::error::{to_source_span, TypeConstructionError};
use crate::types::{TypeElement, TypeHandle, TypeRegistry};

/// Qualifier set attached to a type usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_signed: bool,
    pub is_public: bool,
    pub is_heap: bool,
    pub is_inline: bool,
    pub is_composition: bool,
}

impl Qualifiers {
    pub fn const_() -> Self {
        Self {
            is_const: true,
            ..Self::default()
        }
    }

    pub fn public() -> Self {
        Self {
            is_public: true,
            ..Self::default()
        }
    }
}

/// Handle to an interned type plus its qualifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualType {
    handle: TypeHandle,
    qualifiers: Qualifiers,
}

impl QualType {
    pub fn new(handle: TypeHandle) -> Self {
        Self {
            handle,
            qualifiers: Qualifiers::default(),
        }
    }

    pub fn with_qualifiers(handle: TypeHandle, qualifiers: Qualifiers) -> Self {
        Self { handle, qualifiers }
    }

    pub fn primitive(registry: &mut TypeRegistry, kind: PrimitiveKind) -> Self {
        Self::new(registry.primitive(kind))
    }

    pub fn handle(&self) -> TypeHandle {
        self.handle
    }

    pub fn qualifiers(&self) -> Qualifiers {
        self.qualifiers
    }

    pub fn as_const(mut self) -> Self {
        self.qualifiers.is_const = true;
        self
    }

    pub fn without_const(mut self) -> Self {
        self.qualifiers.is_const = false;
        self
    }

    pub fn is_const(&self) -> bool {
        self.qualifiers.is_const
    }

    /// Same interned chain, qualifiers ignored
    pub fn same_shape(&self, other: &QualType) -> bool {
        self.handle == other.handle
    }

    pub fn is_pointer(&self, registry: &TypeRegistry) -> bool {
        matches!(registry.chain(self.handle).outer(), TypeElement::Pointer)
    }

    pub fn is_reference(&self, registry: &TypeRegistry) -> bool {
        matches!(registry.chain(self.handle).outer(), TypeElement::Reference)
    }

    pub fn is_array(&self, registry: &TypeRegistry) -> bool {
        matches!(
            registry.chain(self.handle).outer(),
            TypeElement::Array { .. }
        )
    }

    pub fn is_unresolved(&self, registry: &TypeRegistry) -> bool {
        matches!(registry.chain(self.handle).base(), TypeElement::Unresolved)
    }

    /// Pointer to this type. Taking a pointer to a still-unresolved type is an
    /// illegal construction.
    pub fn to_pointer(
        &self,
        registry: &mut TypeRegistry,
        span: Span,
    ) -> Result<QualType, TypeConstructionError> {
        if self.is_unresolved(registry) {
            return Err(TypeConstructionError::PointerToUnresolved {
                span: to_source_span(Some(span)),
            });
        }
        let chain = registry.chain(self.handle).clone();
        let handle = registry.intern(chain.wrapped(TypeElement::Pointer));
        Ok(Self::with_qualifiers(handle, self.qualifiers))
    }

    /// Reference to this type; references never nest.
    pub fn to_reference(
        &self,
        registry: &mut TypeRegistry,
        span: Span,
    ) -> Result<QualType, TypeConstructionError> {
        if self.is_reference(registry) {
            return Err(TypeConstructionError::ReferenceToReference {
                span: to_source_span(Some(span)),
            });
        }
        let chain = registry.chain(self.handle).clone();
        let handle = registry.intern(chain.wrapped(TypeElement::Reference));
        Ok(Self::with_qualifiers(handle, self.qualifiers))
    }

    /// Array of this type with an optional static size
    pub fn to_array(
        &self,
        registry: &mut TypeRegistry,
        size: Option<u32>,
        span: Span,
    ) -> Result<QualType, TypeConstructionError> {
        if self.is_unresolved(registry) {
            return Err(TypeConstructionError::ArrayOfUnresolved {
                span: to_source_span(Some(span)),
            });
        }
        let chain = registry.chain(self.handle).clone();
        let handle = registry.intern(chain.wrapped(TypeElement::Array { size }));
        Ok(Self::with_qualifiers(handle, self.qualifiers))
    }

    /// Contained type of the outermost wrapper
    pub fn contained(
        &self,
        registry: &mut TypeRegistry,
        span: Span,
    ) -> Result<QualType, TypeConstructionError> {
        let chain = registry.chain(self.handle).clone();
        if !chain.outer().is_wrapper() {
            return Err(TypeConstructionError::NotAContainer {
                span: to_source_span(Some(span)),
            });
        }
        let inner = chain.unwrapped().expect("wrapper implies a contained type");
        let handle = registry.intern(inner);
        Ok(Self::with_qualifiers(handle, self.qualifiers))
    }

    /// Replace the base element while preserving this type's wrapper order
    pub fn replace_base_type(&self, registry: &mut TypeRegistry, new_base: QualType) -> QualType {
        let own = registry.chain(self.handle).clone();
        let base = registry.chain(new_base.handle()).clone();
        let mut elements = base.elements().to_vec();
        elements.extend(own.elements().iter().skip(1).cloned());
        let handle = registry.intern(crate::types::TypeChain::from_elements(elements));
        Self::with_qualifiers(handle, self.qualifiers)
    }

    /// Equality with relaxable qualifier comparison. With `strict_qualifiers`
    /// the full qualifier set must agree; otherwise only the shape is
    /// compared, the way call matching checks shape and qualifiers
    /// separately.
    pub fn matches(&self, other: &QualType, strict_qualifiers: bool) -> bool {
        if self.handle != other.handle {
            return false;
        }
        !strict_qualifiers || self.qualifiers == other.qualifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> TypeRegistry {
        TypeRegistry::new()
    }

    #[test]
    fn test_transformations_are_pure_and_interned() {
        let mut registry = test_registry();
        let int = QualType::primitive(&mut registry, PrimitiveKind::Int);
        let ptr1 = int.to_pointer(&mut registry, Span::zero()).unwrap();
        let ptr2 = int.to_pointer(&mut registry, Span::zero()).unwrap();
        assert_eq!(ptr1.handle(), ptr2.handle());
        // The source type is untouched
        assert_eq!(
            registry.chain(int.handle()).base(),
            &TypeElement::Primitive(PrimitiveKind::Int)
        );
    }

    #[test]
    fn test_reference_to_reference_is_rejected() {
        let mut registry = test_registry();
        let int = QualType::primitive(&mut registry, PrimitiveKind::Int);
        let reference = int.to_reference(&mut registry, Span::zero()).unwrap();
        let err = reference.to_reference(&mut registry, Span::zero());
        assert!(matches!(
            err,
            Err(TypeConstructionError::ReferenceToReference { .. })
        ));
    }

    #[test]
    fn test_pointer_and_array_of_unresolved_are_rejected() {
        let mut registry = test_registry();
        let unresolved = QualType::new(registry.intern_base(TypeElement::Unresolved));
        assert!(matches!(
            unresolved.to_pointer(&mut registry, Span::zero()),
            Err(TypeConstructionError::PointerToUnresolved { .. })
        ));
        assert!(matches!(
            unresolved.to_array(&mut registry, Some(8), Span::zero()),
            Err(TypeConstructionError::ArrayOfUnresolved { .. })
        ));
    }

    #[test]
    fn test_contained_round_trip() {
        let mut registry = test_registry();
        let double = QualType::primitive(&mut registry, PrimitiveKind::Double);
        let arr = double
            .to_array(&mut registry, Some(16), Span::zero())
            .unwrap();
        let contained = arr.contained(&mut registry, Span::zero()).unwrap();
        assert_eq!(contained.handle(), double.handle());
        assert!(matches!(
            double.contained(&mut registry, Span::zero()),
            Err(TypeConstructionError::NotAContainer { .. })
        ));
    }

    #[test]
    fn test_replace_base_type_preserves_wrappers() {
        let mut registry = test_registry();
        let t = QualType::new(registry.intern_base(TypeElement::Generic("T".to_string())));
        let t_ptr = t.to_pointer(&mut registry, Span::zero()).unwrap();
        let int = QualType::primitive(&mut registry, PrimitiveKind::Int);
        let int_ptr = t_ptr.replace_base_type(&mut registry, int);
        assert_eq!(registry.display(int_ptr), "int*");
    }

    #[test]
    fn test_relaxed_qualifier_matching() {
        let mut registry = test_registry();
        let int = QualType::primitive(&mut registry, PrimitiveKind::Int);
        let const_int = int.as_const();
        assert!(int.matches(&const_int, false));
        assert!(!int.matches(&const_int, true));
        assert!(int.same_shape(&const_int));
    }
}
