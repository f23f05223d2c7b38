//! Component symbols of institutional statements and the statement slots they occupy.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A named component of an institutional statement, displayed as its IG Script symbol.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum ComponentSymbol {
    // Regulative
    #[strum(serialize = "A")]
    Attributes,
    #[strum(serialize = "A,p")]
    AttributesProperty,
    #[strum(serialize = "D")]
    Deontic,
    #[strum(serialize = "I")]
    Aim,
    #[strum(serialize = "Bdir")]
    DirectObject,
    #[strum(serialize = "Bdir,p")]
    DirectObjectProperty,
    #[strum(serialize = "Bind")]
    IndirectObject,
    #[strum(serialize = "Bind,p")]
    IndirectObjectProperty,

    // Shared
    #[strum(serialize = "Cac")]
    ActivationCondition,
    #[strum(serialize = "Cex")]
    ExecutionConstraint,

    // Constitutive
    #[strum(serialize = "E")]
    ConstitutedEntity,
    #[strum(serialize = "E,p")]
    ConstitutedEntityProperty,
    #[strum(serialize = "M")]
    Modal,
    #[strum(serialize = "F")]
    ConstitutiveFunction,
    #[strum(serialize = "P")]
    ConstitutingProperties,
    #[strum(serialize = "P,p")]
    ConstitutingPropertiesProperty,

    #[strum(serialize = "O")]
    OrElse,
}

impl ComponentSymbol {
    pub fn name(&self) -> &'static str {
        match self {
            ComponentSymbol::Attributes => "Attributes",
            ComponentSymbol::AttributesProperty => "Attributes Property",
            ComponentSymbol::Deontic => "Deontic",
            ComponentSymbol::Aim => "Aim",
            ComponentSymbol::DirectObject => "Direct Object",
            ComponentSymbol::DirectObjectProperty => "Direct Object Property",
            ComponentSymbol::IndirectObject => "Indirect Object",
            ComponentSymbol::IndirectObjectProperty => "Indirect Object Property",
            ComponentSymbol::ActivationCondition => "Activation Condition",
            ComponentSymbol::ExecutionConstraint => "Execution Constraint",
            ComponentSymbol::ConstitutedEntity => "Constituted Entity",
            ComponentSymbol::ConstitutedEntityProperty => "Constituted Entity Property",
            ComponentSymbol::Modal => "Modal",
            ComponentSymbol::ConstitutiveFunction => "Constitutive Function",
            ComponentSymbol::ConstitutingProperties => "Constituting Properties",
            ComponentSymbol::ConstitutingPropertiesProperty => {
                "Constituting Properties Properties"
            }
            ComponentSymbol::OrElse => "Or Else",
        }
    }

    /// Symbol without the property marker (`Bdir` for `Bdir,p`).
    pub fn root(&self) -> ComponentSymbol {
        match self {
            ComponentSymbol::AttributesProperty => ComponentSymbol::Attributes,
            ComponentSymbol::DirectObjectProperty => ComponentSymbol::DirectObject,
            ComponentSymbol::IndirectObjectProperty => ComponentSymbol::IndirectObject,
            ComponentSymbol::ConstitutedEntityProperty => ComponentSymbol::ConstitutedEntity,
            ComponentSymbol::ConstitutingPropertiesProperty => {
                ComponentSymbol::ConstitutingProperties
            }
            other => *other,
        }
    }

    /// Property variant of a component, if it has one.
    pub fn property(&self) -> Option<ComponentSymbol> {
        match self {
            ComponentSymbol::Attributes => Some(ComponentSymbol::AttributesProperty),
            ComponentSymbol::DirectObject => Some(ComponentSymbol::DirectObjectProperty),
            ComponentSymbol::IndirectObject => Some(ComponentSymbol::IndirectObjectProperty),
            ComponentSymbol::ConstitutedEntity => Some(ComponentSymbol::ConstitutedEntityProperty),
            ComponentSymbol::ConstitutingProperties => {
                Some(ComponentSymbol::ConstitutingPropertiesProperty)
            }
            _ => None,
        }
    }

    pub fn is_property(&self) -> bool {
        self.root() != *self
    }

    /// Component whose suffixed leaves receive private links from this one.
    pub fn private_link_target(&self) -> Option<ComponentSymbol> {
        match self {
            ComponentSymbol::Aim => Some(ComponentSymbol::ExecutionConstraint),
            other => other.property(),
        }
    }

    pub fn supports_nesting(&self) -> bool {
        matches!(
            self,
            ComponentSymbol::AttributesProperty
                | ComponentSymbol::DirectObject
                | ComponentSymbol::DirectObjectProperty
                | ComponentSymbol::IndirectObject
                | ComponentSymbol::IndirectObjectProperty
                | ComponentSymbol::ActivationCondition
                | ComponentSymbol::ExecutionConstraint
                | ComponentSymbol::ConstitutedEntityProperty
                | ComponentSymbol::ConstitutingProperties
                | ComponentSymbol::ConstitutingPropertiesProperty
                | ComponentSymbol::OrElse
        )
    }

    /// Or-else only ever holds a consequential statement.
    pub fn supports_plain_content(&self) -> bool {
        *self != ComponentSymbol::OrElse
    }

    /// Resolves a root symbol and property flag as written in a component header.
    pub fn from_header(root: &str, property: bool) -> Option<ComponentSymbol> {
        let symbol = ComponentSymbol::iter().find(|s| !s.is_property() && s.as_ref() == root)?;
        if property {
            symbol.property()
        } else {
            Some(symbol)
        }
    }
}

/// A statement slot: a component either holding plain content or nested statements.
///
/// Variant order is the canonical column order used for leaf arrays and headers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum Slot {
    #[strum(serialize = "A")]
    Attributes,
    #[strum(serialize = "A,p")]
    AttributesProperty,
    #[strum(serialize = "A,p-Ref")]
    AttributesPropertyNested,
    #[strum(serialize = "D")]
    Deontic,
    #[strum(serialize = "I")]
    Aim,
    #[strum(serialize = "Bdir")]
    DirectObject,
    #[strum(serialize = "Bdir-Ref")]
    DirectObjectNested,
    #[strum(serialize = "Bdir,p")]
    DirectObjectProperty,
    #[strum(serialize = "Bdir,p-Ref")]
    DirectObjectPropertyNested,
    #[strum(serialize = "Bind")]
    IndirectObject,
    #[strum(serialize = "Bind-Ref")]
    IndirectObjectNested,
    #[strum(serialize = "Bind,p")]
    IndirectObjectProperty,
    #[strum(serialize = "Bind,p-Ref")]
    IndirectObjectPropertyNested,
    #[strum(serialize = "Cac")]
    ActivationCondition,
    #[strum(serialize = "Cac-Ref")]
    ActivationConditionNested,
    #[strum(serialize = "Cex")]
    ExecutionConstraint,
    #[strum(serialize = "Cex-Ref")]
    ExecutionConstraintNested,
    #[strum(serialize = "E")]
    ConstitutedEntity,
    #[strum(serialize = "E,p")]
    ConstitutedEntityProperty,
    #[strum(serialize = "E,p-Ref")]
    ConstitutedEntityPropertyNested,
    #[strum(serialize = "M")]
    Modal,
    #[strum(serialize = "F")]
    ConstitutiveFunction,
    #[strum(serialize = "P")]
    ConstitutingProperties,
    #[strum(serialize = "P-Ref")]
    ConstitutingPropertiesNested,
    #[strum(serialize = "P,p")]
    ConstitutingPropertiesProperty,
    #[strum(serialize = "P,p-Ref")]
    ConstitutingPropertiesPropertyNested,
    #[strum(serialize = "O-Ref")]
    OrElseNested,
}

impl Slot {
    pub fn new(symbol: ComponentSymbol, nested: bool) -> Option<Slot> {
        Slot::iter().find(|slot| slot.symbol() == symbol && slot.is_nested() == nested)
    }

    pub fn symbol(&self) -> ComponentSymbol {
        use ComponentSymbol as C;
        match self {
            Slot::Attributes => C::Attributes,
            Slot::AttributesProperty | Slot::AttributesPropertyNested => C::AttributesProperty,
            Slot::Deontic => C::Deontic,
            Slot::Aim => C::Aim,
            Slot::DirectObject | Slot::DirectObjectNested => C::DirectObject,
            Slot::DirectObjectProperty | Slot::DirectObjectPropertyNested => {
                C::DirectObjectProperty
            }
            Slot::IndirectObject | Slot::IndirectObjectNested => C::IndirectObject,
            Slot::IndirectObjectProperty | Slot::IndirectObjectPropertyNested => {
                C::IndirectObjectProperty
            }
            Slot::ActivationCondition | Slot::ActivationConditionNested => C::ActivationCondition,
            Slot::ExecutionConstraint | Slot::ExecutionConstraintNested => C::ExecutionConstraint,
            Slot::ConstitutedEntity => C::ConstitutedEntity,
            Slot::ConstitutedEntityProperty | Slot::ConstitutedEntityPropertyNested => {
                C::ConstitutedEntityProperty
            }
            Slot::Modal => C::Modal,
            Slot::ConstitutiveFunction => C::ConstitutiveFunction,
            Slot::ConstitutingProperties | Slot::ConstitutingPropertiesNested => {
                C::ConstitutingProperties
            }
            Slot::ConstitutingPropertiesProperty | Slot::ConstitutingPropertiesPropertyNested => {
                C::ConstitutingPropertiesProperty
            }
            Slot::OrElseNested => C::OrElse,
        }
    }

    pub fn is_nested(&self) -> bool {
        self.to_string().ends_with("-Ref")
    }

    /// Activation conditions multiply rather than add to statement complexity.
    pub fn is_condition(&self) -> bool {
        self.symbol() == ComponentSymbol::ActivationCondition
    }
}
