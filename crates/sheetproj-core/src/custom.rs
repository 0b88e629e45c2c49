//! Custom properties: user-declared fields attached to tasks or resources.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Identity of a custom property definition within its manager
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyId(usize);

/// Entity kind a definition belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKind {
    Task,
    Resource,
}

/// Value type of a custom property
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[default]
    Text,
    Integer,
    Double,
    Date,
    Boolean,
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::Text => write!(f, "text"),
            PropertyType::Integer => write!(f, "integer"),
            PropertyType::Double => write!(f, "double"),
            PropertyType::Date => write!(f, "date"),
            PropertyType::Boolean => write!(f, "boolean"),
        }
    }
}

/// A parsed custom value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypedValue {
    Text(String),
    Integer(i64),
    Double(f64),
    Date(NaiveDate),
    Boolean(bool),
}

impl TypedValue {
    pub const fn property_type(&self) -> PropertyType {
        match self {
            TypedValue::Text(_) => PropertyType::Text,
            TypedValue::Integer(_) => PropertyType::Integer,
            TypedValue::Double(_) => PropertyType::Double,
            TypedValue::Date(_) => PropertyType::Date,
            TypedValue::Boolean(_) => PropertyType::Boolean,
        }
    }
}

/// A stored custom value: the literal text as supplied, plus its typed
/// reading when the literal conforms to the definition's type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomValue {
    pub literal: String,
    pub typed: Option<TypedValue>,
}

impl CustomValue {
    pub fn new(literal: impl Into<String>, typed: Option<TypedValue>) -> Self {
        Self {
            literal: literal.into(),
            typed,
        }
    }

    pub fn text(literal: impl Into<String>) -> Self {
        let literal = literal.into();
        Self {
            typed: Some(TypedValue::Text(literal.clone())),
            literal,
        }
    }
}

/// A declared custom property
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPropertyDefinition {
    pub id: PropertyId,
    pub name: String,
    pub property_type: PropertyType,
    pub owner: OwnerKind,
}

/// Definitions for one owner kind, unique by name
#[derive(Clone, Debug)]
pub struct CustomPropertyManager {
    owner: OwnerKind,
    definitions: Vec<CustomPropertyDefinition>,
    by_name: HashMap<String, PropertyId>,
}

impl CustomPropertyManager {
    pub fn new(owner: OwnerKind) -> Self {
        Self {
            owner,
            definitions: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub const fn owner(&self) -> OwnerKind {
        self.owner
    }

    /// Look up a definition by its exact name
    pub fn definition(&self, name: &str) -> Option<&CustomPropertyDefinition> {
        self.by_name.get(name).map(|id| &self.definitions[id.0])
    }

    pub fn definition_by_id(&self, id: PropertyId) -> Option<&CustomPropertyDefinition> {
        self.definitions.get(id.0)
    }

    /// Return the definition named `name`, declaring it with `property_type`
    /// if it does not exist yet. An existing definition keeps its type.
    ///
    /// The flag is true when a new definition was created.
    pub fn get_or_create(
        &mut self,
        name: &str,
        property_type: PropertyType,
    ) -> (&CustomPropertyDefinition, bool) {
        if let Some(&id) = self.by_name.get(name) {
            return (&self.definitions[id.0], false);
        }
        let id = PropertyId(self.definitions.len());
        self.definitions.push(CustomPropertyDefinition {
            id,
            name: name.to_string(),
            property_type,
            owner: self.owner,
        });
        self.by_name.insert(name.to_string(), id);
        (&self.definitions[id.0], true)
    }

    /// Definitions in declaration order
    pub fn definitions(&self) -> &[CustomPropertyDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Custom values of one entity, keyed by definition
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomValues(BTreeMap<PropertyId, CustomValue>);

impl CustomValues {
    pub fn set(&mut self, definition: PropertyId, value: CustomValue) {
        self.0.insert(definition, value);
    }

    pub fn get(&self, definition: PropertyId) -> Option<&CustomValue> {
        self.0.get(&definition)
    }

    /// Literal text stored for `definition`
    pub fn value(&self, definition: &CustomPropertyDefinition) -> Option<&str> {
        self.0.get(&definition.id).map(|v| v.literal.as_str())
    }

    pub fn remove(&mut self, definition: PropertyId) -> Option<CustomValue> {
        self.0.remove(&definition)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &CustomValue)> {
        self.0.iter().map(|(id, v)| (*id, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
