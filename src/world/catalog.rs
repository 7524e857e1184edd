//! Entity catalog - read-only table of entity type definitions
//!
//! The engine reads movement cooldowns, societal values and mobility from
//! here. Display fields travel along for front ends but are never consulted
//! by the simulation.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{CatalogError, Result};
use crate::core::types::{EntityTypeId, Time};

/// Ordinal used to choose a crash target
///
/// `Unbounded` marks permanent obstacles and ranks above every finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SocietalValue {
    Ranked(u32),
    Unbounded,
}

impl std::fmt::Display for SocietalValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SocietalValue::Ranked(v) => write!(f, "{}", v),
            SocietalValue::Unbounded => f.write_str("unbounded"),
        }
    }
}

// Accepts either an integer or the string "unbounded"
impl<'de> Deserialize<'de> for SocietalValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = SocietalValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("non-negative integer or the string \"unbounded\"")
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                u32::try_from(value)
                    .map(SocietalValue::Ranked)
                    .map_err(|_| E::custom(format!("societal value {} is too large", value)))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                u32::try_from(value)
                    .map(SocietalValue::Ranked)
                    .map_err(|_| E::custom(format!("societal value {} is out of range", value)))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value.eq_ignore_ascii_case("unbounded") {
                    Ok(SocietalValue::Unbounded)
                } else {
                    Err(de::Error::unknown_variant(value, &["unbounded"]))
                }
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl Serialize for SocietalValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            SocietalValue::Ranked(v) => serializer.serialize_u32(*v),
            SocietalValue::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

/// One entity type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub id: EntityTypeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    /// Time between moves; 0 means the type never moves on its own
    #[serde(default)]
    pub movement_cooldown: Time,
    pub societal_value: SocietalValue,
    #[serde(default)]
    pub can_move: bool,
    #[serde(default)]
    pub is_agent: bool,
}

impl EntityType {
    /// Whether the type ever initiates a move
    pub fn is_self_propelled(&self) -> bool {
        self.can_move && self.movement_cooldown > 0
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "entity", default)]
    entities: Vec<EntityType>,
}

/// Lookup table of entity types
#[derive(Debug, Clone)]
pub struct EntityCatalog {
    types: AHashMap<EntityTypeId, EntityType>,
    /// Definition order, for listings
    order: Vec<EntityTypeId>,
    agent: EntityTypeId,
}

impl EntityCatalog {
    /// Build a catalog, checking ids are unique and there is exactly one
    /// mobile agent type
    pub fn new(entities: Vec<EntityType>) -> std::result::Result<Self, CatalogError> {
        let mut types = AHashMap::new();
        let mut order = Vec::with_capacity(entities.len());

        for entity in entities {
            if types.contains_key(&entity.id) {
                return Err(CatalogError::DuplicateType(entity.id));
            }
            order.push(entity.id.clone());
            types.insert(entity.id.clone(), entity);
        }

        let agents: Vec<&EntityType> = order
            .iter()
            .filter_map(|id| types.get(id))
            .filter(|t| t.is_agent)
            .collect();
        if agents.len() != 1 {
            return Err(CatalogError::AgentCount(agents.len()));
        }
        let agent = agents[0];
        if !agent.is_self_propelled() {
            return Err(CatalogError::ImmobileAgent(agent.id.clone()));
        }
        let agent = agent.id.clone();

        Ok(Self { types, order, agent })
    }

    /// Index a table already known to satisfy the catalog rules
    fn from_checked(entities: Vec<EntityType>, agent: EntityTypeId) -> Self {
        let order = entities.iter().map(|t| t.id.clone()).collect();
        let types = entities.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self { types, order, agent }
    }

    /// Built-in catalog of road users and roadside obstacles
    pub fn with_defaults() -> Self {
        fn mobile(id: &str, name: &str, symbol: &str, cooldown: Time, value: u32) -> EntityType {
            EntityType {
                id: EntityTypeId::new(id),
                name: name.to_string(),
                symbol: symbol.to_string(),
                movement_cooldown: cooldown,
                societal_value: SocietalValue::Ranked(value),
                can_move: true,
                is_agent: false,
            }
        }

        fn fixed(id: &str, name: &str, symbol: &str, value: SocietalValue) -> EntityType {
            EntityType {
                id: EntityTypeId::new(id),
                name: name.to_string(),
                symbol: symbol.to_string(),
                movement_cooldown: 0,
                societal_value: value,
                can_move: false,
                is_agent: false,
            }
        }

        let mut car = mobile("autonomous-car", "autonomous car", "🚘", 100, 4);
        car.is_agent = true;
        let agent = car.id.clone();

        let entities = vec![
            car,
            mobile("pedestrian", "pedestrian", "🚶", 300, 2),
            mobile("child", "child", "🧒", 250, 1),
            mobile("elderly", "elderly person", "🧓", 450, 2),
            mobile("cyclist", "cyclist", "🚴", 150, 3),
            mobile("dog", "dog", "🐕", 200, 5),
            mobile("car", "car", "🚗", 100, 6),
            fixed("tree", "tree", "🌳", SocietalValue::Ranked(7)),
            fixed("barrier", "barrier", "🚧", SocietalValue::Ranked(8)),
            fixed("building", "building", "🏢", SocietalValue::Unbounded),
        ];

        Self::from_checked(entities, agent)
    }

    /// Parse a catalog from `[[entity]]` TOML tables
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Ok(Self::new(file.entities)?)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn get(&self, id: &EntityTypeId) -> Option<&EntityType> {
        self.types.get(id)
    }

    /// The single agent type
    pub fn agent_type(&self) -> &EntityTypeId {
        &self.agent
    }

    pub fn is_agent(&self, id: &EntityTypeId) -> bool {
        *id == self.agent
    }

    /// All types in definition order
    pub fn iter(&self) -> impl Iterator<Item = &EntityType> {
        self.order.iter().filter_map(|id| self.types.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for EntityCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_outranks_everything() {
        assert!(SocietalValue::Unbounded > SocietalValue::Ranked(u32::MAX));
        assert!(SocietalValue::Ranked(5) > SocietalValue::Ranked(3));
    }

    #[test]
    fn test_default_catalog_has_one_agent() {
        let catalog = EntityCatalog::with_defaults();
        assert_eq!(catalog.agent_type().as_str(), "autonomous-car");
        assert_eq!(catalog.iter().filter(|t| t.is_agent).count(), 1);
        assert_eq!(catalog.iter().next().map(|t| t.id.as_str()), Some("autonomous-car"));
    }

    #[test]
    fn test_default_table_passes_validation() {
        let builtin = EntityCatalog::with_defaults();
        let checked = EntityCatalog::new(builtin.iter().cloned().collect()).unwrap();
        assert_eq!(checked.agent_type(), builtin.agent_type());
        assert_eq!(checked.len(), builtin.len());
        for entity in builtin.iter() {
            assert_eq!(checked.get(&entity.id), Some(entity));
        }
    }

    #[test]
    fn test_fixed_types_are_not_self_propelled() {
        let catalog = EntityCatalog::with_defaults();
        let tree = catalog.get(&"tree".into()).unwrap();
        assert!(!tree.is_self_propelled());
        let cyclist = catalog.get(&"cyclist".into()).unwrap();
        assert!(cyclist.is_self_propelled());
    }

    #[test]
    fn test_parse_catalog_toml() {
        let catalog = EntityCatalog::from_toml_str(
            r#"
            [[entity]]
            id = "robot"
            movement_cooldown = 50
            societal_value = 3
            can_move = true
            is_agent = true

            [[entity]]
            id = "wall"
            societal_value = "unbounded"
            "#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        let wall = catalog.get(&"wall".into()).unwrap();
        assert_eq!(wall.societal_value, SocietalValue::Unbounded);
        assert!(!wall.can_move);
        assert!(catalog.is_agent(&"robot".into()));
    }

    #[test]
    fn test_catalog_without_agent_rejected() {
        let result = EntityCatalog::from_toml_str(
            r#"
            [[entity]]
            id = "wall"
            societal_value = "unbounded"
            "#,
        );
        assert!(matches!(
            result,
            Err(crate::core::error::SimError::Catalog(CatalogError::AgentCount(0)))
        ));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let t = EntityType {
            id: "a".into(),
            name: String::new(),
            symbol: String::new(),
            movement_cooldown: 10,
            societal_value: SocietalValue::Ranked(1),
            can_move: true,
            is_agent: true,
        };
        let result = EntityCatalog::new(vec![t.clone(), t]);
        assert_eq!(result.err(), Some(CatalogError::DuplicateType("a".into())));
    }

    #[test]
    fn test_bad_societal_value_string() {
        let result = EntityCatalog::from_toml_str(
            r#"
            [[entity]]
            id = "x"
            societal_value = "priceless"
            "#,
        );
        assert!(result.is_err());
    }
}
