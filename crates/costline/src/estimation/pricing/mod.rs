//! Read-only pricing configuration, built once at startup and shared behind an `Arc`.

pub mod building_types;
pub mod schedules;
pub mod scope_profiles;
pub mod space_rates;

use std::collections::HashMap;

use serde::Serialize;

use super::dealshield::policy::{self, DecisionInsurancePolicy};
use super::dealshield::profiles::{self, TileProfile};
use super::domain::{BuildingType, SpaceType, Trade};
use super::regional::RegionalResolver;

pub use building_types::{
    BuildingTypeProfile, InvestmentThresholds, MarketProfile, RevenueBasis, SiteRates,
    StructuralRates, SubtypeConfig,
};
pub use schedules::{PhaseTemplate, ScheduleTemplate};
pub use scope_profiles::{QuantityRule, ScopeItemTemplate, ScopeProfile};
pub use space_rates::{ExpectedRange, SpaceRates, TieredRate};

const SHARE_TOLERANCE: f64 = 1e-6;

/// Which step of the subtype → building type → global chain produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackTier {
    Exact,
    BuildingTypeDefault,
    GlobalDefault,
}

impl FallbackTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::BuildingTypeDefault => "building_type_default",
            Self::GlobalDefault => "global_default",
        }
    }
}

/// A configuration value together with the fallback tier that supplied it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub tier: FallbackTier,
}

impl<T> Resolved<T> {
    pub fn exact(value: T) -> Self {
        Self {
            value,
            tier: FallbackTier::Exact,
        }
    }

    pub fn fallback(value: T, tier: FallbackTier) -> Self {
        Self { value, tier }
    }

    pub fn is_fallback(&self) -> bool {
        self.tier != FallbackTier::Exact
    }
}

/// Configuration-authoring mistakes. Never caused by user input.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("building type {0} has no configured default subtype")]
    MissingDefaultSubtype(BuildingType),
    #[error("subtype {subtype} references unknown scope profile '{profile_id}'")]
    UnknownScopeProfile { subtype: String, profile_id: String },
    #[error("scope profile '{profile_id}' {trade:?} shares sum to {total}, expected 1.0")]
    UnbalancedScopeShares {
        profile_id: String,
        trade: Trade,
        total: f64,
    },
    #[error("unknown DealShield tile profile '{0}'")]
    UnknownTileProfile(String),
    #[error("tile profile '{profile_id}' references unknown tile '{tile_id}'")]
    UnknownTile { profile_id: String, tile_id: String },
    #[error("no decision insurance policy for tile profile '{0}'")]
    MissingPolicy(String),
    #[error("decision insurance policy '{profile_id}' is invalid: {reason}")]
    InvalidPolicy { profile_id: String, reason: String },
}

#[derive(Debug)]
pub struct PricingRegistry {
    space_rates: [SpaceRates; 14],
    building_types: [BuildingTypeProfile; 10],
    subtypes: HashMap<BuildingType, Vec<SubtypeConfig>>,
    scope_profiles: HashMap<&'static str, ScopeProfile>,
    type_schedules: HashMap<BuildingType, ScheduleTemplate>,
    subtype_schedules: Vec<(BuildingType, &'static str, ScheduleTemplate)>,
    global_schedule: ScheduleTemplate,
    tile_profiles: Vec<TileProfile>,
    policies: HashMap<&'static str, DecisionInsurancePolicy>,
    regional: RegionalResolver,
}

/// Lowercase, trimmed, snake_case form used for subtype lookups.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

impl PricingRegistry {
    /// Build the embedded tables and validate their cross references.
    pub fn standard() -> Result<Self, RegistryError> {
        let type_profiles = BuildingType::ordered().map(building_types::profile_for);

        let mut subtypes: HashMap<BuildingType, Vec<SubtypeConfig>> = HashMap::new();
        for config in building_types::subtype_configs() {
            subtypes.entry(config.building_type).or_default().push(config);
        }

        let type_schedules = BuildingType::ordered()
            .into_iter()
            .filter_map(|building_type| {
                schedules::building_type_schedule(building_type)
                    .map(|schedule| (building_type, schedule))
            })
            .collect();

        let scope_profiles = scope_profiles::scope_profiles()
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect();

        let tile_profiles = profiles::tile_profiles();
        let policies = tile_profiles
            .iter()
            .map(|profile| {
                let building = &type_profiles[profile.building_type as usize];
                (profile.id, policy::policy_for(profile, building))
            })
            .collect();

        let registry = Self {
            space_rates: SpaceType::ordered().map(space_rates::rates_for),
            building_types: type_profiles,
            subtypes,
            scope_profiles,
            type_schedules,
            subtype_schedules: schedules::subtype_schedules(),
            global_schedule: schedules::global_schedule(),
            tile_profiles,
            policies,
            regional: RegionalResolver::standard(),
        };
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        for building_type in BuildingType::ordered() {
            let profile = self.building_type(building_type);
            if self.exact_subtype(building_type, profile.default_subtype).is_none() {
                return Err(RegistryError::MissingDefaultSubtype(building_type));
            }
            self.tile_profile_by_id(profile.default_tile_profile)?;
        }

        for config in self.subtypes.values().flatten() {
            if let Some(profile_id) = config.scope_profile {
                if !self.scope_profiles.contains_key(profile_id) {
                    return Err(RegistryError::UnknownScopeProfile {
                        subtype: config.key.to_string(),
                        profile_id: profile_id.to_string(),
                    });
                }
            }
            if let Some(profile_id) = config.tile_profile {
                self.tile_profile_by_id(profile_id)?;
            }
        }

        for profile in self.scope_profiles.values() {
            for scope in &profile.trades {
                let total: f64 = scope.items.iter().map(|item| item.share).sum();
                if (total - 1.0).abs() > SHARE_TOLERANCE {
                    return Err(RegistryError::UnbalancedScopeShares {
                        profile_id: profile.id.to_string(),
                        trade: scope.trade,
                        total,
                    });
                }
            }
        }

        for profile in &self.tile_profiles {
            profile.validate()?;
            let policy = self.policy(profile.id)?;
            policy.validate(profile)?;
        }

        Ok(())
    }

    pub fn space_rates(&self, space: SpaceType) -> &SpaceRates {
        &self.space_rates[space as usize]
    }

    pub fn building_type(&self, building_type: BuildingType) -> &BuildingTypeProfile {
        &self.building_types[building_type as usize]
    }

    pub fn regional(&self) -> &RegionalResolver {
        &self.regional
    }

    pub fn subtypes(&self, building_type: BuildingType) -> &[SubtypeConfig] {
        self.subtypes
            .get(&building_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn exact_subtype(&self, building_type: BuildingType, key: &str) -> Option<&SubtypeConfig> {
        self.subtypes(building_type)
            .iter()
            .find(|config| config.key == key)
    }

    /// Subtype config, falling back to the building type's default subtype.
    pub fn subtype(
        &self,
        building_type: BuildingType,
        key: &str,
    ) -> Result<Resolved<&SubtypeConfig>, RegistryError> {
        let key = normalize_key(key);
        if let Some(config) = self.exact_subtype(building_type, &key) {
            return Ok(Resolved::exact(config));
        }

        let default_key = self.building_type(building_type).default_subtype;
        self.exact_subtype(building_type, default_key)
            .map(|config| Resolved::fallback(config, FallbackTier::BuildingTypeDefault))
            .ok_or(RegistryError::MissingDefaultSubtype(building_type))
    }

    pub fn schedule(&self, building_type: BuildingType, key: &str) -> Resolved<&ScheduleTemplate> {
        let key = normalize_key(key);
        if let Some((_, _, schedule)) = self
            .subtype_schedules
            .iter()
            .find(|(candidate, subtype, _)| *candidate == building_type && *subtype == key)
        {
            return Resolved::exact(schedule);
        }

        if let Some(schedule) = self.type_schedules.get(&building_type) {
            let tier = if self.exact_subtype(building_type, &key).is_some() {
                FallbackTier::Exact
            } else {
                FallbackTier::BuildingTypeDefault
            };
            return Resolved::fallback(schedule, tier);
        }

        Resolved::fallback(&self.global_schedule, FallbackTier::GlobalDefault)
    }

    /// Scope profile for a subtype; `None` when the subtype prices trades un-expanded.
    pub fn scope_profile(
        &self,
        building_type: BuildingType,
        key: &str,
    ) -> Result<Option<Resolved<&ScopeProfile>>, RegistryError> {
        let subtype = self.subtype(building_type, key)?;
        let Some(profile_id) = subtype.value.scope_profile else {
            return Ok(None);
        };
        let profile = self.scope_profiles.get(profile_id).ok_or_else(|| {
            RegistryError::UnknownScopeProfile {
                subtype: subtype.value.key.to_string(),
                profile_id: profile_id.to_string(),
            }
        })?;
        Ok(Some(Resolved::fallback(profile, subtype.tier)))
    }

    pub fn scope_profiles(&self) -> impl Iterator<Item = &ScopeProfile> {
        self.scope_profiles.values()
    }

    pub fn tile_profile_by_id(&self, profile_id: &str) -> Result<&TileProfile, RegistryError> {
        self.tile_profiles
            .iter()
            .find(|profile| profile.id == profile_id)
            .ok_or_else(|| RegistryError::UnknownTileProfile(profile_id.to_string()))
    }

    /// Tile profile for a subtype, falling back to the building type's default profile.
    pub fn tile_profile(
        &self,
        building_type: BuildingType,
        key: &str,
    ) -> Result<Resolved<&TileProfile>, RegistryError> {
        let key = normalize_key(key);
        if let Some(profile_id) = self
            .exact_subtype(building_type, &key)
            .and_then(|config| config.tile_profile)
        {
            return Ok(Resolved::exact(self.tile_profile_by_id(profile_id)?));
        }

        let default_id = self.building_type(building_type).default_tile_profile;
        Ok(Resolved::fallback(
            self.tile_profile_by_id(default_id)?,
            FallbackTier::BuildingTypeDefault,
        ))
    }

    pub fn tile_profiles(&self) -> &[TileProfile] {
        &self.tile_profiles
    }

    pub fn policy(&self, profile_id: &str) -> Result<&DecisionInsurancePolicy, RegistryError> {
        self.policies
            .get(profile_id)
            .ok_or_else(|| RegistryError::MissingPolicy(profile_id.to_string()))
    }
}
