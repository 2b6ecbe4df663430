//! Parameter-profile tables.
//!
//! A model owns one table mapping `ParametersId` to an immutable bundle of
//! physical constants.  Tables are filled by the model builder and never
//! change afterwards.

use pd_core::ParametersId;

use crate::{ModelError, ModelResult};

#[cfg(feature = "fx-hash")]
type ProfileMap<P> = rustc_hash::FxHashMap<ParametersId, P>;

#[cfg(not(feature = "fx-hash"))]
type ProfileMap<P> = std::collections::HashMap<ParametersId, P>;

/// Read-only lookup of parameter profiles by id.
#[derive(Clone, Debug)]
pub struct ProfileTable<P> {
    profiles: ProfileMap<P>,
}

impl<P> ProfileTable<P> {
    pub fn new() -> Self {
        Self { profiles: ProfileMap::default() }
    }

    /// Add a profile; a second profile with the same id is rejected.
    pub fn insert(&mut self, id: ParametersId, profile: P) -> ModelResult<()> {
        if self.profiles.contains_key(&id) {
            return Err(ModelError::DuplicateProfile(id));
        }
        self.profiles.insert(id, profile);
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: ParametersId) -> Option<&P> {
        self.profiles.get(&id)
    }

    /// Like [`get`](Self::get) but reports a missing id as `UnknownProfile`.
    pub fn require(&self, id: ParametersId) -> ModelResult<&P> {
        self.profiles.get(&id).ok_or(ModelError::UnknownProfile(id))
    }

    #[inline]
    pub fn contains(&self, id: ParametersId) -> bool {
        self.profiles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl<P> Default for ProfileTable<P> {
    fn default() -> Self {
        Self::new()
    }
}
