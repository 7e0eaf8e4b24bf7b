//! List membership flags derived from account lists
//!
//! A flag is a local cache of "is this movie on that list". It is recomputed
//! whenever its inputs change and can be flipped optimistically in between.

use crate::models::MoviePage;

/// True iff both the list and the movie are loaded and the movie is on the list's page
pub fn derive_membership(list: Option<&MoviePage>, movie_id: Option<u64>) -> bool {
    match (list, movie_id) {
        (Some(list), Some(id)) => list.contains(id),
        _ => false,
    }
}

/// Identity of everything a flag is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagDeps {
    /// Movie id the screen is showing
    pub movie_key: u64,
    /// Version of the movie detail entry (0 = not loaded)
    pub movie_version: u64,
    /// Version of the list entry (0 = not loaded)
    pub list_version: u64,
}

/// One membership flag with the inputs it was last derived from
#[derive(Debug, Clone, Default)]
pub struct MembershipFlag {
    value: bool,
    deps: Option<FlagDeps>,
}

impl MembershipFlag {
    pub fn get(&self) -> bool {
        self.value
    }

    /// Recompute if `deps` differ from the last derivation; returns whether it ran
    ///
    /// Between two changes of `deps` the flag keeps whatever value it holds,
    /// including an optimistic flip.
    pub fn sync(
        &mut self,
        deps: FlagDeps,
        list: Option<&MoviePage>,
        movie_id: Option<u64>,
    ) -> bool {
        if self.deps == Some(deps) {
            return false;
        }
        self.deps = Some(deps);
        self.value = derive_membership(list, movie_id);
        true
    }

    /// Invert the local value without touching the derivation inputs
    pub fn flip(&mut self) {
        self.value = !self.value;
    }

    /// Forget the value and inputs (movie changed)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
