/// Scene providers and the query interfaces they may implement.
///
/// A provider exposes each capability through a typed accessor that
/// returns `None` when unsupported. Views ask for the one interface they
/// aggregate, so a provider can implement any subset without unchecked
/// casts.

use std::any::Any;
use std::fmt;
use glam::Vec3;
use crate::math::{CollisionState, ConvexHull, SweepParams, WorldTriangle};
use super::{IntersectionSet, Scene, SceneIntersectContext};

/// Id of a provider within one `Scene`. Recycled after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(u32);

impl ProviderId {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider#{}", self.0)
    }
}

/// Hull-vs-scene queries.
pub trait IntersectSceneProvider {
    /// Insert objects overlapping `hull` into `out`; returns how many were
    /// added.
    fn intersect(
        &self,
        context: &SceneIntersectContext,
        hull: &ConvexHull,
        out: &mut IntersectionSet,
    ) -> usize;
}

/// Sweep-vs-scene queries. Both return `true` when the query must stop.
pub trait CollisionSceneProvider {
    fn collide_ray(
        &self,
        source: Vec3,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool;

    fn collide_prism(
        &self,
        source: &WorldTriangle,
        extent: Vec3,
        sweep: &SweepParams,
        state: &mut CollisionState,
    ) -> bool;
}

/// Frame boundary notifications.
pub trait TickSceneListener {
    fn on_pre_tick(&self) {}

    fn on_post_tick(&self) {}
}

/// Per-frame object updates. Every tick provider also receives the
/// pre/post tick notifications.
pub trait TickSceneProvider: TickSceneListener {
    fn tick(&self, dt: f32);

    fn update_animations(&self, dt: f32);
}

pub trait SceneProvider: Any {
    fn intersect_provider(&self) -> Option<&(dyn IntersectSceneProvider + 'static)> {
        None
    }

    fn collision_provider(&self) -> Option<&(dyn CollisionSceneProvider + 'static)> {
        None
    }

    fn tick_provider(&self) -> Option<&(dyn TickSceneProvider + 'static)> {
        None
    }

    /// Called by `Scene::add_provider` after every existing view has been
    /// told about the provider.
    fn on_added_to_scene(&self, _scene: &Scene, _id: ProviderId) {}

    /// Called by `Scene::remove_provider` after the provider has left every
    /// view.
    fn on_removed_from_scene(&self, _scene: &Scene) {}

    fn debug_name(&self) -> &str {
        "SceneProvider"
    }
}

/// Maps a query interface to the provider accessor returning it.
pub trait ProviderInterface: 'static {
    fn query(provider: &dyn SceneProvider) -> Option<&Self>;
}

impl ProviderInterface for dyn IntersectSceneProvider {
    fn query(provider: &dyn SceneProvider) -> Option<&Self> {
        provider.intersect_provider()
    }
}

impl ProviderInterface for dyn CollisionSceneProvider {
    fn query(provider: &dyn SceneProvider) -> Option<&Self> {
        provider.collision_provider()
    }
}

impl ProviderInterface for dyn TickSceneProvider {
    fn query(provider: &dyn SceneProvider) -> Option<&Self> {
        provider.tick_provider()
    }
}
