//! Scene composition: type-erased objects, per-type operation tables,
//! provider views and the `Scene` root that ties them together.

mod scene_object;
mod intersection_set;
mod scene_intersect_context;
mod object_operation;
mod tick_operation;
mod draw_operation;
mod collision_operation;
mod spatial_query_operation;
mod scene_provider;
mod scene_view;
mod intersect_scene_view;
mod collision_scene_view;
mod tick_scene_view;
mod change_scene_view;
mod scene;

pub use scene_object::{SceneObject, SceneObjectFlags};
pub use intersection_set::IntersectionSet;
pub use scene_intersect_context::SceneIntersectContext;
pub use object_operation::{ObjectOperation, ObjectOperationType, IntoHandler};
pub use tick_operation::{TickHandler, TickOperation};
pub use draw_operation::{DrawContext, DrawHandler, DrawOperation};
pub use collision_operation::{CollisionHandler, CollisionOperation, SweepShape};
pub use spatial_query_operation::{SpatialQueryHandler, SpatialQueryOperation};
pub use scene_provider::{
    ProviderId, SceneProvider, ProviderInterface,
    IntersectSceneProvider, CollisionSceneProvider, TickSceneProvider, TickSceneListener,
};
pub use scene_view::{SceneView, SceneViewBase, SceneViewType};
pub use intersect_scene_view::IntersectSceneView;
pub use collision_scene_view::CollisionSceneView;
pub use tick_scene_view::TickSceneView;
pub use change_scene_view::{
    ChangeSceneView, ObjectChangeSceneView, ObjectChangeListener, SceneChangeListener,
};
pub use scene::Scene;
