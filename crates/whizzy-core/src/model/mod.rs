//! Domain types shared by every stage of the onboarding and scheduling flow.
//!
//! Values here are already validated: a [`Profile`] either has a complete
//! [`Identity`] or none, and a [`Group`] exposes which configuration fields
//! are still missing. Raw stored documents live in [`crate::store::document`].

mod group;
mod ids;
mod profile;
mod task;
mod weekday;

pub use group::{Group, GroupField, UNNAMED_GROUP};
pub use ids::{GroupId, UserId};
pub use profile::{AVATAR_COUNT, AvatarIndex, Identity, Profile};
pub use task::{CatalogTask, ScheduledTask};
pub use weekday::{ParseWeekdayError, Weekday};
