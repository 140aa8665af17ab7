//! Store layer - state tree, transitions and the actor that owns them

pub mod actor;
pub mod fence;
pub mod handle;
pub mod reducers;
pub mod resource;
pub mod slices;
pub mod state;

pub use actor::StoreActor;
pub use fence::{Lane, SequenceFence, SliceId, Ticket};
pub use handle::Store;
pub use resource::{Collection, Keyed, Lifecycle, Remote};
pub use state::StoreState;
