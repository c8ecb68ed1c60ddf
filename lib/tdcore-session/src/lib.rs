#![deny(unsafe_code)]

mod chat;
mod dc_options;
mod generated;
mod message_box;
mod peer;
mod session;
pub mod storages;

pub use chat::{ChatHashCache, PackedChat, PackedType};
pub use dc_options::{DEFAULT_DC, KNOWN_DC_OPTIONS};
pub use generated::LAYER as VERSION;
pub use generated::enums::DataCenter;
pub use generated::types::User;
pub use message_box::PrematureEndReason;
pub use message_box::{Gap, MessageBoxes, UpdatesLike};
pub use peer::{ChannelKind, Peer, PeerInfo, PeerKind};
pub use session::{DcOption, Session, UpdateState};

// Needed for auto-generated definitions.
use generated::{enums, types};
use tdcore_tl_types::{Deserializable, Identifiable, Serializable};
